//! Core booking repository trait.
//!
//! The conflict check and the insert live together behind
//! [`BookingRepository::create_booking`] because they must be atomic with
//! respect to concurrent callers targeting the same room. Implementations
//! provide that atomicity with their own locking primitive: `SELECT ... FOR
//! UPDATE` inside a transaction for Postgres, a per-room mutex for the
//! in-memory backend.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Booking, BookingId, BookingWithRoom, NewBooking, UserId};

/// Repository trait for booking storage.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Check if the storage backend is healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Atomically check for conflicts and insert a new booking.
    ///
    /// Within a single transaction, non-cancelled bookings for the room that
    /// satisfy the overlap predicate (`existing.start_date < new.end_date AND
    /// existing.end_date > new.start_date`) are locked; if any exist the
    /// transaction rolls back and `RepositoryError::Conflict` is returned.
    /// Otherwise the booking is inserted with status `Confirmed`.
    ///
    /// # Returns
    /// * `Ok(Booking)` - The persisted booking with generated id and timestamp
    /// * `Err(RepositoryError::Conflict)` - An overlapping booking exists
    /// * `Err(RepositoryError::NotFound)` - The referenced room does not exist
    /// * `Err(RepositoryError)` - Transient or internal storage failure;
    ///   nothing was inserted
    async fn create_booking(&self, booking: &NewBooking) -> RepositoryResult<Booking>;

    /// Fetch a single booking by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the booking doesn't exist
    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking>;

    /// List bookings joined with their room details, ordered by `start_date`
    /// descending. Consumers rely on this ordering.
    ///
    /// # Arguments
    /// * `user_id` - If supplied, restrict to that owner's bookings
    async fn list_bookings(
        &self,
        user_id: Option<UserId>,
    ) -> RepositoryResult<Vec<BookingWithRoom>>;

    /// Transition a booking to `Closed`.
    ///
    /// The update is guarded: it applies only while the current status is not
    /// already `Closed`, so of two racing close calls exactly one performs
    /// the transition and the other observes `RepositoryError::Conflict`.
    ///
    /// # Returns
    /// * `Ok(Booking)` - The updated booking
    /// * `Err(RepositoryError::NotFound)` - If the booking doesn't exist
    /// * `Err(RepositoryError::Conflict)` - If the booking is already closed
    async fn close_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking>;
}
