//! Booking business logic.
//!
//! These functions sit between the HTTP layer and the repository traits. They
//! validate input, translate repository errors into domain errors, and
//! orchestrate cross-cutting concerns (cache invalidation) so that behavior is
//! identical regardless of the storage backend.
//!
//! Conflict detection itself lives inside the repository: only the storage
//! layer can check for overlaps and insert atomically.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{Booking, BookingId, BookingWithRoom, NewBooking, RoomId, UserId};

use super::cache::RoomAvailabilityCache;

/// Date format accepted for booking boundaries.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Domain-level booking errors, as surfaced to callers of the service layer.
#[derive(Debug, Error)]
pub enum BookingError {
    /// A date string did not parse as `YYYY-MM-DD`.
    #[error("Invalid date '{value}': expected format YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    /// The checkout date is not strictly after the check-in date.
    #[error("Invalid date range: end date {end} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A user or room identifier was zero or negative.
    #[error("Invalid {field}: must be a positive integer, got {value}")]
    InvalidIdentifier { field: &'static str, value: i64 },

    /// The room already has an active booking overlapping the requested dates.
    #[error("Room {room_id} is already booked for the requested dates")]
    RoomAlreadyBooked { room_id: RoomId },

    /// The referenced booking or room does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The requesting user does not own the booking.
    #[error("Booking {booking_id} does not belong to the requesting user")]
    NotAuthorized { booking_id: BookingId },

    /// The booking was already closed by an earlier request.
    #[error("Booking {booking_id} is already closed")]
    AlreadyClosed { booking_id: BookingId },

    /// Unexpected storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Raw booking request as received from the outside world.
///
/// Dates are strings on purpose: parsing and validating them is part of the
/// service contract.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: i64,
    pub room_id: i64,
    pub start_date: String,
    pub end_date: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| BookingError::InvalidDateFormat {
        value: value.to_string(),
    })
}

fn require_positive(field: &'static str, value: i64) -> Result<i64, BookingError> {
    if value <= 0 {
        return Err(BookingError::InvalidIdentifier { field, value });
    }
    Ok(value)
}

/// Check if the storage backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(
    repo: &R,
) -> Result<bool, BookingError> {
    Ok(repo.health_check().await?)
}

/// Create a booking, rejecting any request that would overlap an active
/// booking for the same room.
///
/// Dates form a half-open interval `[start_date, end_date)`: a booking ending
/// on a given day does not conflict with one starting that day.
///
/// On success the room's cached availability is invalidated. Cache failures
/// are logged and do not affect the committed booking.
pub async fn create_booking<R: FullRepository + ?Sized>(
    repo: &R,
    cache: &dyn RoomAvailabilityCache,
    request: &BookingRequest,
) -> Result<Booking, BookingError> {
    let user_id = UserId::new(require_positive("user_id", request.user_id)?);
    let room_id = RoomId::new(require_positive("room_id", request.room_id)?);

    let start_date = parse_date(&request.start_date)?;
    let end_date = parse_date(&request.end_date)?;

    if end_date <= start_date {
        return Err(BookingError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let new_booking = NewBooking {
        user_id,
        room_id,
        start_date,
        end_date,
    };

    let booking = match repo.create_booking(&new_booking).await {
        Ok(booking) => booking,
        Err(RepositoryError::Conflict { .. }) => {
            info!(
                room_id = room_id.value(),
                %start_date,
                %end_date,
                "Booking rejected: overlapping active booking"
            );
            return Err(BookingError::RoomAlreadyBooked { room_id });
        }
        Err(RepositoryError::NotFound { .. }) => {
            return Err(BookingError::NotFound { entity: "Room" });
        }
        Err(e) => return Err(BookingError::Storage(e)),
    };

    info!(
        booking_id = booking.id.value(),
        room_id = room_id.value(),
        user_id = user_id.value(),
        "Booking created"
    );

    if let Err(e) = cache.invalidate(room_id) {
        warn!(
            room_id = room_id.value(),
            error = %e,
            "Failed to invalidate availability cache"
        );
    }

    Ok(booking)
}

/// List bookings with their rooms, most recent check-in first.
///
/// When `user_id` is given, only that user's bookings are returned.
pub async fn list_bookings<R: FullRepository + ?Sized>(
    repo: &R,
    user_id: Option<UserId>,
) -> Result<Vec<BookingWithRoom>, BookingError> {
    Ok(repo.list_bookings(user_id).await?)
}

/// Close a booking on behalf of the user who owns it.
///
/// The first close wins; any later attempt reports
/// [`BookingError::AlreadyClosed`].
pub async fn close_booking<R: FullRepository + ?Sized>(
    repo: &R,
    cache: &dyn RoomAvailabilityCache,
    booking_id: BookingId,
    requesting_user: UserId,
) -> Result<Booking, BookingError> {
    require_positive("booking_id", booking_id.value())?;
    require_positive("user_id", requesting_user.value())?;

    let existing = repo
        .get_booking(booking_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound { .. } => BookingError::NotFound { entity: "Booking" },
            other => BookingError::Storage(other),
        })?;

    if existing.user_id != requesting_user {
        warn!(
            booking_id = booking_id.value(),
            owner = existing.user_id.value(),
            requester = requesting_user.value(),
            "Close rejected: requester does not own booking"
        );
        return Err(BookingError::NotAuthorized { booking_id });
    }

    let closed = match repo.close_booking(booking_id).await {
        Ok(booking) => booking,
        Err(RepositoryError::Conflict { .. }) => {
            return Err(BookingError::AlreadyClosed { booking_id });
        }
        Err(RepositoryError::NotFound { .. }) => {
            return Err(BookingError::NotFound { entity: "Booking" });
        }
        Err(e) => return Err(BookingError::Storage(e)),
    };

    info!(
        booking_id = booking_id.value(),
        user_id = requesting_user.value(),
        "Booking closed"
    );

    if let Err(e) = cache.invalidate(closed.room_id) {
        warn!(
            room_id = closed.room_id.value(),
            error = %e,
            "Failed to invalidate availability cache"
        );
    }

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::models::BookingStatus;
    use crate::services::cache::testing::RecordingCache;
    use crate::services::cache::NoopCache;

    fn request(user: i64, room: i64, start: &str, end: &str) -> BookingRequest {
        BookingRequest {
            user_id: user,
            room_id: room,
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    fn repo_with_room() -> (LocalRepository, RoomId) {
        let repo = LocalRepository::new();
        let room_id = repo.add_room("Sunset Suite", 18_000, 2, "ES");
        (repo, room_id)
    }

    #[tokio::test]
    async fn test_create_booking_success() {
        let (repo, room_id) = repo_with_room();
        let cache = NoopCache;

        let booking = create_booking(
            &repo,
            &cache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.room_id, room_id);
    }

    #[tokio::test]
    async fn test_create_booking_invalid_date_format() {
        let (repo, room_id) = repo_with_room();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "01/09/2026", "2026-09-04"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::InvalidDateFormat { .. }));
    }

    #[tokio::test]
    async fn test_create_booking_inverted_range() {
        let (repo, room_id) = repo_with_room();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-04", "2026-09-01"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn test_create_booking_zero_length_range() {
        let (repo, room_id) = repo_with_room();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-01"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn test_create_booking_nonpositive_ids() {
        let (repo, room_id) = repo_with_room();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(0, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidIdentifier { field: "user_id", .. }
        ));

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(1, -3, "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidIdentifier { field: "room_id", .. }
        ));
    }

    #[tokio::test]
    async fn test_create_booking_overlap_maps_to_room_already_booked() {
        let (repo, room_id) = repo_with_room();

        create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-05"),
        )
        .await
        .unwrap();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(2, room_id.value(), "2026-09-03", "2026-09-07"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::RoomAlreadyBooked { .. }));
    }

    #[tokio::test]
    async fn test_create_booking_unknown_room() {
        let repo = LocalRepository::new();

        let err = create_booking(
            &repo,
            &NoopCache,
            &request(1, 42, "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BookingError::NotFound { entity: "Room" }));
    }

    #[tokio::test]
    async fn test_create_booking_invalidates_cache() {
        let (repo, room_id) = repo_with_room();
        let cache = RecordingCache::default();

        create_booking(
            &repo,
            &cache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();

        assert_eq!(&*cache.invalidated.lock().unwrap(), &[room_id]);
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_booking() {
        let (repo, room_id) = repo_with_room();
        let cache = RecordingCache::failing();

        let booking = create_booking(
            &repo,
            &cache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(repo.booking_count(), 1);
    }

    #[tokio::test]
    async fn test_close_booking_requires_ownership() {
        let (repo, room_id) = repo_with_room();

        let booking = create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();

        let err = close_booking(&repo, &NoopCache, booking.id, UserId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotAuthorized { .. }));

        let closed = close_booking(&repo, &NoopCache, booking.id, UserId::new(1))
            .await
            .unwrap();
        assert_eq!(closed.status, BookingStatus::Closed);
    }

    #[tokio::test]
    async fn test_close_booking_twice_reports_already_closed() {
        let (repo, room_id) = repo_with_room();

        let booking = create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();

        close_booking(&repo, &NoopCache, booking.id, UserId::new(1))
            .await
            .unwrap();

        let err = close_booking(&repo, &NoopCache, booking.id, UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::AlreadyClosed { .. }));
    }

    #[tokio::test]
    async fn test_close_booking_not_found() {
        let repo = LocalRepository::new();

        let err = close_booking(&repo, &NoopCache, BookingId::new(7), UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound { entity: "Booking" }));
    }

    #[tokio::test]
    async fn test_list_bookings_filters_by_user() {
        let (repo, room_id) = repo_with_room();
        let other = repo.add_room("Harbour Loft", 14_500, 4, "NL");

        create_booking(
            &repo,
            &NoopCache,
            &request(1, room_id.value(), "2026-09-01", "2026-09-04"),
        )
        .await
        .unwrap();
        create_booking(
            &repo,
            &NoopCache,
            &request(2, other.value(), "2026-09-02", "2026-09-05"),
        )
        .await
        .unwrap();

        let all = list_bookings(&repo, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = list_bookings(&repo, Some(UserId::new(1))).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].booking.user_id, UserId::new(1));
    }
}
