//! Repository trait definitions for storage operations.
//!
//! Storage is abstracted behind focused traits so the same service layer runs
//! against Postgres in production and the in-memory backend in tests, with an
//! identical no-overlap contract.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`booking`]: Conflict-safe booking creation, lookup, listing, closing
//! - [`room`]: Read-only room lookups
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let rooms = repo.list_rooms().await?;
//!     let bookings = repo.list_bookings(None).await?;
//!     Ok(())
//! }
//! ```

pub mod booking;
pub mod error;
pub mod room;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use booking::BookingRepository;
pub use room::RoomRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements both repository
/// traits. Use this as a convenient bound when you need access to all
/// repository operations.
pub trait FullRepository: BookingRepository + RoomRepository {}

// Blanket implementation: any type implementing both traits qualifies.
impl<T> FullRepository for T where T: BookingRepository + RoomRepository {}
