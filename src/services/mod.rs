//! Service layer for business logic and orchestration.
//!
//! This module sits between the HTTP layer and the repository traits.
//! Services validate input, translate storage errors into domain errors, and
//! orchestrate cross-cutting concerns such as availability-cache
//! invalidation.

pub mod bookings;
pub mod cache;
pub mod rooms;

pub use bookings::{
    close_booking, create_booking, health_check, list_bookings, BookingError, BookingRequest,
};
pub use cache::{CacheError, NoopCache, RoomAvailabilityCache};
pub use rooms::{get_room, list_rooms, RoomWithCategory};
