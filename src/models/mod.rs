//! Core domain types for the reservation backend.
//!
//! - [`booking`]: bookings, identifiers, statuses and the overlap predicate
//! - [`room`]: rooms and the decorative name-based category classification

pub mod booking;
pub mod room;

pub use booking::{Booking, BookingId, BookingStatus, BookingWithRoom, NewBooking, RoomId, UserId};
pub use room::{classify_room_name, Room, RoomCategory};
