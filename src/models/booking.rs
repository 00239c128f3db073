//! Booking domain model.
//!
//! A booking reserves a room over a half-open date interval
//! `[start_date, end_date)`. Two intervals touching at a single date do not
//! overlap, so back-to-back stays on the same room are always allowed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a persisted booking.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BookingId(pub i64);

/// Identifier of a user account. The reservation core consumes only the
/// identity; authentication happens upstream.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub i64);

/// Identifier of a room.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoomId(pub i64);

macro_rules! impl_id_conversions {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl $name {
            /// Create a new identifier.
            pub fn new(v: i64) -> Self {
                $name(v)
            }

            /// Get the raw value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }
    };
}

impl_id_conversions!(BookingId);
impl_id_conversions!(UserId);
impl_id_conversions!(RoomId);

/// Lifecycle status of a booking.
///
/// Bookings are created as `Confirmed`, may transition to `Closed` (terminal,
/// owner-only), or to `Cancelled` by an external collaborator. Cancelled
/// bookings never participate in conflict detection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Closed,
    Cancelled,
}

impl BookingStatus {
    /// Database/API representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(Self::Confirmed),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,
    /// First night of the stay (inclusive).
    pub start_date: NaiveDate,
    /// Checkout date (exclusive).
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking participates in conflict detection.
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    /// Whether this booking's interval overlaps `[start, end)`.
    ///
    /// Canonical predicate: `existing.start_date < end AND
    /// existing.end_date > start`. Intervals touching at a single date do
    /// not overlap.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date < end && self.end_date > start
    }
}

/// Parameters for a booking about to be inserted. Dates are already
/// validated: `end_date > start_date` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A booking joined with the details of the room it reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWithRoom {
    pub booking: Booking,
    pub room: super::Room,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn booking(start: &str, end: &str, status: BookingStatus) -> Booking {
        Booking {
            id: BookingId(1),
            user_id: UserId(1),
            room_id: RoomId(1),
            start_date: date(start),
            end_date: date(end),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overlap_contained() {
        let b = booking("2025-03-01", "2025-03-05", BookingStatus::Confirmed);
        assert!(b.overlaps(date("2025-03-03"), date("2025-03-07")));
        assert!(b.overlaps(date("2025-02-28"), date("2025-03-02")));
        assert!(b.overlaps(date("2025-03-02"), date("2025-03-04")));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let b = booking("2025-03-01", "2025-03-05", BookingStatus::Confirmed);
        // Back-to-back on either side of the existing stay.
        assert!(!b.overlaps(date("2025-03-05"), date("2025-03-08")));
        assert!(!b.overlaps(date("2025-02-25"), date("2025-03-01")));
    }

    #[test]
    fn test_disjoint_intervals_do_not_overlap() {
        let b = booking("2025-03-01", "2025-03-05", BookingStatus::Confirmed);
        assert!(!b.overlaps(date("2025-03-10"), date("2025-03-12")));
    }

    #[test]
    fn test_cancelled_booking_is_not_active() {
        assert!(!booking("2025-03-01", "2025-03-05", BookingStatus::Cancelled).is_active());
        assert!(booking("2025-03-01", "2025-03-05", BookingStatus::Confirmed).is_active());
        assert!(booking("2025-03-01", "2025-03-05", BookingStatus::Closed).is_active());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Closed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<BookingStatus>().is_err());
    }
}
