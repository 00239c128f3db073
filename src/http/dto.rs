//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Dates cross the wire as `YYYY-MM-DD` strings; the service layer owns
//! parsing and validation.

use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingWithRoom, Room};
use crate::services::RoomWithCategory;

/// Request body for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: i64,
    pub room_id: i64,
    /// Check-in date, `YYYY-MM-DD`
    pub start_date: String,
    /// Checkout date, `YYYY-MM-DD` (exclusive)
    pub end_date: String,
}

/// Request body for closing a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseBookingRequest {
    /// User claiming ownership of the booking
    pub user_id: i64,
}

/// A booking as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDto {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub created_at: String,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.value(),
            user_id: b.user_id.value(),
            room_id: b.room_id.value(),
            start_date: b.start_date.to_string(),
            end_date: b.end_date.to_string(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// A room as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub id: i64,
    pub name: String,
    pub nightly_price_cents: i64,
    pub capacity: i32,
    pub country: String,
    /// Category derived from the room name
    pub category: String,
}

impl RoomDto {
    fn from_room(room: Room, category: &str) -> Self {
        Self {
            id: room.id.value(),
            name: room.name,
            nightly_price_cents: room.nightly_price_cents,
            capacity: room.capacity,
            country: room.country,
            category: category.to_string(),
        }
    }
}

impl From<RoomWithCategory> for RoomDto {
    fn from(rc: RoomWithCategory) -> Self {
        let category = rc.category.as_str();
        Self::from_room(rc.room, category)
    }
}

/// A booking joined with its room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithRoomDto {
    #[serde(flatten)]
    pub booking: BookingDto,
    pub room_name: String,
    pub room_country: String,
}

impl From<BookingWithRoom> for BookingWithRoomDto {
    fn from(bwr: BookingWithRoom) -> Self {
        Self {
            booking: bwr.booking.into(),
            room_name: bwr.room.name,
            room_country: bwr.room.country,
        }
    }
}

/// Response for listing bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingWithRoomDto>,
    pub total: usize,
}

/// Response for listing rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomDto>,
    pub total: usize,
}

/// Query parameters for listing bookings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookingListQuery {
    /// Restrict the listing to one user's bookings
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingId, BookingStatus, RoomId, UserId};
    use chrono::{TimeZone, Utc};

    fn sample_booking() -> Booking {
        Booking {
            id: BookingId::new(7),
            user_id: UserId::new(3),
            room_id: RoomId::new(2),
            start_date: "2026-09-01".parse().unwrap(),
            end_date: "2026-09-04".parse().unwrap(),
            status: BookingStatus::Confirmed,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_booking_dto_serializes_dates_as_plain_strings() {
        let dto = BookingDto::from(sample_booking());
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["start_date"], "2026-09-01");
        assert_eq!(json["end_date"], "2026-09-04");
        assert_eq!(json["status"], "CONFIRMED");
    }

    #[test]
    fn test_booking_with_room_dto_flattens_booking_fields() {
        let dto = BookingWithRoomDto {
            booking: BookingDto::from(sample_booking()),
            room_name: "Sunset Suite".to_string(),
            room_country: "ES".to_string(),
        };
        let json = serde_json::to_value(&dto).unwrap();

        // Flattened: booking fields at the top level next to the room fields.
        assert_eq!(json["id"], 7);
        assert_eq!(json["room_name"], "Sunset Suite");
        assert!(json.get("booking").is_none());
    }

    #[test]
    fn test_create_booking_request_deserializes() {
        let request: CreateBookingRequest = serde_json::from_str(
            r#"{"user_id": 1, "room_id": 2, "start_date": "2026-09-01", "end_date": "2026-09-04"}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, 1);
        assert_eq!(request.room_id, 2);
    }
}
