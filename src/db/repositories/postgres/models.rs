use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{bookings, rooms};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Booking, BookingId, Room, RoomId, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl BookingRow {
    /// Convert a database row into the domain type.
    ///
    /// # Errors
    /// Returns `RepositoryError::InternalError` if the stored status string
    /// is not a known booking status.
    pub fn into_booking(self) -> RepositoryResult<Booking> {
        let status = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(Booking {
            id: BookingId(self.id),
            user_id: UserId(self.user_id),
            room_id: RoomId(self.room_id),
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub user_id: i64,
    pub room_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: i64,
    pub name: String,
    pub nightly_price_cents: i64,
    pub capacity: i32,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: RoomId(row.id),
            name: row.name,
            nightly_price_cents: row.nightly_price_cents,
            capacity: row.capacity,
            country: row.country,
            created_at: row.created_at,
        }
    }
}
