//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.
//!
//! Row-level locking is emulated with one mutex per room: a writer acquires
//! the room's mutex before running the conflict check and insert, so the
//! no-overlap contract holds under concurrency exactly as it does for the
//! Postgres backend, while writers on different rooms stay fully concurrent.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::db::repository::{
    BookingRepository, ErrorContext, RepositoryError, RepositoryResult, RoomRepository,
};
use crate::models::{
    Booking, BookingId, BookingStatus, BookingWithRoom, NewBooking, Room, RoomId, UserId,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use roomstay::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// let room_id = repo.add_room("Sunset Suite", 12000, 2, "ES");
/// assert!(repo.has_room(room_id));
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    // One lock per room, created lazily; guards the conflict-check+insert
    // critical section the way a row-level lock does in Postgres.
    room_locks: Arc<Mutex<HashMap<RoomId, Arc<Mutex<()>>>>>,
}

struct LocalData {
    rooms: HashMap<RoomId, Room>,
    bookings: HashMap<BookingId, Booking>,

    // ID counters
    next_room_id: i64,
    next_booking_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            rooms: HashMap::new(),
            bookings: HashMap::new(),
            next_room_id: 1,
            next_booking_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            room_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with a handful of demo rooms, for
    /// running the server without a database.
    pub fn with_demo_rooms() -> Self {
        let repo = Self::new();
        repo.add_room("Sunset Suite", 18000, 2, "ES");
        repo.add_room("Harbour Loft", 14500, 4, "NL");
        repo.add_room("Garden Studio", 9000, 2, "PT");
        repo.add_room("Pine Cabin", 11000, 6, "NO");
        repo.add_room("Room 101", 7500, 1, "DE");
        repo
    }

    /// Add a room to the repository, assigning it an id.
    ///
    /// Helper for seeding data; room management is not part of the booking
    /// core's contract.
    pub fn add_room(
        &self,
        name: &str,
        nightly_price_cents: i64,
        capacity: i32,
        country: &str,
    ) -> RoomId {
        let mut data = self.data.write().unwrap();
        let room_id = RoomId(data.next_room_id);
        data.next_room_id += 1;
        data.rooms.insert(
            room_id,
            Room {
                id: room_id,
                name: name.to_string(),
                nightly_price_cents,
                capacity,
                country: country.to_string(),
                created_at: Utc::now(),
            },
        );
        room_id
    }

    /// Insert a booking directly with an explicit status, bypassing conflict
    /// detection. Test helper for seeding cancelled or closed rows.
    pub fn add_booking_with_status(
        &self,
        booking: &NewBooking,
        status: BookingStatus,
    ) -> BookingId {
        let mut data = self.data.write().unwrap();
        let booking_id = BookingId(data.next_booking_id);
        data.next_booking_id += 1;
        data.bookings.insert(
            booking_id,
            Booking {
                id: booking_id,
                user_id: booking.user_id,
                room_id: booking.room_id,
                start_date: booking.start_date,
                end_date: booking.end_date,
                status,
                created_at: Utc::now(),
            },
        );
        booking_id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Get the number of bookings stored, regardless of status.
    pub fn booking_count(&self) -> usize {
        self.data.read().unwrap().bookings.len()
    }

    /// Check if a room exists.
    pub fn has_room(&self, room_id: RoomId) -> bool {
        self.data.read().unwrap().rooms.contains_key(&room_id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    /// Fetch the lock guarding writes for one room, creating it on first use.
    fn room_lock(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        let mut locks = self.room_locks.lock().unwrap();
        locks.entry(room_id).or_default().clone()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn create_booking(&self, booking: &NewBooking) -> RepositoryResult<Booking> {
        self.check_health()?;

        // Serialize conflicting writers on this room. The guard spans the
        // conflict check and the insert; writers on other rooms take
        // different locks and proceed concurrently.
        let lock = self.room_lock(booking.room_id);
        let _guard = lock.lock().unwrap();

        let mut data = self.data.write().unwrap();

        // Emulates the foreign-key constraint of the relational schema.
        if !data.rooms.contains_key(&booking.room_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Room {} not found", booking.room_id),
                ErrorContext::new("create_booking")
                    .with_entity("room")
                    .with_entity_id(booking.room_id),
            ));
        }

        let conflicting = data.bookings.values().any(|existing| {
            existing.room_id == booking.room_id
                && existing.is_active()
                && existing.overlaps(booking.start_date, booking.end_date)
        });
        if conflicting {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Room {} already booked in [{}, {})",
                    booking.room_id, booking.start_date, booking.end_date
                ),
                ErrorContext::new("create_booking")
                    .with_entity("booking")
                    .with_entity_id(booking.room_id),
            ));
        }

        let booking_id = BookingId(data.next_booking_id);
        data.next_booking_id += 1;
        let persisted = Booking {
            id: booking_id,
            user_id: booking.user_id,
            room_id: booking.room_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        data.bookings.insert(booking_id, persisted.clone());

        Ok(persisted)
    }

    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        let data = self.data.read().unwrap();
        data.bookings.get(&booking_id).cloned().ok_or_else(|| {
            RepositoryError::not_found(format!("Booking {} not found", booking_id))
        })
    }

    async fn list_bookings(
        &self,
        user_id: Option<UserId>,
    ) -> RepositoryResult<Vec<BookingWithRoom>> {
        let data = self.data.read().unwrap();

        let mut entries: Vec<BookingWithRoom> = data
            .bookings
            .values()
            .filter(|b| user_id.map_or(true, |uid| b.user_id == uid))
            .filter_map(|b| {
                data.rooms.get(&b.room_id).map(|room| BookingWithRoom {
                    booking: b.clone(),
                    room: room.clone(),
                })
            })
            .collect();

        // Most recent reservations first; id descending breaks date ties
        // deterministically.
        entries.sort_by(|a, b| {
            b.booking
                .start_date
                .cmp(&a.booking.start_date)
                .then(b.booking.id.cmp(&a.booking.id))
        });
        Ok(entries)
    }

    async fn close_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        let booking = data.bookings.get_mut(&booking_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Booking {} not found", booking_id))
        })?;

        if booking.status == BookingStatus::Closed {
            return Err(RepositoryError::conflict_with_context(
                format!("Booking {} is already closed", booking_id),
                ErrorContext::new("close_booking")
                    .with_entity("booking")
                    .with_entity_id(booking_id),
            ));
        }

        booking.status = BookingStatus::Closed;
        Ok(booking.clone())
    }
}

#[async_trait]
impl RoomRepository for LocalRepository {
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        let data = self.data.read().unwrap();
        data.rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Room {} not found", room_id)))
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let data = self.data.read().unwrap();
        let mut rooms: Vec<Room> = data.rooms.values().cloned().collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_booking(user: i64, room: RoomId, start: &str, end: &str) -> NewBooking {
        NewBooking {
            user_id: UserId(user),
            room_id: room,
            start_date: date(start),
            end_date: date(end),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_get_booking() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        let created = repo
            .create_booking(&new_booking(1, room, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();
        assert_eq!(created.status, BookingStatus::Confirmed);

        let fetched = repo.get_booking(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_overlapping_booking_conflicts() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        repo.create_booking(&new_booking(1, room, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();

        let result = repo
            .create_booking(&new_booking(2, room, "2025-03-03", "2025-03-07"))
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
        assert_eq!(repo.booking_count(), 1);
    }

    #[tokio::test]
    async fn test_touching_booking_is_allowed() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        repo.create_booking(&new_booking(1, room, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();
        // Checkout day equals the next check-in day: no overlap.
        repo.create_booking(&new_booking(2, room, "2025-03-05", "2025-03-08"))
            .await
            .unwrap();
        assert_eq!(repo.booking_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_booking_does_not_conflict() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        repo.add_booking_with_status(
            &new_booking(1, room, "2025-03-01", "2025-03-05"),
            BookingStatus::Cancelled,
        );

        repo.create_booking(&new_booking(2, room, "2025-03-03", "2025-03-07"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_booking_still_conflicts() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        repo.add_booking_with_status(
            &new_booking(1, room, "2025-03-01", "2025-03-05"),
            BookingStatus::Closed,
        );

        let result = repo
            .create_booking(&new_booking(2, room, "2025-03-03", "2025-03-07"))
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_booking_unknown_room() {
        let repo = LocalRepository::new();
        let result = repo
            .create_booking(&new_booking(1, RoomId(99), "2025-03-01", "2025-03-05"))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(repo.booking_count(), 0);
    }

    #[tokio::test]
    async fn test_different_rooms_do_not_conflict() {
        let repo = LocalRepository::new();
        let room_a = repo.add_room("Sunset Suite", 18000, 2, "ES");
        let room_b = repo.add_room("Harbour Loft", 14500, 4, "NL");

        repo.create_booking(&new_booking(1, room_a, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();
        repo.create_booking(&new_booking(2, room_b, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_bookings_order_and_filter() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        repo.create_booking(&new_booking(1, room, "2025-03-01", "2025-03-03"))
            .await
            .unwrap();
        repo.create_booking(&new_booking(2, room, "2025-03-10", "2025-03-12"))
            .await
            .unwrap();
        repo.create_booking(&new_booking(1, room, "2025-03-05", "2025-03-07"))
            .await
            .unwrap();

        let all = repo.list_bookings(None).await.unwrap();
        assert_eq!(all.len(), 3);
        let starts: Vec<_> = all.iter().map(|e| e.booking.start_date).collect();
        assert_eq!(
            starts,
            vec![date("2025-03-10"), date("2025-03-05"), date("2025-03-01")]
        );

        let mine = repo.list_bookings(Some(UserId(1))).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.booking.user_id == UserId(1)));
        assert_eq!(mine[0].room.name, "Sunset Suite");
    }

    #[tokio::test]
    async fn test_close_booking_guarded() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");

        let created = repo
            .create_booking(&new_booking(1, room, "2025-03-01", "2025-03-05"))
            .await
            .unwrap();

        let closed = repo.close_booking(created.id).await.unwrap();
        assert_eq!(closed.status, BookingStatus::Closed);

        let second = repo.close_booking(created.id).await;
        assert!(matches!(second, Err(RepositoryError::Conflict { .. })));

        let missing = repo.close_booking(BookingId(999)).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_writes() {
        let repo = LocalRepository::new();
        let room = repo.add_room("Sunset Suite", 18000, 2, "ES");
        repo.set_healthy(false);

        let result = repo
            .create_booking(&new_booking(1, room, "2025-03-01", "2025-03-05"))
            .await;
        assert!(matches!(result, Err(RepositoryError::ConnectionError { .. })));
        assert_eq!(repo.booking_count(), 0);
    }
}
