//! Room catalogue queries.

use crate::db::repository::FullRepository;
use crate::models::{classify_room_name, Room, RoomCategory, RoomId};

use super::bookings::BookingError;
use crate::db::repository::RepositoryError;

/// A room together with its derived marketing category.
#[derive(Debug, Clone)]
pub struct RoomWithCategory {
    pub room: Room,
    pub category: RoomCategory,
}

/// List all rooms, annotated with the category derived from their name.
pub async fn list_rooms<R: FullRepository + ?Sized>(
    repo: &R,
) -> Result<Vec<RoomWithCategory>, BookingError> {
    let rooms = repo.list_rooms().await?;
    Ok(rooms
        .into_iter()
        .map(|room| {
            let category = classify_room_name(&room.name);
            RoomWithCategory { room, category }
        })
        .collect())
}

/// Fetch a single room by id.
pub async fn get_room<R: FullRepository + ?Sized>(
    repo: &R,
    room_id: RoomId,
) -> Result<RoomWithCategory, BookingError> {
    let room = repo.get_room(room_id).await.map_err(|e| match e {
        RepositoryError::NotFound { .. } => BookingError::NotFound { entity: "Room" },
        other => BookingError::Storage(other),
    })?;
    let category = classify_room_name(&room.name);
    Ok(RoomWithCategory { room, category })
}
