//! Room lookup repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Room, RoomId};

/// Repository trait for read-only room lookups.
///
/// Rooms are immutable as far as the booking core is concerned; room
/// management is an external collaborator's responsibility.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Fetch a single room by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the room doesn't exist
    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room>;

    /// List all rooms, ordered by id.
    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;
}
