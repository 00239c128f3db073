//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::{NoopCache, RoomAvailabilityCache};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Availability cache invalidated on booking mutations
    pub cache: Arc<dyn RoomAvailabilityCache>,
}

impl AppState {
    /// Create application state with the given repository and no cache.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            cache: Arc::new(NoopCache),
        }
    }

    /// Create application state with an explicit availability cache.
    pub fn with_cache(
        repository: Arc<dyn FullRepository>,
        cache: Arc<dyn RoomAvailabilityCache>,
    ) -> Self {
        Self { repository, cache }
    }
}
