//! Room availability cache seam.
//!
//! Booking mutations invalidate cached availability for the affected room.
//! Invalidation is best-effort: a cache failure is logged and never turns a
//! committed booking into an error.

use thiserror::Error;

use crate::models::RoomId;

/// Errors raised by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Cache of per-room availability data.
///
/// Implementations must tolerate invalidation for rooms they have never
/// cached.
pub trait RoomAvailabilityCache: Send + Sync {
    /// Drop any cached availability for the given room.
    fn invalidate(&self, room_id: RoomId) -> Result<(), CacheError>;
}

/// Cache implementation that caches nothing.
///
/// Used when no external cache is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl RoomAvailabilityCache for NoopCache {
    fn invalidate(&self, _room_id: RoomId) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records invalidated rooms; can be switched to fail on demand.
    #[derive(Default)]
    pub struct RecordingCache {
        pub invalidated: Mutex<Vec<RoomId>>,
        pub fail: Mutex<bool>,
    }

    impl RecordingCache {
        pub fn failing() -> Self {
            Self {
                invalidated: Mutex::new(Vec::new()),
                fail: Mutex::new(true),
            }
        }
    }

    impl RoomAvailabilityCache for RecordingCache {
        fn invalidate(&self, room_id: RoomId) -> Result<(), CacheError> {
            if *self.fail.lock().unwrap() {
                return Err(CacheError::Unavailable("simulated outage".into()));
            }
            self.invalidated.lock().unwrap().push(room_id);
            Ok(())
        }
    }
}
