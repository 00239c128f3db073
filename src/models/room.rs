//! Room domain model and name-based category classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RoomId;

/// A room available for reservation. Read-only as far as the booking core is
/// concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Nightly price in minor currency units.
    pub nightly_price_cents: i64,
    pub capacity: i32,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// Decorative category tag derived from a room's display name.
///
/// Purely presentational; plays no part in booking logic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomCategory {
    Suite,
    Penthouse,
    Loft,
    Studio,
    Cabin,
    Standard,
}

impl RoomCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suite => "suite",
            Self::Penthouse => "penthouse",
            Self::Loft => "loft",
            Self::Studio => "studio",
            Self::Cabin => "cabin",
            Self::Standard => "standard",
        }
    }
}

/// Ordered classification rules; the first matching substring wins.
const CATEGORY_RULES: &[(&str, RoomCategory)] = &[
    ("penthouse", RoomCategory::Penthouse),
    ("suite", RoomCategory::Suite),
    ("loft", RoomCategory::Loft),
    ("studio", RoomCategory::Studio),
    ("cabin", RoomCategory::Cabin),
];

/// Classify a room name into a category tag.
///
/// Case-insensitive substring match against [`CATEGORY_RULES`], first match
/// wins, [`RoomCategory::Standard`] if nothing matches.
pub fn classify_room_name(name: &str) -> RoomCategory {
    let lowered = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, category)| *category)
        .unwrap_or(RoomCategory::Standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_matches_substring_case_insensitive() {
        assert_eq!(classify_room_name("Sunset Suite"), RoomCategory::Suite);
        assert_eq!(classify_room_name("downtown LOFT 3b"), RoomCategory::Loft);
        assert_eq!(classify_room_name("Lakeside cabin"), RoomCategory::Cabin);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "penthouse" outranks "suite" in the rule order.
        assert_eq!(
            classify_room_name("Penthouse Suite"),
            RoomCategory::Penthouse
        );
    }

    #[test]
    fn test_classify_default() {
        assert_eq!(classify_room_name("Room 12"), RoomCategory::Standard);
        assert_eq!(classify_room_name(""), RoomCategory::Standard);
    }
}
