use serde::{Deserialize, Serialize};

use crate::colors::Rgb;

/// Position in game-world coordinates. `y` is height and never projected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPos {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Feed `lastSeen` value. Upstream emits numbers; textual numbers compare
/// against numbers by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastSeen {
    Number(f64),
    Text(String),
}

impl LastSeen {
    /// Exact equality against the server heartbeat.
    pub fn matches(&self, heartbeat: &LastSeen) -> bool {
        match (self, heartbeat) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(t)) | (Self::Text(t), Self::Number(n)) => {
                t.trim().parse::<f64>().is_ok_and(|parsed| parsed == *n)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub color: Rgb,
    pub position: WorldPos,
    pub last_seen: LastSeen,
}

/// Territory claim, joined against the online player list of the same poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub owner: String,
    pub position: WorldPos,
    /// Owner's palette color for this poll cycle.
    pub color: Rgb,
    #[serde(default)]
    pub range: Option<f64>,
    #[serde(default)]
    pub last_seen: Option<LastSeen>,
}

#[cfg(test)]
mod tests {
    use super::LastSeen;

    #[test]
    fn numeric_heartbeats_compare_exactly() {
        let heartbeat = LastSeen::Number(100.0);
        assert!(LastSeen::Number(100.0).matches(&heartbeat));
        assert!(!LastSeen::Number(99.0).matches(&heartbeat));
        assert!(!LastSeen::Number(100.000_001).matches(&heartbeat));
    }

    #[test]
    fn textual_numbers_match_by_value() {
        let heartbeat = LastSeen::Number(1_700_000_000_000.0);
        assert!(LastSeen::Text("1700000000000".to_string()).matches(&heartbeat));
        assert!(!LastSeen::Text("yesterday".to_string()).matches(&heartbeat));
        assert!(LastSeen::Text("abc".to_string()).matches(&LastSeen::Text("abc".to_string())));
    }

    #[test]
    fn last_seen_deserializes_numbers_and_strings() {
        let number: LastSeen = serde_json::from_str("1700000000000").expect("integer lastSeen");
        assert_eq!(number, LastSeen::Number(1_700_000_000_000.0));
        let text: LastSeen = serde_json::from_str("\"42\"").expect("string lastSeen");
        assert_eq!(text, LastSeen::Text("42".to_string()));
    }
}
