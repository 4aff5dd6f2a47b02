use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::colors::palette_color;
use crate::entity::{Claim, LastSeen, Player, WorldPos};

/// Reserved feed key carrying the server heartbeat.
pub const HEARTBEAT_KEY: &str = "server";

#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Request could not be sent or the body could not be read.
    Transport(String),
    /// Upstream answered with a non-success HTTP status.
    Status(u16),
    /// Body is not the expected JSON shape.
    Decode(String),
    /// Player feed has no `server` heartbeat entry.
    MissingHeartbeat,
    /// A position tuple could not be parsed.
    BadPosition(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "fetch error: {e}"),
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Decode(e) => write!(f, "parse error: {e}"),
            Self::MissingHeartbeat => write!(f, "feed has no `{HEARTBEAT_KEY}` heartbeat"),
            Self::BadPosition(raw) => write!(f, "malformed position tuple {raw:?}"),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[derive(Deserialize)]
struct RawHeartbeat {
    #[serde(rename = "lastSeen")]
    last_seen: LastSeen,
}

// Only positions are strict; other fields of an unexpected type read as missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    last_seen_location: String,
    #[serde(default)]
    last_seen: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaim {
    position: String,
    #[serde(default)]
    owner: Option<Value>,
    #[serde(default)]
    range: Option<Value>,
    #[serde(default)]
    last_seen: Option<Value>,
}

fn loose_last_seen(value: Option<Value>) -> Option<LastSeen> {
    match value? {
        Value::Number(n) => n.as_f64().map(LastSeen::Number),
        Value::String(s) => Some(LastSeen::Text(s)),
        _ => None,
    }
}

fn loose_f64(value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Parse a textual `"(x,y,z)"` tuple. Parentheses and whitespace are optional.
pub fn parse_position(raw: &str) -> Result<WorldPos, FeedError> {
    let bad = || FeedError::BadPosition(raw.to_string());

    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('(').unwrap_or(trimmed);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    let mut parts = inner.split(',').map(|part| part.trim().parse::<f64>());
    let (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    Ok(WorldPos { x, y, z })
}

/// Parse the player feed into the online players of this cycle, in document
/// order. Every entry's position is validated, online or not.
pub fn parse_player_feed(bytes: &[u8]) -> Result<Vec<Player>, FeedError> {
    let payload: Map<String, Value> = serde_json::from_slice(bytes)?;
    let heartbeat = payload
        .get(HEARTBEAT_KEY)
        .ok_or(FeedError::MissingHeartbeat)
        .and_then(|value| RawHeartbeat::deserialize(value).map_err(FeedError::from))?
        .last_seen;

    let mut players = Vec::new();
    for (id, value) in &payload {
        if id == HEARTBEAT_KEY {
            continue;
        }
        let raw = RawPlayer::deserialize(value)
            .map_err(|e| FeedError::Decode(format!("player {id}: {e}")))?;
        let position = parse_position(&raw.last_seen_location)?;

        let Some(last_seen) =
            loose_last_seen(raw.last_seen).filter(|seen| seen.matches(&heartbeat))
        else {
            continue;
        };
        players.push(Player {
            id: id.clone(),
            name: loose_string(raw.name).unwrap_or_default(),
            color: palette_color(players.len()),
            position,
            last_seen,
        });
    }
    Ok(players)
}

/// Parse the claim feed, keeping only claims whose owner is in `online`.
pub fn parse_claim_feed(bytes: &[u8], online: &[Player]) -> Result<Vec<Claim>, FeedError> {
    let payload: Map<String, Value> = serde_json::from_slice(bytes)?;

    let mut claims = Vec::new();
    for (id, value) in &payload {
        if id == HEARTBEAT_KEY {
            continue;
        }
        let raw = RawClaim::deserialize(value)
            .map_err(|e| FeedError::Decode(format!("claim {id}: {e}")))?;
        let position = parse_position(&raw.position)?;

        let Some(owner) = loose_string(raw.owner)
            .and_then(|owner| online.iter().find(|player| player.id == owner))
        else {
            continue;
        };
        claims.push(Claim {
            id: id.clone(),
            owner: owner.id.clone(),
            color: owner.color,
            position,
            range: loose_f64(raw.range),
            last_seen: loose_last_seen(raw.last_seen),
        });
    }
    Ok(claims)
}
