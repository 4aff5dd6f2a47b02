use std::future::Future;

use crate::feed::{FeedError, parse_claim_feed, parse_player_feed};
use crate::store::FeedSnapshot;

/// Where raw feed bytes come from. The browser implements it over HTTP;
/// tests use in-memory payloads.
pub trait FeedSource {
    fn fetch_players(&self) -> impl Future<Output = Result<Vec<u8>, FeedError>>;
    fn fetch_claims(&self) -> impl Future<Output = Result<Vec<u8>, FeedError>>;
}

/// One poll cycle: fetch, parse, join.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    pub claims_enabled: bool,
}

impl Poller {
    pub const fn new(claims_enabled: bool) -> Self {
        Self { claims_enabled }
    }

    /// Fetch players, then claims joined against the freshly parsed player
    /// list. A claims feed that is absent or not yet available yields no
    /// claims; any other failure fails the whole cycle.
    pub async fn poll_once<S: FeedSource>(&self, source: &S) -> Result<FeedSnapshot, FeedError> {
        let players = parse_player_feed(&source.fetch_players().await?)?;
        if !self.claims_enabled {
            return Ok(FeedSnapshot {
                players,
                claims: Vec::new(),
            });
        }
        let claims = match source.fetch_claims().await {
            Ok(bytes) => parse_claim_feed(&bytes, &players)?,
            Err(error) if claims_unavailable(&error) => Vec::new(),
            Err(error) => return Err(error),
        };
        Ok(FeedSnapshot { players, claims })
    }
}

fn claims_unavailable(error: &FeedError) -> bool {
    matches!(error, FeedError::Status(404 | 503))
}
