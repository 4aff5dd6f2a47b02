use bytes::Bytes;
use rosella_shared::{Player, parse_claim_feed, parse_player_feed};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::state::{AppState, CachedFeed, FeedKind};

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(state.settings.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        players_url = %state.settings.players_url,
        claims_url = state.settings.claims_url.as_deref().unwrap_or("<disabled>"),
        interval_ms = state.settings.poll_interval.as_millis() as u64,
        "feed poller started"
    );

    loop {
        interval.tick().await;
        poll_once(&state).await;
    }
}

/// Fetch both upstream feeds concurrently and fold them into the cache.
pub(crate) async fn poll_once(state: &AppState) {
    state.observability.record_poll();
    let settings = &state.settings;
    let players = fetch_feed(&state.http_client, &settings.players_url);
    let claims = async {
        match settings.claims_url.as_deref() {
            Some(url) => Some(fetch_feed(&state.http_client, url).await),
            None => None,
        }
    };
    let (players, claims) = futures::future::join(players, claims).await;
    process_polled_feeds(state, players, claims).await;
}

/// Validate fresh payloads and swap them in. A payload that fails to fetch or
/// validate leaves the previous one in place.
async fn process_polled_feeds(
    state: &AppState,
    players: Result<Bytes, String>,
    claims: Option<Result<Bytes, String>>,
) {
    let online = match players.and_then(validate_players) {
        Ok((bytes, online)) => {
            let fresh = CachedFeed::new(FeedKind::Players, bytes, online.len());
            let mut cache = state.cache.write().await;
            if cache.players.as_ref().map(|feed| &feed.etag) != Some(&fresh.etag) {
                debug!(online = online.len(), etag = %fresh.etag, "player feed updated");
            }
            cache.players = Some(fresh);
            online
        }
        Err(e) => {
            state.observability.record_poll_failure();
            warn!(feed = "players", error = %e, "keeping previous payload");
            return;
        }
    };

    let Some(claims) = claims else {
        return;
    };
    match claims.and_then(|bytes| validate_claims(bytes, &online)) {
        Ok((bytes, kept)) => {
            state.cache.write().await.claims =
                Some(CachedFeed::new(FeedKind::Claims, bytes, kept));
        }
        Err(e) => {
            state.observability.record_poll_failure();
            warn!(feed = "claims", error = %e, "keeping previous payload");
        }
    }
}

fn validate_players(bytes: Bytes) -> Result<(Bytes, Vec<Player>), String> {
    let online = parse_player_feed(&bytes).map_err(|e| {
        format!("invalid player feed: {e}; body preview: {}", preview(&bytes))
    })?;
    Ok((bytes, online))
}

fn validate_claims(bytes: Bytes, online: &[Player]) -> Result<(Bytes, usize), String> {
    let claims = parse_claim_feed(&bytes, online).map_err(|e| {
        format!("invalid claim feed: {e}; body preview: {}", preview(&bytes))
    })?;
    Ok((bytes, claims.len()))
}

async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Bytes, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| format!("failed to read response body: {e}"))?;

    if !status.is_success() {
        return Err(format!(
            "upstream status {status}; body preview: {}",
            preview(&bytes)
        ));
    }
    Ok(bytes)
}

fn preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).chars().take(200).collect()
}
