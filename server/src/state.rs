use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::config::{
    claims_url, players_url, poll_interval, static_dir, upstream_connect_timeout,
    upstream_http_timeout,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Players,
    Claims,
}

impl FeedKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Claims => "claims",
        }
    }
}

/// Last good upstream payload, kept verbatim and shared with handlers via Arc.
#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub etag: String,
    pub json: Arc<Bytes>,
    pub fetched_at: DateTime<Utc>,
    /// Entities kept by validation (online players, or claims with an online owner).
    pub entity_count: usize,
}

impl CachedFeed {
    pub fn new(kind: FeedKind, json: Bytes, entity_count: usize) -> Self {
        Self {
            etag: feed_etag(kind, &json),
            json: Arc::new(json),
            fetched_at: Utc::now(),
            entity_count,
        }
    }
}

/// Content-derived ETag, so identical upstream payloads revalidate as 304.
pub fn feed_etag(kind: FeedKind, json: &[u8]) -> String {
    format!("\"{}-{:08x}\"", kind.name(), crc32fast::hash(json))
}

#[derive(Debug, Default)]
pub struct FeedCache {
    pub players: Option<CachedFeed>,
    pub claims: Option<CachedFeed>,
}

impl FeedCache {
    pub fn get(&self, kind: FeedKind) -> Option<&CachedFeed> {
        match kind {
            FeedKind::Players => self.players.as_ref(),
            FeedKind::Claims => self.claims.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub players_url: String,
    /// `None` disables the claims feed.
    pub claims_url: Option<String>,
    pub poll_interval: Duration,
    pub static_dir: String,
}

impl RelaySettings {
    pub fn from_env() -> Self {
        Self {
            players_url: players_url(),
            claims_url: claims_url(),
            poll_interval: poll_interval(),
            static_dir: static_dir(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<FeedCache>>,
    pub http_client: reqwest::Client,
    pub settings: Arc<RelaySettings>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    polls_total: AtomicU64,
    poll_failures_total: AtomicU64,
    feed_requests_total: AtomicU64,
    not_modified_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub polls_total: u64,
    pub poll_failures_total: u64,
    pub feed_requests_total: u64,
    pub not_modified_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            polls_total: self.polls_total.load(Ordering::Relaxed),
            poll_failures_total: self.poll_failures_total.load(Ordering::Relaxed),
            feed_requests_total: self.feed_requests_total.load(Ordering::Relaxed),
            not_modified_total: self.not_modified_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_poll(&self) {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll_failure(&self) {
        self.poll_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feed_request(&self) {
        self.feed_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_modified(&self) {
        self.not_modified_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(RelaySettings::from_env())
    }

    pub fn with_settings(settings: RelaySettings) -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("rosella-map/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to build timeout-configured HTTP client");
                reqwest::Client::new()
            });
        Self {
            cache: Arc::new(RwLock::new(FeedCache::default())),
            http_client,
            settings: Arc::new(settings),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
