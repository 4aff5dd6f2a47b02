use rosella_shared::{FeedError, FeedSource};

/// Fetches the feeds over HTTP with the browser fetch API.
pub struct HttpFeedSource {
    pub players_url: &'static str,
    pub claims_url: Option<&'static str>,
}

impl FeedSource for HttpFeedSource {
    async fn fetch_players(&self) -> Result<Vec<u8>, FeedError> {
        fetch_bytes(self.players_url).await
    }

    async fn fetch_claims(&self) -> Result<Vec<u8>, FeedError> {
        match self.claims_url {
            Some(url) => fetch_bytes(url).await,
            None => Ok(b"{}".to_vec()),
        }
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FeedError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FeedError::Transport(e.to_string()))?;
    if !resp.ok() {
        return Err(FeedError::Status(resp.status()));
    }
    resp.binary()
        .await
        .map_err(|e| FeedError::Transport(format!("failed to read body: {e}")))
}
