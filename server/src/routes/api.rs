use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::FEED_CACHE_CONTROL;
use crate::state::{AppState, FeedKind};

const EMPTY_CLAIMS: &[u8] = b"{}";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (players, claims) = {
        let cache = state.cache.read().await;
        (cache.players.clone(), cache.claims.clone())
    };
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": if players.is_some() { "ok" } else { "starting" },
        "online_players": players.as_ref().map_or(0, |feed| feed.entity_count),
        "claims_enabled": state.settings.claims_url.is_some(),
        "claims": claims.as_ref().map_or(0, |feed| feed.entity_count),
        "players_fetched_at": players.as_ref().map(|feed| feed.fetched_at.to_rfc3339()),
        "claims_fetched_at": claims.as_ref().map(|feed| feed.fetched_at.to_rfc3339()),
        "observability": {
            "polls_total": observability.polls_total,
            "poll_failures_total": observability.poll_failures_total,
            "feed_requests_total": observability.feed_requests_total,
            "not_modified_total": observability.not_modified_total,
        }
    }))
}

/// Serve the last good upstream player payload verbatim.
pub async fn get_players(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_feed(&state, FeedKind::Players, &headers).await
}

/// With claims disabled this is an empty claim map, so clients keep polling
/// players normally.
pub async fn get_claims(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.settings.claims_url.is_none() {
        state.observability.record_feed_request();
        return json_bytes_response(
            Bytes::from_static(EMPTY_CLAIMS),
            FEED_CACHE_CONTROL,
            None,
        );
    }
    serve_feed(&state, FeedKind::Claims, &headers).await
}

async fn serve_feed(state: &AppState, kind: FeedKind, headers: &HeaderMap) -> Response {
    state.observability.record_feed_request();
    let cached: Option<(String, Arc<Bytes>)> = {
        let cache = state.cache.read().await;
        cache
            .get(kind)
            .map(|feed| (feed.etag.clone(), Arc::clone(&feed.json)))
    };
    let Some((etag, json)) = cached else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &format!("{} feed has not been fetched yet", kind.name()),
        );
    };

    if if_none_match_matches(headers, &etag) {
        state.observability.record_not_modified();
        return not_modified_response(FEED_CACHE_CONTROL, Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), FEED_CACHE_CONTROL, Some(etag.as_str()))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let mut response = (status, Json(serde_json::json!({ "error": message }))).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
