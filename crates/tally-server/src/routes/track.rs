use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::PathRejection, ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use tracing::{debug, warn};

use tally_core::{hit::Visit, recorder::RecordOutcome};

use crate::state::AppState;

/// Sent on every track response so no intermediary caches it.
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate, post-check=0, pre-check=0";

/// `GET /track/{path}?action=&referrer=` — record one hit.
///
/// ## Auth
/// None. This endpoint is embedded on tracked pages.
///
/// ## Response
/// Always `200 OK` with an empty body and cache-prevention headers, whatever
/// happened internally. Bots, duplicates, lookup failures and storage
/// failures all look the same to the client; failures are only logged.
///
/// ## Enrichment
/// - visitor hash: `sha256(ip + day)`, the IP itself is never stored.
/// - country: MaxMind lookup of the client IP.
/// - device/browser: `woothee` parse of the `User-Agent` header.
/// - referrer: bare domain of the `referrer` query parameter.
///
/// A path segment that does not decode to UTF-8 is dropped like any other
/// unusable hit.
#[tracing::instrument(skip_all)]
pub async fn track(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
) -> Response {
    let path = match path {
        Ok(Path(path)) => path,
        Err(rejection) => {
            warn!(error = %rejection, "hit dropped: undecodable path");
            return no_store_ok();
        }
    };
    let peer = connect_info.map(|Extension(ConnectInfo(addr))| addr);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let agent = state.agents.classify(user_agent);

    let visit = Visit {
        ip: extract_client_ip(&headers, peer),
        path,
        action: params.get("action").cloned().unwrap_or_default(),
        referrer: params.get("referrer").cloned().unwrap_or_default(),
    };

    let today = Utc::now().date_naive();
    match state.recorder.record(&visit, &agent, today).await {
        Ok(RecordOutcome::Recorded) => debug!(path = %visit.path, "hit recorded"),
        Ok(RecordOutcome::Duplicate) => debug!(path = %visit.path, "duplicate hit ignored"),
        Ok(RecordOutcome::SkippedBot) => {}
        Err(e) => warn!(path = %visit.path, error = %e, "hit dropped"),
    }

    no_store_ok()
}

fn no_store_ok() -> Response {
    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
        .headers_mut()
        .insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

/// Extract the real client IP from `X-Forwarded-For` (first entry).
///
/// Falls back to the TCP peer address, then to `"unknown"` (which the
/// country lookup rejects, so such a hit is dropped).
pub fn extract_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
