use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use tally_core::hit::day_key;

use crate::state::AppState;

/// `GET /health` — reports the newest day marker.
///
/// A stale `last_day` means the ledger task has stopped. If the store cannot
/// be read at all the answer is `503` with `"status": "degraded"`.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    match state.store.latest_day().await {
        Ok(last_day) => {
            let body = json!({
                "status": "ok",
                "version": version,
                "last_day": last_day.map(day_key),
            });
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "store unreadable");
            let body = json!({ "status": "degraded", "version": version });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}
