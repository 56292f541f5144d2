use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Json,
};
use chrono::Utc;
use serde_json::json;

use tally_core::aggregator::{compute_stats, overview};

use crate::state::AppState;

/// `GET /` — send visitors of the bare host to the stats overview.
pub async fn index() -> Redirect {
    Redirect::to("/stats")
}

/// `GET /stats` — every tracked path.
///
/// Requires Basic auth (applied as a route layer in `app.rs`).
#[tracing::instrument(skip(state))]
pub async fn get_overview(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let paths = overview(state.store.as_ref()).await;
    Json(json!({ "data": paths }))
}

/// `GET /stats/{path}` — 30-day statistics for one path.
///
/// Requires Basic auth. A dimension whose query fails is returned as an
/// empty list; the rest of the bundle is still served.
#[tracing::instrument(skip(state))]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let result = compute_stats(state.store.as_ref(), &path, today).await;
    Json(json!({ "data": result }))
}
