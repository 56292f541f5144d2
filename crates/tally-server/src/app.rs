use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::middleware::require_basic_auth, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive CORS so the track endpoint can be called from
///    any tracked site.
///
/// The `/stats` routes additionally sit behind HTTP Basic auth.
pub fn build_app(state: Arc<AppState>) -> Router {
    let stats = Router::new()
        .route("/stats", get(routes::stats::get_overview))
        .route("/stats/{path}", get(routes::stats::get_stats))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_basic_auth,
        ));

    Router::new()
        .route("/", get(routes::stats::index))
        .route("/health", get(routes::health::health))
        .route("/track/{path}", get(routes::track::track))
        .merge(stats)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
