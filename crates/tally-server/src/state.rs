use std::sync::Arc;

use tally_core::{
    analytics::{CountryResolver, HitStore, UserAgentClassifier},
    config::Config,
    recorder::HitRecorder,
};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Every handle is constructed once in `main.rs` (or a test) and never
/// mutated afterwards; there is no other in-process shared state.
pub struct AppState {
    /// The hit store. Deduplication is enforced by its unique key.
    pub store: Arc<dyn HitStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Turns track requests into stored hits. Holds its own store and
    /// country-resolver handles.
    pub recorder: HitRecorder,

    /// User-agent classifier used by the track endpoint.
    pub agents: Arc<dyn UserAgentClassifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn HitStore>,
        config: Config,
        countries: Arc<dyn CountryResolver>,
        agents: Arc<dyn UserAgentClassifier>,
    ) -> Self {
        Self {
            recorder: HitRecorder::new(Arc::clone(&store), countries),
            store,
            config: Arc::new(config),
            agents,
        }
    }
}
