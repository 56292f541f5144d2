use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tally_core::analytics::{CountryResolver, HitStore, UserAgentClassifier};
use tally_core::config::Config;
use tally_core::hit::AgentInfo;
use tally_core::ledger;
use tally_core::memory::MemoryStore;
use tally_duckdb::DuckDbBackend;
use tally_server::app::build_app;
use tally_server::state::AppState;

struct NoCountry;

impl CountryResolver for NoCountry {
    fn country(&self, _ip: &str) -> Result<String> {
        Ok(String::new())
    }
}

struct PlainAgent;

impl UserAgentClassifier for PlainAgent {
    fn classify(&self, _user_agent: &str) -> AgentInfo {
        AgentInfo::default()
    }
}

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/tally-test".to_string(),
        geoip_path: "/nonexistent/GeoLite2-Country.mmdb".to_string(),
        admin_username: "admin".to_string(),
        admin_password_hash: "unused".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
    }
}

fn state_with(store: Arc<dyn HitStore>) -> Arc<AppState> {
    Arc::new(AppState::new(
        store,
        test_config(),
        Arc::new(NoCountry),
        Arc::new(PlainAgent),
    ))
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn test_health_returns_200_when_db_reachable() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let app = build_app(state_with(Arc::new(db)));

    let response = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["last_day"].is_null());
}

#[tokio::test]
async fn test_health_reports_latest_day_marker() {
    let store = Arc::new(MemoryStore::new());
    let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 6).expect("date");
    ledger::ensure_day(store.as_ref(), day).await.expect("marker");
    let app = build_app(state_with(store));

    let response = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["last_day"], "2024-05-06");
}

#[tokio::test]
async fn test_health_returns_503_when_store_unreachable() {
    struct DownStore(MemoryStore);

    #[async_trait::async_trait]
    impl HitStore for DownStore {
        async fn insert_hit(
            &self,
            hit: &tally_core::hit::Hit,
        ) -> Result<tally_core::hit::InsertOutcome> {
            self.0.insert_hit(hit).await
        }
        async fn insert_day(
            &self,
            day: chrono::NaiveDate,
        ) -> Result<tally_core::hit::InsertOutcome> {
            self.0.insert_day(day).await
        }
        async fn distinct_paths(&self) -> Result<Vec<String>> {
            self.0.distinct_paths().await
        }
        async fn daily_counts(
            &self,
            path: &str,
            since: chrono::NaiveDate,
        ) -> Result<Vec<tally_core::analytics::StatRow>> {
            self.0.daily_counts(path, since).await
        }
        async fn grouped_counts(
            &self,
            path: &str,
            dimension: tally_core::analytics::Dimension,
            since: chrono::NaiveDate,
        ) -> Result<Vec<tally_core::analytics::StatRow>> {
            self.0.grouped_counts(path, dimension, since).await
        }
        async fn latest_day(&self) -> Result<Option<chrono::NaiveDate>> {
            Err(anyhow!("connection lost"))
        }
    }

    let app = build_app(state_with(Arc::new(DownStore(MemoryStore::new()))));
    let response = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
}

#[tokio::test]
async fn test_unknown_route_returns_404_json() {
    let app = build_app(state_with(Arc::new(MemoryStore::new())));
    let response = app.oneshot(get("/nope")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}
