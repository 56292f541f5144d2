use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use tally_core::{analytics::HitStore, ledger};
use tally_duckdb::DuckDbBackend;
use tally_server::{
    auth::password::{check_admin_hash, hash_password, DEFAULT_M_COST},
    config::Config,
    geo::MaxMindCountryResolver,
    state::AppState,
    user_agent::WootheeClassifier,
};

/// `tally health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$TALLY_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("TALLY_PORT").unwrap_or_else(|_| "1323".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

/// `tally hash-password <password>` — print an Argon2id hash for
/// `TALLY_ADMIN_PASSWORD_HASH`.
fn run_hash_password(password: Option<&str>) -> Result<()> {
    let password = password.context("usage: tally hash-password <password>")?;
    println!("{}", hash_password(password, DEFAULT_M_COST)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("health") => run_health_check(),
        Some("hash-password") => return run_hash_password(args.get(2).map(|s| s.as_str())),
        _ => {}
    }

    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tally=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    check_admin_hash(&cfg.admin_password_hash)?;

    // Ensure data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;

    // Schema setup failure is fatal: never serve against an unusable store.
    let db = DuckDbBackend::open(&cfg.db_path(), &cfg.duckdb_memory_limit)
        .context("failed to open database")?;

    // Without country data no hit can be recorded, so refuse to start.
    let countries = MaxMindCountryResolver::open(&cfg.geoip_path)?;
    info!(geoip_path = %cfg.geoip_path, "GeoIP database loaded");

    let store: Arc<dyn HitStore> = Arc::new(db);

    if let Err(e) = ledger::ensure_today(store.as_ref()).await {
        tracing::error!(error = %e, "Failed to create today's day marker");
    }

    let state = Arc::new(AppState::new(
        store,
        cfg.clone(),
        Arc::new(countries),
        Arc::new(WootheeClassifier),
    ));

    // Spawn background day-ledger task (runs at midnight UTC).
    tokio::spawn(tally_server::scheduler::run_day_ledger_loop(Arc::clone(
        &state.store,
    )));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = tally_server::app::build_app(state);

    info!(port = cfg.port, "Tally listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    Ok(())
}
