use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use tally_core::hit::{day_key, Hit, InsertOutcome, DAY_FORMAT};

use crate::schema::init_sql;

/// A DuckDB backend for Tally.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent writes
/// cause contention. The connection lives in `Arc<Mutex<_>>` so every
/// statement is serialised while the struct stays cheap to share across
/// Axum handlers and the ledger task.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    /// Runs the schema init SQL so all tables exist before the first request.
    /// A failure here is fatal for the caller.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests only. Data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert one hit, ignoring a primary-key collision.
    ///
    /// DuckDB reports zero changed rows when `INSERT OR IGNORE` skips a
    /// conflicting row; that is mapped to [`InsertOutcome::Duplicate`].
    pub async fn insert_hit(&self, hit: &Hit) -> Result<InsertOutcome> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            r#"INSERT OR IGNORE INTO hits (
                visitor_hash, path, action, day,
                country, device, browser, referrer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            duckdb::params![
                hit.visitor_hash,
                hit.path,
                hit.action,
                day_key(hit.day),
                hit.country,
                hit.device,
                hit.browser,
                hit.referrer,
            ],
        )?;
        Ok(if changed == 0 {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    /// Insert a day marker, ignoring an existing one.
    pub async fn insert_day(&self, day: NaiveDate) -> Result<InsertOutcome> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO days (day) VALUES (?1)",
            duckdb::params![day_key(day)],
        )?;
        Ok(if changed == 0 {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    /// Most recent day marker. Any query error surfaces, so `/health` uses
    /// this as its liveness check too.
    pub async fn latest_day(&self) -> Result<Option<NaiveDate>> {
        let conn = self.conn.lock().await;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(day) FROM days", [], |row| row.get(0))?;
        latest
            .map(|raw| NaiveDate::parse_from_str(&raw, DAY_FORMAT))
            .transpose()
            .map_err(Into::into)
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    /// Production code should use the typed methods above.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
