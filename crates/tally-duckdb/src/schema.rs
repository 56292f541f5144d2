/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `TALLY_DUCKDB_MEMORY`, default `"1GB"`).
///
/// IMPORTANT:
///   - The `hits` primary key is the deduplication mechanism. Inserts use
///     `INSERT OR IGNORE`, so a second hit with the same
///     `(visitor_hash, path, action, day)` is dropped by the database.
///   - `day` columns are ISO `YYYY-MM-DD` strings in both tables. The stats
///     window filter compares them lexically, which matches date order.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- HITS
-- ===========================================
CREATE TABLE IF NOT EXISTS hits (
    visitor_hash    VARCHAR NOT NULL,              -- sha256(ip + day)[0:32], never the raw IP
    path            VARCHAR NOT NULL,
    action          VARCHAR NOT NULL,              -- '' for a plain page view
    day             VARCHAR NOT NULL,              -- 'YYYY-MM-DD'
    country         VARCHAR NOT NULL DEFAULT '',
    device          VARCHAR NOT NULL DEFAULT '',   -- OS name from the user agent
    browser         VARCHAR NOT NULL DEFAULT '',
    referrer        VARCHAR NOT NULL DEFAULT '',   -- bare referrer domain
    PRIMARY KEY (visitor_hash, path, action, day)
);
CREATE INDEX IF NOT EXISTS idx_hits_path_day ON hits(path, day);

-- ===========================================
-- DAYS (one row per day the service has been live)
-- ===========================================
-- Drives zero-filled time series: days LEFT JOIN hits.
CREATE TABLE IF NOT EXISTS days (
    day             VARCHAR PRIMARY KEY
);
"#
    )
}
