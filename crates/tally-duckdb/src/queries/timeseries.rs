use anyhow::Result;
use chrono::NaiveDate;

use tally_core::analytics::StatRow;
use tally_core::hit::day_key;

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Per-day hit counts for `path` since `since` (inclusive).
    ///
    /// Zero-fill comes from the `days` table: every marker in the window
    /// appears exactly once, with `COUNT(h.visitor_hash)` evaluating to 0 when
    /// the left join found no hit. The path filter sits in the join condition
    /// so it cannot drop marker rows.
    pub async fn get_daily_counts(&self, path: &str, since: NaiveDate) -> Result<Vec<StatRow>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                d.day AS name,
                COUNT(h.visitor_hash) AS count
            FROM days AS d
            LEFT JOIN hits AS h
              ON h.day = d.day
             AND h.path = ?1
            WHERE d.day >= ?2
            GROUP BY d.day
            ORDER BY d.day
            "#,
        )?;
        let rows = stmt.query_map(duckdb::params![path, day_key(since)], |row| {
            Ok(StatRow {
                name: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut series = Vec::new();
        for row in rows {
            series.push(row?);
        }
        Ok(series)
    }
}
