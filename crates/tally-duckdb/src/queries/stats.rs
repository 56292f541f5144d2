use anyhow::Result;
use chrono::NaiveDate;

use tally_core::analytics::{Dimension, StatRow};
use tally_core::hit::day_key;

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Hit counts for `path` since `since` (inclusive), grouped by one column.
    ///
    /// The column name comes from [`Dimension::column`], a fixed set of
    /// identifiers; user input only ever reaches the query as a parameter.
    /// Rows come back in column order; callers apply their own ranking.
    pub async fn get_grouped_counts(
        &self,
        path: &str,
        dimension: Dimension,
        since: NaiveDate,
    ) -> Result<Vec<StatRow>> {
        let column = dimension.column();
        let sql = format!(
            "SELECT {column} AS name, COUNT(*) AS count \
             FROM hits \
             WHERE path = ?1 AND day >= ?2 \
             GROUP BY {column} \
             ORDER BY {column}"
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(duckdb::params![path, day_key(since)], |row| {
            Ok(StatRow {
                name: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Every path that has at least one hit, ascending.
    pub async fn get_distinct_paths(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT DISTINCT path FROM hits ORDER BY path")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut paths = Vec::new();
        for row in rows {
            paths.push(row?);
        }
        Ok(paths)
    }
}
