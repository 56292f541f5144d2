use anyhow::Result;
use chrono::{Duration, NaiveDate};
use tracing::error;

use crate::analytics::{Dimension, HitStore, StatRow, StatsBundle};

/// Length of the trailing stats window in days. The lower bound is inclusive.
pub const STATS_WINDOW_DAYS: i64 = 30;

/// First day inside the window ending on `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(STATS_WINDOW_DAYS)
}

/// Order category rows by count descending, then by name ascending so that
/// equal counts always come back in the same order.
pub fn sort_by_count(rows: &mut [StatRow]) {
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
}

/// Collapse a failed dimension query to an empty list.
fn or_empty(result: Result<Vec<StatRow>>, path: &str, dimension: &str) -> Vec<StatRow> {
    result.unwrap_or_else(|e| {
        error!(path = %path, dimension, error = %e, "stats query failed");
        Vec::new()
    })
}

async fn category(
    store: &dyn HitStore,
    path: &str,
    dimension: Dimension,
    since: NaiveDate,
) -> Vec<StatRow> {
    let mut rows = or_empty(
        store.grouped_counts(path, dimension, since).await,
        path,
        dimension.column(),
    );
    sort_by_count(&mut rows);
    rows
}

/// Compute the stats bundle for `path` over the window ending on `today`.
///
/// Every dimension is queried independently; one failing query yields an
/// empty list for that dimension and does not affect the others.
pub async fn compute_stats(store: &dyn HitStore, path: &str, today: NaiveDate) -> StatsBundle {
    let since = window_start(today);

    let series = or_empty(store.daily_counts(path, since).await, path, "series");

    let mut actions = or_empty(
        store.grouped_counts(path, Dimension::Action, since).await,
        path,
        Dimension::Action.column(),
    );
    actions.sort_by(|a, b| a.name.cmp(&b.name));

    let countries = category(store, path, Dimension::Country, since).await;
    let browsers = category(store, path, Dimension::Browser, since).await;
    let devices = category(store, path, Dimension::Device, since).await;
    let referrers = category(store, path, Dimension::Referrer, since).await;

    StatsBundle {
        path: path.to_string(),
        series,
        actions,
        countries,
        browsers,
        devices,
        referrers,
    }
}

/// Distinct tracked paths. A failed query is logged and yields no paths.
pub async fn overview(store: &dyn HitStore) -> Vec<String> {
    store.distinct_paths().await.unwrap_or_else(|e| {
        error!(error = %e, "overview query failed");
        Vec::new()
    })
}
