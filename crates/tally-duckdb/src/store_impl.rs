use async_trait::async_trait;
use chrono::NaiveDate;

use tally_core::analytics::{Dimension, HitStore, StatRow};
use tally_core::hit::{Hit, InsertOutcome};

use crate::DuckDbBackend;

#[async_trait]
impl HitStore for DuckDbBackend {
    async fn insert_hit(&self, hit: &Hit) -> anyhow::Result<InsertOutcome> {
        DuckDbBackend::insert_hit(self, hit).await
    }

    async fn insert_day(&self, day: NaiveDate) -> anyhow::Result<InsertOutcome> {
        DuckDbBackend::insert_day(self, day).await
    }

    async fn distinct_paths(&self) -> anyhow::Result<Vec<String>> {
        self.get_distinct_paths().await
    }

    async fn daily_counts(&self, path: &str, since: NaiveDate) -> anyhow::Result<Vec<StatRow>> {
        self.get_daily_counts(path, since).await
    }

    async fn grouped_counts(
        &self,
        path: &str,
        dimension: Dimension,
        since: NaiveDate,
    ) -> anyhow::Result<Vec<StatRow>> {
        self.get_grouped_counts(path, dimension, since).await
    }

    async fn latest_day(&self) -> anyhow::Result<Option<NaiveDate>> {
        DuckDbBackend::latest_day(self).await
    }
}
