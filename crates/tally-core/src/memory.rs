//! In-process [`HitStore`] with the same key semantics as the SQL backend.
//!
//! Used for unit tests of the recorder, ledger and aggregator, and as a
//! stand-in store when a caller wants to run the core without a database.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::analytics::{Dimension, HitStore, StatRow};
use crate::hit::{day_key, Hit, InsertOutcome};

type HitKey = (String, String, String, NaiveDate);

#[derive(Default)]
struct Inner {
    hits: BTreeMap<HitKey, Hit>,
    days: BTreeSet<NaiveDate>,
    fail_writes: bool,
    failing: HashSet<Dimension>,
    fail_series: bool,
    fail_paths: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all stored hits in key order.
    pub fn hits(&self) -> Vec<Hit> {
        self.lock().hits.values().cloned().collect()
    }

    /// Snapshot of all day markers, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.lock().days.iter().copied().collect()
    }

    /// Make every subsequent insert fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make grouped queries on `dimension` fail.
    pub fn fail_dimension(&self, dimension: Dimension) {
        self.lock().failing.insert(dimension);
    }

    /// Make the daily series query fail.
    pub fn fail_series(&self, fail: bool) {
        self.lock().fail_series = fail;
    }

    /// Make the distinct-paths query fail.
    pub fn fail_paths(&self, fail: bool) {
        self.lock().fail_paths = fail;
    }
}

#[async_trait]
impl HitStore for MemoryStore {
    async fn insert_hit(&self, hit: &Hit) -> Result<InsertOutcome> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(anyhow!("memory store: writes disabled"));
        }
        let key = (
            hit.visitor_hash.clone(),
            hit.path.clone(),
            hit.action.clone(),
            hit.day,
        );
        if inner.hits.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        inner.hits.insert(key, hit.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn insert_day(&self, day: NaiveDate) -> Result<InsertOutcome> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(anyhow!("memory store: writes disabled"));
        }
        if inner.days.insert(day) {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Duplicate)
        }
    }

    async fn distinct_paths(&self) -> Result<Vec<String>> {
        let inner = self.lock();
        if inner.fail_paths {
            return Err(anyhow!("memory store: paths query disabled"));
        }
        let paths: BTreeSet<&str> = inner.hits.values().map(|h| h.path.as_str()).collect();
        Ok(paths.into_iter().map(str::to_string).collect())
    }

    async fn daily_counts(&self, path: &str, since: NaiveDate) -> Result<Vec<StatRow>> {
        let inner = self.lock();
        if inner.fail_series {
            return Err(anyhow!("memory store: series query disabled"));
        }
        Ok(inner
            .days
            .range(since..)
            .map(|day| {
                let count = inner
                    .hits
                    .values()
                    .filter(|h| h.path == path && h.day == *day)
                    .count();
                StatRow::new(day_key(*day), count as i64)
            })
            .collect())
    }

    async fn grouped_counts(
        &self,
        path: &str,
        dimension: Dimension,
        since: NaiveDate,
    ) -> Result<Vec<StatRow>> {
        let inner = self.lock();
        if inner.failing.contains(&dimension) {
            return Err(anyhow!("memory store: {} query disabled", dimension.column()));
        }
        let mut groups: BTreeMap<&str, i64> = BTreeMap::new();
        for hit in inner.hits.values() {
            if hit.path == path && hit.day >= since {
                *groups.entry(dimension.value_of(hit)).or_default() += 1;
            }
        }
        Ok(groups
            .into_iter()
            .map(|(name, count)| StatRow::new(name, count))
            .collect())
    }

    async fn latest_day(&self) -> Result<Option<NaiveDate>> {
        Ok(self.lock().days.last().copied())
    }
}
