//! Storage and lookup abstractions.
//!
//! The core never talks to a concrete database, GeoIP reader or UA parser;
//! it is handed `Arc<dyn ...>` handles implementing these traits.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hit::{AgentInfo, Hit, InsertOutcome};

/// One `(name, count)` pair of an aggregated dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub name: String,
    pub count: i64,
}

impl StatRow {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Hit columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Action,
    Country,
    Browser,
    Device,
    Referrer,
}

impl Dimension {
    /// Column name in the `hits` table. Only these fixed identifiers are ever
    /// interpolated into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Action => "action",
            Dimension::Country => "country",
            Dimension::Browser => "browser",
            Dimension::Device => "device",
            Dimension::Referrer => "referrer",
        }
    }

    /// Extract this dimension's value from a hit.
    pub fn value_of(self, hit: &Hit) -> &str {
        match self {
            Dimension::Action => &hit.action,
            Dimension::Country => &hit.country,
            Dimension::Browser => &hit.browser,
            Dimension::Device => &hit.device,
            Dimension::Referrer => &hit.referrer,
        }
    }
}

/// Aggregated statistics for one path over the trailing window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsBundle {
    pub path: String,
    /// One row per known day (`name` = ISO date), zero-filled, ascending.
    pub series: Vec<StatRow>,
    pub actions: Vec<StatRow>,
    pub countries: Vec<StatRow>,
    pub browsers: Vec<StatRow>,
    pub devices: Vec<StatRow>,
    pub referrers: Vec<StatRow>,
}

/// Narrow storage capability: insert-or-ignore writes plus read-only grouped
/// aggregate queries.
///
/// Deduplication relies entirely on the implementation's unique-key
/// enforcement. Implementations must report a key collision as
/// [`InsertOutcome::Duplicate`], never as an error.
#[async_trait]
pub trait HitStore: Send + Sync + 'static {
    /// Insert a hit keyed by `(visitor_hash, path, action, day)`.
    async fn insert_hit(&self, hit: &Hit) -> Result<InsertOutcome>;

    /// Insert a day marker.
    async fn insert_day(&self, day: NaiveDate) -> Result<InsertOutcome>;

    /// Distinct tracked paths, ascending.
    async fn distinct_paths(&self) -> Result<Vec<String>>;

    /// Per-day hit counts for `path`: one row for every day marker with
    /// `day >= since`, 0 where no hit matched, ascending by day.
    async fn daily_counts(&self, path: &str, since: NaiveDate) -> Result<Vec<StatRow>>;

    /// Hit counts for `path` with `day >= since`, grouped by `dimension`.
    /// Absent categories are omitted. Order is unspecified.
    async fn grouped_counts(
        &self,
        path: &str,
        dimension: Dimension,
        since: NaiveDate,
    ) -> Result<Vec<StatRow>>;

    /// Most recent day marker, `None` before the ledger has run once.
    /// Doubles as the store's liveness check.
    async fn latest_day(&self) -> Result<Option<NaiveDate>>;
}

/// IP to country name lookup.
pub trait CountryResolver: Send + Sync + 'static {
    fn country(&self, ip: &str) -> Result<String>;
}

/// User-agent classification.
pub trait UserAgentClassifier: Send + Sync + 'static {
    fn classify(&self, user_agent: &str) -> AgentInfo;
}
