use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ISO calendar date format used for every `day` column.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Format a day the way it is stored in the `hits` and `days` tables.
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parameters of one inbound track request, as parsed by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct Visit {
    /// Client IP. Only ever fed to the anonymizer, never persisted.
    pub ip: String,
    pub path: String,
    /// Empty for a plain page view.
    pub action: String,
    /// Raw `referrer` query value; normalized before storage.
    pub referrer: String,
}

/// Output of the user-agent classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentInfo {
    pub is_bot: bool,
    pub os: String,
    pub browser: String,
}

/// The stored hit. Mirrors the `hits` table columns exactly.
///
/// `(visitor_hash, path, action, day)` is the primary key: one visitor is
/// counted at most once per page, per action, per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub visitor_hash: String,
    pub path: String,
    pub action: String,
    pub day: NaiveDate,
    pub country: String,
    pub device: String,
    pub browser: String,
    pub referrer: String,
}

/// Result of an insert against a unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same key already existed; nothing was written.
    Duplicate,
}
