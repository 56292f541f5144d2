use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::analytics::{CountryResolver, HitStore};
use crate::error::CoreError;
use crate::hit::{AgentInfo, Hit, InsertOutcome, Visit};
use crate::visitor::{anonymize, normalize_referrer};

/// What happened to a track request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Same visitor already hit this path and action today.
    Duplicate,
    /// Classified as a bot; nothing was written.
    SkippedBot,
}

/// Turns track requests into stored, anonymized hits.
pub struct HitRecorder {
    store: Arc<dyn HitStore>,
    countries: Arc<dyn CountryResolver>,
}

impl HitRecorder {
    pub fn new(store: Arc<dyn HitStore>, countries: Arc<dyn CountryResolver>) -> Self {
        Self { store, countries }
    }

    /// Record one hit for `visit` on `day`.
    ///
    /// Writes at most one row. A key collision is the expected deduplication
    /// path and is reported as [`RecordOutcome::Duplicate`]. A failed country
    /// lookup drops the hit without retrying.
    pub async fn record(
        &self,
        visit: &Visit,
        agent: &AgentInfo,
        day: NaiveDate,
    ) -> Result<RecordOutcome, CoreError> {
        if agent.is_bot {
            debug!(path = %visit.path, "bot hit ignored");
            return Ok(RecordOutcome::SkippedBot);
        }

        let visitor_hash = anonymize(&visit.ip, day);
        let country = self
            .countries
            .country(&visit.ip)
            .map_err(CoreError::CountryLookup)?;

        let hit = Hit {
            visitor_hash,
            path: visit.path.clone(),
            action: visit.action.clone(),
            day,
            country,
            device: agent.os.clone(),
            browser: agent.browser.clone(),
            referrer: normalize_referrer(&visit.referrer),
        };

        match self.store.insert_hit(&hit).await {
            Ok(InsertOutcome::Inserted) => Ok(RecordOutcome::Recorded),
            Ok(InsertOutcome::Duplicate) => Ok(RecordOutcome::Duplicate),
            Err(e) => Err(CoreError::Storage(e)),
        }
    }
}
