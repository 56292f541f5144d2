use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::analytics::HitStore;
use crate::hit::InsertOutcome;

/// Make sure a day marker exists for `day`.
///
/// An existing marker is the normal case after the first call of the day and
/// is not an error.
pub async fn ensure_day(store: &dyn HitStore, day: NaiveDate) -> Result<InsertOutcome> {
    let outcome = store.insert_day(day).await?;
    match outcome {
        InsertOutcome::Inserted => info!(day = %day, "day marker created"),
        InsertOutcome::Duplicate => debug!(day = %day, "day marker already present"),
    }
    Ok(outcome)
}

/// [`ensure_day`] for the current UTC date.
pub async fn ensure_today(store: &dyn HitStore) -> Result<InsertOutcome> {
    ensure_day(store, Utc::now().date_naive()).await
}
