use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use tally_core::{analytics::HitStore, ledger};

/// Time left until the next UTC midnight, never less than one second.
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let tomorrow = now.date_naive() + chrono::Duration::days(1);
    let millis = tomorrow
        .and_hms_opt(0, 0, 0)
        .map(|t| (t.and_utc() - now).num_milliseconds())
        .unwrap_or(86_400_000);
    Duration::from_millis(millis.max(1000) as u64)
}

/// One ledger step: write the marker for the day containing `now`.
///
/// A failed insert is logged and left for the next step; the stats series
/// lacks that day until then.
pub async fn ledger_tick(store: &dyn HitStore, now: DateTime<Utc>) {
    if let Err(e) = ledger::ensure_day(store, now.date_naive()).await {
        error!(error = %e, "day marker insert failed");
    }
}

/// Background loop: create the day marker for each new UTC day.
///
/// `main.rs` writes the first marker at startup; this loop sleeps until
/// midnight and ticks, whether or not any traffic arrived.
pub async fn run_day_ledger_loop(store: Arc<dyn HitStore>) {
    info!("Day ledger scheduler started");
    loop {
        tokio::time::sleep(until_next_midnight(Utc::now())).await;
        ledger_tick(store.as_ref(), Utc::now()).await;
    }
}
