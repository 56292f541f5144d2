use thiserror::Error;

/// Recoverable failures of the ingestion path.
///
/// Neither variant is surfaced to the tracked client; callers log it and
/// answer the request as if the hit had been recorded.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("country lookup failed: {0}")]
    CountryLookup(#[source] anyhow::Error),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
