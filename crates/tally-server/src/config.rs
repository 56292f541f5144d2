/// Re-export `Config` from `tally-core` for use within this crate.
///
/// All environment-variable parsing lives in `tally-core` so integration
/// tests can build a `Config` without going through the environment.
pub use tally_core::config::Config;
