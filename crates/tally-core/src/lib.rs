pub mod aggregator;
pub mod analytics;
pub mod config;
pub mod error;
pub mod hit;
pub mod ledger;
pub mod memory;
pub mod recorder;
pub mod visitor;
