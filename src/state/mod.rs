//! State owned by a single mirroring run
//!
//! # Components
//!
//! - `TransientLedger`: index pages written during traversal, removed at the end
//! - `CrawlStats`: counters reported when the run finishes

mod ledger;
mod stats;

pub use ledger::{CleanupReport, TransientLedger};
pub use stats::CrawlStats;
