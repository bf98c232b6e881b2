//! Signal classification for the insider-signal pipeline.
//!
//! This crate handles:
//! - Trade value and ownership delta metrics
//! - Distinct-insider cluster counting per ticker
//! - Whale/cluster/standard labelling
//! - Per-ticker summaries

pub mod classifier;
pub mod cluster;
pub mod metrics;
pub mod summary;

pub use classifier::{ClassificationReport, SignalClassifier};
pub use cluster::ClusterIndex;
pub use metrics::{ownership_delta_pct, trade_value};
pub use summary::summarize;
