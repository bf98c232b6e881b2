//! Filing ingestion and normalization for the insider-signal pipeline.
//!
//! This crate handles:
//! - Raw filing records tagged with their upstream schema
//! - Per-source adapters (sec-api.io, FinancialModelingPrep, SEC EDGAR)
//! - Purchase filtering and skip-and-continue normalization

pub mod adapters;
mod fields;
pub mod normalizer;
pub mod raw;

pub use normalizer::{normalize, sort_most_recent_first, NormalizationStats, Normalizer};
pub use raw::RawFilingRecord;
