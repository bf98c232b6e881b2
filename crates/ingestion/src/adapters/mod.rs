//! Per-source adapters mapping upstream schemas onto [`Transaction`].
//!
//! Each adapter deserializes the filing-level fields of one upstream shape
//! and yields one result per nested trade entry. Record-level problems
//! (no ticker, no filing date, wrong shape) fail the whole record; entry-level
//! problems fail only that entry. Code filtering and the quantity invariant
//! are left to the normalizer.

pub mod edgar;
pub mod fmp;
pub mod sec_api;

use chrono::NaiveDate;
use insider_core::{InsiderRole, NormalizerConfig, Result, SourceKind, Transaction};

use crate::raw::RawFilingRecord;

/// Outcome of mapping one nested trade entry.
pub type EntryResult = Result<Transaction>;

/// Map a raw record with the adapter selected by its source tag.
pub fn adapt(record: &RawFilingRecord, config: &NormalizerConfig) -> Result<Vec<EntryResult>> {
    match record.source {
        SourceKind::SecApi => sec_api::adapt(&record.payload, config),
        SourceKind::Fmp => fmp::adapt(&record.payload, config),
        SourceKind::Edgar => edgar::adapt(&record.payload, config),
    }
}

/// Filing-level fields shared by every entry of one filing.
#[derive(Debug, Clone)]
pub(crate) struct FilingContext {
    pub ticker: String,
    pub insider: String,
    pub role: InsiderRole,
    pub filed_date: NaiveDate,
    pub is_planned: bool,
}

/// Entry-level fields of one trade.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntryFields {
    pub trade_date: Option<NaiveDate>,
    pub code: String,
    pub shares: f64,
    pub price_per_share: f64,
    pub shares_owned_after: f64,
    pub is_planned: bool,
}

impl FilingContext {
    /// Combine with one entry into a canonical transaction.
    pub(crate) fn transaction(&self, entry: EntryFields) -> Transaction {
        Transaction {
            ticker: self.ticker.clone(),
            insider: self.insider.clone(),
            role: self.role,
            filed_date: self.filed_date,
            trade_date: entry.trade_date.unwrap_or(self.filed_date),
            transaction_code: entry.code.trim().to_ascii_uppercase(),
            shares: entry.shares,
            price_per_share: entry.price_per_share,
            shares_owned_after: entry.shares_owned_after,
            is_planned: self.is_planned || entry.is_planned,
        }
    }
}
