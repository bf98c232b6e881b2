//! Core data types for the insider-signal pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Transaction code for an open-market purchase.
pub const PURCHASE_CODE: &str = "P";

/// Upstream schema a raw filing record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// sec-api.io insider-trading filings (nested transaction tables).
    SecApi,
    /// FinancialModelingPrep insider-trading rows (one trade per row).
    Fmp,
    /// SEC EDGAR Form 4 ownership document, converted from XML to JSON.
    Edgar,
}

impl SourceKind {
    /// All supported sources.
    pub const ALL: [SourceKind; 3] = [SourceKind::SecApi, SourceKind::Fmp, SourceKind::Edgar];

    /// Stable tag used in configuration and bindings.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::SecApi => "sec_api",
            SourceKind::Fmp => "fmp",
            SourceKind::Edgar => "edgar",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| Error::unknown_source(s))
    }
}

/// Relationship of the reporting person to the issuer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsiderRole {
    Officer,
    Director,
    TenPercentOwner,
    #[default]
    Other,
}

impl InsiderRole {
    /// Resolve relationship flags. Officer > Director > TenPercentOwner.
    pub fn from_flags(is_officer: bool, is_director: bool, is_ten_percent_owner: bool) -> Self {
        if is_officer {
            InsiderRole::Officer
        } else if is_director {
            InsiderRole::Director
        } else if is_ten_percent_owner {
            InsiderRole::TenPercentOwner
        } else {
            InsiderRole::Other
        }
    }

    /// Display label.
    pub fn as_str(self) -> &'static str {
        match self {
            InsiderRole::Officer => "Officer",
            InsiderRole::Director => "Director",
            InsiderRole::TenPercentOwner => "TenPercentOwner",
            InsiderRole::Other => "Other",
        }
    }
}

/// Canonical insider transaction, independent of the upstream schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Exchange symbol, upper-cased.
    pub ticker: String,
    /// Reporting person or entity.
    pub insider: String,
    /// Relationship to the issuer.
    pub role: InsiderRole,
    /// Date the filing was submitted.
    pub filed_date: NaiveDate,
    /// Date of the trade itself (filing date when not reported).
    pub trade_date: NaiveDate,
    /// Raw transaction code from the source.
    pub transaction_code: String,
    /// Number of shares transacted.
    pub shares: f64,
    /// Price per share.
    pub price_per_share: f64,
    /// Shares held after the trade (0 when unknown).
    pub shares_owned_after: f64,
    /// Trade executed under a pre-arranged 10b5-1 plan.
    pub is_planned: bool,
}

impl Transaction {
    /// Is this an open-market purchase?
    #[inline]
    pub fn is_purchase(&self) -> bool {
        self.transaction_code.trim().eq_ignore_ascii_case(PURCHASE_CODE)
    }

    /// Check the non-negativity invariant on quantities.
    pub fn has_valid_quantities(&self) -> bool {
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;
        non_negative(self.shares)
            && non_negative(self.price_per_share)
            && non_negative(self.shares_owned_after)
    }
}

/// Signal label. A transaction carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Standard,
    Whale,
    Cluster,
}

impl Classification {
    /// Get the priority (lower = stronger signal).
    /// Cluster (1) > Whale (2) > Standard (3)
    pub fn priority(self) -> u8 {
        match self {
            Classification::Cluster => 1,
            Classification::Whale => 2,
            Classification::Standard => 3,
        }
    }

    /// Display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Standard => "Standard",
            Classification::Whale => "Whale",
            Classification::Cluster => "Cluster",
        }
    }
}

/// Derived metrics and label for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// shares * price_per_share.
    pub value: f64,
    /// Percentage increase of the insider's position.
    pub ownership_delta_pct: f64,
    /// Assigned label.
    pub classification: Classification,
    /// Distinct insiders buying the same ticker in the batch.
    pub cluster_size: u32,
    /// 1.0 for discretionary trades, reduced for planned trades.
    pub confidence: f64,
}

/// A transaction with its signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    /// Original transaction.
    pub transaction: Transaction,
    /// Computed signal.
    pub signal: Signal,
}

impl ClassifiedTransaction {
    #[inline]
    pub fn classification(&self) -> Classification {
        self.signal.classification
    }
}

/// Aggregate signal for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    /// Strongest label on the ticker.
    pub classification: Classification,
    /// Distinct insiders over the whole batch (before value filtering).
    pub cluster_size: u32,
    /// Number of reported transactions.
    pub transaction_count: u32,
    pub total_shares: f64,
    pub total_value: f64,
    pub max_value: f64,
    /// Distinct insiders among reported transactions, first-seen order.
    pub insiders: Vec<String>,
    /// Reported transactions made under a 10b5-1 plan.
    pub planned_count: u32,
    pub latest_trade_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_transaction(code: &str, shares: f64, price: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        Transaction {
            ticker: "AAPL".to_string(),
            insider: "Cook Timothy".to_string(),
            role: InsiderRole::Officer,
            filed_date: date,
            trade_date: date,
            transaction_code: code.to_string(),
            shares,
            price_per_share: price,
            shares_owned_after: 0.0,
            is_planned: false,
        }
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("sec_api".parse::<SourceKind>().unwrap(), SourceKind::SecApi);
        assert_eq!("SEC-API".parse::<SourceKind>().unwrap(), SourceKind::SecApi);
        assert_eq!(" fmp ".parse::<SourceKind>().unwrap(), SourceKind::Fmp);
        assert_eq!("edgar".parse::<SourceKind>().unwrap(), SourceKind::Edgar);
        assert!(matches!(
            "yahoo".parse::<SourceKind>(),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn test_role_precedence() {
        assert_eq!(InsiderRole::from_flags(true, true, true), InsiderRole::Officer);
        assert_eq!(InsiderRole::from_flags(false, true, true), InsiderRole::Director);
        assert_eq!(
            InsiderRole::from_flags(false, false, true),
            InsiderRole::TenPercentOwner
        );
        assert_eq!(InsiderRole::from_flags(false, false, false), InsiderRole::Other);
        assert_eq!(InsiderRole::default(), InsiderRole::Other);
    }

    #[test]
    fn test_is_purchase() {
        assert!(make_transaction("P", 1.0, 1.0).is_purchase());
        assert!(make_transaction(" p ", 1.0, 1.0).is_purchase());
        assert!(!make_transaction("S", 1.0, 1.0).is_purchase());
        assert!(!make_transaction("M", 1.0, 1.0).is_purchase());
    }

    #[test]
    fn test_quantity_invariant() {
        assert!(make_transaction("P", 0.0, 0.0).has_valid_quantities());
        assert!(!make_transaction("P", -1.0, 10.0).has_valid_quantities());
        assert!(!make_transaction("P", 10.0, -0.5).has_valid_quantities());
        assert!(!make_transaction("P", f64::NAN, 10.0).has_valid_quantities());
    }

    #[test]
    fn test_classification_priority() {
        assert!(Classification::Cluster.priority() < Classification::Whale.priority());
        assert!(Classification::Whale.priority() < Classification::Standard.priority());
    }
}
