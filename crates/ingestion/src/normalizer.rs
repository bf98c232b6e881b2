//! Transaction normalization.
//!
//! Maps batches of raw filing records onto canonical open-market purchase
//! transactions. Nothing in a batch is fatal: bad records and entries are
//! counted, logged and skipped.

use insider_core::{NormalizerConfig, SourceKind, Transaction};
use tracing::{debug, trace};

use crate::adapters;
use crate::raw::RawFilingRecord;

/// Statistics about normalization outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Raw records processed.
    pub records_seen: u64,
    /// Records skipped entirely (wrong shape, no ticker, no filing date).
    pub records_rejected: u64,
    /// Nested trade entries processed.
    pub entries_seen: u64,
    /// Entries kept as purchases.
    pub entries_retained: u64,
    /// Entries dropped for a non-purchase code.
    pub entries_filtered: u64,
    /// Entries dropped as unparseable or with negative quantities.
    pub entries_malformed: u64,
}

impl NormalizationStats {
    /// Fraction of entries that were malformed.
    pub fn malformed_frac(&self) -> f64 {
        if self.entries_seen > 0 {
            self.entries_malformed as f64 / self.entries_seen as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalizer from raw filing records to canonical purchases.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
    stats: NormalizationStats,
}

impl Normalizer {
    /// Create a normalizer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a custom configuration.
    pub fn with_config(config: NormalizerConfig) -> Self {
        Self {
            config,
            stats: NormalizationStats::default(),
        }
    }

    /// Normalize a batch, preserving record order and entry order.
    pub fn normalize_batch(&mut self, records: &[RawFilingRecord]) -> Vec<Transaction> {
        let before = self.stats.clone();
        let mut transactions = Vec::with_capacity(records.len());
        for record in records {
            self.normalize_into(record, &mut transactions);
        }

        debug!(
            records = records.len(),
            retained = transactions.len(),
            filtered = self.stats.entries_filtered - before.entries_filtered,
            malformed = self.stats.entries_malformed - before.entries_malformed,
            rejected = self.stats.records_rejected - before.records_rejected,
            "normalized filing batch"
        );
        transactions
    }

    /// Normalize raw API response bodies from one source.
    ///
    /// Each body is split into records with
    /// [`RawFilingRecord::batch_from_json_str`]. A body that is not valid JSON
    /// counts as one rejected record; the remaining bodies are still normalized.
    pub fn normalize_payloads<S: AsRef<str>>(
        &mut self,
        source: SourceKind,
        payloads: &[S],
    ) -> Vec<Transaction> {
        let mut records = Vec::new();
        for payload in payloads {
            match RawFilingRecord::batch_from_json_str(source, payload.as_ref()) {
                Ok(batch) => records.extend(batch),
                Err(err) => {
                    self.stats.records_seen += 1;
                    self.stats.records_rejected += 1;
                    debug!(source = %source, error = %err, "skipping unreadable payload");
                }
            }
        }
        self.normalize_batch(&records)
    }

    /// Normalize a single record.
    pub fn normalize_record(&mut self, record: &RawFilingRecord) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        self.normalize_into(record, &mut transactions);
        transactions
    }

    fn normalize_into(&mut self, record: &RawFilingRecord, out: &mut Vec<Transaction>) {
        self.stats.records_seen += 1;

        let entries = match adapters::adapt(record, &self.config) {
            Ok(entries) => entries,
            Err(err) => {
                self.stats.records_rejected += 1;
                debug!(source = %record.source, error = %err, "skipping filing record");
                return;
            }
        };

        for entry in entries {
            self.stats.entries_seen += 1;
            match entry {
                Ok(tx) if !tx.is_purchase() => {
                    self.stats.entries_filtered += 1;
                    trace!(
                        source = %record.source,
                        ticker = %tx.ticker,
                        code = %tx.transaction_code,
                        "dropping non-purchase entry"
                    );
                }
                Ok(tx) if !tx.has_valid_quantities() => {
                    self.stats.entries_malformed += 1;
                    debug!(
                        source = %record.source,
                        ticker = %tx.ticker,
                        shares = tx.shares,
                        price = tx.price_per_share,
                        "skipping entry with invalid quantities"
                    );
                }
                Ok(tx) => {
                    self.stats.entries_retained += 1;
                    out.push(tx);
                }
                Err(err) => {
                    self.stats.entries_malformed += 1;
                    debug!(source = %record.source, error = %err, "skipping filing entry");
                }
            }
        }
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Get the configuration.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

/// Normalize a batch with the default configuration.
pub fn normalize(records: &[RawFilingRecord]) -> Vec<Transaction> {
    Normalizer::new().normalize_batch(records)
}

/// Stable sort, newest filing first, then newest trade first.
pub fn sort_most_recent_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.filed_date
            .cmp(&a.filed_date)
            .then_with(|| b.trade_date.cmp(&a.trade_date))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn fmp_row(symbol: &str, name: &str, kind: &str, shares: Value, price: Value) -> RawFilingRecord {
        RawFilingRecord::new(
            SourceKind::Fmp,
            json!({
                "symbol": symbol,
                "reportingName": name,
                "filingDate": "2024-04-02 17:00:00",
                "transactionDate": "2024-04-01",
                "transactionType": kind,
                "securitiesTransacted": shares,
                "price": price,
                "securitiesOwned": 10000
            }),
        )
    }

    fn sec_filing(ticker: &str, filed_at: &str, codes: &[&str]) -> RawFilingRecord {
        let transactions: Vec<Value> = codes
            .iter()
            .map(|code| {
                json!({
                    "transactionDate": "2024-04-01",
                    "coding": {"code": code},
                    "amounts": {"shares": 100, "pricePerShare": 10.0}
                })
            })
            .collect();
        RawFilingRecord::new(
            SourceKind::SecApi,
            json!({
                "ticker": ticker,
                "filedAt": filed_at,
                "reportingOwner": {"name": "Doe Jane"},
                "nonDerivativeTable": {"transactions": transactions}
            }),
        )
    }

    #[test]
    fn test_empty_batch() {
        let mut normalizer = Normalizer::new();
        assert!(normalizer.normalize_batch(&[]).is_empty());
        assert_eq!(normalizer.stats(), &NormalizationStats::default());
    }

    #[test]
    fn test_sale_is_excluded() {
        let records = vec![fmp_row("TSLA", "Musk Elon", "S-Sale", json!(1_000_000), json!(250.0))];
        let mut normalizer = Normalizer::new();
        let transactions = normalizer.normalize_batch(&records);

        assert!(transactions.is_empty());
        let stats = normalizer.stats();
        assert_eq!(stats.entries_seen, 1);
        assert_eq!(stats.entries_filtered, 1);
        assert_eq!(stats.entries_malformed, 0);
    }

    #[test]
    fn test_mixed_codes_in_one_filing() {
        let records = vec![sec_filing("AAPL", "2024-04-02", &["P", "S", "M", "P", "G"])];
        let mut normalizer = Normalizer::new();
        let transactions = normalizer.normalize_batch(&records);

        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().all(Transaction::is_purchase));
        assert_eq!(normalizer.stats().entries_filtered, 3);
        assert_eq!(normalizer.stats().entries_retained, 2);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let records = vec![
            fmp_row("AAPL", "A", "P-Purchase", json!("many"), json!(200.0)),
            fmp_row("AAPL", "B", "P-Purchase", json!(-50), json!(200.0)),
            fmp_row("AAPL", "C", "P-Purchase", json!(500), json!(200.0)),
            RawFilingRecord::new(SourceKind::Fmp, json!({"symbol": "AAPL"})),
            RawFilingRecord::new(SourceKind::Edgar, json!([1, 2, 3])),
        ];
        let mut normalizer = Normalizer::new();
        let transactions = normalizer.normalize_batch(&records);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].insider, "C");

        let stats = normalizer.stats();
        assert_eq!(stats.records_seen, 5);
        assert_eq!(stats.records_rejected, 2);
        assert_eq!(stats.entries_seen, 3);
        assert_eq!(stats.entries_malformed, 2);
        assert!((stats.malformed_frac() - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mistyped_amount_counts_as_malformed_entry() {
        let records = vec![fmp_row("AAPL", "A", "P-Purchase", json!(true), json!(200.0))];
        let mut normalizer = Normalizer::new();
        assert!(normalizer.normalize_batch(&records).is_empty());

        let stats = normalizer.stats();
        assert_eq!(stats.records_rejected, 0);
        assert_eq!(stats.entries_seen, 1);
        assert_eq!(stats.entries_malformed, 1);
    }

    #[test]
    fn test_unreadable_payload_does_not_discard_others() {
        let first = json!([
            {"symbol": "KO", "reportingName": "A", "filingDate": "2024-02-20",
             "transactionType": "P-Purchase", "securitiesTransacted": 10, "price": 60.0}
        ])
        .to_string();
        let truncated = r#"[{"symbol": "KO", "reportingName": "#;
        let last = json!({"data": [
            {"symbol": "PEP", "reportingName": "B", "filingDate": "2024-02-21",
             "transactionType": "P-Purchase", "securitiesTransacted": 5, "price": 170.0}
        ]})
        .to_string();

        let mut normalizer = Normalizer::new();
        let payloads = [first.as_str(), truncated, last.as_str()];
        let transactions = normalizer.normalize_payloads(SourceKind::Fmp, &payloads);

        let tickers: Vec<&str> = transactions.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["KO", "PEP"]);
        assert_eq!(normalizer.stats().records_seen, 3);
        assert_eq!(normalizer.stats().records_rejected, 1);
        assert_eq!(normalizer.stats().entries_retained, 2);
    }

    #[test]
    fn test_preserves_input_order_across_sources() {
        let edgar = RawFilingRecord::new(
            SourceKind::Edgar,
            json!({
                "filedAt": "2024-04-03",
                "issuer": {"issuerTradingSymbol": "MSFT"},
                "reportingOwner": {"reportingOwnerId": {"rptOwnerName": "Smith Brad"}},
                "nonDerivativeTable": {"nonDerivativeTransaction": {
                    "transactionCoding": {"transactionCode": "P"},
                    "transactionAmounts": {"transactionShares": {"value": "10"}}
                }}
            }),
        );
        let records = vec![
            fmp_row("KO", "Quincey James", "P-Purchase", json!(10), json!(60.0)),
            edgar,
            sec_filing("AAPL", "2024-04-01", &["P"]),
        ];
        let tickers: Vec<String> = normalize(&records).into_iter().map(|t| t.ticker).collect();
        assert_eq!(tickers, vec!["KO", "MSFT", "AAPL"]);
    }

    #[test]
    fn test_custom_unknown_name() {
        let mut normalizer = Normalizer::with_config(NormalizerConfig {
            unknown_name: "(unnamed)".to_string(),
        });
        let records = vec![fmp_row("KO", "  ", "P-Purchase", json!(10), json!(60.0))];
        let transactions = normalizer.normalize_batch(&records);
        assert_eq!(transactions[0].insider, "(unnamed)");
    }

    #[test]
    fn test_stats_accumulate_and_reset() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize_record(&sec_filing("AAPL", "2024-04-02", &["P"]));
        normalizer.normalize_record(&sec_filing("AAPL", "2024-04-02", &["P", "S"]));
        assert_eq!(normalizer.stats().records_seen, 2);
        assert_eq!(normalizer.stats().entries_retained, 2);

        normalizer.reset_stats();
        assert_eq!(normalizer.stats().records_seen, 0);
    }

    #[test]
    fn test_sort_most_recent_first() {
        let records = vec![
            sec_filing("OLD", "2024-03-01", &["P"]),
            sec_filing("NEW", "2024-05-01", &["P"]),
            sec_filing("MID", "2024-04-01", &["P"]),
        ];
        let mut transactions = normalize(&records);
        sort_most_recent_first(&mut transactions);

        let tickers: Vec<&str> = transactions.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["NEW", "MID", "OLD"]);
        assert_eq!(
            transactions[0].filed_date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }
}
