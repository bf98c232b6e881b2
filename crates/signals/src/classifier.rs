//! Whale/cluster classification of insider purchases.
//!
//! Labels every transaction of one evaluation window and aggregates the
//! result per ticker. Cluster detection always runs on the whole batch; the
//! optional minimum-value filter only trims what is reported.

use insider_core::{
    ClassifiedTransaction, Classification, ClassifierConfig, Result, Signal, TickerSummary,
    Transaction,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::ClusterIndex;
use crate::metrics::{ownership_delta_pct, trade_value};
use crate::summary::summarize;

/// Confidence for a discretionary (unplanned) trade.
const FULL_CONFIDENCE: f64 = 1.0;

/// Classified output of one evaluation window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Reported transactions with their signals, in input order.
    pub signals: Vec<ClassifiedTransaction>,
    /// One aggregate per reported ticker, strongest first.
    pub summaries: Vec<TickerSummary>,
}

impl ClassificationReport {
    /// No transactions were reported.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Reported transactions with the given label.
    pub fn with_classification(
        &self,
        classification: Classification,
    ) -> impl Iterator<Item = &ClassifiedTransaction> {
        self.signals
            .iter()
            .filter(move |ct| ct.signal.classification == classification)
    }

    /// Reported whale transactions.
    pub fn whales(&self) -> impl Iterator<Item = &ClassifiedTransaction> {
        self.with_classification(Classification::Whale)
    }

    /// Reported cluster transactions.
    pub fn clusters(&self) -> impl Iterator<Item = &ClassifiedTransaction> {
        self.with_classification(Classification::Cluster)
    }

    /// Summary for one ticker, if it was reported.
    pub fn summary(&self, ticker: &str) -> Option<&TickerSummary> {
        self.summaries.iter().find(|s| s.ticker == ticker)
    }
}

/// Signal classifier over a batch of canonical transactions.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    config: ClassifierConfig,
}

impl SignalClassifier {
    /// Create a classifier. Fails if the policy is out of bounds.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the classification policy.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Label one transaction given its ticker's cluster size.
    ///
    /// Cluster takes precedence over Whale.
    pub fn classify_transaction(&self, tx: &Transaction, cluster_size: u32) -> Signal {
        let value = trade_value(tx);
        let classification = if cluster_size >= self.config.cluster_min_insiders {
            Classification::Cluster
        } else if value >= self.config.whale_threshold {
            Classification::Whale
        } else {
            Classification::Standard
        };
        let confidence = if tx.is_planned {
            self.config.planned_trade_weight
        } else {
            FULL_CONFIDENCE
        };

        Signal {
            value,
            ownership_delta_pct: ownership_delta_pct(tx),
            classification,
            cluster_size,
            confidence,
        }
    }

    /// Classify a batch and summarize it per ticker.
    ///
    /// Never fails; an empty batch yields an empty report.
    pub fn classify(&self, transactions: &[Transaction]) -> ClassificationReport {
        if transactions.is_empty() {
            return ClassificationReport::default();
        }

        let index = ClusterIndex::build(transactions);
        let signals: Vec<ClassifiedTransaction> = transactions
            .iter()
            .map(|tx| ClassifiedTransaction {
                signal: self.classify_transaction(tx, index.cluster_size(&tx.ticker)),
                transaction: tx.clone(),
            })
            .filter(|ct| ct.signal.value >= self.config.min_value)
            .collect();
        let summaries = summarize(&signals);

        debug!(
            transactions = transactions.len(),
            reported = signals.len(),
            tickers = index.ticker_count(),
            clustered = index.clustered_tickers(self.config.cluster_min_insiders).len(),
            "classified insider batch"
        );

        ClassificationReport { signals, summaries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use insider_core::InsiderRole;

    fn make_tx(ticker: &str, insider: &str, shares: f64, price: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        Transaction {
            ticker: ticker.to_string(),
            insider: insider.to_string(),
            role: InsiderRole::Director,
            filed_date: date,
            trade_date: date,
            transaction_code: "P".to_string(),
            shares,
            price_per_share: price,
            shares_owned_after: 0.0,
            is_planned: false,
        }
    }

    fn classifier(whale_threshold: f64, cluster_min_insiders: u32) -> SignalClassifier {
        SignalClassifier::new(ClassifierConfig::new(whale_threshold, cluster_min_insiders)).unwrap()
    }

    #[test]
    fn test_two_insiders_form_cluster() {
        let batch = vec![
            make_tx("AAPL", "A", 1000.0, 200.0),
            make_tx("AAPL", "B", 500.0, 200.0),
        ];
        let report = classifier(1_000_000.0, 2).classify(&batch);

        assert_eq!(report.signals.len(), 2);
        for ct in &report.signals {
            assert_eq!(ct.signal.classification, Classification::Cluster);
            assert_eq!(ct.signal.cluster_size, 2);
        }
        let aapl = report.summary("AAPL").unwrap();
        assert_eq!(aapl.cluster_size, 2);
        assert_eq!(aapl.classification, Classification::Cluster);
    }

    #[test]
    fn test_single_large_buy_is_whale() {
        let batch = vec![make_tx("TSLA", "X", 5000.0, 300.0)];
        let report = classifier(250_000.0, 2).classify(&batch);

        let ct = &report.signals[0];
        assert_relative_eq!(ct.signal.value, 1_500_000.0);
        assert_eq!(ct.signal.classification, Classification::Whale);
        assert_eq!(ct.signal.cluster_size, 1);
        assert_eq!(report.whales().count(), 1);
        assert_eq!(report.clusters().count(), 0);
    }

    #[test]
    fn test_unknown_balance_is_new_position() {
        let batch = vec![make_tx("KO", "Y", 100.0, 60.0)];
        let report = classifier(250_000.0, 2).classify(&batch);
        assert_eq!(report.signals[0].signal.ownership_delta_pct, 100.0);
    }

    #[test]
    fn test_empty_batch() {
        let report = classifier(250_000.0, 2).classify(&[]);
        assert!(report.is_empty());
        assert!(report.summaries.is_empty());
    }

    #[test]
    fn test_cluster_beats_whale() {
        let batch = vec![
            make_tx("NVDA", "A", 10_000.0, 100.0),
            make_tx("NVDA", "B", 10.0, 100.0),
        ];
        let report = classifier(250_000.0, 2).classify(&batch);
        assert_eq!(report.signals[0].signal.classification, Classification::Cluster);
        assert_eq!(report.signals[1].signal.classification, Classification::Cluster);
    }

    #[test]
    fn test_repeat_buyer_counts_once() {
        let batch = vec![
            make_tx("MSFT", "A", 10.0, 400.0),
            make_tx("MSFT", "A", 20.0, 400.0),
            make_tx("MSFT", "A", 30.0, 400.0),
        ];
        let report = classifier(250_000.0, 2).classify(&batch);
        assert!(report
            .signals
            .iter()
            .all(|ct| ct.signal.cluster_size == 1
                && ct.signal.classification == Classification::Standard));
    }

    #[test]
    fn test_higher_cluster_minimum() {
        let batch = vec![
            make_tx("AMD", "A", 10.0, 150.0),
            make_tx("AMD", "B", 10.0, 150.0),
        ];
        let report = classifier(250_000.0, 3).classify(&batch);
        assert!(report
            .signals
            .iter()
            .all(|ct| ct.signal.classification == Classification::Standard));
        assert_eq!(report.summary("AMD").unwrap().cluster_size, 2);
    }

    #[test]
    fn test_min_value_filter_runs_after_clustering() {
        let batch = vec![
            make_tx("JPM", "A", 5000.0, 200.0),
            make_tx("JPM", "B", 1.0, 200.0),
            make_tx("WMT", "C", 1.0, 60.0),
        ];
        let config = ClassifierConfig::new(250_000.0, 2).with_min_value(10_000.0);
        let report = SignalClassifier::new(config).unwrap().classify(&batch);

        assert_eq!(report.signals.len(), 1);
        let kept = &report.signals[0];
        assert_eq!(kept.transaction.insider, "A");
        assert_eq!(kept.signal.cluster_size, 2);
        assert_eq!(kept.signal.classification, Classification::Cluster);

        assert_eq!(report.summaries.len(), 1);
        let jpm = report.summary("JPM").unwrap();
        assert_eq!(jpm.cluster_size, 2);
        assert_eq!(jpm.transaction_count, 1);
        assert!(report.summary("WMT").is_none());
    }

    #[test]
    fn test_planned_trades_are_downweighted() {
        let mut planned = make_tx("PG", "A", 10.0, 160.0);
        planned.is_planned = true;
        let batch = vec![planned, make_tx("PG", "A", 10.0, 160.0)];

        let config = ClassifierConfig::new(250_000.0, 2).with_planned_trade_weight(0.25);
        let report = SignalClassifier::new(config).unwrap().classify(&batch);
        assert_relative_eq!(report.signals[0].signal.confidence, 0.25);
        assert_relative_eq!(report.signals[1].signal.confidence, 1.0);
        assert_eq!(report.summary("PG").unwrap().planned_count, 1);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let batch = vec![
            make_tx("AAPL", "A", 1000.0, 200.0),
            make_tx("TSLA", "X", 5000.0, 300.0),
            make_tx("AAPL", "B", 500.0, 200.0),
            make_tx("KO", "Z", 10.0, 60.0),
        ];
        let classifier = classifier(250_000.0, 2);
        let first = classifier.classify(&batch);
        let second = classifier.classify(&batch);
        assert_eq!(first, second);

        let order: Vec<&str> = first.summaries.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "TSLA", "KO"]);
    }

    #[test]
    fn test_value_matches_shares_times_price() {
        let batch = vec![
            make_tx("A", "1", 0.0, 10.0),
            make_tx("B", "2", 123.0, 4.5),
            make_tx("C", "3", 77.0, 0.0),
        ];
        let report = classifier(250_000.0, 2).classify(&batch);
        for ct in &report.signals {
            let expected = ct.transaction.shares * ct.transaction.price_per_share;
            assert_relative_eq!(ct.signal.value, expected);
            assert!(ct.signal.value >= 0.0);
        }
    }

    #[test]
    fn test_rejects_invalid_policy() {
        assert!(SignalClassifier::new(ClassifierConfig::new(0.0, 2)).is_err());
        assert!(SignalClassifier::new(ClassifierConfig::new(250_000.0, 1)).is_err());
    }

    #[test]
    fn test_normalized_sale_never_reaches_classifier() {
        use insider_core::SourceKind;
        use insider_ingestion::{normalize, RawFilingRecord};
        use serde_json::json;

        let records = vec![
            RawFilingRecord::new(
                SourceKind::Fmp,
                json!({
                    "symbol": "TSLA",
                    "reportingName": "X",
                    "filingDate": "2024-06-03",
                    "transactionType": "S-Sale",
                    "securitiesTransacted": 100_000,
                    "price": 300.0
                }),
            ),
            RawFilingRecord::new(
                SourceKind::Fmp,
                json!({
                    "symbol": "TSLA",
                    "reportingName": "Y",
                    "filingDate": "2024-06-03",
                    "transactionType": "P-Purchase",
                    "securitiesTransacted": 10,
                    "price": 300.0
                }),
            ),
        ];
        let transactions = normalize(&records);
        let report = classifier(250_000.0, 2).classify(&transactions);

        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].transaction.insider, "Y");
        assert_eq!(report.signals[0].signal.cluster_size, 1);
        assert_eq!(report.signals[0].signal.classification, Classification::Standard);
    }
}
