//! Per-ticker aggregation of classified transactions.

use std::collections::HashMap;

use chrono::NaiveDate;
use insider_core::{Classification, ClassifiedTransaction, TickerSummary};
use ordered_float::OrderedFloat;

/// Summary being accumulated for one ticker.
#[derive(Debug, Clone)]
struct SummaryInProgress {
    ticker: String,
    classification: Classification,
    cluster_size: u32,
    transaction_count: u32,
    total_shares: f64,
    total_value: f64,
    max_value: f64,
    insiders: Vec<String>,
    planned_count: u32,
    latest_trade_date: NaiveDate,
}

impl SummaryInProgress {
    fn new(first: &ClassifiedTransaction) -> Self {
        Self {
            ticker: first.transaction.ticker.clone(),
            classification: first.signal.classification,
            cluster_size: first.signal.cluster_size,
            transaction_count: 0,
            total_shares: 0.0,
            total_value: 0.0,
            max_value: 0.0,
            insiders: Vec::new(),
            planned_count: 0,
            latest_trade_date: first.transaction.trade_date,
        }
    }

    fn add(&mut self, ct: &ClassifiedTransaction) {
        let tx = &ct.transaction;
        if ct.signal.classification.priority() < self.classification.priority() {
            self.classification = ct.signal.classification;
        }
        self.cluster_size = self.cluster_size.max(ct.signal.cluster_size);
        self.transaction_count += 1;
        self.total_shares += tx.shares;
        self.total_value += ct.signal.value;
        self.max_value = self.max_value.max(ct.signal.value);
        if !self.insiders.iter().any(|name| name == &tx.insider) {
            self.insiders.push(tx.insider.clone());
        }
        if tx.is_planned {
            self.planned_count += 1;
        }
        self.latest_trade_date = self.latest_trade_date.max(tx.trade_date);
    }

    fn finish(self) -> TickerSummary {
        TickerSummary {
            ticker: self.ticker,
            classification: self.classification,
            cluster_size: self.cluster_size,
            transaction_count: self.transaction_count,
            total_shares: self.total_shares,
            total_value: self.total_value,
            max_value: self.max_value,
            insiders: self.insiders,
            planned_count: self.planned_count,
            latest_trade_date: self.latest_trade_date,
        }
    }
}

/// Aggregate classified transactions per ticker.
///
/// Sorted strongest first: Cluster, Whale, Standard, then by total value
/// descending, then by ticker.
pub fn summarize(signals: &[ClassifiedTransaction]) -> Vec<TickerSummary> {
    let mut by_ticker: HashMap<&str, SummaryInProgress> = HashMap::new();
    for ct in signals {
        by_ticker
            .entry(ct.transaction.ticker.as_str())
            .or_insert_with(|| SummaryInProgress::new(ct))
            .add(ct);
    }

    let mut summaries: Vec<TickerSummary> = by_ticker
        .into_values()
        .map(SummaryInProgress::finish)
        .collect();
    summaries.sort_by(|a, b| {
        a.classification
            .priority()
            .cmp(&b.classification.priority())
            .then_with(|| OrderedFloat(b.total_value).cmp(&OrderedFloat(a.total_value)))
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    summaries
}
