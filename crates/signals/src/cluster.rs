//! Distinct-insider counting per ticker.

use std::collections::{HashMap, HashSet};

use insider_core::Transaction;

/// Distinct insiders per ticker over one batch.
#[derive(Debug, Clone, Default)]
pub struct ClusterIndex<'a> {
    insiders: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> ClusterIndex<'a> {
    /// Index a batch of transactions.
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut insiders: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
        for tx in transactions {
            insiders
                .entry(tx.ticker.as_str())
                .or_default()
                .insert(tx.insider.as_str());
        }
        Self { insiders }
    }

    /// Number of distinct insiders who bought the ticker (0 if absent).
    pub fn cluster_size(&self, ticker: &str) -> u32 {
        self.insiders
            .get(ticker)
            .map_or(0, |names| u32::try_from(names.len()).unwrap_or(u32::MAX))
    }

    /// Number of tickers in the batch.
    pub fn ticker_count(&self) -> usize {
        self.insiders.len()
    }

    /// Tickers with at least `min_insiders` distinct buyers, sorted.
    pub fn clustered_tickers(&self, min_insiders: u32) -> Vec<&'a str> {
        let mut tickers: Vec<&'a str> = self
            .insiders
            .keys()
            .copied()
            .filter(|ticker| self.cluster_size(ticker) >= min_insiders)
            .collect();
        tickers.sort_unstable();
        tickers
    }
}
