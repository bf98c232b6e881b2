//! PyO3 bindings for the insider-signal Rust components.
//!
//! Exposes the normalization and classification core to the Python
//! fetch/alert/dashboard scripts:
//! - Filing normalization (sec-api.io, FinancialModelingPrep, SEC EDGAR)
//! - Whale/cluster classification with per-ticker summaries

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use insider_core::{
    Classification as RustClassification, ClassifiedTransaction as RustClassifiedTransaction,
    ClassifierConfig, Error as RustError, InsiderRole as RustInsiderRole,
    NormalizerConfig, Signal as RustSignal, SourceKind, TickerSummary as RustTickerSummary,
    Transaction as RustTransaction,
};
use insider_ingestion::Normalizer;
use insider_signals::SignalClassifier;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn to_py_err(err: RustError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_py_date(raw: &str, field: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| PyValueError::new_err(format!("{field} must be YYYY-MM-DD, got {raw:?}")))
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Relationship of the reporting person to the issuer.
#[pyclass]
#[derive(Clone, Copy)]
pub enum InsiderRole {
    Officer,
    Director,
    TenPercentOwner,
    Other,
}

impl From<RustInsiderRole> for InsiderRole {
    fn from(r: RustInsiderRole) -> Self {
        match r {
            RustInsiderRole::Officer => InsiderRole::Officer,
            RustInsiderRole::Director => InsiderRole::Director,
            RustInsiderRole::TenPercentOwner => InsiderRole::TenPercentOwner,
            RustInsiderRole::Other => InsiderRole::Other,
        }
    }
}

impl From<InsiderRole> for RustInsiderRole {
    fn from(r: InsiderRole) -> Self {
        match r {
            InsiderRole::Officer => RustInsiderRole::Officer,
            InsiderRole::Director => RustInsiderRole::Director,
            InsiderRole::TenPercentOwner => RustInsiderRole::TenPercentOwner,
            InsiderRole::Other => RustInsiderRole::Other,
        }
    }
}

/// Signal label.
#[pyclass]
#[derive(Clone, Copy)]
pub enum Classification {
    Standard,
    Whale,
    Cluster,
}

#[pymethods]
impl Classification {
    /// Lower is stronger: Cluster (1) > Whale (2) > Standard (3).
    #[getter]
    fn priority(&self) -> u8 {
        RustClassification::from(*self).priority()
    }
}

impl From<RustClassification> for Classification {
    fn from(c: RustClassification) -> Self {
        match c {
            RustClassification::Standard => Classification::Standard,
            RustClassification::Whale => Classification::Whale,
            RustClassification::Cluster => Classification::Cluster,
        }
    }
}

impl From<Classification> for RustClassification {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Standard => RustClassification::Standard,
            Classification::Whale => RustClassification::Whale,
            Classification::Cluster => RustClassification::Cluster,
        }
    }
}

/// Canonical insider purchase. Dates are `YYYY-MM-DD` strings.
#[pyclass]
#[derive(Clone)]
pub struct Transaction {
    #[pyo3(get, set)]
    pub ticker: String,
    #[pyo3(get, set)]
    pub insider: String,
    #[pyo3(get, set)]
    pub role: InsiderRole,
    #[pyo3(get, set)]
    pub filed_date: String,
    #[pyo3(get, set)]
    pub trade_date: String,
    #[pyo3(get, set)]
    pub transaction_code: String,
    #[pyo3(get, set)]
    pub shares: f64,
    #[pyo3(get, set)]
    pub price_per_share: f64,
    #[pyo3(get, set)]
    pub shares_owned_after: f64,
    #[pyo3(get, set)]
    pub is_planned: bool,
}

#[pymethods]
impl Transaction {
    #[new]
    #[pyo3(signature = (
        ticker,
        insider,
        filed_date,
        shares,
        price_per_share,
        shares_owned_after = 0.0,
        trade_date = None,
        role = InsiderRole::Other,
        transaction_code = String::from("P"),
        is_planned = false,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        ticker: String,
        insider: String,
        filed_date: String,
        shares: f64,
        price_per_share: f64,
        shares_owned_after: f64,
        trade_date: Option<String>,
        role: InsiderRole,
        transaction_code: String,
        is_planned: bool,
    ) -> PyResult<Self> {
        parse_py_date(&filed_date, "filed_date")?;
        if let Some(date) = &trade_date {
            parse_py_date(date, "trade_date")?;
        }
        Ok(Transaction {
            ticker,
            insider,
            role,
            trade_date: trade_date.unwrap_or_else(|| filed_date.clone()),
            filed_date,
            transaction_code,
            shares,
            price_per_share,
            shares_owned_after,
            is_planned,
        })
    }

    fn __repr__(&self) -> String {
        format!(
            "Transaction(ticker={}, insider={:?}, code={}, shares={}, price={:.2}, filed={})",
            self.ticker,
            self.insider,
            self.transaction_code,
            self.shares,
            self.price_per_share,
            self.filed_date
        )
    }
}

impl Transaction {
    fn to_rust(&self) -> PyResult<RustTransaction> {
        Ok(RustTransaction {
            ticker: self.ticker.clone(),
            insider: self.insider.clone(),
            role: self.role.into(),
            filed_date: parse_py_date(&self.filed_date, "filed_date")?,
            trade_date: parse_py_date(&self.trade_date, "trade_date")?,
            transaction_code: self.transaction_code.clone(),
            shares: self.shares,
            price_per_share: self.price_per_share,
            shares_owned_after: self.shares_owned_after,
            is_planned: self.is_planned,
        })
    }
}

impl From<RustTransaction> for Transaction {
    fn from(t: RustTransaction) -> Self {
        Transaction {
            ticker: t.ticker,
            insider: t.insider,
            role: t.role.into(),
            filed_date: t.filed_date.format(DATE_FORMAT).to_string(),
            trade_date: t.trade_date.format(DATE_FORMAT).to_string(),
            transaction_code: t.transaction_code,
            shares: t.shares,
            price_per_share: t.price_per_share,
            shares_owned_after: t.shares_owned_after,
            is_planned: t.is_planned,
        }
    }
}

/// Derived metrics and label for one transaction.
#[pyclass]
#[derive(Clone)]
pub struct Signal {
    #[pyo3(get)]
    pub value: f64,
    #[pyo3(get)]
    pub ownership_delta_pct: f64,
    #[pyo3(get)]
    pub classification: Classification,
    #[pyo3(get)]
    pub cluster_size: u32,
    #[pyo3(get)]
    pub confidence: f64,
}

#[pymethods]
impl Signal {
    fn __repr__(&self) -> String {
        format!(
            "Signal(classification={}, value={:.2}, cluster_size={}, delta_pct={:.1})",
            RustClassification::from(self.classification).as_str(),
            self.value,
            self.cluster_size,
            self.ownership_delta_pct
        )
    }
}

impl From<RustSignal> for Signal {
    fn from(s: RustSignal) -> Self {
        Signal {
            value: s.value,
            ownership_delta_pct: s.ownership_delta_pct,
            classification: s.classification.into(),
            cluster_size: s.cluster_size,
            confidence: s.confidence,
        }
    }
}

/// A transaction with its signal.
#[pyclass]
#[derive(Clone)]
pub struct ClassifiedTransaction {
    #[pyo3(get)]
    pub transaction: Transaction,
    #[pyo3(get)]
    pub signal: Signal,
}

#[pymethods]
impl ClassifiedTransaction {
    #[getter]
    fn classification(&self) -> Classification {
        self.signal.classification
    }
}

impl From<RustClassifiedTransaction> for ClassifiedTransaction {
    fn from(ct: RustClassifiedTransaction) -> Self {
        ClassifiedTransaction {
            transaction: ct.transaction.into(),
            signal: ct.signal.into(),
        }
    }
}

/// Aggregate signal for one ticker.
#[pyclass]
#[derive(Clone)]
pub struct TickerSummary {
    #[pyo3(get)]
    pub ticker: String,
    #[pyo3(get)]
    pub classification: Classification,
    #[pyo3(get)]
    pub cluster_size: u32,
    #[pyo3(get)]
    pub transaction_count: u32,
    #[pyo3(get)]
    pub total_shares: f64,
    #[pyo3(get)]
    pub total_value: f64,
    #[pyo3(get)]
    pub max_value: f64,
    #[pyo3(get)]
    pub insiders: Vec<String>,
    #[pyo3(get)]
    pub planned_count: u32,
    #[pyo3(get)]
    pub latest_trade_date: String,
}

#[pymethods]
impl TickerSummary {
    fn __repr__(&self) -> String {
        format!(
            "TickerSummary(ticker={}, classification={}, cluster_size={}, total_value={:.2})",
            self.ticker,
            RustClassification::from(self.classification).as_str(),
            self.cluster_size,
            self.total_value
        )
    }
}

impl From<RustTickerSummary> for TickerSummary {
    fn from(s: RustTickerSummary) -> Self {
        TickerSummary {
            ticker: s.ticker,
            classification: s.classification.into(),
            cluster_size: s.cluster_size,
            transaction_count: s.transaction_count,
            total_shares: s.total_shares,
            total_value: s.total_value,
            max_value: s.max_value,
            insiders: s.insiders,
            planned_count: s.planned_count,
            latest_trade_date: s.latest_trade_date.format(DATE_FORMAT).to_string(),
        }
    }
}

// ============================================================================
// Engine Wrappers
// ============================================================================

/// Filing normalizer with skip-and-continue semantics.
#[pyclass]
pub struct PyNormalizer {
    inner: Normalizer,
}

#[pymethods]
impl PyNormalizer {
    #[new]
    #[pyo3(signature = (unknown_name = None))]
    fn new(unknown_name: Option<String>) -> PyResult<Self> {
        let mut config = NormalizerConfig::default();
        if let Some(name) = unknown_name {
            config.unknown_name = name;
        }
        config.validate().map_err(to_py_err)?;
        Ok(PyNormalizer {
            inner: Normalizer::with_config(config),
        })
    }

    /// Normalize API responses from one source ("sec_api", "fmp", "edgar").
    ///
    /// Each payload is a JSON document: a single record, an array of
    /// records, or an envelope holding them under `filings`/`transactions`/`data`.
    /// A payload that is not valid JSON is skipped and counted as a rejected
    /// record. Only an unknown source raises.
    fn normalize(&mut self, source: &str, payloads: Vec<String>) -> PyResult<Vec<Transaction>> {
        let source: SourceKind = source.parse().map_err(to_py_err)?;
        Ok(self
            .inner
            .normalize_payloads(source, &payloads)
            .into_iter()
            .map(|t| t.into())
            .collect())
    }

    /// Get normalization statistics:
    /// (records_seen, records_rejected, entries_seen, entries_retained,
    ///  entries_filtered, entries_malformed).
    fn stats(&self) -> (u64, u64, u64, u64, u64, u64) {
        let s = self.inner.stats();
        (
            s.records_seen,
            s.records_rejected,
            s.entries_seen,
            s.entries_retained,
            s.entries_filtered,
            s.entries_malformed,
        )
    }

    /// Reset statistics.
    fn reset_stats(&mut self) {
        self.inner.reset_stats();
    }
}

/// Whale/cluster signal classifier.
#[pyclass]
pub struct PySignalClassifier {
    inner: SignalClassifier,
}

#[pymethods]
impl PySignalClassifier {
    #[new]
    #[pyo3(signature = (whale_threshold, cluster_min_insiders, min_value = 0.0, planned_trade_weight = 0.5))]
    fn new(
        whale_threshold: f64,
        cluster_min_insiders: u32,
        min_value: f64,
        planned_trade_weight: f64,
    ) -> PyResult<Self> {
        let config = ClassifierConfig::new(whale_threshold, cluster_min_insiders)
            .with_min_value(min_value)
            .with_planned_trade_weight(planned_trade_weight);
        Ok(PySignalClassifier {
            inner: SignalClassifier::new(config).map_err(to_py_err)?,
        })
    }

    /// Classify a batch; returns (signals, per-ticker summaries).
    fn classify(
        &self,
        transactions: Vec<Transaction>,
    ) -> PyResult<(Vec<ClassifiedTransaction>, Vec<TickerSummary>)> {
        let rust_transactions = transactions
            .iter()
            .map(Transaction::to_rust)
            .collect::<PyResult<Vec<_>>>()?;
        let report = self.inner.classify(&rust_transactions);
        Ok((
            report.signals.into_iter().map(|ct| ct.into()).collect(),
            report.summaries.into_iter().map(|s| s.into()).collect(),
        ))
    }

    #[getter]
    fn whale_threshold(&self) -> f64 {
        self.inner.config().whale_threshold
    }

    #[getter]
    fn cluster_min_insiders(&self) -> u32 {
        self.inner.config().cluster_min_insiders
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// Insider Signal Core - Rust normalization and classification for Python.
#[pymodule]
fn insider_signal_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<InsiderRole>()?;
    m.add_class::<Classification>()?;
    m.add_class::<Transaction>()?;
    m.add_class::<Signal>()?;
    m.add_class::<ClassifiedTransaction>()?;
    m.add_class::<TickerSummary>()?;

    // Engine classes
    m.add_class::<PyNormalizer>()?;
    m.add_class::<PySignalClassifier>()?;

    Ok(())
}
