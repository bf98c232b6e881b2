//! Configuration structures for the insider-signal pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Normalizer configuration.
    pub normalizer: NormalizerConfig,
    /// Classifier configuration.
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check every section against its bounds.
    pub fn validate(&self) -> Result<()> {
        self.normalizer.validate()?;
        self.classifier.validate()
    }
}

/// Transaction normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Sentinel used when an insider name is missing.
    pub unknown_name: String,
}

impl NormalizerConfig {
    /// Check the sentinel is usable as a display name.
    pub fn validate(&self) -> Result<()> {
        if self.unknown_name.trim().is_empty() {
            return Err(Error::config("normalizer.unknown_name must not be empty"));
        }
        Ok(())
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            unknown_name: "Unknown".to_string(),
        }
    }
}

/// Whale/cluster classification policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum trade value (dollars) for a Whale label.
    pub whale_threshold: f64,
    /// Minimum number of distinct insiders on one ticker for a Cluster label.
    pub cluster_min_insiders: u32,
    /// Output filter on trade value, applied after classification (0 = keep all).
    pub min_value: f64,
    /// Confidence assigned to trades made under a 10b5-1 plan (discretionary = 1.0).
    pub planned_trade_weight: f64,
}

impl ClassifierConfig {
    /// Build a policy with the two core thresholds and default output settings.
    pub fn new(whale_threshold: f64, cluster_min_insiders: u32) -> Self {
        Self {
            whale_threshold,
            cluster_min_insiders,
            ..Self::default()
        }
    }

    /// Set the post-classification value filter.
    pub fn with_min_value(mut self, min_value: f64) -> Self {
        self.min_value = min_value;
        self
    }

    /// Set the confidence weight for planned trades.
    pub fn with_planned_trade_weight(mut self, weight: f64) -> Self {
        self.planned_trade_weight = weight;
        self
    }

    /// Check thresholds are within their documented bounds.
    pub fn validate(&self) -> Result<()> {
        if !(self.whale_threshold.is_finite() && self.whale_threshold > 0.0) {
            return Err(Error::config(format!(
                "classifier.whale_threshold must be positive, got {}",
                self.whale_threshold
            )));
        }
        if self.cluster_min_insiders < 2 {
            return Err(Error::config(format!(
                "classifier.cluster_min_insiders must be at least 2, got {}",
                self.cluster_min_insiders
            )));
        }
        if !(self.min_value.is_finite() && self.min_value >= 0.0) {
            return Err(Error::config(format!(
                "classifier.min_value must be non-negative, got {}",
                self.min_value
            )));
        }
        if !(0.0..=1.0).contains(&self.planned_trade_weight) {
            return Err(Error::config(format!(
                "classifier.planned_trade_weight must be within [0, 1], got {}",
                self.planned_trade_weight
            )));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            whale_threshold: 250_000.0,
            cluster_min_insiders: 2,
            min_value: 0.0,
            planned_trade_weight: 0.5,
        }
    }
}
