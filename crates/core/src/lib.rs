//! Core types and configuration for the insider-signal pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Canonical transaction and signal types
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{ClassifierConfig, Config, NormalizerConfig};
pub use error::{Error, Result};
pub use types::*;
