//! Configuration for the unit-of-work ledger

use serde::{Deserialize, Serialize};
use std::env;

/// Ledger configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Refuse to sort batches with more operations than this
    pub max_batch_size: Option<usize>,
    /// Refuse to sort when the type dependency graph has more edges than this
    pub max_edge_count: Option<usize>,
    /// Leave batches with a single document type in insertion order
    pub skip_single_type_batches: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: None,
            max_edge_count: None,
            skip_single_type_batches: true,
        }
    }
}

impl LedgerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `UOW_MAX_BATCH_SIZE`: Operation limit per sort (default: unlimited)
    /// - `UOW_MAX_EDGE_COUNT`: Dependency edge limit per sort (default: unlimited)
    /// - `UOW_SKIP_SINGLE_TYPE`: Skip single-type batches (default: true)
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            max_batch_size: lookup("UOW_MAX_BATCH_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .or(defaults.max_batch_size),

            max_edge_count: lookup("UOW_MAX_EDGE_COUNT")
                .and_then(|v| v.trim().parse().ok())
                .or(defaults.max_edge_count),

            skip_single_type_batches: lookup("UOW_SKIP_SINGLE_TYPE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.skip_single_type_batches),
        }
    }
}
