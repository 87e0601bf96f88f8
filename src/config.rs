//! Tunable identification thresholds.
//!
//! Loaded from a TOML file when the host application provides one; every
//! field has a default matching the reference behavior, so an empty (or
//! absent) config is fully functional. The grouping heuristics' thresholds
//! live as constants in [`crate::grouping`]; they are part of that
//! algorithm's contract and are exposed there for tests to probe.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default minimum fingerprint hit confidence for a recording ID to count.
pub const DEFAULT_FINGERPRINT_THRESHOLD: f64 = 0.5;

/// Default minimum fraction of a group's tracks a release must share
/// recordings with to become a fingerprint candidate.
pub const DEFAULT_FINGERPRINT_COMMON_PROPORTION: f64 = 0.6;

/// Default cap on candidates taken from the fingerprint source.
pub const DEFAULT_MAX_FINGERPRINT_CANDIDATES: usize = 10;

/// Default cap on candidates taken from a text search.
pub const DEFAULT_MAX_SEARCH_CANDIDATES: usize = 5;

/// Default timeout for a single provider call, in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Default number of groups identified concurrently.
pub const DEFAULT_MAX_CONCURRENT_GROUPS: usize = 4;

/// Identification engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentificationConfig {
    /// Minimum fingerprint hit confidence in [0, 1].
    pub fingerprint_threshold: f64,

    /// Minimum shared-recording proportion for fingerprint candidates.
    pub fingerprint_common_proportion: f64,

    /// Cap on fingerprint-sourced candidates per group.
    pub max_fingerprint_candidates: usize,

    /// Cap on search-sourced candidates per group.
    pub max_search_candidates: usize,

    /// Per-call provider timeout in seconds. Calls that exceed it count as
    /// zero results, they never stall the pipeline.
    pub provider_timeout_secs: u64,

    /// Worker bound for per-group identification.
    pub max_concurrent_groups: usize,
}

impl Default for IdentificationConfig {
    fn default() -> Self {
        Self {
            fingerprint_threshold: DEFAULT_FINGERPRINT_THRESHOLD,
            fingerprint_common_proportion: DEFAULT_FINGERPRINT_COMMON_PROPORTION,
            max_fingerprint_candidates: DEFAULT_MAX_FINGERPRINT_CANDIDATES,
            max_search_candidates: DEFAULT_MAX_SEARCH_CANDIDATES,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            max_concurrent_groups: DEFAULT_MAX_CONCURRENT_GROUPS,
        }
    }
}

impl IdentificationConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::config(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
