//! Dispatcher settings, loadable from TOML.
//!
//! ```toml
//! # Per-branch limit on the suggestion join; a slow branch counts as empty.
//! suggestion_timeout_ms = 250
//! # Keep at most this many merged suggestions.
//! max_suggestions = 20
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Timeout for each suggestion branch, in milliseconds. Unset waits for
    /// every branch.
    pub suggestion_timeout_ms: Option<u64>,
    /// Truncate merged suggestions after sorting.
    pub max_suggestions: Option<usize>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

impl DispatcherConfig {
    pub fn suggestion_timeout(&self) -> Option<Duration> {
        self.suggestion_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a config file from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        DispatcherConfig::from_toml_str(&text)
    }
}
