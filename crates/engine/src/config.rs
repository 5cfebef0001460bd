// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use sitepulse_probes::load::LoadEngineConfig;

/// How the browser probe should audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserMode {
    /// Always produce synthetic audits. Used when no browser engine is
    /// installed and in test/CI environments.
    Simulate,
    /// Audit through a configured browser engine, degrading to simulated
    /// on failure.
    Real,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Load engine binary path or name.
    pub load_binary: PathBuf,
    /// Grace period in seconds added to each load run's deadline.
    pub load_grace_secs: u64,
    /// Cap on captured load-engine output, in bytes.
    pub load_max_output_bytes: usize,
    /// Browser audit mode.
    pub browser_mode: BrowserMode,
    /// Directory where result snapshots are written.
    pub output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_binary: PathBuf::from("k6"),
            load_grace_secs: 30,
            load_max_output_bytes: 1024 * 1024,
            browser_mode: BrowserMode::Simulate,
            output_dir: PathBuf::from("sitepulse-output"),
        }
    }
}

impl EngineConfig {
    /// Materialize the load-probe configuration slice.
    pub fn load_engine(&self) -> LoadEngineConfig {
        LoadEngineConfig {
            binary: self.load_binary.clone(),
            grace: Duration::from_secs(self.load_grace_secs),
            max_output_bytes: self.load_max_output_bytes,
            ..LoadEngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.load_binary, PathBuf::from("k6"));
        assert_eq!(config.browser_mode, BrowserMode::Simulate);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "browser_mode": "real", "load_grace_secs": 10 }"#).unwrap();
        assert_eq!(config.browser_mode, BrowserMode::Real);
        assert_eq!(config.load_grace_secs, 10);
        assert_eq!(config.load_binary, PathBuf::from("k6"));
    }
}
