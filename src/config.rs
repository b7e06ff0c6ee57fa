//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ClientConfig;
use crate::domain::AppError;

/// Orchestrator behavior for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Cadence of elapsed-time updates.
    pub tick_interval_ms: u64,
    /// Remove the partial file when a transfer is cancelled. Failed
    /// transfers always clean up.
    pub delete_partial_on_cancel: bool,
}

impl RunConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            delete_partial_on_cancel: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub run: RunConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.run.tick_interval(), Duration::from_secs(1));
        assert!(!config.run.delete_partial_on_cancel);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json(
            r#"{"client": {"stall_timeout_secs": 5}, "run": {"delete_partial_on_cancel": true}}"#,
        )
        .unwrap();

        assert_eq!(config.client.stall_timeout(), Duration::from_secs(5));
        assert_eq!(config.client.connect_timeout_secs, 30);
        assert!(config.run.delete_partial_on_cancel);
        assert_eq!(config.run.tick_interval_ms, 1000);
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        assert!(matches!(
            Config::from_json("{not json"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
