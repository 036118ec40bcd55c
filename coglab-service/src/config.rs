//! Service configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tunables for the scoring service and its reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Extra recomputation passes allowed when the population version
    /// moves between snapshot and batch write.
    pub max_conflict_retries: u32,
    /// Default page size for the test-count leaderboard.
    pub leaderboard_limit: usize,
    /// When set, every scored record is appended to this JSONL session
    /// file.
    pub history_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 1,
            leaderboard_limit: 10,
            history_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ServiceConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_conflict_retries, 1);
        assert_eq!(config.leaderboard_limit, 10);
        assert_eq!(config.history_path, None);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config = ServiceConfig::from_toml("max_conflict_retries = 3\n").unwrap();
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.leaderboard_limit, 10);
    }

    #[test]
    fn full_toml_round_trip() {
        let config = ServiceConfig::from_toml(
            "max_conflict_retries = 2\nleaderboard_limit = 25\nhistory_path = \"session.jsonl\"\n",
        )
        .unwrap();
        assert_eq!(config.leaderboard_limit, 25);
        assert_eq!(config.history_path, Some(PathBuf::from("session.jsonl")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ServiceConfig::from_toml("retries = 5\n").is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coglab.toml");
        std::fs::write(&path, "leaderboard_limit = 3\n").unwrap();
        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.leaderboard_limit, 3);
    }
}
