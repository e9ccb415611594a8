//! User configuration, read from `~/.curlup/config.yaml`
//!
//! Every field is optional. The file is only ever read; nothing is persisted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_GC_TIME_SECS, DEFAULT_HTTP_URL, DEFAULT_LOG_FILE,
    DEFAULT_STALE_TIME_SECS, DEFAULT_TIMEOUT_SECS,
};

const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL the draft starts with
    pub default_url: String,
    pub timeout_secs: u64,
    /// Freshness window of cached reads
    pub stale_time_secs: u64,
    /// How long an unused cached read is kept
    pub gc_time_secs: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_url: String::from(DEFAULT_HTTP_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            stale_time_secs: DEFAULT_STALE_TIME_SECS,
            gc_time_secs: DEFAULT_GC_TIME_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stale_time(), Duration::from_secs(600));
        assert_eq!(config.gc_time(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "default_url: http://localhost:8080/health\ntimeout_secs: 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_url, "http://localhost:8080/health");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.stale_time_secs, DEFAULT_STALE_TIME_SECS);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "timeout_secs: [not, a, number]\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
