use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::AutoplayPolicy;

pub const API_URL_ENV: &str = "LOKIZ_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root; requests go to `{api_url}/v1`.
    pub api_url: String,
    pub timeout_secs: u64,
    pub session_path: PathBuf,
    pub settle_delay_ms: u64,
    /// Height of one feed section in scroll units.
    pub viewport_height: f64,
    pub autoplay: AutoplayPolicy,
    pub log_level: String,
    pub log_file: PathBuf,
    /// Mock data only; no backend calls.
    pub offline: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            session_path: PathBuf::from("auth-storage.json"),
            settle_delay_ms: 150,
            viewport_height: 800.0,
            autoplay: AutoplayPolicy::Allowed,
            log_level: "info".to_string(),
            log_file: PathBuf::from("lokiz.log"),
            offline: false,
        }
    }
}

impl ClientConfig {
    /// Reads a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("config {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// `LOKIZ_API_URL` overrides the configured backend.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}/v1", self.api_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.base_url(), "http://localhost:8000/v1");
        assert_eq!(cfg.settle_delay(), Duration::from_millis(150));
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lokiz.toml");
        fs::write(&path, "api_url = \"https://api.lokiz.com/\"\nautoplay = \"muted-only\"\nsettle_delay_ms = 200\n").unwrap();
        let cfg = ClientConfig::load(&path).unwrap();
        assert_eq!(cfg.base_url(), "https://api.lokiz.com/v1");
        assert_eq!(cfg.autoplay, AutoplayPolicy::MutedOnly);
        assert_eq!(cfg.settle_delay_ms, 200);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
