//! Terminal configuration: TOML file, then environment, then CLI flags.
//!
//! The file lives at `<config dir>/tradeterm/config.toml`. A missing file
//! means defaults; a present but unparseable file is an error.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SERVER_URI: &str = "http://localhost:8000";
pub const DEFAULT_ROBOT_NAME: &str = "RandomExample";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub server_uri: String,
    pub account_id: String,
    pub robot_name: String,
    pub request_timeout_secs: u64,
    pub log_path: Option<PathBuf>,
    pub storage_path: Option<PathBuf>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            server_uri: DEFAULT_SERVER_URI.to_string(),
            account_id: String::new(),
            robot_name: DEFAULT_ROBOT_NAME.to_string(),
            request_timeout_secs: 30,
            log_path: None,
            storage_path: None,
        }
    }
}

/// `<config dir>/tradeterm`, falling back to the working directory.
pub fn config_home() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradeterm")
}

fn env_str(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TerminalConfig {
    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_home().join("config.toml"));
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Apply `TRADETERM_*` environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Some(v) = env_str("TRADETERM_SERVER_URI") {
            self.server_uri = v;
        }
        if let Some(v) = env_str("TRADETERM_ACCOUNT_ID") {
            self.account_id = v;
        }
        if let Some(v) = env_str("TRADETERM_ROBOT_NAME") {
            self.robot_name = v;
        }
        if let Some(v) = env_str("TRADETERM_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.request_timeout_secs = v;
        }
        self
    }

    /// Apply command-line overrides; `None` keeps the current value.
    pub fn with_overrides(mut self, server_uri: Option<String>, account_id: Option<String>) -> Self {
        if let Some(v) = server_uri {
            self.server_uri = v;
        }
        if let Some(v) = account_id {
            self.account_id = v;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| config_home().join("tradeterm.log"))
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| config_home().join("storage.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = TerminalConfig::from_toml(r#"server_uri = "http://broker:9000""#).unwrap();
        assert_eq!(cfg.server_uri, "http://broker:9000");
        assert_eq!(cfg.robot_name, DEFAULT_ROBOT_NAME);
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TerminalConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(cfg, TerminalConfig::default());
    }

    #[test]
    fn bad_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server_uri = [").unwrap();
        assert!(matches!(
            TerminalConfig::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn file_values_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "account_id = \"2000123\"\nrobot_name = \"Momentum\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();
        let cfg = TerminalConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.account_id, "2000123");
        assert_eq!(cfg.robot_name, "Momentum");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn cli_overrides_win() {
        let cfg = TerminalConfig::default()
            .with_overrides(Some("http://other:1".into()), None);
        assert_eq!(cfg.server_uri, "http://other:1");
        assert_eq!(cfg.account_id, "");
    }
}
