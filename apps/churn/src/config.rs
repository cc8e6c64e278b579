//! Configuration loading and validation.
//!
//! Loads `churn.toml` (or the path given with `--config`) with environment
//! variable overrides. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "churn.toml";

/// The root configuration structure.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// Decision threshold; a record churns when `probability > threshold`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_threshold() -> f64 {
    churn_core::DEFAULT_THRESHOLD
}

impl std::fmt::Debug for ChurnConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChurnConfig")
            .field("threshold", &self.threshold)
            .field("assets", &self.assets)
            .field("server", &self.server)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Artifact directory (JSON files) or packed `.churn` bundle.
    #[serde(default = "default_assets_path")]
    pub path: PathBuf,
}

fn default_assets_path() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            path: default_assets_path(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request quota for the whole server.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}
fn default_requests_per_second() -> u32 {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "api_key",
                &self.api_key.as_ref().map_or("None", |_| "[REDACTED]"),
            )
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            assets: AssetsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl ChurnConfig {
    /// Load from `path` (or `churn.toml`) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `CHURN_ASSETS`, `CHURN_API_KEY` and `CHURN_PORT` overrides.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("CHURN_ASSETS") {
            self.assets.path = PathBuf::from(path);
        }
        if let Some(key) = lookup("CHURN_API_KEY") {
            self.server.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(port) = lookup("CHURN_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("CHURN_PORT {port:?} is not a port number"))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::ValidationError(
                "threshold must lie strictly between 0.0 and 1.0".into(),
            ));
        }
        if self.server.requests_per_second == 0 {
            return Err(ConfigError::ValidationError(
                "server.requests_per_second must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = ChurnConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.assets.path, PathBuf::from("assets"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: ChurnConfig = toml::from_str(
            r#"
            threshold = 0.4

            [server]
            port = 9000
            api_key = "secret"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = ChurnConfig::default();
        config.server.api_key = Some("super-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CHURN_ASSETS", "/srv/churn/model.churn"),
            ("CHURN_API_KEY", "k"),
            ("CHURN_PORT", "9100"),
        ]);
        let mut config = ChurnConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .expect("valid overrides");

        assert_eq!(config.assets.path, PathBuf::from("/srv/churn/model.churn"));
        assert_eq!(config.server.api_key.as_deref(), Some("k"));
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = ChurnConfig::default();
        let result = config.apply_overrides(|k| (k == "CHURN_PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = ChurnConfig {
            threshold: 1.5,
            ..ChurnConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ChurnConfig::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, ChurnConfig::default());
    }

    #[test]
    fn default_toml_roundtrips() {
        let text = ChurnConfig::default_toml();
        let parsed: ChurnConfig = toml::from_str(&text).expect("valid toml");
        assert_eq!(parsed, ChurnConfig::default());
    }
}
