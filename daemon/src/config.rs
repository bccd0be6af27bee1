//! Daemon configuration with TOML file support.

use civica_types::CoreParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),
}

/// Configuration for a Civica daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Port the gateway listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Remote identity classifier base URL. When absent, every capture
    /// passes the liveness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_endpoint: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Engine parameters.
    #[serde(default)]
    pub params: CoreParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_port() -> u16 {
    8080
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("DaemonConfig is always serializable to TOML")
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            classifier_endpoint: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: CoreParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.listen_port, config.listen_port);
        assert_eq!(
            parsed.params.duplicate_radius_meters,
            config.params.duplicate_radius_meters
        );
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.log_format, "human");
        assert!(config.params.identity_verification_required);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            listen_port = 9999

            [params]
            resolution_radius_meters = 45.0
            identity_verification_required = false
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.listen_port, 9999);
        assert_eq!(config.params.resolution_radius_meters, 45.0);
        assert!(!config.params.identity_verification_required);
        assert_eq!(config.params.duplicate_radius_meters, 30.0); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = DaemonConfig::from_toml_file(std::path::Path::new("/nonexistent/civica.toml"));
        assert!(result.is_err());
    }
}
