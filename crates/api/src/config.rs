//! Server Configuration
//!
//! Loaded from an optional TOML file and `DIAGNOSIS__*` environment
//! variables, e.g. `DIAGNOSIS__SERVER__BIND_ADDR=127.0.0.1:3000`.

use config::{Config, ConfigError, Environment, File};
use expert_system::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::rate_limit::RateLimitConfig;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "DIAGNOSIS_CONFIG";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub metrics: MetricsConfig,
    pub engine: EngineConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to INFO for unknown names
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

/// Prometheus exporter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load from [`CONFIG_PATH_ENV`] (or the default path) plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file leaves the defaults in place
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("DIAGNOSIS").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.logging.max_level(), Level::INFO);
        assert!(!config.logging.json);
        assert!(config.rate_limit.enabled);
        assert!(config.metrics.enabled);
        assert_eq!(config.engine.max_cycles, 1000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.burst_size, 20);
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = std::env::temp_dir().join(format!("diagnosis-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.toml");
        std::fs::write(
            &path,
            "[logging]\nlevel = \"debug\"\n\n[rate_limit]\nenabled = false\n\n[engine]\nmax_cycles = 50\n",
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.logging.max_level(), Level::DEBUG);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.per_second, 1);
        assert_eq!(config.engine.max_cycles, 50);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
            json: false,
        };
        assert_eq!(logging.max_level(), Level::INFO);
    }
}
