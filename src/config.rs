//! Configuration loading and types for kvdash.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct.  The control endpoint base URL and the poll
//! interval are read once at startup and stay fixed for the session.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Control endpoint settings.
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Polling settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Control endpoint location.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Base URL of the cluster control endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Polling / refresh settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Fixed interval between topology fetches, in seconds.  Also the
    /// retry cadence after a failed fetch (no backoff).
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Per-request timeout for control endpoint calls, in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.controller.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.poll.interval_seconds, 5);
        assert_eq!(config.poll.request_timeout_seconds, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_overrides() {
        let yaml = r#"
controller:
  base_url: http://controller.internal:9000
poll:
  interval_seconds: 30
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.controller.base_url, "http://controller.internal:9000");
        assert_eq!(config.poll.interval_seconds, 30);
        // Untouched sections keep their defaults.
        assert_eq!(config.poll.request_timeout_seconds, 10);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "controller:\n  base_url: http://10.0.0.5:8080").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.controller.base_url, "http://10.0.0.5:8080");
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        assert!(load_config("/no/such/kvdash.yaml").is_err());
    }
}
