//! Configuration loading and typed config structures for the draft room.
//!
//! The configuration lives in `draft-config.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields a working server
//! on port 8000 with a ten-pick draft.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Pick budget used when the config does not set one.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `draft-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DraftConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Draft rules.
    #[serde(default)]
    pub session: SessionConfig,

    /// Per-client delivery limits.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DraftConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listen address:
    /// - `DRAFT_HOST` overrides `server.host`
    /// - `DRAFT_PORT` overrides `server.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_rounds == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_rounds",
                reason: String::from("must be at least 1"),
            });
        }
        if self.connection.send_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "connection.send_timeout_ms",
                reason: String::from("must be at least 1"),
            });
        }
        if self.connection.outbound_buffer == 0 {
            return Err(ConfigError::Invalid {
                field: "connection.outbound_buffer",
                reason: String::from("must be at least 1"),
            });
        }
        Ok(())
    }
}

/// Listen address configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on. `0` picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Apply `DRAFT_HOST` / `DRAFT_PORT` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DRAFT_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("DRAFT_PORT") {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %val, error = %e, "ignoring invalid DRAFT_PORT"),
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Draft rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Total picks allowed across both teams before the draft finishes.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

/// Per-client delivery limits.
///
/// Each client has a bounded outbound queue drained by its own writer.
/// A client whose queue is full, or whose socket write exceeds the
/// timeout, is dropped rather than retried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Deadline for writing one frame to a client socket.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Frames queued per client before it counts as too slow.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl ConnectionConfig {
    /// [`send_timeout_ms`](Self::send_timeout_ms) as a [`Duration`].
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

const fn default_send_timeout_ms() -> u64 {
    5000
}

const fn default_outbound_buffer() -> usize {
    32
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DraftConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.max_rounds, 10);
        assert_eq!(config.connection.send_timeout(), Duration::from_secs(5));
        assert_eq!(config.connection.outbound_buffer, 32);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9100

session:
  max_rounds: 6

connection:
  send_timeout_ms: 250
  outbound_buffer: 4

logging:
  level: "debug"
  json: true
"#;
        let config = DraftConfig::parse(yaml).unwrap();
        assert_eq!(config.session.max_rounds, 6);
        assert_eq!(config.connection.send_timeout_ms, 250);
        assert_eq!(config.connection.outbound_buffer, 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = DraftConfig::parse("session:\n  max_rounds: 4\n").unwrap();
        assert_eq!(config.session.max_rounds, 4);
        assert_eq!(config.connection, ConnectionConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = DraftConfig::parse("").unwrap();
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn zero_rounds_rejected() {
        let err = DraftConfig::parse("session:\n  max_rounds: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "session.max_rounds",
                ..
            }
        ));
    }

    #[test]
    fn zero_buffer_rejected() {
        let err = DraftConfig::parse("connection:\n  outbound_buffer: 0\n").unwrap_err();
        assert!(err.to_string().contains("connection.outbound_buffer"));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let err = DraftConfig::parse("session: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DraftConfig::from_file(Path::new("/nonexistent/draft-config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
