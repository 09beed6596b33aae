//! CLI configuration.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cleanmate_core::{ConnectionInfo, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A config file that exists but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Which vacuum to talk to.
    pub device: DeviceConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Device address and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// IP address of the vacuum.
    pub host: String,
    /// The 10-character auth code from the vendor app.
    pub auth_code: String,
    /// TCP port.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".into(),
            auth_code: String::new(),
            port: DEFAULT_PORT,
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl CliConfig {
    /// Load from a TOML file. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

impl DeviceConfig {
    /// Connection settings for the core client.
    pub fn connection_info(&self) -> cleanmate_core::Result<ConnectionInfo> {
        Ok(ConnectionInfo::parse(&self.host)?
            .with_port(self.port)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

// ── Tests ────────────────────────────────────────────────────────
