//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::channels::ChannelBlock;
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Protocol limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Message of the Day configuration.
    #[serde(default)]
    pub motd: MotdConfig,
    /// Predeclared channels; they survive becoming empty.
    #[serde(default, rename = "channel")]
    pub channels: Vec<ChannelBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used as numeric prefix and PING origin.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Network name shown in the welcome numeric.
    #[serde(default = "default_network")]
    pub network: String,
    /// Prefix for connection ids.
    #[serde(default = "default_sid")]
    pub sid: String,
    /// Reverse-resolve client addresses.
    #[serde(default = "default_true")]
    pub resolve_hostnames: bool,
    /// Prometheus metrics HTTP port. Absent or 0 disables the endpoint.
    pub metrics_port: Option<u16>,
    /// Idle timeouts for keepalive.
    #[serde(default)]
    pub idle_timeouts: IdleTimeoutsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            network: default_network(),
            sid: default_sid(),
            resolve_hostnames: true,
            metrics_port: None,
            idle_timeouts: IdleTimeoutsConfig::default(),
        }
    }
}

fn default_server_name() -> String {
    "localhost".to_string()
}

fn default_network() -> String {
    "TinyNet".to_string()
}

fn default_sid() -> String {
    "001".to_string()
}

fn default_true() -> bool {
    true
}

/// Idle timeout configuration for client connection keepalive.
///
/// - `ping`: seconds without inbound traffic before the server sends PING
/// - `timeout`: further seconds without traffic before "Ping timeout"
#[derive(Debug, Clone, Deserialize)]
pub struct IdleTimeoutsConfig {
    /// Seconds of idle before sending PING to client (default: 30).
    #[serde(default = "default_ping_interval")]
    pub ping: u64,

    /// Seconds to wait after PING before disconnect (default: 30).
    #[serde(default = "default_ping_timeout")]
    pub timeout: u64,
}

impl IdleTimeoutsConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for IdleTimeoutsConfig {
    fn default() -> Self {
        Self {
            ping: default_ping_interval(),
            timeout: default_ping_timeout(),
        }
    }
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    30
}

/// Message of the Day configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MotdConfig {
    /// Path to MOTD file (one line per MOTD line).
    pub file: Option<String>,
    /// Inline MOTD lines (used when `file` is not set or unreadable).
    #[serde(default)]
    pub lines: Vec<String>,
}

impl MotdConfig {
    /// Load MOTD lines from file, or return default MOTD.
    pub fn load_lines(&self) -> Vec<String> {
        if let Some(ref path) = self.file {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    return content.lines().map(|s| s.to_string()).collect();
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to read MOTD file");
                }
            }
        }

        if !self.lines.is_empty() {
            return self.lines.clone();
        }

        vec!["Welcome to tinyircd!".to_string()]
    }
}
