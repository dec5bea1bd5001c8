// Configuration types module
// Raw (string-typed) settings as supplied by the host, and the validated form

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure, as read from file and environment
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: RawServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server settings before validation. Every value arrives as a string.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawServerConfig {
    /// Directory to expose; unset or unreadable falls back to `default_root`
    #[serde(default)]
    pub root_directory: Option<String>,
    pub default_root: String,
    pub host: String,
    pub port: String,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// combined, common, json, or a custom `$variable` pattern
    pub access_log_format: String,
    /// Info/access log file (stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Warning/error log file (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PerformanceConfig {
    /// Upper bound in seconds for a single connection; unbounded when unset
    #[serde(default)]
    pub connection_timeout: Option<u64>,
}

/// Validated server configuration, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Absolute, canonical path of the exposed directory
    pub root_directory: PathBuf,
    /// Host as configured, including any path suffix the pattern allows
    pub bind_host: String,
    pub bind_port: u16,
}

impl ServerConfig {
    /// The single listening prefix, `http://{host}:{port}/`
    pub fn prefix(&self) -> String {
        format!("http://{}:{}/", self.bind_host, self.bind_port)
    }

    /// Host part used for binding, without any path suffix
    pub fn listen_host(&self) -> &str {
        self.bind_host
            .split_once('/')
            .map_or(self.bind_host.as_str(), |(host, _)| host)
    }
}

/// Per-connection behaviour that is not part of the server identity
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub connection_timeout: Option<Duration>,
    /// Access log format when access logging is enabled
    pub access_log_format: Option<String>,
}
