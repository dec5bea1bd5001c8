// Configuration module entry point
// Loads host-supplied settings, validates them, and holds the shared serving state

mod state;
mod types;
mod validate;

use std::time::Duration;

pub use state::AppState;
pub use types::{
    Config, LoggingConfig, PerformanceConfig, RawServerConfig, RuntimeOptions, ServerConfig,
};
pub use validate::{is_valid_address, parse_port, resolve_root, validate};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "files-lister";

impl Config {
    /// Load configuration from the given file path (extension optional).
    /// A missing file is not an error; environment variables prefixed with
    /// `FILES_LISTER_` override it, e.g. `FILES_LISTER_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FILES_LISTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.default_root", ".")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", "8080")?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "combined")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            connection_timeout: self
                .performance
                .connection_timeout
                .map(Duration::from_secs),
            access_log_format: self
                .logging
                .access_log
                .then(|| self.logging.access_log_format.clone()),
        }
    }
}
