// Application state module
// Read-only state shared by the accept loop and every request handler

use super::types::{RuntimeOptions, ServerConfig};
use crate::logger::SharedLog;

/// Application state
pub struct AppState {
    pub config: ServerConfig,
    pub options: RuntimeOptions,
    pub log: SharedLog,
}

impl AppState {
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(config: ServerConfig, options: RuntimeOptions, log: SharedLog) -> Self {
        Self {
            config,
            options,
            log,
        }
    }
}
