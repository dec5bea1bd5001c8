//! Startup error taxonomy
//!
//! Every variant aborts a single start attempt. The process keeps running and
//! may call start again once the configuration is fixed.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Server address is not set")]
    EmptyAddress,

    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Invalid server port: {0}")]
    InvalidPort(String),

    #[error("Failed to start the HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl StartError {
    /// Configuration problems, as opposed to a listener that could not bind.
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::Bind { .. })
    }
}
