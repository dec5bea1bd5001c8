//! Minimal HTTP file server: `/` lists every file under a root directory and
//! `/download/{relativePath}` returns one of them as an attachment.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use crate::config::{Config, RawServerConfig, RuntimeOptions, ServerConfig};
pub use crate::error::StartError;
pub use crate::logger::{LogSink, LogWriter, SharedLog};
pub use crate::server::{FilesLister, Running};
