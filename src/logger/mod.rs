//! Logger module
//!
//! Every component logs through an injected [`LogSink`] rather than a
//! process-wide singleton:
//! - [`LogWriter`] is the default sink (stdout/stderr or append-mode files)
//! - [`AccessLogEntry`] renders per-request access lines

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogWriter;

use std::sync::Arc;

/// Leveled, tagged log destination.
///
/// The tag names the component that produced the message (for example
/// `"FilesLister.Start"`), the message is free text.
pub trait LogSink: Send + Sync {
    fn info(&self, tag: &str, message: &str);

    fn warning(&self, tag: &str, message: &str);

    fn error(&self, tag: &str, message: &str);

    /// Write a pre-formatted access log line.
    fn access(&self, line: &str) {
        self.info("Access", line);
    }
}

/// Shared handle passed to the lifecycle manager and request handlers.
pub type SharedLog = Arc<dyn LogSink>;

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl LogSink for NullLog {
    fn info(&self, _tag: &str, _message: &str) {}

    fn warning(&self, _tag: &str, _message: &str) {}

    fn error(&self, _tag: &str, _message: &str) {}
}
