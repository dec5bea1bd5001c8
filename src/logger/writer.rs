//! Log writer module
//!
//! Thread-safe log writing to stdout/stderr or to append-mode files.
//! Info and access lines share one target, warnings and errors share the other.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use super::LogSink;

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Stderr => eprintln!("{line}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    // A failing log write has nowhere left to be reported.
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

/// Default [`LogSink`] implementation.
pub struct LogWriter {
    info: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    /// Create a writer; `None` paths fall back to stdout (info) and stderr (errors).
    pub fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            info: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }
}

impl LogSink for LogWriter {
    fn info(&self, tag: &str, message: &str) {
        self.info.write_line(&format!("[INFO] [{tag}] {message}"));
    }

    fn warning(&self, tag: &str, message: &str) {
        self.error.write_line(&format!("[WARN] [{tag}] {message}"));
    }

    fn error(&self, tag: &str, message: &str) {
        self.error.write_line(&format!("[ERROR] [{tag}] {message}"));
    }

    fn access(&self, line: &str) {
        self.info.write_line(line);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
