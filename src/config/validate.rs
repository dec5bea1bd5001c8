// Configuration validation module
// Turns string-typed host settings into a ServerConfig, checking in a fixed order:
// directory -> address present -> address well-formed -> port

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::types::{RawServerConfig, ServerConfig};
use crate::error::StartError;
use crate::logger::LogSink;

const LOG_TAG: &str = "FilesLister.Start";

/// Hostname or IPv4 address with an optional short path suffix
const ADDRESS_PATTERN: &str = r"^([\w-]+\.)+[\w-]+(/[\w\-./?%&=])?$";

fn address_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ADDRESS_PATTERN).ok()).as_ref()
}

/// Whether `address` is an acceptable bind host
pub fn is_valid_address(address: &str) -> bool {
    address_regex().is_some_and(|re| re.is_match(address))
}

/// Parse a port string into 1..=65535
pub fn parse_port(port: &str) -> Result<u16, StartError> {
    match port.trim().parse::<i64>() {
        Ok(n) => u16::try_from(n)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| StartError::InvalidPort(port.to_string())),
        Err(_) => Err(StartError::InvalidPort(port.to_string())),
    }
}

/// Pick the configured root, or the default root when it is unset or unreadable.
pub fn resolve_root(raw: &RawServerConfig, log: &dyn LogSink) -> PathBuf {
    match raw.root_directory.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => match std::fs::read_dir(dir) {
            Ok(_) => PathBuf::from(dir),
            Err(e) => {
                log.warning(
                    LOG_TAG,
                    &format!(
                        "Failed to get the base directory '{dir}', falling back to '{}'. Error: {e}",
                        raw.default_root
                    ),
                );
                PathBuf::from(&raw.default_root)
            }
        },
        _ => {
            log.warning(
                LOG_TAG,
                &format!(
                    "Base directory is not set, falling back to '{}'",
                    raw.default_root
                ),
            );
            PathBuf::from(&raw.default_root)
        }
    }
}

fn canonical_directory(path: &Path) -> Result<PathBuf, StartError> {
    if !path.is_dir() {
        return Err(StartError::MissingDirectory(path.to_path_buf()));
    }
    path.canonicalize()
        .map_err(|_| StartError::MissingDirectory(path.to_path_buf()))
}

/// Validate raw settings. The first failing check wins.
pub fn validate(raw: &RawServerConfig, log: &dyn LogSink) -> Result<ServerConfig, StartError> {
    let root_directory = canonical_directory(&resolve_root(raw, log))?;

    let host = raw.host.trim();
    if host.is_empty() {
        return Err(StartError::EmptyAddress);
    }
    if !is_valid_address(host) {
        return Err(StartError::InvalidAddress(host.to_string()));
    }

    let bind_port = parse_port(&raw.port)?;

    Ok(ServerConfig {
        root_directory,
        bind_host: host.to_string(),
        bind_port,
    })
}
