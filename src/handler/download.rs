//! File download module
//!
//! Maps the URL suffix after `/download/` onto the root directory and serves
//! the file as an attachment. Anything that does not resolve to a regular file
//! inside the root is a 404, traversal attempts included.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::http;
use crate::logger::SharedLog;

const LOG_TAG: &str = "FilesLister.Download";

/// Outcome of mapping a request suffix onto the root
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Found { path: PathBuf, file_name: String },
    /// Not decodable, absent, or not a regular file
    Missing,
    /// Canonical path lies outside the root
    Escaped(PathBuf),
}

/// Resolve a `/`-separated, percent-encoded suffix against `root`, which
/// must already be canonical (as in a validated `ServerConfig`).
pub async fn resolve_download_path(root: &Path, suffix: &str) -> Resolution {
    let Ok(decoded) = urlencoding::decode(suffix) else {
        return Resolution::Missing;
    };
    if decoded.contains('\0') {
        return Resolution::Missing;
    }

    let mut candidate = root.to_path_buf();
    let mut file_name = None;
    for segment in decoded.split('/').filter(|s| !s.is_empty() && *s != ".") {
        candidate.push(segment);
        file_name = Some(segment);
    }
    let Some(file_name) = file_name else {
        return Resolution::Missing;
    };

    let Ok(canonical) = fs::canonicalize(&candidate).await else {
        return Resolution::Missing;
    };
    if !canonical.starts_with(root) {
        return Resolution::Escaped(canonical);
    }
    match fs::metadata(&canonical).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Resolution::Missing,
    }

    Resolution::Found {
        path: canonical,
        file_name: file_name.to_string(),
    }
}

/// Serve `/download/{suffix}`
pub async fn serve_download(
    root: &Path,
    suffix: &str,
    log: &SharedLog,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match resolve_download_path(root, suffix).await {
        Resolution::Found { path, file_name } => match fs::read(&path).await {
            Ok(content) => http::build_download_response(Bytes::from(content), &file_name, is_head),
            Err(e) => {
                log.error(
                    LOG_TAG,
                    &format!("Failed to read file '{}': {e}", path.display()),
                );
                http::build_500_response()
            }
        },
        Resolution::Escaped(target) => {
            log.warning(
                LOG_TAG,
                &format!(
                    "Path traversal attempt blocked: {suffix} -> {}",
                    target.display()
                ),
            );
            http::build_404_response()
        }
        Resolution::Missing => http::build_404_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLog;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("root");
        std::fs::create_dir_all(root.join("a/sub")).unwrap();
        std::fs::write(root.join("a/b.txt"), "hello").unwrap();
        std::fs::write(root.join("with space.txt"), "spaced").unwrap();
        std::fs::write(parent.path().join("outside.txt"), "secret").unwrap();
        let root = root.canonicalize().unwrap();
        (parent, root)
    }

    #[tokio::test]
    async fn test_resolves_nested_file() {
        let (_parent, root) = fixture();
        match resolve_download_path(&root, "a/b.txt").await {
            Resolution::Found { path, file_name } => {
                assert_eq!(path, root.join("a/b.txt").canonicalize().unwrap());
                assert_eq!(file_name, "b.txt");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_percent_encoded_names() {
        let (_parent, root) = fixture();
        assert!(matches!(
            resolve_download_path(&root, "with%20space.txt").await,
            Resolution::Found { ref file_name, .. } if file_name == "with space.txt"
        ));
    }

    #[tokio::test]
    async fn test_missing_and_directories() {
        let (_parent, root) = fixture();
        assert_eq!(resolve_download_path(&root, "nope.txt").await, Resolution::Missing);
        assert_eq!(resolve_download_path(&root, "a").await, Resolution::Missing);
        assert_eq!(resolve_download_path(&root, "a/sub/").await, Resolution::Missing);
        assert_eq!(resolve_download_path(&root, "").await, Resolution::Missing);
        assert_eq!(resolve_download_path(&root, "%FF").await, Resolution::Missing);
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (_parent, root) = fixture();
        assert!(matches!(
            resolve_download_path(&root, "../outside.txt").await,
            Resolution::Escaped(_)
        ));
        assert!(matches!(
            resolve_download_path(&root, "a/../../outside.txt").await,
            Resolution::Escaped(_)
        ));
        assert!(matches!(
            resolve_download_path(&root, "%2E%2E/outside.txt").await,
            Resolution::Escaped(_)
        ));
        // Dot-dot that stays inside the root is fine.
        assert!(matches!(
            resolve_download_path(&root, "a/sub/../b.txt").await,
            Resolution::Found { .. }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_rejected() {
        let (parent, root) = fixture();
        std::os::unix::fs::symlink(parent.path().join("outside.txt"), root.join("link.txt"))
            .unwrap();
        assert!(matches!(
            resolve_download_path(&root, "link.txt").await,
            Resolution::Escaped(_)
        ));
    }

    #[tokio::test]
    async fn test_traversal_logged_and_404() {
        let (_parent, root) = fixture();
        let recorder = Arc::new(RecordingLog::default());
        let log: SharedLog = recorder.clone();

        let resp = serve_download(&root, "../outside.txt", &log, false).await;

        assert_eq!(resp.status(), 404);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
        assert!(recorder.contains("warning", "Path traversal attempt blocked"));
    }

    #[tokio::test]
    async fn test_serves_bytes() {
        let (_parent, root) = fixture();
        let log: SharedLog = Arc::new(RecordingLog::default());

        let resp = serve_download(&root, "a/b.txt", &log, false).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-disposition"], "attachment; filename=b.txt");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }
}
