//! Directory listing module
//!
//! Walks the root on every request (no cached index) and renders one link per
//! regular file. Entries appear in directory-walk order, which is not sorted.

use html_escape::{encode_double_quoted_attribute, encode_text};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::http;
use crate::logger::SharedLog;

const LOG_TAG: &str = "FilesLister.List";

/// A file found under the root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    /// Location relative to the root, always `/`-separated
    pub relative_path: String,
}

/// `/`-separated form of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Recursively enumerate regular files. Directories and symbolic links are
/// skipped; unreadable subtrees are logged and skipped.
pub fn enumerate_files(root: &Path, log: &SharedLog) -> Vec<FileEntry> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log.warning(LOG_TAG, &format!("Skipping unreadable entry: {e}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(relative_path) = relative_path(root, entry.path()) {
            entries.push(FileEntry {
                absolute_path: entry.into_path(),
                relative_path,
            });
        }
    }

    entries
}

/// Percent-encode each segment, keeping the `/` separators
fn encode_href(relative_path: &str) -> String {
    relative_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render the listing page
pub fn render_listing(entries: &[FileEntry]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Files List</title></head>\
         <body><h1>Files List</h1><ul>",
    );

    for entry in entries {
        let href = encode_href(&entry.relative_path);
        html.push_str(&format!(
            "<li><a href=\"/download/{}\">{}</a></li>",
            encode_double_quoted_attribute(&href),
            encode_text(&entry.relative_path),
        ));
    }

    html.push_str("</ul></body></html>");
    html
}

/// Serve the listing page for `root`
pub async fn serve_listing(root: &Path, log: &SharedLog, is_head: bool) -> Response<Full<Bytes>> {
    let root = root.to_path_buf();
    let walk_log = SharedLog::clone(log);

    match tokio::task::spawn_blocking(move || enumerate_files(&root, &walk_log)).await {
        Ok(entries) => http::build_html_response(render_listing(&entries), is_head),
        Err(e) => {
            log.error(LOG_TAG, &format!("Directory walk failed: {e}"));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLog;
    use std::fs;
    use std::sync::Arc;

    fn null_log() -> SharedLog {
        Arc::new(NullLog)
    }

    #[test]
    fn test_enumerates_nested_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/deep/er")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top.txt"), "1").unwrap();
        fs::write(dir.path().join("a/b.txt"), "2").unwrap();
        fs::write(dir.path().join("a/deep/er/c.bin"), "3").unwrap();

        let mut rel: Vec<_> = enumerate_files(dir.path(), &null_log())
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        rel.sort();

        assert_eq!(rel, vec!["a/b.txt", "a/deep/er/c.bin", "top.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linkdir")).unwrap();

        assert!(enumerate_files(dir.path(), &null_log()).is_empty());
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/srv/files");
        let path = root.join("reports").join("2024").join("q1.csv");
        assert_eq!(
            relative_path(root, &path).as_deref(),
            Some("reports/2024/q1.csv")
        );
        assert_eq!(relative_path(root, root), None);
    }

    #[test]
    fn test_render_one_item_per_entry() {
        let entries = vec![
            FileEntry {
                absolute_path: PathBuf::from("/r/a/b.txt"),
                relative_path: "a/b.txt".to_string(),
            },
            FileEntry {
                absolute_path: PathBuf::from("/r/c.txt"),
                relative_path: "c.txt".to_string(),
            },
        ];
        let html = render_listing(&entries);

        assert!(html.contains("<h1>Files List</h1>"));
        assert_eq!(html.matches("<li>").count(), 2);
        assert!(html.contains("<li><a href=\"/download/a/b.txt\">a/b.txt</a></li>"));
        assert!(html.contains("<li><a href=\"/download/c.txt\">c.txt</a></li>"));
    }

    #[test]
    fn test_render_escapes_names() {
        let entries = vec![FileEntry {
            absolute_path: PathBuf::from("/r/x"),
            relative_path: "dir/<b> & \"q\".txt".to_string(),
        }];
        let html = render_listing(&entries);

        assert!(html.contains("href=\"/download/dir/%3Cb%3E%20%26%20%22q%22.txt\""));
        assert!(html.contains(">dir/&lt;b&gt; &amp; \"q\".txt</a>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_render_empty() {
        let html = render_listing(&[]);
        assert!(html.contains("<ul></ul>"));
        assert!(!html.contains("<li>"));
    }
}
