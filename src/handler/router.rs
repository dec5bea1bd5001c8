//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, path
//! classification, dispatch to listing or download, access logging.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::handler::{download, listing};
use crate::http;
use crate::logger::AccessLogEntry;

const DOWNLOAD_PREFIX: &str = "/download/";

/// What a request path asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    List,
    /// Suffix after `/download/`, still percent-encoded
    Download(&'a str),
    NotFound,
}

/// Classify a request path
pub fn classify(path: &str) -> Route<'_> {
    if path == "/" {
        Route::List
    } else if let Some(rest) = path.strip_prefix(DOWNLOAD_PREFIX) {
        Route::Download(rest)
    } else {
        Route::NotFound
    }
}

/// Request data needed after the request itself has been consumed
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub version: Version,
    pub peer_addr: SocketAddr,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, peer_addr: SocketAddr) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            version: req.version(),
            peer_addr,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }

    fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req, peer_addr);
    drop(req);

    let response = route_request(&ctx, &state).await;

    if let Some(format) = state.options.access_log_format.as_deref() {
        log_access(&ctx, &response, started, format, &state);
    }

    Ok(response)
}

/// Dispatch on method, then on path
pub async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    if ctx.method != Method::GET && ctx.method != Method::HEAD {
        return http::build_405_response();
    }

    let root = &state.config.root_directory;
    match classify(&ctx.path) {
        Route::List => listing::serve_listing(root, &state.log, ctx.is_head()).await,
        Route::Download(suffix) => {
            download::serve_download(root, suffix, &state.log, ctx.is_head()).await
        }
        Route::NotFound => http::build_404_response(),
    }
}

fn log_access(
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    started: Instant,
    format: &str,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        ctx.peer_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.http_version = match ctx.version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if ctx.is_head() {
        0
    } else {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    state.log.access(&entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuntimeOptions, ServerConfig};
    use crate::logger::testing::RecordingLog;
    use crate::logger::SharedLog;
    use http_body_util::BodyExt;

    fn state_for(root: &std::path::Path, access_log: Option<&str>) -> (Arc<AppState>, Arc<RecordingLog>) {
        let recorder = Arc::new(RecordingLog::default());
        let log: SharedLog = recorder.clone();
        let state = AppState::new(
            ServerConfig {
                root_directory: root.canonicalize().unwrap(),
                bind_host: "127.0.0.1".to_string(),
                bind_port: 8080,
            },
            RuntimeOptions {
                connection_timeout: None,
                access_log_format: access_log.map(ToString::to_string),
            },
            log,
        );
        (Arc::new(state), recorder)
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn peer() -> SocketAddr {
        "192.0.2.10:50000".parse().unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("/"), Route::List);
        assert_eq!(classify("/download/a/b.txt"), Route::Download("a/b.txt"));
        assert_eq!(classify("/download/"), Route::Download(""));
        assert_eq!(classify("/download"), Route::NotFound);
        assert_eq!(classify("/does/not/exist"), Route::NotFound);
        assert_eq!(classify("//"), Route::NotFound);
        assert_eq!(classify(""), Route::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_path_is_empty_404() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state_for(dir.path(), None);

        let resp = handle_request(request(Method::GET, "/does/not/exist"), peer(), state)
            .await
            .unwrap();

        assert_eq!(resp.status(), 404);
        assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_listing_then_download() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/b.txt"), b"\x00\x01payload").unwrap();
        let (state, _) = state_for(dir.path(), None);

        let listing = handle_request(request(Method::GET, "/"), peer(), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(listing.status(), 200);
        let page = listing.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(page.to_vec()).unwrap();
        assert!(page.contains("href=\"/download/a/b.txt\""));

        let download = handle_request(request(Method::GET, "/download/a/b.txt"), peer(), state)
            .await
            .unwrap();
        assert_eq!(download.status(), 200);
        let body = download.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"\x00\x01payload");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), b"12345").unwrap();
        let (state, _) = state_for(dir.path(), None);

        let resp = handle_request(request(Method::HEAD, "/download/f.txt"), peer(), state)
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "5");
        assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state_for(dir.path(), None);

        let resp = handle_request(request(Method::POST, "/"), peer(), state)
            .await
            .unwrap();

        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_access_log_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let (state, recorder) = state_for(dir.path(), Some("$request_method $request_uri $status"));

        handle_request(request(Method::GET, "/missing"), peer(), state)
            .await
            .unwrap();

        assert!(recorder.contains("info", "GET /missing 404"));
    }
}
