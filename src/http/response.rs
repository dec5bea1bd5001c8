//! HTTP response building module
//!
//! Builders for every response the file server emits. Bodies are always
//! complete `Full<Bytes>` values with an exact `Content-Length`; HEAD requests
//! get the same headers and an empty body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

fn finish(builder: Builder, status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    builder.body(Full::new(body)).unwrap_or_else(|_| {
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = status;
        fallback
    })
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(status)
            .header("Content-Length", 0),
        status,
        Bytes::new(),
    )
}

/// Build 404 Not Found response with an empty body
pub fn build_404_response() -> Response<Full<Bytes>> {
    empty(StatusCode::NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header("Allow", "GET, HEAD")
            .header("Content-Length", 0),
        StatusCode::METHOD_NOT_ALLOWED,
        Bytes::new(),
    )
}

/// Build 500 response for a request that failed after routing
pub fn build_500_response() -> Response<Full<Bytes>> {
    empty(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build HTML page response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/html; charset=utf-8")
            .header("Content-Length", content_length),
        StatusCode::OK,
        body,
    )
}

/// Build attachment response carrying raw file bytes
pub fn build_download_response(data: Bytes, file_name: &str, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/octet-stream")
            .header("Content-Disposition", content_disposition(file_name))
            .header("Content-Length", content_length),
        StatusCode::OK,
        body,
    )
}

/// `attachment; filename=<name>`, quoted or RFC 5987 encoded only when the
/// bare form would not be a valid token.
pub fn content_disposition(file_name: &str) -> String {
    let is_token = |c: char| c.is_ascii_alphanumeric() || "!#$&+-.^_`|~".contains(c);

    if !file_name.is_empty() && file_name.chars().all(is_token) {
        format!("attachment; filename={file_name}")
    } else if file_name
        .chars()
        .all(|c| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\')
    {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        format!(
            "attachment; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    }
}
