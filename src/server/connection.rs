// Connection module
// Serves one accepted TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppState;
use crate::handler;

const LOG_TAG: &str = "FilesLister.Connection";

/// Spawn handling for an accepted connection and return immediately.
pub fn accept_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(state)));
}

/// Drive HTTP/1.1 on `stream` until the client is done.
///
/// Failures stay local to this connection: they are logged and the task ends.
async fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let timeout = state.options.connection_timeout;
    let log = Arc::clone(&state.log);

    let conn = http1::Builder::new().serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&state))),
    );

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, conn).await {
            Ok(result) => result,
            Err(_) => {
                log.warning(
                    LOG_TAG,
                    &format!(
                        "Connection from {peer_addr} timed out after {} seconds",
                        limit.as_secs()
                    ),
                );
                return;
            }
        },
        None => conn.await,
    };

    if let Err(err) = result {
        log.error(
            LOG_TAG,
            &format!("Failed to serve connection from {peer_addr}: {err}"),
        );
    }
}
