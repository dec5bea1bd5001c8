// Accept loop module
// Accepts connections until shutdown is signalled

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;

const LOG_TAG: &str = "FilesLister.Accept";

/// Accept connections until `shutdown` fires.
///
/// Each accepted connection is handed to its own task before the loop goes
/// back to `accept`, so a slow request never holds up the next connection.
/// The listener is dropped (closed) when the loop returns.
pub async fn run_accept_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            biased;

            () = shutdown.notified() => break,

            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => state
                        .log
                        .error(LOG_TAG, &format!("Failed to accept connection: {e}")),
                }
            }
        }
    }
}
