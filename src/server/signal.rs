// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) ask the hosting process to stop the server.
// On non-Unix platforms only Ctrl+C is available.

use crate::logger::LogSink;

const LOG_TAG: &str = "FilesLister.Signal";

/// Wait until the process is asked to shut down.
#[cfg(unix)]
pub async fn wait_for_shutdown(log: &dyn LogSink) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => log.info(LOG_TAG, "SIGTERM received, shutting down"),
        _ = sigint.recv() => log.info(LOG_TAG, "SIGINT received, shutting down"),
    }
    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown(log: &dyn LogSink) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    log.info(LOG_TAG, "Ctrl+C received, shutting down");
    Ok(())
}
