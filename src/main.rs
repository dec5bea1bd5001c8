use std::sync::Arc;

use files_lister::config::{Config, DEFAULT_CONFIG_PATH};
use files_lister::logger::{LogWriter, SharedLog};
use files_lister::server::{signal, FilesLister};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let log: SharedLog = Arc::new(LogWriter::new(
        cfg.logging.access_log_file.as_deref(),
        cfg.logging.error_log_file.as_deref(),
    )?);

    let mut lister = FilesLister::new(Arc::clone(&log), cfg.runtime_options());
    // Failures are already logged by start.
    if lister.start(&cfg.server).await.is_err() {
        std::process::exit(1);
    }

    let waited = signal::wait_for_shutdown(log.as_ref()).await;
    lister.stop().await;
    waited?;
    Ok(())
}
