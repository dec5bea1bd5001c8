// Lifecycle module
// Start / stop of the single listener owned by the file server

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::listener::create_listener;
use super::server_loop::run_accept_loop;
use crate::config::{self, AppState, RawServerConfig, RuntimeOptions, ServerConfig};
use crate::error::StartError;
use crate::logger::SharedLog;

const START_TAG: &str = "FilesLister.Start";
const STOP_TAG: &str = "FilesLister.Stop";

/// A bound listener with its accept loop running.
pub struct Running {
    local_addr: SocketAddr,
    prefix: String,
    shutdown: Arc<Notify>,
    accept_task: JoinHandle<()>,
}

impl Running {
    /// Resolve the bind address, bind, and spawn the accept loop.
    ///
    /// Nothing is logged here; [`FilesLister::start`] reports the outcome.
    pub async fn bind(
        config: ServerConfig,
        options: RuntimeOptions,
        log: SharedLog,
    ) -> Result<Self, StartError> {
        let addr = resolve_bind_addr(&config).await?;
        let listener =
            create_listener(addr).map_err(|source| StartError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartError::Bind { addr, source })?;

        let prefix = config.prefix();
        let state = Arc::new(AppState::new(config, options, log));
        let shutdown = Arc::new(Notify::new());
        let accept_task = tokio::spawn(run_accept_loop(listener, state, Arc::clone(&shutdown)));

        Ok(Self {
            local_addr,
            prefix,
            shutdown,
            accept_task,
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The configured `http://{host}:{port}/` prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Stop accepting and close the listener. Connections already being
    /// served keep their own tasks and are not waited for.
    pub async fn shutdown(mut self) -> Result<(), tokio::task::JoinError> {
        // notify_one stores a permit, so this cannot be missed by the loop.
        self.shutdown.notify_one();
        (&mut self.accept_task).await
    }
}

impl Drop for Running {
    // Dropped without `shutdown`: cancel the loop so the listener closes.
    fn drop(&mut self) {
        self.shutdown.notify_one();
        self.accept_task.abort();
    }
}

async fn resolve_bind_addr(config: &ServerConfig) -> Result<SocketAddr, StartError> {
    let host = config.listen_host();
    let invalid = || StartError::InvalidAddress(config.bind_host.clone());

    tokio::net::lookup_host((host, config.bind_port))
        .await
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)
}

/// Lifecycle manager for the file server.
///
/// Owned by the hosting process, which calls [`start`](Self::start) and
/// [`stop`](Self::stop); at most one listener is live per instance.
pub struct FilesLister {
    log: SharedLog,
    options: RuntimeOptions,
    running: Option<Running>,
}

impl FilesLister {
    pub fn new(log: SharedLog, options: RuntimeOptions) -> Self {
        Self {
            log,
            options,
            running: None,
        }
    }

    /// Validate host-supplied settings and start serving.
    ///
    /// Every failure is logged and returned. A listener that was already
    /// running is left untouched by a failed start.
    pub async fn start(&mut self, raw: &RawServerConfig) -> Result<SocketAddr, StartError> {
        let config = match config::validate(raw, self.log.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                self.log.error(START_TAG, &e.to_string());
                return Err(e);
            }
        };
        self.start_with(config).await
    }

    /// Start serving an already validated configuration.
    ///
    /// When already running, the new listener is bound first and the previous
    /// one is stopped only after that succeeds. Restarting on the address
    /// still in use therefore fails with [`StartError::Bind`].
    pub async fn start_with(&mut self, config: ServerConfig) -> Result<SocketAddr, StartError> {
        if let Some(current) = &self.running {
            self.log.warning(
                START_TAG,
                &format!(
                    "Already running on {}, starting a replacement listener",
                    current.local_addr()
                ),
            );
        }

        let root = config.root_directory.clone();
        self.log
            .info(START_TAG, &format!("Base directory: {}", root.display()));
        self.log.info(
            START_TAG,
            &format!("Starting HTTP listener at {}", config.prefix()),
        );

        match Running::bind(config, self.options.clone(), Arc::clone(&self.log)).await {
            Ok(running) => {
                let addr = running.local_addr();
                self.log.info(
                    START_TAG,
                    &format!(
                        "HTTP listener started at {} (bound {addr}), serving {}",
                        running.prefix(),
                        root.display()
                    ),
                );
                if let Some(previous) = self.running.replace(running) {
                    self.retire(previous).await;
                }
                Ok(addr)
            }
            Err(e) => {
                self.log.error(START_TAG, &e.to_string());
                Err(e)
            }
        }
    }

    /// Stop the listener. A no-op when not running.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            self.retire(running).await;
        }
    }

    async fn retire(&self, running: Running) {
        let addr = running.local_addr();
        match running.shutdown().await {
            Ok(()) => self
                .log
                .info(STOP_TAG, &format!("HTTP listener on {addr} stopped")),
            Err(e) => self
                .log
                .error(STOP_TAG, &format!("Accept loop on {addr} ended abnormally: {e}")),
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(Running::local_addr)
    }
}
