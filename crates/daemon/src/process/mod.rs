pub mod utils;

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use common::prelude::MemoryStore;

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// How often the in-process store drops expired secrets
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

use crate::http_server::{self, HttpServerError};
use crate::{ServiceConfig, ServiceState};

/// Handle for gracefully shutting down the relay.
pub struct ShutdownHandle {
    graceful_waiter: tokio::task::JoinHandle<()>,
    server: tokio::task::JoinHandle<Result<(), HttpServerError>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Block until the service shuts down (via signal or explicit shutdown).
    ///
    /// Returns the HTTP server's error if it stopped on its own, e.g.
    ///  because the listen address was taken.
    pub async fn wait(self) -> Result<(), HttpServerError> {
        shutdown_and_join(self.graceful_waiter, self.server, self.handles).await
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Initialize logging, panic handler, and build info reporting.
/// Returns guards that must be kept alive for the duration of the program.
fn init_logging(
    service_config: &ServiceConfig,
) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(service_config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    if let Some(log_dir) = &service_config.log_dir {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, "relay.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(service_config.log_level.into())
            .from_env_lossy();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(file_env_filter);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_layer).init();
    }

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Create service state from config, exiting on error.
async fn create_state(service_config: &ServiceConfig) -> ServiceState {
    match ServiceState::from_config(service_config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    }
}

/// Wait for shutdown and join all handles with timeout.
async fn shutdown_and_join(
    graceful_waiter: tokio::task::JoinHandle<()>,
    server: tokio::task::JoinHandle<Result<(), HttpServerError>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
) -> Result<(), HttpServerError> {
    let _ = graceful_waiter.await;

    let joined = futures::future::join(server, join_all(handles));
    match timeout(FINAL_SHUTDOWN_TIMEOUT, joined).await {
        Ok((server, _)) => server?,
        Err(_) => {
            tracing::error!(
                "Failed to shut down within {} seconds",
                FINAL_SHUTDOWN_TIMEOUT.as_secs()
            );
            std::process::exit(4);
        }
    }
}

/// Periodically drop expired entries so unread secrets don't pile up
///  in memory. Redis expires keys on its own.
async fn purge_loop(store: MemoryStore, mut shutdown_rx: watch::Receiver<()>) {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = store.len(), "purged expired secrets");
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}

/// Create state and spawn background tasks, returning the state handle.
///
/// The returned `ShutdownHandle` must be kept alive; dropping it does not stop the service.
pub async fn start_service(service_config: &ServiceConfig) -> (ServiceState, ShutdownHandle) {
    let (graceful_waiter, shutdown_tx, shutdown_rx) = match utils::graceful_shutdown_blocker() {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("failed to install signal handlers: {}", e);
            std::process::exit(3);
        }
    };
    let state = create_state(service_config).await;

    let mut handles = Vec::new();

    if let Some(store) = state.memory_store() {
        let store = store.clone();
        let purge_rx = shutdown_rx.clone();
        handles.push(tokio::spawn(purge_loop(store, purge_rx)));
    }

    let mut http_config = http_server::Config::new(
        service_config.listen_addr,
        service_config.tls.clone(),
        service_config.public_dir.clone(),
    );
    http_config.log_level = service_config.log_level;

    let http_state = state.clone();
    let http_rx = shutdown_rx.clone();
    let http_shutdown_tx = shutdown_tx.clone();
    let server = tokio::spawn(async move {
        let result = http_server::run(http_config, http_state, http_rx).await;
        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
            // nothing left to serve, take the rest of the process down with it
            let _ = http_shutdown_tx.send(());
        }
        result
    });

    tracing::info!(
        "Running: relay on {} ({})",
        service_config.listen_addr,
        if service_config.tls.is_some() {
            "https"
        } else {
            "http"
        }
    );

    let handle = ShutdownHandle {
        graceful_waiter,
        server,
        handles,
        shutdown_tx,
    };

    (state, handle)
}

/// Spawns the relay: HTTP server plus any store housekeeping.
/// Blocks until shutdown signal is received. Use for CLI binary usage.
pub async fn spawn_service(service_config: &ServiceConfig) -> Result<(), HttpServerError> {
    let _guards = init_logging(service_config);
    let (_, handle) = start_service(service_config).await;
    handle.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::prelude::{Expiration, IdGenerator, SecretStore, UuidV4Generator};
    use url::Url;

    #[tokio::test(start_paused = true)]
    async fn test_purge_loop_drops_expired_and_stops_on_shutdown() {
        let store = MemoryStore::new();
        store
            .put(
                &UuidV4Generator.generate(),
                b"short lived",
                Expiration::OneHour,
            )
            .await
            .unwrap();

        let (tx, rx) = watch::channel(());
        let task = tokio::spawn(purge_loop(store.clone(), rx));

        tokio::time::sleep(Duration::from_secs(3600) + PURGE_INTERVAL * 2).await;
        assert!(store.is_empty());

        tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_taken_listen_address_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = ServiceConfig::new(Url::parse("memory://").unwrap());
        config.listen_addr = taken.local_addr().unwrap();

        let (_, handle) = start_service(&config).await;
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, HttpServerError::ServingFailed(_)));
    }
}
