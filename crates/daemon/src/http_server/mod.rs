use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;
mod health;
pub mod tls;

pub use config::Config;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Maximum request body size in bytes (64 KiB). Comfortably above the
///  largest valid issuance request.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// How long in-flight TLS connections get to finish after shutdown
const TLS_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Build the full relay router: status routes, the secret api and
///  the static UI as fallback.
pub fn router(config: &Config, state: ServiceState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let static_files =
        ServeDir::new(&config.public_dir).fallback(handlers::not_found_handler.into_service());

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .merge(api::router(state.clone()))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
        .layer(trace_layer)
}

/// Run the relay HTTP server until `shutdown_rx` fires. Listens with
///  TLS when the config carries a certificate and key.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state);

    match &config.tls {
        Some(paths) => {
            let rustls_config = RustlsConfig::from_config(tls::server_config(paths)?);

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                let _ = shutdown_rx.changed().await;
                shutdown_handle.graceful_shutdown(Some(TLS_SHUTDOWN_GRACE));
            });

            tracing::info!(addr = ?listen_addr, "relay listening with TLS");
            axum_server::bind_rustls(listen_addr, rustls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(addr = ?listen_addr, "relay listening");
            let listener = tokio::net::TcpListener::bind(listen_addr).await?;

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await?;
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
    #[error("failed to set up TLS: {0}")]
    Tls(#[from] tls::TlsError),
    #[error("HTTP server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
