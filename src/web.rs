use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Search requests are a single short string
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Time in-flight TLS connections get to finish once shutdown starts
#[cfg(feature = "tls")]
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(10);

/// Build the full application: JSON API under `/api`, frontend otherwise.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
                .layer(cors),
        )
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(state, &config.static_dir);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
            .await
            .with_context(|| format!("Failed to load TLS certificate {cert}"))?;
        tracing::info!("Web server running at https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(shutdown_handle(shutdown_signal()))
            .serve(app.into_make_service())
            .await
            .context("Web server failed")?;
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    if config.tls_cert_path.is_some() {
        tracing::warn!("TLS paths configured but the `tls` feature is disabled; serving plain HTTP");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    Ok(())
}

/// Handle that starts a graceful shutdown of an `axum_server` once `signal` resolves
#[cfg(feature = "tls")]
fn shutdown_handle<F>(signal: F) -> axum_server::Handle
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let handle = axum_server::Handle::new();
    let trigger = handle.clone();
    tokio::spawn(async move {
        signal.await;
        trigger.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });
    handle
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
