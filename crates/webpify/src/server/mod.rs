//! HTTP service exposing the conversion pipeline.
//!
//! Routing, CORS and body limits live here; all conversion semantics are
//! delegated to [`webpify_core::Converter`].

mod error;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use webpify_core::config::ServerConfig;
use webpify_core::{Config, Converter};

pub use error::ApiError;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub converter: Converter,
    pub default_quality: u8,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let timeout_ms = config.server.request_timeout_ms;
        Self {
            converter: Converter::new(&config.conversion, &config.limits),
            default_quality: config.conversion.default_quality,
            request_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
        }
    }
}

/// Build the application router.
pub fn router(config: &Config) -> Router {
    let state = Arc::new(AppState::from_config(config));
    let body_limit = (config.server.max_upload_mb as usize).saturating_mul(1024 * 1024);

    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/convert", post(routes::convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: configured origins, credentials allowed, methods and headers mirrored.
///
/// A `*` entry mirrors the request origin, since a literal wildcard cannot
/// be combined with credentials.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origin = if server.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {:?}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Bind and serve until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let address = config.bind_address();
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;

    tracing::info!(
        "{} v{} listening on http://{}",
        webpify_core::SERVICE_NAME,
        webpify_core::VERSION,
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, draining connections");
}
