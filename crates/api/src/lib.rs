//! E-Gommerce API Server
//!
//! REST API exposing CRUD routes for products and users over a pluggable
//! storage backend.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_governor::GovernorLayer;
use tower_http::{
    catch_panic::CatchPanicLayer, normalize_path::NormalizePath, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub mod config;
pub mod content_type;
pub mod handlers;
pub mod logging;
pub mod rate_limit;
pub mod response;
pub mod routes;

use crate::config::{AppConfig, ServerConfig};
use crate::handlers::EntityState;
use crate::rate_limit::{create_governor_config, RateLimitConfig};
use storage::{Product, SqlStorage, Storage, StorageError, User};

pub use logging::init_logging;

/// The served application: the router behind trailing-slash trimming
pub type App = NormalizePath<Router>;

/// Server startup and runtime errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rate limit configuration error: {0}")]
    RateLimit(String),
    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// The application: storage handles plus server settings.
///
/// Built once at startup and handed to route registration.
pub struct Server {
    storage: Arc<dyn Storage>,
    products: EntityState<Product>,
    users: EntityState<User>,
    config: ServerConfig,
    metrics: Option<PrometheusHandle>,
}

impl Server {
    /// Create a server over `storage`
    pub fn new<S: Storage + 'static>(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            products: storage.clone(),
            users: storage.clone(),
            storage,
            config,
            metrics: None,
        }
    }

    /// Serve Prometheus metrics from `handle` at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the application with its middleware stack.
    ///
    /// Path normalization wraps the router so it runs before route matching.
    pub fn app(&self) -> Result<App, ServerError> {
        Ok(NormalizePath::trim_trailing_slash(self.router()?))
    }

    fn router(&self) -> Result<Router, ServerError> {
        let api = Router::new()
            .nest(routes::products::PATH, routes::products::routes(self.products.clone()))
            .nest(routes::users::PATH, routes::users::routes(self.users.clone()))
            .layer(middleware::from_fn(content_type::require_json));

        let mut app = Router::new().nest(routes::BASE_PATH, api);

        if let Some(limit) = RateLimitConfig::per_minute(self.config.rate_limit_per_minute) {
            info!(
                "Rate limiting to {} requests/minute per IP and endpoint",
                self.config.rate_limit_per_minute
            );
            app = app.layer(GovernorLayer {
                config: create_governor_config(&limit)?,
            });
        }

        // Added after the governor layer so they are not rate limited
        app = app.route("/ping", get(heartbeat));
        if let Some(handle) = self.metrics.clone() {
            app = app.route("/metrics", get(move || async move { handle.render() }));
        }

        Ok(app
            .layer(TimeoutLayer::new(self.config.request_timeout()))
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve until Ctrl-C / SIGTERM, then close storage
    pub async fn serve(self) -> Result<(), ServerError> {
        let app = self.app()?;
        routes::log_routes(routes::products::PATH);
        routes::log_routes(routes::users::PATH);

        let listener = tokio::net::TcpListener::bind(&self.config.addr).await?;
        info!("Starting server on {}", self.config.addr);

        let served = axum::serve(
            listener,
            axum::ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        if let Err(e) = &served {
            error!("Server error: {}", e);
        }
        self.storage.close().await?;
        info!("Server stopped");

        served.map_err(ServerError::from)
    }
}

/// Liveness check
async fn heartbeat() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], ".")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))
}

/// Connect the database and run the server with `config`
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let storage = SqlStorage::connect(&config.database.url, config.database.max_connections).await?;
    storage.init_schema().await?;

    let server = Server::new(Arc::new(storage), config.server).with_metrics(install_metrics()?);
    server.serve().await
}
