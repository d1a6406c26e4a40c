//! HTTP server exposing the event-window import.
//!
//! # Routes
//!
//! ```text
//! GET /health                 liveness and version
//! GET /api/data/import        window around the event mark of the configured recording
//!     ?points_before=N        override the configured split for this call
//!     &total_points=M
//! ```
//!
//! Reading the recording is blocking file I/O, so each import runs on
//! tokio's blocking pool.

use crate::config::{Config, ConfigError};
use crate::core::{WindowError, WindowSpec};
use crate::mark::MarkTimeProvider;
use crate::pipeline::{ImportError, ImportPipeline, ImportResponse};
use crate::source::CsvFileSource;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Recording served by the import endpoint
    pub source_path: PathBuf,
    /// Default window split
    pub window: WindowSpec,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, source_path: impl Into<PathBuf>, window: WindowSpec) -> Self {
        Self {
            port,
            source_path: source_path.into(),
            window,
        }
    }

    /// Derive the server configuration from the service configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.port,
            config.source_path.clone(),
            config.window_spec()?,
        ))
    }
}

/// Shared server state
pub struct ServerState {
    /// Import pipeline for the configured recording
    pipeline: ImportPipeline,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: &ServerConfig, provider: Arc<dyn MarkTimeProvider>) -> Self {
        Self {
            pipeline: ImportPipeline::new(
                provider,
                Arc::new(CsvFileSource::new(config.source_path.clone())),
                config.window,
            ),
        }
    }

    /// Window for one request: the configured split with query overrides.
    fn window_for(&self, query: &ImportQuery) -> Result<WindowSpec, WindowError> {
        let window = self.pipeline.spec();
        if query.points_before.is_none() && query.total_points.is_none() {
            return Ok(window);
        }
        WindowSpec::from_signed(
            query.points_before.unwrap_or(window.points_before() as i64),
            query.total_points.unwrap_or(window.total_points() as i64),
        )
    }
}

/// Optional per-request window overrides
#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    pub points_before: Option<i64>,
    pub total_points: Option<i64>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            code: code.to_string(),
        }),
    )
}

fn import_error(err: ImportError) -> ApiError {
    match &err {
        ImportError::Mark(_) => api_error(StatusCode::BAD_GATEWAY, "MARK_UNAVAILABLE", &err),
        ImportError::Source(e) if e.is_unavailable() => {
            api_error(StatusCode::SERVICE_UNAVAILABLE, "SOURCE_UNAVAILABLE", &err)
        }
        ImportError::Source(_) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "SOURCE_MALFORMED", &err)
        }
    }
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/data/import
///
/// Resolves the event mark for the configured recording and returns the
/// window of samples around it.
async fn import(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<ImportQuery>, QueryRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Query(query) = query
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_WINDOW", e.body_text()))?;
    let spec = state
        .window_for(&query)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_WINDOW", e))?;

    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.run_with(spec))
        .await
        .map_err(|e| {
            tracing::error!("Import task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e)
        })?;

    result.map(Json).map_err(import_error)
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/data/import", get(import))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                    HeaderValue::from_static("http://localhost:3000"),
                ])
                .allow_methods([Method::GET])
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Handle to a server started by [`run`].
pub struct RunningServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningServer {
    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight imports to finish.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.shutdown_tx.send(());
        self.task.await
    }
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    provider: Arc<dyn MarkTimeProvider>,
) -> anyhow::Result<RunningServer> {
    let state = Arc::new(ServerState::new(&config, provider));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!(
        "QuakeSphere listening on http://{} (source: {})",
        actual_addr,
        config.source_path.display()
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(RunningServer {
        addr: actual_addr,
        shutdown_tx,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::FixedMarkProvider;

    fn state() -> ServerState {
        let config = ServerConfig::new(0, "unused.csv", WindowSpec::default());
        ServerState::new(&config, Arc::new(FixedMarkProvider::default()))
    }

    #[test]
    fn test_window_defaults_without_query() {
        let window = state().window_for(&ImportQuery::default()).unwrap();
        assert_eq!(window, WindowSpec::default());
    }

    #[test]
    fn test_window_query_overrides() {
        let state = state();
        let query = ImportQuery {
            points_before: Some(25),
            total_points: None,
        };
        assert_eq!(state.window_for(&query).unwrap(), WindowSpec::new(25, 50).unwrap());

        let query = ImportQuery {
            points_before: Some(-1),
            total_points: None,
        };
        assert!(state.window_for(&query).is_err());

        let query = ImportQuery {
            points_before: None,
            total_points: Some(5),
        };
        assert!(matches!(
            state.window_for(&query),
            Err(WindowError::BeforeExceedsTotal { .. })
        ));
    }

    #[test]
    fn test_server_config_from_config() {
        let config = Config {
            port: 0,
            points_before: 60,
            ..Config::default()
        };
        assert!(ServerConfig::from_config(&config).is_err());

        let config = Config {
            port: 1234,
            ..Config::default()
        };
        let server = ServerConfig::from_config(&config).unwrap();
        assert_eq!(server.port, 1234);
        assert_eq!(server.window, WindowSpec::default());
    }
}
