//! Health and metrics endpoint.

use crate::AgentMetrics;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use chirp_error::{ChirpResult, EndpointError, EndpointErrorKind};
use serde_json::json;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// State shared with the HTTP handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    metrics: AgentMetrics,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(metrics: AgentMetrics) -> Self {
        Self { metrics }
    }
}

/// Router answering `/`, `/health` and `/metrics`.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn get_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}

/// Bind `port` on all interfaces and serve the router in a background task.
///
/// Returns the bound address, useful when `port` is zero.
///
/// # Errors
///
/// Returns [`EndpointError`] if the port cannot be bound.
pub async fn serve(port: u16, state: ApiState) -> ChirpResult<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| {
            EndpointError::new(EndpointErrorKind::Bind {
                port,
                reason: e.to_string(),
            })
        })?;
    let addr = listener
        .local_addr()
        .map_err(|e| EndpointError::new(EndpointErrorKind::LocalAddr(e.to_string())))?;

    let app = create_router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Health server stopped");
        }
    });
    info!(%addr, "Health endpoint listening");
    Ok((addr, handle))
}
