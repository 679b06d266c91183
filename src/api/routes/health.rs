//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (backend client is usable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 503 once the backend client has been terminated.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.client.is_terminated() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backend_ok = !state.client.is_terminated();
    let stats = state.client.stats();

    Json(HealthResponse {
        status: if backend_ok { "healthy" } else { "unhealthy" }.to_string(),
        backend: if backend_ok { "ok" } else { "terminated" }.to_string(),
        project_id: state.client.project_id().to_string(),
        documents: state.words.len(),
        listeners: stats.listeners,
        ws_connections: state.ws_connection_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
