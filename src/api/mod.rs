//! Wordboard HTTP API
//!
//! HTTP layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /` - Chart page
//! - `GET /ws` - Live snapshot stream for the chart
//!
//! ## Words
//! - `GET /api/v1/words/top` - Current top words
//! - `POST /api/v1/words/ingest` - Add words from identifiers
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use wordboard::api::{serve, AppState};
//! use wordboard::backend::initialize_client;
//! use wordboard::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = initialize_client(&config.backend)?;
//!
//!     let state = AppState::new(client, config.dashboard.clone(), config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/words/top", get(routes::words::top_words))
        .route("/words/ingest", post(routes::words::ingest_identifiers))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/ws", get(websocket_handler))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Wordboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Wordboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{client::test_config, BackendClient, Fields};
    use crate::view::ViewOptions;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, BackendClient) {
        let client = BackendClient::connect(test_config()).unwrap();
        let state = AppState::new(client.clone(), ViewOptions::default(), ApiConfig::default());
        (build_router(state), client)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _client) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_tracks_termination() {
        let (app, client) = create_test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        client.terminate();

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _client) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["project_id"], "wordboard-test");
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let (app, _client) = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/ws"));
    }

    #[tokio::test]
    async fn test_top_words_ordered() {
        let (app, client) = create_test_app();
        let words = client.words();
        for (id, value) in [("get", 5), ("set", 9), ("run", 1)] {
            let mut fields = Fields::new();
            fields.insert("name".to_string(), json!(id));
            fields.insert("value".to_string(), json!(value));
            words.set(id, fields).unwrap();
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/words/top?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["words"][0]["data"]["name"], "set");
        assert_eq!(body["words"][1]["data"]["name"], "get");
    }

    #[tokio::test]
    async fn test_top_words_rejects_zero_limit() {
        let (app, _client) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/words/top?limit=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_identifiers() {
        let (app, client) = create_test_app();

        let response = app
            .oneshot(post_json(
                "/api/v1/words/ingest",
                r#"{"language": "java", "identifiers": ["getUser", "getName", "Bad_name"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["words"], 3);
        assert_eq!(body["occurrences"], 4);
        assert_eq!(body["skipped"], 1);

        let get = client.words().get("get").unwrap().unwrap();
        assert_eq!(get.fields["java_value"], json!(2));
    }

    #[tokio::test]
    async fn test_ingest_validation() {
        let (app, _client) = create_test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/words/ingest",
                r#"{"language": "python", "identifiers": []}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/api/v1/words/ingest", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_nothing_matching() {
        let (app, client) = create_test_app();

        let response = app
            .oneshot(post_json(
                "/api/v1/words/ingest",
                r#"{"language": "python", "identifiers": ["camelCase"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "empty");
        assert!(client.words().is_empty());
    }
}
