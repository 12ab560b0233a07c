// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTTP surface: health check and inference API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::engine::InferenceEngine;

pub const HEALTH_TEXT: &str = "anirename is running!";

/// Shared application state
pub struct AppState {
    pub engine: InferenceEngine,
    pub config: AppConfig,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: InferenceEngine, config: AppConfig) -> Self {
        Self {
            engine,
            config,
            started_at: Utc::now(),
        }
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/infer", get(api_infer))
        .route("/api/status", get(api_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

#[derive(Deserialize)]
struct InferQuery {
    filename: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

async fn api_infer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InferQuery>,
) -> Response {
    match query.filename {
        Some(filename) => Json(state.engine.preview(&filename)).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody { error: "missing 'filename' query parameter".to_string() }),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
struct StatusResponse {
    version: &'static str,
    uptime_secs: i64,
    rules: Vec<&'static str>,
    extensions: Vec<String>,
}

async fn api_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        rules: state.engine.rule_names(),
        extensions: state.config.intake.extensions.clone(),
    })
}

/// Bind and serve until the process exits
pub async fn start_server(engine: InferenceEngine, config: AppConfig) -> crate::Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(engine, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Health check and API listening on http://{}", addr);

    axum::serve(listener, create_router(state)).await
        .map_err(|e| crate::RenameError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(AppState::new(InferenceEngine::new(), AppConfig::default())))
    }

    async fn get_body(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        for uri in ["/", "/health"] {
            let (status, body) = get_body(uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, HEALTH_TEXT.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_infer() {
        let (status, body) =
            get_body("/api/infer?filename=%5BSubGroup%5D%20Great%20Anime%20-%2005%20%5B720p%5D.mkv").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["series_name"], "Great Anime");
        assert_eq!(json["episode"], "05");
        assert_eq!(json["new_filename"], "Great Anime - Episode 05.mkv");
    }

    #[tokio::test]
    async fn test_infer_requires_filename() {
        let (status, body) = get_body("/api/infer").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("filename"));
    }

    #[tokio::test]
    async fn test_status() {
        let (status, body) = get_body("/api/status").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["rules"].as_array().unwrap().len(), 5);
        assert_eq!(json["rules"][0], "bracket_tag_dash");
    }
}
