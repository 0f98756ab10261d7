//! HTTP API routes
//!
//! Defines the proxy endpoint, the status endpoint and static file serving.

use crate::constants::messages::{RATE_LIMIT_ERROR, RATE_LIMIT_MESSAGE, UPSTREAM_FAILED};
use crate::proxy::{PlanesQuery, PlanesResponse, ProxyError};
use crate::quota::ClientIdentity;
use crate::server::state::AppState;
use crate::upstream::UpstreamError;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

/// Resolve a static asset path
///
/// Relative paths are tried against the working directory first, then
/// next to the executable.
fn resolve_static_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(configured)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = resolve_static_path(&state.config.server.static_dir);
    let airlines_file = resolve_static_path(&state.config.server.airlines_file);

    Router::new()
        .route("/planes", get(planes_handler))
        .route("/api/status", get(status_handler))
        .route_service("/airlines.json", ServeFile::new(airlines_file))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: None,
        }
    }
}

/// Whole seconds until `wait` has elapsed, rounded up
fn retry_after_secs(wait: std::time::Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
            }
            ProxyError::RateLimited { retry_after } => {
                let body = ApiError {
                    error: RATE_LIMIT_ERROR.to_string(),
                    message: Some(RATE_LIMIT_MESSAGE.to_string()),
                    details: None,
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                if let Some(wait) = retry_after {
                    response
                        .headers_mut()
                        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(wait)));
                }
                response
            }
            ProxyError::Upstream(err) => {
                let body = match err {
                    UpstreamError::Transport(detail) => ApiError {
                        details: Some(detail),
                        ..ApiError::new(UPSTREAM_FAILED)
                    },
                    UpstreamError::Status { status, body } => ApiError {
                        details: Some(body),
                        ..ApiError::new(format!("API returned status code {}", status))
                    },
                    UpstreamError::Payload(detail) => ApiError {
                        details: Some(detail),
                        ..ApiError::new("Invalid upstream payload")
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Nearby aircraft, nearest first
///
/// GET /planes?lat=&lon=&dist=
async fn planes_handler(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PlanesResponse>, ProxyError> {
    let query = PlanesQuery::from_pairs(pairs);
    let identity = peer
        .map(|ConnectInfo(addr)| ClientIdentity::from(addr.ip()))
        .unwrap_or_else(ClientIdentity::unknown);

    let response = state.proxy.planes(&identity, &query).await?;
    Ok(Json(response))
}

/// One configured quota window
#[derive(Debug, Serialize, Deserialize)]
pub struct LimitInfo {
    pub name: String,
    pub max_requests: u64,
    pub window_secs: u64,
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Counting store backend
    pub quota_store: String,
    /// Whether the counting store answered a ping
    pub quota_store_ok: bool,
    /// Configured quota windows
    pub limits: Vec<LimitInfo>,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let guard = state.proxy.guard();

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        quota_store: guard.store_name().to_string(),
        quota_store_ok: guard.ping().await.is_ok(),
        limits: guard
            .limits()
            .iter()
            .map(|limit| LimitInfo {
                name: limit.name.clone(),
                max_requests: limit.max_requests,
                window_secs: limit.window.as_secs(),
            })
            .collect(),
    })
}
