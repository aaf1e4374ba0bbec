//! Router configuration.
//!
//! This module creates the main Axum router that combines all endpoints.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use dm_model::{DirectoryEntry, DirectoryKey};
use dm_sync::SyncReport;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check));

    let directory = Router::new()
        .route("/users", get(sync_users))
        .route("/directory", get(list_directory));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health)
        .merge(directory)
        .route("/", get(root))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// Directory
// ============================================================================

/// Response of `GET /users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    /// Live key set after the pass, ordered by key.
    pub users: Vec<DirectoryKey>,
    /// Counters for the pass.
    pub sync: SyncReport,
}

/// Fetches the roster with the caller's token and reconciles the store.
async fn sync_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UsersResponse>> {
    let token = extract_bearer_token(&headers)?;
    let outcome = state.sync().sync(&token).await?;

    Ok(Json(UsersResponse {
        users: outcome.live.into_iter().collect(),
        sync: outcome.report,
    }))
}

/// Returns the persisted entries without syncing.
async fn list_directory(State(state): State<AppState>) -> ApiResult<Json<Vec<DirectoryEntry>>> {
    Ok(Json(state.sync().entries().await?))
}

/// Extracts the Bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> ApiResult<String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected Bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::unauthorized("empty token"));
    }

    Ok(token.to_string())
}

// ============================================================================
// Health
// ============================================================================

/// Server information response.
#[derive(Serialize)]
pub struct ServerInfo {
    name: String,
    version: String,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// Root endpoint handler.
async fn root() -> Json<ServerInfo> {
    Json(ServerInfo {
        name: "Directory Mirror".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Basic health check.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    })
}

/// Kubernetes liveness probe.
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe.
async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match dm_storage::ping(&state.pool).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
