/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use eventra_shared::db::pool;

use crate::{app::AppState, error::ApiResult};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status: `connected` or `disconnected`
    pub database: String,
}

/// Reports service liveness and database connectivity
///
/// Always answers `200`; a broken database surfaces as `degraded` rather
/// than an error status, so load balancers can distinguish "down" from
/// "up but impaired".
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
