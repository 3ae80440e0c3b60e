/// Liveness endpoints
///
/// ```text
/// GET /        -> OK
/// GET /health  -> {"status": "healthy", "version": "0.1.0", "database": "connected"}
/// ```

use crate::{app::AppState, outcome::Outcome};
use axum::{extract::State, Json};
use courier_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Plain liveness probe; touches nothing
pub async fn index() -> Outcome {
    Outcome::Ok
}

/// Returns service health including database connectivity
///
/// Always 200; a failing database shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = pool::health_check(&state.db).await.is_ok();

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
