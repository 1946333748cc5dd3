/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "schema_up_to_date": true
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskpad_shared::db::{migrations::get_migration_status, pool::health_check as ping};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Application version
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,

    /// Whether every embedded migration has been applied
    pub schema_up_to_date: bool,
}

/// Health check handler
///
/// Always answers 200; a broken database shows up as `"degraded"`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = ping(&state.db).await.is_ok();
    let schema_up_to_date = match get_migration_status(&state.db).await {
        Ok(status) => status.is_up_to_date,
        Err(_) => false,
    };

    Json(HealthResponse {
        status: if connected && schema_up_to_date {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        schema_up_to_date,
    })
}
