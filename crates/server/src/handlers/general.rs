//! # General Route Handlers
//!
//! The root and health check endpoints.

use super::{wrap_response, ApiResponse, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "checkbot server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Json<ApiResponse<HealthResponse>> {
    let active_sessions = app_state.sessions.len().await;
    wrap_response(
        HealthResponse {
            status: "OK".to_string(),
            active_sessions,
        },
        debug_params,
        None,
    )
}
