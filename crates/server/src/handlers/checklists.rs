//! # Checklist Handlers
//!
//! Operators assign checklists; clients list the ones assigned to them.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use checkbot::{
    checklists::assign_checklist, constants::NO_CHECKLISTS_NOTICE,
    providers::db::storage::ChecklistStore, Checklist, NewChecklist,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Deserialize)]
pub struct AssignChecklistRequest {
    pub filename: String,
    pub content: String,
    pub assigned_clients: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ChecklistsResponse {
    pub checklists: Vec<Checklist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Handler for `POST /checklists`.
pub async fn assign_checklist_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<AssignChecklistRequest>,
) -> Result<Json<ApiResponse<Checklist>>, AppError> {
    info!(
        "Received checklist '{}' for clients {:?}",
        payload.filename, payload.assigned_clients
    );
    let checklist = assign_checklist(
        app_state.sqlite_provider.as_ref(),
        NewChecklist {
            filename: payload.filename,
            content: payload.content,
            assigned_clients: payload.assigned_clients,
        },
    )
    .await?;
    Ok(wrap_response(checklist, debug_params, None))
}

/// Handler for `GET /clients/{client_id}/checklists`.
pub async fn list_checklists_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ChecklistsResponse>>, AppError> {
    let checklists = app_state
        .sqlite_provider
        .checklists_for_client(&client_id)
        .await?;
    let notice = checklists
        .is_empty()
        .then(|| NO_CHECKLISTS_NOTICE.to_string());
    let debug_info = json!({ "client_id": client_id, "count": checklists.len() });
    Ok(wrap_response(
        ChecklistsResponse { checklists, notice },
        debug_params,
        Some(debug_info),
    ))
}
