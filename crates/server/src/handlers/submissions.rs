use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use checkbot::{providers::db::storage::ChecklistStore, Submission};

/// Handler for `GET /clients/{client_id}/submissions`, oldest first.
pub async fn list_submissions_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Vec<Submission>>>, AppError> {
    let submissions = app_state
        .sqlite_provider
        .submissions_for_client(&client_id)
        .await?;
    Ok(wrap_response(submissions, debug_params, None))
}
