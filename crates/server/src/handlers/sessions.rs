//! # Session Handlers
//!
//! The conversational flow: create a session, select a checklist, exchange
//! messages, and finalize the filled checklist into a submission.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::SessionView;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use checkbot::{
    constants::{CHAT_TURN_TASK, NO_CHECKLISTS_NOTICE, SUBMISSION_TASK},
    providers::db::storage::ChecklistStore,
    Message, Submission,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub client_id: String,
}

#[derive(Deserialize)]
pub struct SelectChecklistRequest {
    pub filename: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub reply: Message,
    pub history_len: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DestroySessionResponse {
    pub destroyed: bool,
}

/// Handler for `POST /sessions`. Replaces any existing session of the client.
pub async fn create_session_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let handle = app_state.sessions.create(&payload.client_id).await?;
    let session = handle.lock().await;
    Ok(wrap_response(SessionView::from(&*session), debug_params, None))
}

/// Handler for `GET /sessions/{client_id}`.
pub async fn get_session_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let handle = app_state.sessions.get(&client_id).await?;
    let session = handle.lock().await;
    Ok(wrap_response(SessionView::from(&*session), debug_params, None))
}

/// Handler for `DELETE /sessions/{client_id}`.
pub async fn destroy_session_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<DestroySessionResponse>>, AppError> {
    if !app_state.sessions.destroy(&client_id).await {
        return Err(AppError::NotFound(format!(
            "No active session for client '{client_id}'"
        )));
    }
    Ok(wrap_response(
        DestroySessionResponse { destroyed: true },
        debug_params,
        None,
    ))
}

/// Handler for `PUT /sessions/{client_id}/checklist`.
///
/// The checklist is looked up among those assigned to the session's client.
pub async fn select_checklist_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<SelectChecklistRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let handle = app_state.sessions.get(&client_id).await?;
    let mut session = handle.lock().await;

    let store = app_state.sqlite_provider.as_ref();
    let Some(checklist) = store
        .checklist_for_client(session.client_id(), &payload.filename)
        .await?
    else {
        if store.checklists_for_client(session.client_id()).await?.is_empty() {
            return Err(AppError::NotFound(NO_CHECKLISTS_NOTICE.to_string()));
        }
        return Err(AppError::NotFound(format!(
            "Checklist '{}' is not assigned to client '{client_id}'",
            payload.filename
        )));
    };

    session.select_checklist(checklist)?;
    Ok(wrap_response(SessionView::from(&*session), debug_params, None))
}

/// Handler for `POST /sessions/{client_id}/messages`.
///
/// The client's knowledge documents are read fresh for every turn, so a
/// document uploaded mid-conversation is used from the next message on.
pub async fn send_message_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<SendMessageResponse>>, AppError> {
    let handle = app_state.sessions.get(&client_id).await?;
    let mut session = handle.lock().await;
    info!("Client '{}' sent a message", client_id);

    let (task, provider) = app_state.task(CHAT_TURN_TASK)?;
    let documents = app_state
        .sqlite_provider
        .knowledge_documents_for_client(session.client_id())
        .await?;

    let reply = session
        .send(provider, &task.template, &documents, &payload.text)
        .await?;

    let debug_info = json!({
        "template_version": task.template.version,
        "provider": task.provider,
        "documents": documents.iter().map(|d| d.filename.as_str()).collect::<Vec<_>>(),
    });
    Ok(wrap_response(
        SendMessageResponse {
            reply,
            history_len: session.messages().len(),
        },
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `POST /sessions/{client_id}/submit`.
pub async fn submit_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Submission>>, AppError> {
    let handle = app_state.sessions.get(&client_id).await?;
    let session = handle.lock().await;
    info!("Client '{}' requested submission", client_id);

    let (task, provider) = app_state.task(SUBMISSION_TASK)?;
    let submission = session
        .finalize_submission(
            provider,
            &task.template,
            app_state.sqlite_provider.as_ref(),
            app_state.submission_validation,
        )
        .await?;

    let debug_info = json!({
        "template_version": task.template.version,
        "validation": app_state.submission_validation,
    });
    Ok(wrap_response(submission, debug_params, Some(debug_info)))
}
