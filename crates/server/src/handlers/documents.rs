//! # Knowledge Document Handlers
//!
//! Clients upload supporting documents as multipart `file` parts; the text is
//! extracted and stored under their client ID.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use checkbot::{
    constants::NO_DOCUMENTS_NOTICE, ingest::upload_knowledge_document,
    providers::db::storage::ChecklistStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Serialize, Deserialize)]
pub struct UploadDocumentResponse {
    pub message: String,
    pub filename: String,
    pub characters: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub characters: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Handler for `POST /clients/{client_id}/documents`.
pub async fn upload_document_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadDocumentResponse>>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?.to_vec();
        info!(
            "Client '{}' uploaded file '{}' ({} bytes)",
            client_id,
            filename,
            data.len()
        );
        upload = Some((filename, data));
    }

    let (filename, data) = upload
        .ok_or_else(|| AppError::BadRequest("Missing multipart field 'file'".to_string()))?;

    let document = upload_knowledge_document(
        app_state.sqlite_provider.as_ref(),
        &app_state.upload_policy,
        &client_id,
        &filename,
        &data,
    )
    .await?;

    let debug_info = json!({ "bytes": data.len(), "policy": {
        "allowed_extensions": app_state.upload_policy.allowed_extensions,
        "max_bytes": app_state.upload_policy.max_bytes,
    }});
    Ok(wrap_response(
        UploadDocumentResponse {
            message: format!("File '{}' uploaded successfully.", document.filename),
            characters: document.content.chars().count(),
            filename: document.filename,
        },
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `GET /clients/{client_id}/documents`.
pub async fn list_documents_handler(
    State(app_state): State<AppState>,
    Path(client_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<DocumentsResponse>>, AppError> {
    let documents: Vec<DocumentSummary> = app_state
        .sqlite_provider
        .knowledge_documents_for_client(&client_id)
        .await?
        .into_iter()
        .map(|doc| DocumentSummary {
            characters: doc.content.chars().count(),
            filename: doc.filename,
        })
        .collect();
    let notice = documents
        .is_empty()
        .then(|| NO_DOCUMENTS_NOTICE.to_string());
    Ok(wrap_response(
        DocumentsResponse { documents, notice },
        debug_params,
        None,
    ))
}

fn multipart_error(err: axum_extra::extract::multipart::MultipartError) -> AppError {
    AppError::Status(err.status(), err.body_text())
}
