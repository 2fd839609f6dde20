use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkbot::{
    checklists::ChecklistError, ingest::IngestError, submission::SubmissionError, PromptError,
    SessionError,
};
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the completion service, storage or templates.
    Prompt(PromptError),
    /// Errors from session operations.
    Session(SessionError),
    /// Errors from knowledge document uploads.
    Ingest(IngestError),
    /// Errors from checklist administration.
    Checklist(ChecklistError),
    /// A malformed request the handler rejected itself.
    BadRequest(String),
    /// A resource the client asked for does not exist.
    NotFound(String),
    /// A rejection that already carries its status, such as a malformed upload body.
    Status(StatusCode, String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Prompt(e) | SessionError::Submission(SubmissionError::Prompt(e)) => {
                AppError::Prompt(e)
            }
            other => AppError::Session(other),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Storage(e) => AppError::Prompt(e),
            IngestError::Internal(e) => AppError::Internal(e),
            other => AppError::Ingest(other),
        }
    }
}

impl From<ChecklistError> for AppError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::Storage(e) => AppError::Prompt(e),
            other => AppError::Checklist(other),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

fn prompt_error_response(err: PromptError) -> (StatusCode, String) {
    error!("PromptError: {:?}", err);
    match err {
        PromptError::AiRequest(e) => (
            StatusCode::BAD_GATEWAY,
            format!("Request to AI provider failed: {e}"),
        ),
        PromptError::AiDeserialization(e) => (
            StatusCode::BAD_GATEWAY,
            format!("Failed to deserialize AI provider response: {e}"),
        ),
        PromptError::AiApi(e) => (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}")),
        PromptError::EmptyCompletion => (
            StatusCode::BAD_GATEWAY,
            "AI provider returned an empty response.".to_string(),
        ),
        PromptError::MissingAiProvider(_) | PromptError::MissingTemplateSlot(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server is not configured correctly.".to_string(),
        ),
        PromptError::StorageConnection(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Storage provider connection error: {e}"),
        ),
        PromptError::StorageOperationFailed(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Storage operation failed: {e}"),
        ),
        PromptError::UniqueViolation(e) => (StatusCode::CONFLICT, format!("Record already exists: {e}")),
        PromptError::ReqwestClientBuild(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to build HTTP client: {e}"),
        ),
    }
}

fn session_error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::EmptyClientId | SessionError::EmptyMessage => StatusCode::BAD_REQUEST,
        SessionError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::ChecklistNotAssigned(_) => StatusCode::NOT_FOUND,
        SessionError::NoChecklistSelected | SessionError::NoPendingUserMessage => {
            StatusCode::CONFLICT
        }
        SessionError::Submission(SubmissionError::MalformedResponse(_)) => {
            StatusCode::BAD_GATEWAY
        }
        SessionError::Prompt(_) | SessionError::Submission(SubmissionError::Prompt(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn ingest_error_status(err: &IngestError) -> StatusCode {
    match err {
        IngestError::EmptyClientId | IngestError::EmptyFilename => StatusCode::BAD_REQUEST,
        IngestError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        IngestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        IngestError::DuplicateFilename { .. } => StatusCode::CONFLICT,
        IngestError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IngestError::Storage(_) | IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Prompt(err) => prompt_error_response(err),
            AppError::Session(err) => {
                warn!("SessionError: {:?}", err);
                (session_error_status(&err), err.to_string())
            }
            AppError::Ingest(err) => {
                warn!("IngestError: {:?}", err);
                (ingest_error_status(&err), err.to_string())
            }
            AppError::Checklist(err) => {
                warn!("ChecklistError: {:?}", err);
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Status(status, msg) => (status, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
