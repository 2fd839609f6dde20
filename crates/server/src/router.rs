use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Room for the multipart framing around an uploaded file, so an oversize
/// file reaches the upload policy and is reported as such.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.upload_policy.max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/checklists", post(handlers::assign_checklist_handler))
        .route(
            "/clients/{client_id}/checklists",
            get(handlers::list_checklists_handler),
        )
        .route(
            "/clients/{client_id}/documents",
            post(handlers::upload_document_handler)
                .layer(DefaultBodyLimit::max(upload_limit))
                .get(handlers::list_documents_handler),
        )
        .route(
            "/clients/{client_id}/submissions",
            get(handlers::list_submissions_handler),
        )
        .route("/sessions", post(handlers::create_session_handler))
        .route(
            "/sessions/{client_id}",
            get(handlers::get_session_handler).delete(handlers::destroy_session_handler),
        )
        .route(
            "/sessions/{client_id}/checklist",
            put(handlers::select_checklist_handler),
        )
        .route(
            "/sessions/{client_id}/messages",
            post(handlers::send_message_handler),
        )
        .route("/sessions/{client_id}/submit", post(handlers::submit_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
