//! # Shared Constants
//!
//! Values shared between the library and the server, kept here to avoid
//! magic strings drifting apart.

/// The default path for the application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/checkbot.db";

/// File extensions accepted for knowledge-document uploads by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

/// Upper bound for a single uploaded knowledge document.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Task name for a conversational turn.
pub const CHAT_TURN_TASK: &str = "chat_turn";

/// Task name for the final submission report.
pub const SUBMISSION_TASK: &str = "submission";

/// Shown to a client that has no checklist assigned.
pub const NO_CHECKLISTS_NOTICE: &str = "No checklists assigned to this client ID.";

/// Shown to a client that has not uploaded any knowledge documents.
pub const NO_DOCUMENTS_NOTICE: &str = "No knowledge documents uploaded for this client ID.";
