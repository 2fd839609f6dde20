//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the SQLite provider, keeping
//! database-specific syntax out of the provider logic.

pub const CREATE_CHECKLIST_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS checklist (
        id TEXT PRIMARY KEY,
        filename TEXT NOT NULL,
        content TEXT NOT NULL,
        upload_date TEXT NOT NULL
    );";

pub const CREATE_CHECKLIST_ASSIGNMENT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS checklist_assignment (
        checklist_id TEXT NOT NULL,
        client_id TEXT NOT NULL
    );";

pub const CREATE_CHECKLIST_ASSIGNMENT_INDEX: &str = "
    CREATE INDEX IF NOT EXISTS idx_checklist_assignment_client
    ON checklist_assignment (client_id);";

pub const CREATE_CLIENT_KNOWLEDGE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS client_knowledge (
        client_id TEXT NOT NULL,
        filename TEXT NOT NULL,
        content TEXT NOT NULL
    );";

pub const CREATE_CLIENT_KNOWLEDGE_INDEX: &str = "
    CREATE UNIQUE INDEX IF NOT EXISTS idx_client_knowledge_client_filename
    ON client_knowledge (client_id, filename);";

pub const CREATE_CLIENT_SUBMISSIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS client_submissions (
        id TEXT PRIMARY KEY,
        client_id TEXT NOT NULL,
        checklist_filename TEXT NOT NULL,
        submission TEXT NOT NULL,
        "current_date" TEXT NOT NULL
    );"#;

/// Every statement needed for a fresh database, in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_CHECKLIST_TABLE,
    CREATE_CHECKLIST_ASSIGNMENT_TABLE,
    CREATE_CHECKLIST_ASSIGNMENT_INDEX,
    CREATE_CLIENT_KNOWLEDGE_TABLE,
    CREATE_CLIENT_KNOWLEDGE_INDEX,
    CREATE_CLIENT_SUBMISSIONS_TABLE,
];

pub const INSERT_CHECKLIST: &str =
    "INSERT INTO checklist (id, filename, content, upload_date) VALUES (?, ?, ?, ?)";

pub const INSERT_CHECKLIST_ASSIGNMENT: &str =
    "INSERT INTO checklist_assignment (checklist_id, client_id) VALUES (?, ?)";

/// Checklists for one client (`?1`), newest first. RFC 3339 timestamps in UTC
/// sort lexicographically.
pub const SELECT_CHECKLISTS_FOR_CLIENT: &str = "
    SELECT c.id, c.filename, c.content, c.upload_date
    FROM checklist c
    JOIN checklist_assignment a ON a.checklist_id = c.id
    WHERE a.client_id = ?1
    ORDER BY c.upload_date DESC, c.rowid DESC";

pub const SELECT_ASSIGNED_CLIENTS: &str =
    "SELECT client_id FROM checklist_assignment WHERE checklist_id = ?1 ORDER BY rowid";

pub const SELECT_KNOWLEDGE_EXISTS: &str =
    "SELECT 1 FROM client_knowledge WHERE client_id = ?1 AND filename = ?2 LIMIT 1";

pub const INSERT_KNOWLEDGE_DOCUMENT: &str =
    "INSERT INTO client_knowledge (client_id, filename, content) VALUES (?, ?, ?)";

pub const SELECT_KNOWLEDGE_FOR_CLIENT: &str =
    "SELECT client_id, filename, content FROM client_knowledge WHERE client_id = ?1 ORDER BY rowid";

// `current_date` is also an SQL keyword, so the column is always quoted.
pub const INSERT_SUBMISSION: &str = r#"INSERT INTO client_submissions (id, client_id, checklist_filename, submission, "current_date") VALUES (?, ?, ?, ?, ?)"#;

pub const SELECT_SUBMISSIONS_FOR_CLIENT: &str = r#"
    SELECT id, client_id, checklist_filename, submission, "current_date"
    FROM client_submissions
    WHERE client_id = ?1
    ORDER BY "current_date" ASC, rowid ASC"#;
