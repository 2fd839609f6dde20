use crate::{
    errors::PromptError,
    providers::db::storage::ChecklistStore,
    types::{Checklist, KnowledgeDocument, NewChecklist, NewSubmission, Submission},
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{params, Connection, Database, Value as TursoValue};
use uuid::Uuid;

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, so an in-memory
/// database can be shared between the server state and a test harness.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path, or `":memory:"` for an
    /// isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        // PRAGMA returns a row, so it goes through `query`.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures that all tables and indexes exist. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), PromptError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        info!("SQLite schema initialized.");
        Ok(())
    }

    fn connect(&self) -> Result<Connection, PromptError> {
        self.db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))
    }

    async fn assigned_clients(
        &self,
        conn: &Connection,
        checklist_id: &str,
    ) -> Result<Vec<String>, PromptError> {
        let mut rows = conn
            .query(sql::SELECT_ASSIGNED_CLIENTS, params![checklist_id])
            .await?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next().await? {
            clients.push(text_value(row.get_value(0)?));
        }
        Ok(clients)
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, PromptError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PromptError::StorageOperationFailed(format!("Invalid timestamp '{raw}': {e}")))
}

fn is_unique_violation(message: &str) -> bool {
    message.to_ascii_uppercase().contains("UNIQUE CONSTRAINT")
}

fn text_value(value: TursoValue) -> String {
    match value {
        TursoValue::Text(s) => s,
        TursoValue::Integer(i) => i.to_string(),
        TursoValue::Real(f) => f.to_string(),
        TursoValue::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
        TursoValue::Null => String::new(),
    }
}

#[async_trait]
impl ChecklistStore for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn insert_checklist(&self, checklist: NewChecklist) -> Result<Checklist, PromptError> {
        let mut conn = self.connect()?;
        let id = Uuid::new_v4().to_string();
        let stamp = format_timestamp(&Utc::now());
        let upload_date = parse_timestamp(&stamp)?;

        // The checklist and its assignments are stored together or not at all.
        let tx = conn.transaction().await?;
        tx.execute(
            sql::INSERT_CHECKLIST,
            params![
                id.as_str(),
                checklist.filename.as_str(),
                checklist.content.as_str(),
                stamp
            ],
        )
        .await?;

        let mut assigned_clients: Vec<String> = Vec::with_capacity(checklist.assigned_clients.len());
        for client_id in &checklist.assigned_clients {
            // A set: repeated ids in the request are stored once.
            if assigned_clients.contains(client_id) {
                continue;
            }
            tx.execute(
                sql::INSERT_CHECKLIST_ASSIGNMENT,
                params![id.as_str(), client_id.as_str()],
            )
            .await?;
            assigned_clients.push(client_id.clone());
        }
        tx.commit().await?;

        info!(checklist_id = %id, filename = %checklist.filename, clients = ?assigned_clients, "Stored checklist.");

        Ok(Checklist {
            id,
            filename: checklist.filename,
            content: checklist.content,
            assigned_clients,
            upload_date,
        })
    }

    async fn checklists_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<Checklist>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_CHECKLISTS_FOR_CLIENT, params![client_id])
            .await?;

        let mut checklists = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = text_value(row.get_value(0)?);
            let filename = text_value(row.get_value(1)?);
            let content = text_value(row.get_value(2)?);
            let upload_date = parse_timestamp(&text_value(row.get_value(3)?))?;
            checklists.push(Checklist {
                id,
                filename,
                content,
                assigned_clients: Vec::new(),
                upload_date,
            });
        }
        drop(rows);
        for checklist in &mut checklists {
            checklist.assigned_clients = self.assigned_clients(&conn, &checklist.id).await?;
        }

        debug!(client_id = %client_id, count = checklists.len(), "Fetched assigned checklists.");
        Ok(checklists)
    }

    async fn knowledge_document_exists(
        &self,
        client_id: &str,
        filename: &str,
    ) -> Result<bool, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_KNOWLEDGE_EXISTS, params![client_id, filename])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    async fn insert_knowledge_document(
        &self,
        document: &KnowledgeDocument,
    ) -> Result<(), PromptError> {
        let conn = self.connect()?;
        conn.execute(
            sql::INSERT_KNOWLEDGE_DOCUMENT,
            params![
                document.client_id.as_str(),
                document.filename.as_str(),
                document.content.as_str()
            ],
        )
        .await
        .map_err(|e| {
            let message = e.to_string();
            if is_unique_violation(&message) {
                PromptError::UniqueViolation(message)
            } else {
                PromptError::StorageOperationFailed(message)
            }
        })?;
        Ok(())
    }

    async fn knowledge_documents_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<KnowledgeDocument>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_KNOWLEDGE_FOR_CLIENT, params![client_id])
            .await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(KnowledgeDocument {
                client_id: text_value(row.get_value(0)?),
                filename: text_value(row.get_value(1)?),
                content: text_value(row.get_value(2)?),
            });
        }
        Ok(documents)
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission, PromptError> {
        let conn = self.connect()?;
        let id = Uuid::new_v4().to_string();
        let stamp = format_timestamp(&submission.current_date);
        let current_date = parse_timestamp(&stamp)?;
        conn.execute(
            sql::INSERT_SUBMISSION,
            params![
                id.as_str(),
                submission.client_id.as_str(),
                submission.checklist_filename.as_str(),
                submission.submission.as_str(),
                stamp
            ],
        )
        .await?;

        info!(submission_id = %id, client_id = %submission.client_id, "Stored submission.");

        Ok(Submission {
            id,
            client_id: submission.client_id,
            checklist_filename: submission.checklist_filename,
            submission: submission.submission,
            current_date,
        })
    }

    async fn submissions_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<Submission>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::SELECT_SUBMISSIONS_FOR_CLIENT, params![client_id])
            .await?;
        let mut submissions = Vec::new();
        while let Some(row) = rows.next().await? {
            submissions.push(Submission {
                id: text_value(row.get_value(0)?),
                client_id: text_value(row.get_value(1)?),
                checklist_filename: text_value(row.get_value(2)?),
                submission: text_value(row.get_value(3)?),
                current_date: parse_timestamp(&text_value(row.get_value(4)?))?,
            });
        }
        Ok(submissions)
    }
}
