//! # Knowledge Document Upload

use super::{
    docx::extract_text_from_docx,
    pdf::extract_text_from_pdf,
    text::decode_text,
    traits::{extension_of, DocumentKind, IngestError},
};
use crate::{
    constants::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES},
    errors::PromptError,
    providers::db::storage::ChecklistStore,
    types::KnowledgeDocument,
};
use tracing::{info, instrument, warn};

/// Which uploads are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Checks the declared extension and the size of an upload.
    pub fn check(&self, filename: &str, size: usize) -> Result<DocumentKind, IngestError> {
        let allowed = extension_of(filename).is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&ext))
        });
        if !allowed {
            return Err(IngestError::UnsupportedFileType {
                filename: filename.to_string(),
                allowed: self.allowed_extensions.clone(),
            });
        }
        if size > self.max_bytes {
            return Err(IngestError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(DocumentKind::from_filename(filename))
    }
}

/// Extracts the text content of a document of the given kind.
pub async fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, IngestError> {
    match kind {
        DocumentKind::Pdf => extract_text_from_pdf(data).await,
        DocumentKind::Docx => extract_text_from_docx(data),
        DocumentKind::PlainText => decode_text(data),
    }
}

/// Stores an uploaded file as a knowledge document of `client_id`.
///
/// A filename that already exists for the client is rejected before any
/// extraction happens, leaving storage untouched.
#[instrument(skip(store, policy, data), fields(size = data.len()))]
pub async fn upload_knowledge_document(
    store: &dyn ChecklistStore,
    policy: &UploadPolicy,
    client_id: &str,
    filename: &str,
    data: &[u8],
) -> Result<KnowledgeDocument, IngestError> {
    let client_id = client_id.trim();
    if client_id.is_empty() {
        return Err(IngestError::EmptyClientId);
    }
    if filename.trim().is_empty() {
        return Err(IngestError::EmptyFilename);
    }

    let kind = policy.check(filename, data.len())?;

    if store.knowledge_document_exists(client_id, filename).await? {
        warn!("Rejected duplicate knowledge document '{filename}' for client '{client_id}'.");
        return Err(IngestError::DuplicateFilename {
            client_id: client_id.to_string(),
            filename: filename.to_string(),
        });
    }

    let content = extract_text(kind, data).await?;

    let document = KnowledgeDocument {
        client_id: client_id.to_string(),
        filename: filename.to_string(),
        content,
    };
    // A concurrent upload of the same name can pass the check above; the
    // unique index rejects the later insert.
    store
        .insert_knowledge_document(&document)
        .await
        .map_err(|e| match e {
            PromptError::UniqueViolation(_) => {
                warn!("Rejected duplicate knowledge document '{filename}' for client '{client_id}' on insert.");
                IngestError::DuplicateFilename {
                    client_id: client_id.to_string(),
                    filename: filename.to_string(),
                }
            }
            other => IngestError::Storage(other),
        })?;

    info!(
        "Stored {:?} knowledge document '{}' for client '{}' ({} characters).",
        kind,
        filename,
        client_id,
        document.content.chars().count()
    );
    Ok(document)
}
