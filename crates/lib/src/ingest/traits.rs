use crate::errors::PromptError;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while accepting an uploaded knowledge document.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("A client ID is required to upload documents")]
    EmptyClientId,

    #[error("The uploaded file has no name")]
    EmptyFilename,

    #[error("File type of '{filename}' is not allowed. Allowed extensions: {}", allowed.join(", "))]
    UnsupportedFileType {
        filename: String,
        allowed: Vec<String>,
    },

    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("A file named '{filename}' already exists for this client. Please rename the file and try again.")]
    DuplicateFilename { client_id: String, filename: String },

    #[error("Failed to extract text from the document: {0}")]
    Parse(String),

    #[error("A storage operation failed during ingestion: {0}")]
    Storage(#[from] PromptError),

    #[error("An unexpected internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

/// How the text of an uploaded file is extracted, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// Anything else is decoded as raw UTF-8 text.
    PlainText,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        match extension_of(filename).as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
