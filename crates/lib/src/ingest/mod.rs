//! # Knowledge Document Ingestion
//!
//! This module turns an uploaded file into a knowledge-document record: the
//! file type is derived from its extension, checked against the upload
//! policy, its text is extracted, and the result is stored for the client.

pub mod docx;
pub mod pdf;
pub mod text;
pub mod traits;
pub mod upload;

pub use traits::{DocumentKind, IngestError};
pub use upload::{extract_text, upload_knowledge_document, UploadPolicy};
