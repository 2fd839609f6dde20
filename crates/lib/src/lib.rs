//! # Checklist Assistant
//!
//! This crate holds the core of the checklist assistant: the conversation state
//! for a client session, the prompt templates sent to the completion service,
//! text extraction for uploaded knowledge documents, and the storage provider
//! that keeps checklists, knowledge documents and submissions.
//!
//! Consumers (the HTTP server, tests) drive it through [`session::SessionRegistry`],
//! [`ingest::upload_knowledge_document`] and the [`providers::db::storage::ChecklistStore`]
//! trait.

pub mod checklists;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod submission;
pub mod types;

pub use errors::PromptError;
pub use session::{ConversationSession, SessionError, SessionRegistry};
pub use types::{Checklist, KnowledgeDocument, Message, NewChecklist, Role, Submission};
