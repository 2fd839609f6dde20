use crate::{
    errors::PromptError,
    types::{Checklist, KnowledgeDocument, NewChecklist, NewSubmission, Submission},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for the persistent store behind the assistant.
///
/// Every write is a single insert; nothing is ever updated or deleted.
#[async_trait]
pub trait ChecklistStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Stores a checklist and its client assignments.
    async fn insert_checklist(&self, checklist: NewChecklist) -> Result<Checklist, PromptError>;

    /// Checklists assigned to `client_id`, newest upload first.
    async fn checklists_for_client(&self, client_id: &str)
        -> Result<Vec<Checklist>, PromptError>;

    /// The newest checklist named `filename` among those assigned to `client_id`.
    async fn checklist_for_client(
        &self,
        client_id: &str,
        filename: &str,
    ) -> Result<Option<Checklist>, PromptError> {
        Ok(self
            .checklists_for_client(client_id)
            .await?
            .into_iter()
            .find(|c| c.filename == filename))
    }

    /// Whether `client_id` already has a knowledge document named `filename`.
    async fn knowledge_document_exists(
        &self,
        client_id: &str,
        filename: &str,
    ) -> Result<bool, PromptError>;

    async fn insert_knowledge_document(&self, document: &KnowledgeDocument)
        -> Result<(), PromptError>;

    /// Knowledge documents of `client_id` in upload order.
    async fn knowledge_documents_for_client(
        &self,
        client_id: &str,
    ) -> Result<Vec<KnowledgeDocument>, PromptError>;

    async fn insert_submission(&self, submission: NewSubmission)
        -> Result<Submission, PromptError>;

    /// Submissions of `client_id`, oldest first.
    async fn submissions_for_client(&self, client_id: &str)
        -> Result<Vec<Submission>, PromptError>;
}

dyn_clone::clone_trait_object!(ChecklistStore);
