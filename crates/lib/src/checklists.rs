//! # Checklist Administration
//!
//! Operators assign checklists to clients through [`assign_checklist`]; clients
//! only ever read them back through the store.

use crate::{
    errors::PromptError,
    providers::db::storage::ChecklistStore,
    types::{Checklist, NewChecklist},
};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum ChecklistError {
    #[error("A checklist needs a filename")]
    EmptyFilename,
    #[error("A checklist needs content")]
    EmptyContent,
    #[error("A checklist must be assigned to at least one client ID")]
    NoAssignedClients,
    #[error(transparent)]
    Storage(#[from] PromptError),
}

/// Validates and stores a checklist together with its client assignments.
///
/// Client ids are trimmed and blank entries dropped before the check for at
/// least one assignee.
#[instrument(skip(store, checklist), fields(filename = %checklist.filename))]
pub async fn assign_checklist(
    store: &dyn ChecklistStore,
    checklist: NewChecklist,
) -> Result<Checklist, ChecklistError> {
    let filename = checklist.filename.trim().to_string();
    if filename.is_empty() {
        return Err(ChecklistError::EmptyFilename);
    }
    if checklist.content.trim().is_empty() {
        return Err(ChecklistError::EmptyContent);
    }
    let assigned_clients: Vec<String> = checklist
        .assigned_clients
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if assigned_clients.is_empty() {
        return Err(ChecklistError::NoAssignedClients);
    }

    let stored = store
        .insert_checklist(NewChecklist {
            filename,
            content: checklist.content,
            assigned_clients,
        })
        .await?;
    info!(checklist_id = %stored.id, clients = stored.assigned_clients.len(), "Checklist assigned.");
    Ok(stored)
}
