//! # Session Conversation State
//!
//! A [`ConversationSession`] holds the dialogue between one client and the
//! assistant about one checklist. It starts inert; once a checklist is selected
//! the client can request turns and finally produce a submission.
//!
//! Sessions live only in memory. The [`SessionRegistry`] owns them, keyed by
//! client identifier, and gives each one an explicit create/destroy lifecycle.

use crate::{
    errors::PromptError,
    prompts::{format_documents, format_history, PromptTemplate},
    providers::{ai::AiProvider, db::storage::ChecklistStore},
    submission::{FilledChecklist, SubmissionError, SubmissionValidation},
    types::{Checklist, KnowledgeDocument, Message, NewSubmission, Role, Submission},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Errors raised by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A client ID is required")]
    EmptyClientId,
    #[error("Message text must not be empty")]
    EmptyMessage,
    #[error("No checklist is selected for this session")]
    NoChecklistSelected,
    #[error("There is no pending user message to answer")]
    NoPendingUserMessage,
    #[error("Checklist '{0}' belongs to another client")]
    ChecklistNotAssigned(String),
    #[error("No active session for client '{0}'")]
    SessionNotFound(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No checklist selected; turns are refused.
    Inert,
    /// A checklist is selected; turns may be requested.
    Active,
}

/// The in-progress dialogue for a single client and checklist.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    client_id: String,
    checklist: Option<Checklist>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Creates an inert session for `client_id`.
    pub fn new(client_id: impl Into<String>) -> Result<Self, SessionError> {
        let client_id = client_id.into().trim().to_string();
        if client_id.is_empty() {
            return Err(SessionError::EmptyClientId);
        }
        Ok(Self {
            client_id,
            checklist: None,
            messages: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn checklist(&self) -> Option<&Checklist> {
        self.checklist.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        if self.checklist.is_some() {
            SessionState::Active
        } else {
            SessionState::Inert
        }
    }

    /// Selects the checklist the conversation is about.
    ///
    /// Switching to a different checklist starts a new pairing and discards the
    /// history; selecting the current one again keeps it.
    pub fn select_checklist(&mut self, checklist: Checklist) -> Result<(), SessionError> {
        if !checklist.assigned_clients.is_empty()
            && !checklist.assigned_clients.iter().any(|c| *c == self.client_id)
        {
            return Err(SessionError::ChecklistNotAssigned(checklist.filename));
        }
        let same = self
            .checklist
            .as_ref()
            .is_some_and(|current| current.id == checklist.id);
        if !same && !self.messages.is_empty() {
            info!(
                client_id = %self.client_id,
                discarded = self.messages.len(),
                "Checklist changed; discarding conversation history."
            );
            self.messages.clear();
        }
        info!(client_id = %self.client_id, checklist = %checklist.filename, "Checklist selected.");
        self.checklist = Some(checklist);
        Ok(())
    }

    /// Appends a user message. Only rejects empty input.
    pub fn append_user_message(&mut self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        self.messages.push(Message::user(text));
        Ok(())
    }

    /// Asks the completion service for the assistant's answer to the trailing
    /// user message and appends it.
    ///
    /// The payload carries the checklist, the client's knowledge documents, the
    /// history before the latest message, and the latest message itself.
    /// Completion errors propagate unchanged and nothing is appended, so the
    /// pending message can be retried.
    #[instrument(skip_all, fields(client_id = %self.client_id))]
    pub async fn request_next_turn(
        &mut self,
        provider: &dyn AiProvider,
        template: &PromptTemplate,
        documents: &[KnowledgeDocument],
    ) -> Result<Message, SessionError> {
        let checklist = self
            .checklist
            .as_ref()
            .ok_or(SessionError::NoChecklistSelected)?;
        let (latest, prior) = match self.messages.split_last() {
            Some((latest, prior)) if latest.role == Role::User => (latest, prior),
            _ => return Err(SessionError::NoPendingUserMessage),
        };

        let corpus = format_documents(documents);
        let history = format_history(prior);
        let prompt = template.render(&[
            ("checklist", checklist.content.as_str()),
            ("documents", corpus.as_str()),
            ("history", history.as_str()),
            ("latest_message", latest.content.as_str()),
        ])?;

        debug!(
            template_version = %template.version,
            user_prompt = %prompt.user_prompt,
            "--> Requesting next turn"
        );

        let reply = provider
            .generate(&prompt.system_prompt, &prompt.user_prompt)
            .await?;
        if reply.trim().is_empty() {
            return Err(PromptError::EmptyCompletion.into());
        }

        let message = Message::assistant(reply.trim());
        self.messages.push(message.clone());
        info!(history_len = self.messages.len(), "Assistant turn appended.");
        Ok(message)
    }

    /// Appends `text` as a user message and requests the assistant's reply.
    ///
    /// The exchange is all or nothing: if the reply cannot be obtained the user
    /// message is removed again, so the history keeps alternating and the
    /// client can simply send it again.
    pub async fn send(
        &mut self,
        provider: &dyn AiProvider,
        template: &PromptTemplate,
        documents: &[KnowledgeDocument],
        text: &str,
    ) -> Result<Message, SessionError> {
        if self.checklist.is_none() {
            return Err(SessionError::NoChecklistSelected);
        }
        self.append_user_message(text)?;
        match self.request_next_turn(provider, template, documents).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.messages.pop();
                warn!(client_id = %self.client_id, error = %e, "Turn failed; user message withdrawn.");
                Err(e)
            }
        }
    }

    /// Produces the filled-checklist report and persists it as one new
    /// submission record.
    #[instrument(skip_all, fields(client_id = %self.client_id))]
    pub async fn finalize_submission(
        &self,
        provider: &dyn AiProvider,
        template: &PromptTemplate,
        store: &dyn ChecklistStore,
        validation: SubmissionValidation,
    ) -> Result<Submission, SessionError> {
        let checklist = self
            .checklist
            .as_ref()
            .ok_or(SessionError::NoChecklistSelected)?;

        let history = format_history(&self.messages);
        let prompt = template.render(&[
            ("checklist", checklist.content.as_str()),
            ("history", history.as_str()),
        ])?;

        debug!(template_version = %template.version, "--> Requesting submission report");

        let report = provider
            .generate(&prompt.system_prompt, &prompt.user_prompt)
            .await?;
        if report.trim().is_empty() {
            return Err(PromptError::EmptyCompletion.into());
        }

        let parsed = FilledChecklist::parse(&report);
        if !parsed.is_complete() {
            let missing = parsed.missing_parts().join(", ");
            match validation {
                SubmissionValidation::Strict => {
                    return Err(SubmissionError::MalformedResponse(missing).into());
                }
                SubmissionValidation::Lenient => {
                    warn!("Submission report does not follow the requested format ({missing}); storing it as-is.");
                }
            }
        }

        let submission = store
            .insert_submission(NewSubmission {
                client_id: self.client_id.clone(),
                checklist_filename: checklist.filename.clone(),
                submission: report,
                current_date: Utc::now(),
            })
            .await?;

        info!(
            submission_id = %submission.id,
            items = parsed.items.len(),
            "Submission stored."
        );
        Ok(submission)
    }
}

/// A shared handle to one session. The mutex serializes interactions of a
/// client so one is fully processed before the next starts.
pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Live sessions keyed by client identifier.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh inert session, replacing any existing one for the client.
    pub async fn create(&self, client_id: &str) -> Result<SessionHandle, SessionError> {
        let session = ConversationSession::new(client_id)?;
        let key = session.client_id().to_string();
        let handle = Arc::new(Mutex::new(session));
        let replaced = self
            .sessions
            .write()
            .await
            .insert(key.clone(), handle.clone())
            .is_some();
        info!(client_id = %key, replaced, "Session created.");
        Ok(handle)
    }

    /// Returns the live session of `client_id`.
    pub async fn get(&self, client_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(client_id.trim())
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(client_id.to_string()))
    }

    /// Discards the session of `client_id`. Returns whether one existed.
    pub async fn destroy(&self, client_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(client_id.trim()).is_some();
        if removed {
            info!(client_id = %client_id, "Session destroyed.");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
