//! Domain records shared by the session, storage and server layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the in-memory conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A checklist assigned to one or more clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: String,
    pub filename: String,
    pub content: String,
    pub assigned_clients: Vec<String>,
    pub upload_date: DateTime<Utc>,
}

/// Input for assigning a new checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub filename: String,
    pub content: String,
    pub assigned_clients: Vec<String>,
}

/// Supporting text uploaded by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub client_id: String,
    pub filename: String,
    pub content: String,
}

/// Input for recording a finalized checklist.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub client_id: String,
    pub checklist_filename: String,
    pub submission: String,
    pub current_date: DateTime<Utc>,
}

/// A persisted, immutable submission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub client_id: String,
    pub checklist_filename: String,
    pub submission: String,
    pub current_date: DateTime<Utc>,
}
