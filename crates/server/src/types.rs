use chrono::{DateTime, Utc};
use checkbot::{session::SessionState, ConversationSession, Message};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

/// The client-facing view of a conversation session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub client_id: String,
    pub state: SessionState,
    /// Filename of the selected checklist, if any.
    pub checklist: Option<String>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationSession> for SessionView {
    fn from(session: &ConversationSession) -> Self {
        Self {
            client_id: session.client_id().to_string(),
            state: session.state(),
            checklist: session.checklist().map(|c| c.filename.clone()),
            messages: session.messages().to_vec(),
            created_at: session.created_at(),
        }
    }
}
