//! # Default Task Prompts
//!
//! This module contains the default prompt templates for the two completion
//! tasks. They are loaded programmatically and can be overridden by `config.yml`
//! or `prompt.yml` in the server.

use crate::constants::{CHAT_TURN_TASK, SUBMISSION_TASK};

/// Bumped whenever the wording or the slots of a default template change.
pub const PROMPT_TEMPLATE_VERSION: &str = "2";

/// Slots filled when rendering a conversational turn.
pub const CHAT_TURN_SLOTS: &[&str] = &["checklist", "documents", "history", "latest_message"];

/// Slots filled when rendering the submission report.
pub const SUBMISSION_SLOTS: &[&str] = &["checklist", "history"];

/// The slots the session fills for a known task.
pub fn known_slots(task: &str) -> Option<&'static [&'static str]> {
    match task {
        CHAT_TURN_TASK => Some(CHAT_TURN_SLOTS),
        SUBMISSION_TASK => Some(SUBMISSION_SLOTS),
        _ => None,
    }
}

// --- Chat Turn ---

/// Persona for the conversational turn.
pub const CHAT_TURN_SYSTEM_PROMPT: &str =
    r#"You are a polite and helpful data entry assistant."#;

/// Payload for a conversational turn.
///
/// Placeholders: `{checklist}`, `{documents}`, `{history}`, `{latest_message}`
pub const CHAT_TURN_USER_PROMPT: &str = r#"You are having a conversation with a client who must fill out a checklist for a task.
You help the client fill out the checklist.
You are given the checklist, the conversation history and the client's latest message.
The client may also have uploaded documents that are useful for filling out the checklist. If so, they are given to you below.
These documents may or may not be sufficient to fill out the checklist, but more detail is always welcome regardless of the documents.
Answer the client so that the conversation leads to the checklist being filled out.
Your answer must be consistent with the conversation history and the checklist.
###
Checklist:
{checklist}

Supporting documents:
{documents}

Conversation history:
{history}

Client's latest message:
{latest_message}
###
Your answer must be a statement, instruction, comment or remark followed by a question, or just a question, that moves the conversation forward.
Also explain why the question matters and how much of the checklist is filled out, as a percentage.
Reply only with the answer to the client; do not add any other information."#;

// --- Submission ---

/// Persona for the final report.
pub const SUBMISSION_SYSTEM_PROMPT: &str = r#"You are a survey analyst and reporter."#;

/// Payload for the final filled-checklist report.
///
/// Placeholders: `{checklist}`, `{history}`
pub const SUBMISSION_USER_PROMPT: &str = r#"You are given a checklist and a conversation between an agent and the client who had to fill out the checklist.
Use the conversation history and the checklist to fill out the checklist.
Be precise when filling out the checklist.
Do not fill out the checklist with information that is not present in the conversation history.
Return a text answer with the filled-out checklist.
Keep the text of every checklist item the same as in the original checklist.
Also return comments about the client's conversation with regard to the experience of filling it out.
###
Checklist:
{checklist}

Conversation history:
{history}
###

Your answer must use exactly the following format:
***
Checklist:
Item 1: <item text>
Answer 1: <answer>
Item 2: <item text>
Answer 2: <answer>
... and so on

Comments:
<your comments here>
***"#;
