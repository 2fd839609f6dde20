//! # Prompt Template Rendering
//!
//! A [`PromptTemplate`] pairs a system prompt with a user prompt containing
//! `{slot}` placeholders. Rendering substitutes every supplied slot and refuses
//! to send a prompt that still references a slot nobody filled.

use crate::{
    errors::PromptError,
    prompts::tasks::{
        CHAT_TURN_SYSTEM_PROMPT, CHAT_TURN_USER_PROMPT, PROMPT_TEMPLATE_VERSION,
        SUBMISSION_SYSTEM_PROMPT, SUBMISSION_USER_PROMPT,
    },
    types::{KnowledgeDocument, Message},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Rendered when a client has no knowledge documents.
pub const NO_DOCUMENTS_MARKER: &str = "(no supporting documents)";

/// Rendered when the conversation has not started yet.
pub const EMPTY_HISTORY_MARKER: &str = "(no previous messages)";

/// Named values substituted into a template, in insertion order.
pub type TemplateSlots<'a> = [(&'a str, &'a str)];

/// A versioned pair of system and user prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub version: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// The rendered form of a template, ready for `AiProvider::generate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

fn slot_regex() -> &'static Regex {
    static SLOT_RE: OnceLock<Regex> = OnceLock::new();
    SLOT_RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("slot regex is valid"))
}

impl PromptTemplate {
    pub fn new(
        version: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// The default template for a conversational turn.
    pub fn chat_turn() -> Self {
        Self::new(
            PROMPT_TEMPLATE_VERSION,
            CHAT_TURN_SYSTEM_PROMPT,
            CHAT_TURN_USER_PROMPT,
        )
    }

    /// The default template for the final submission report.
    pub fn submission() -> Self {
        Self::new(
            PROMPT_TEMPLATE_VERSION,
            SUBMISSION_SYSTEM_PROMPT,
            SUBMISSION_USER_PROMPT,
        )
    }

    /// Substitutes `slots` into both prompts in a single pass.
    ///
    /// Values are inserted verbatim, so a value that itself contains `{...}`
    /// (a checklist with braces, say) is never re-expanded. A placeholder that
    /// has no matching slot fails with [`PromptError::MissingTemplateSlot`].
    pub fn render(&self, slots: &TemplateSlots<'_>) -> Result<RenderedPrompt, PromptError> {
        Ok(RenderedPrompt {
            system_prompt: render_str(&self.system_prompt, slots)?,
            user_prompt: render_str(&self.user_prompt, slots)?,
        })
    }

    /// Fails if either prompt references a placeholder outside `slot_names`.
    pub fn check_slots(&self, slot_names: &[&str]) -> Result<(), PromptError> {
        let slots: Vec<(&str, &str)> = slot_names.iter().map(|name| (*name, "")).collect();
        self.render(&slots).map(|_| ())
    }
}

fn render_str(template: &str, slots: &TemplateSlots<'_>) -> Result<String, PromptError> {
    let re = slot_regex();
    if let Some(missing) = re.captures_iter(template).find_map(|caps| {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        (!slots.iter().any(|(slot, _)| *slot == name)).then(|| name.to_string())
    }) {
        return Err(PromptError::MissingTemplateSlot(missing));
    }

    Ok(re
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            slots
                .iter()
                .find(|(slot, _)| *slot == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .into_owned())
}

/// Renders the knowledge-document corpus for a prompt.
pub fn format_documents(documents: &[KnowledgeDocument]) -> String {
    if documents.is_empty() {
        return NO_DOCUMENTS_MARKER.to_string();
    }
    documents
        .iter()
        .map(|doc| format!("### {}\n{}", doc.filename, doc.content.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders the conversation history, one `role: content` block per message.
pub fn format_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return EMPTY_HISTORY_MARKER.to_string();
    }
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
