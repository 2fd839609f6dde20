//! # Submission Reports
//!
//! The finalize step asks the model for a report of the form
//!
//! ```text
//! Checklist:
//! Item 1: <item text>
//! Answer 1: <answer>
//! ...
//! Comments:
//! <free text>
//! ```
//!
//! [`FilledChecklist::parse`] reads that structure back so a report can be
//! checked before it is persisted. How strictly is decided by
//! [`SubmissionValidation`].

use crate::errors::PromptError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while producing a submission.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("The report does not follow the requested checklist format: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// How a finalize response is checked before it is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionValidation {
    /// Persist whatever the model returned; log when it does not parse.
    #[default]
    Lenient,
    /// Refuse to persist a report without items or without comments.
    Strict,
}

/// One transcribed checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistAnswer {
    pub item: String,
    pub answer: String,
}

/// The structured reading of a finalize response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilledChecklist {
    pub items: Vec<ChecklistAnswer>,
    pub comments: Option<String>,
}

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(item|answer)\s*(\d+)\s*:\s*(.*)$").expect("item regex is valid")
    })
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(checklist|comments)\s*:\s*(.*)$").expect("heading regex is valid"))
}

/// Strips markdown emphasis and list markers a model tends to add.
fn clean_line(line: &str) -> String {
    line.replace("**", "")
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '#' | '>') || c.is_whitespace())
        .trim_end()
        .to_string()
}

impl FilledChecklist {
    /// Parses a report. Unknown lines outside the comments section are ignored;
    /// lines following an `Item`/`Answer` line without a label continue it.
    pub fn parse(text: &str) -> Self {
        enum Section {
            Preamble,
            Items,
            Comments,
        }
        #[derive(PartialEq)]
        enum Last {
            None,
            Item,
            Answer,
        }

        let mut section = Section::Preamble;
        let mut last = Last::None;
        let mut items: Vec<(String, String, String)> = Vec::new();
        let mut comments: Vec<String> = Vec::new();
        let mut saw_comments = false;

        for raw in text.lines() {
            if raw.trim() == "***" {
                continue;
            }
            let line = clean_line(raw);
            if line.is_empty() && !matches!(section, Section::Comments) {
                continue;
            }

            if let Some(caps) = heading_regex().captures(&line) {
                match caps[1].to_ascii_lowercase().as_str() {
                    "checklist" => section = Section::Items,
                    _ => {
                        section = Section::Comments;
                        saw_comments = true;
                        let rest = caps[2].trim();
                        if !rest.is_empty() {
                            comments.push(rest.to_string());
                        }
                    }
                }
                last = Last::None;
                continue;
            }

            match section {
                Section::Comments => comments.push(raw.trim_end().to_string()),
                Section::Preamble | Section::Items => {
                    if let Some(caps) = item_regex().captures(&line) {
                        let number = caps[2].to_string();
                        let value = caps[3].trim().to_string();
                        if caps[1].eq_ignore_ascii_case("item") {
                            items.push((number, value, String::new()));
                            last = Last::Item;
                        } else if let Some(entry) =
                            items.iter_mut().rev().find(|(n, _, _)| *n == number)
                        {
                            entry.2 = value;
                            last = Last::Answer;
                        } else {
                            // An answer whose item line is missing.
                            items.push((number, String::new(), value));
                            last = Last::Answer;
                        }
                        section = Section::Items;
                    } else if let Some(entry) = items.last_mut() {
                        let target = match last {
                            Last::Item => &mut entry.1,
                            Last::Answer => &mut entry.2,
                            Last::None => continue,
                        };
                        if !target.is_empty() {
                            target.push('\n');
                        }
                        target.push_str(&line);
                    }
                }
            }
        }

        let comments = comments.join("\n").trim().to_string();

        FilledChecklist {
            items: items
                .into_iter()
                .map(|(_, item, answer)| ChecklistAnswer { item, answer })
                .collect(),
            comments: (saw_comments && !comments.is_empty()).then_some(comments),
        }
    }

    /// Whether the report carries everything the format asks for.
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.comments.is_some()
    }

    /// Describes what is missing, for error messages and logs.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.items.is_empty() {
            missing.push("no 'Item N:/Answer N:' pairs");
        }
        if self.comments.is_none() {
            missing.push("no 'Comments:' section");
        }
        missing
    }
}
