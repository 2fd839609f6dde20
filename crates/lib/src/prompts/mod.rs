//! # Prompt Template Modules
//!
//! This module organizes the prompt templates sent to the completion service.
//! `core` holds the slot-rendering machinery and the history/document
//! formatting helpers; `tasks` holds the default text for every task.

pub mod core;
pub mod tasks;

pub use self::core::{format_documents, format_history, PromptTemplate, TemplateSlots};
