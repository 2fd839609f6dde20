//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds all shared resources, such
//! as the store, the instantiated AI provider clients and the
//! live conversation sessions, making them accessible to all request handlers.

use crate::config::AppConfig;
use anyhow::anyhow;
use checkbot::{
    ingest::UploadPolicy,
    prompts::{tasks::known_slots, PromptTemplate},
    providers::{
        ai::AiProvider,
        db::{sqlite::SqliteProvider, storage::ChecklistStore},
        factory::create_providers,
    },
    submission::SubmissionValidation,
    SessionRegistry,
};
use std::{collections::HashMap, sync::Arc};

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub template: PromptTemplate,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// A map of fully resolved tasks, ready for use by handlers.
    pub tasks: Arc<HashMap<String, ResolvedTask>>,
    /// The store for checklists, knowledge documents and submissions.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// A map of instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn AiProvider>>>,
    /// Live conversation sessions, one per client.
    pub sessions: SessionRegistry,
    pub upload_policy: Arc<UploadPolicy>,
    pub submission_validation: SubmissionValidation,
}

impl AppState {
    /// Looks up a task together with the provider it is configured to use.
    pub fn task(&self, name: &str) -> anyhow::Result<(&ResolvedTask, &dyn AiProvider)> {
        let task = self
            .tasks
            .get(name)
            .ok_or_else(|| anyhow!("Task '{name}' is not configured"))?;
        let provider = self.ai_providers.get(&task.provider).ok_or_else(|| {
            anyhow!(
                "Provider '{}' for task '{name}' is not configured",
                task.provider
            )
        })?;
        Ok((task, &**provider))
    }
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - It instantiates an AI provider client for each entry in the `providers`
///   section of the configuration.
/// - It resolves every task into a versioned prompt template and rejects
///   templates that reference a slot the task never fills.
/// - It sets up the SQLite database and its schema.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_providers = create_providers(&config.providers)?;

    let mut resolved_tasks = HashMap::new();
    for (name, task_config) in &config.tasks {
        let provider = task_config.provider.clone().ok_or_else(|| {
            anyhow!("Resolved task '{name}' is missing required 'provider' field")
        })?;
        if !ai_providers.contains_key(&provider) {
            return Err(anyhow!(
                "Task '{name}' refers to unknown provider '{provider}'"
            ));
        }
        let system_prompt = task_config.system_prompt.clone().ok_or_else(|| {
            anyhow!("Resolved task '{name}' is missing required 'system_prompt' field")
        })?;
        let user_prompt = task_config.user_prompt.clone().ok_or_else(|| {
            anyhow!("Resolved task '{name}' is missing required 'user_prompt' field")
        })?;
        let version = task_config
            .version
            .clone()
            .unwrap_or_else(|| checkbot::prompts::tasks::PROMPT_TEMPLATE_VERSION.to_string());

        let template = PromptTemplate::new(version, system_prompt, user_prompt);
        if let Some(slots) = known_slots(name) {
            template
                .check_slots(slots)
                .map_err(|e| anyhow!("Prompt template of task '{name}' is invalid: {e}"))?;
        }

        resolved_tasks.insert(name.clone(), ResolvedTask { provider, template });
    }

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    tracing::info!(
        db_path = %config.db_url,
        "Initialized local storage provider ({}).",
        sqlite_provider.name()
    );
    // Ensure the database schema is up-to-date on startup.
    sqlite_provider.initialize_schema().await?;

    let upload_policy = UploadPolicy::from(&config.upload);
    let submission_validation = config.submission.validation;

    Ok(AppState {
        tasks: Arc::new(resolved_tasks),
        sqlite_provider: Arc::new(sqlite_provider),
        ai_providers: Arc::new(ai_providers),
        sessions: SessionRegistry::new(),
        upload_policy: Arc::new(upload_policy),
        submission_validation,
    })
}
