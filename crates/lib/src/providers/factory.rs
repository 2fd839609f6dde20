//! # AI Provider Factory
//!
//! Centralizes how provider instances are built from configuration so the
//! server and tests construct them the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

/// A reusable configuration for one AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key; may be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Builds a single provider from its configuration.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    PromptError::MissingAiProvider(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            let api_url = config.api_url.clone().unwrap_or_else(|| {
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                    config.model_name
                )
            });
            info!(provider = %name, api_url = %api_url, "Configuring Gemini provider");
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    PromptError::MissingAiProvider(format!(
                        "api_url is required for local provider '{name}'. Please set AI_API_URL in your .env file."
                    ))
                })?;
            info!(provider = %name, api_url = %api_url, "Configuring local AI provider");
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone().filter(|k| !k.is_empty()),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "Unsupported AI provider type '{other}' for provider '{name}'"
            )))
        }
    };
    Ok(provider)
}

/// Builds every configured provider, keyed by its configuration name.
pub fn create_providers(
    configs: &HashMap<String, ProviderConfig>,
) -> Result<HashMap<String, Box<dyn AiProvider>>, PromptError> {
    configs
        .iter()
        .map(|(name, config)| Ok((name.clone(), create_provider(name, config)?)))
        .collect()
}
