//! GitHub Models provider.
//!
//! Calls the OpenAI-compatible chat completions endpoint of GitHub Models,
//! authenticated with the workflow's `GITHUB_TOKEN`.

use super::chat::ChatEndpoint;
use super::{ClassifierProvider, ProviderResult, ProviderSettings};
use crate::analyzer::types::CompletionAnalysis;

pub const DEFAULT_ENDPOINT: &str = "https://models.inference.ai.azure.com/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "GITHUB_TOKEN";

/// Classifier backed by GitHub Models.
#[derive(Debug, Clone)]
pub struct GitHubModelsProvider {
    endpoint: ChatEndpoint,
}

impl GitHubModelsProvider {
    pub fn new() -> Self {
        Self::from_settings(&ProviderSettings::default())
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            endpoint: ChatEndpoint::resolve(
                &settings.providers.github_models,
                settings,
                DEFAULT_ENDPOINT,
                DEFAULT_MODEL,
                DEFAULT_API_KEY_ENV,
            ),
        }
    }

    pub fn model(&self) -> &str {
        &self.endpoint.model
    }
}

impl Default for GitHubModelsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierProvider for GitHubModelsProvider {
    fn name(&self) -> &'static str {
        "github-models"
    }

    fn is_available(&self) -> bool {
        self.endpoint.api_key().is_some()
    }

    fn analyze_completion(
        &self,
        text: &str,
        tasks: &[String],
        context: Option<&str>,
    ) -> ProviderResult<CompletionAnalysis> {
        self.endpoint.classify(self.name(), text, tasks, context)
    }
}
