//! OpenAI provider.

use super::chat::ChatEndpoint;
use super::{ClassifierProvider, ProviderResult, ProviderSettings};
use crate::analyzer::types::CompletionAnalysis;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Classifier backed by the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    endpoint: ChatEndpoint,
}

impl OpenAiProvider {
    pub fn new() -> Self {
        Self::from_settings(&ProviderSettings::default())
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            endpoint: ChatEndpoint::resolve(
                &settings.providers.openai,
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

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
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
