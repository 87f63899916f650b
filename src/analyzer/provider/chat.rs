//! Shared client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_classification, ProviderError, ProviderResult, ProviderSettings};
use crate::analyzer::prompt::build_classify_prompt;
use crate::analyzer::types::CompletionAnalysis;
use crate::config::ProviderConfig;
use crate::text::truncate_chars;

const SYSTEM_PROMPT: &str =
    "You classify software tasks from coding agent logs. Reply with a single JSON object.";

const TEMPERATURE: f32 = 0.1;

/// Resolved endpoint for one remote provider.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChatEndpoint {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout: Duration,
    pub prompt_text_limit: usize,
}

impl ChatEndpoint {
    /// Apply config overrides on top of provider defaults.
    pub fn resolve(
        config: &ProviderConfig,
        settings: &ProviderSettings,
        endpoint: &str,
        model: &str,
        api_key_env: &str,
    ) -> Self {
        Self {
            endpoint: config.endpoint.clone().unwrap_or_else(|| endpoint.to_string()),
            model: config.model.clone().unwrap_or_else(|| model.to_string()),
            api_key_env: config
                .api_key_env
                .clone()
                .unwrap_or_else(|| api_key_env.to_string()),
            timeout: settings.timeout,
            prompt_text_limit: settings.prompt_text_limit,
        }
    }

    /// Credential from the environment; empty values count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Run one classification request against the endpoint.
    pub fn classify(
        &self,
        provider: &str,
        text: &str,
        tasks: &[String],
        context: Option<&str>,
    ) -> ProviderResult<CompletionAnalysis> {
        let api_key = self.api_key().ok_or_else(|| {
            ProviderError::NotAvailable(format!("{} is not set", self.api_key_env))
        })?;

        let prompt = build_classify_prompt(text, tasks, context, self.prompt_text_limit);
        let content = self.complete(&api_key, &prompt)?;
        Ok(parse_classification(&content, tasks, provider))
    }

    fn complete(&self, api_key: &str, prompt: &str) -> ProviderResult<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion request");
        let response = client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), 200),
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    fn request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Request(error.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
