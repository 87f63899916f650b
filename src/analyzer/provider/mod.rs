//! Classifier providers for task completion analysis.
//!
//! Each provider turns an evidence digest and a task list into a
//! [`CompletionAnalysis`]. The set of providers is closed and enumerated by
//! [`ProviderKind`]; [`ProviderChain`] tries them in preference order.
//!
//! # Supported Providers
//!
//! - **GitHub Models**: OpenAI-compatible chat completions, `GITHUB_TOKEN`
//! - **OpenAI**: chat completions, `OPENAI_API_KEY`
//! - **Heuristic**: keyword and signal-phrase matching, always available
//!
//! Providers are stateless and can be shared across threads.

mod chain;
mod chat;
mod github;
mod heuristic;
mod openai;

pub use chain::{ChainError, ProviderChain};
pub use github::GitHubModelsProvider;
pub use heuristic::{HeuristicProvider, HEURISTIC_CONFIDENCE};
pub use openai::OpenAiProvider;

use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::analyzer::types::{clamp_confidence, CompletionAnalysis};
use crate::config::{Config, ProvidersConfig};
use crate::text::truncate_chars;

/// Default remote request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of session characters embedded in a remote prompt.
pub const DEFAULT_PROMPT_TEXT_LIMIT: usize = 8000;

/// Confidence reported when a response carries none.
const DEFAULT_RESPONSE_CONFIDENCE: f64 = 0.5;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A task-completion classifier.
///
/// Implementors must be thread-safe; batch analysis shares them across
/// worker threads.
pub trait ClassifierProvider: Send + Sync {
    /// Stable identifier, recorded as `provider_used`.
    fn name(&self) -> &'static str;

    /// Whether the provider can run (credentials present, etc.).
    fn is_available(&self) -> bool;

    /// Classify `tasks` against the evidence `text`.
    ///
    /// # Arguments
    ///
    /// * `text` - Evidence digest or plain text
    /// * `tasks` - Caller's task descriptions
    /// * `context` - Optional free-form context for the classifier
    fn analyze_completion(
        &self,
        text: &str,
        tasks: &[String],
        context: Option<&str>,
    ) -> ProviderResult<CompletionAnalysis>;
}

/// Provider variants in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GitHubModels,
    OpenAi,
    Heuristic,
}

impl ProviderKind {
    /// All variants, most preferred first.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::GitHubModels,
        ProviderKind::OpenAi,
        ProviderKind::Heuristic,
    ];

    /// Create the provider with built-in defaults.
    pub fn create_provider(&self) -> Box<dyn ClassifierProvider> {
        self.create_with(&ProviderSettings::default())
    }

    /// Create the provider using configured endpoints and limits.
    pub fn create_with(&self, settings: &ProviderSettings) -> Box<dyn ClassifierProvider> {
        match self {
            ProviderKind::GitHubModels => Box::new(GitHubModelsProvider::from_settings(settings)),
            ProviderKind::OpenAi => Box::new(OpenAiProvider::from_settings(settings)),
            ProviderKind::Heuristic => Box::new(HeuristicProvider::new()),
        }
    }

    /// Identifier used on the command line and in config.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHubModels => "github-models",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Heuristic => "heuristic",
        }
    }

    /// Environment variable holding the default credential, if any.
    pub fn credential_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::GitHubModels => Some(github::DEFAULT_API_KEY_ENV),
            ProviderKind::OpenAi => Some(openai::DEFAULT_API_KEY_ENV),
            ProviderKind::Heuristic => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::GitHubModels => write!(f, "GitHub Models"),
            ProviderKind::OpenAi => write!(f, "OpenAI"),
            ProviderKind::Heuristic => write!(f, "Heuristic"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github-models" | "github_models" | "github" => Ok(ProviderKind::GitHubModels),
            "openai" => Ok(ProviderKind::OpenAi),
            "heuristic" | "regex" => Ok(ProviderKind::Heuristic),
            other => Err(format!(
                "Unknown provider '{}'. Valid: github-models, openai, heuristic",
                other
            )),
        }
    }
}

/// Endpoint overrides and request limits shared by remote providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub providers: ProvidersConfig,
    pub timeout: Duration,
    pub prompt_text_limit: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            prompt_text_limit: DEFAULT_PROMPT_TEXT_LIMIT,
        }
    }
}

impl ProviderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            providers: config.providers.clone(),
            timeout: Duration::from_secs(config.analysis.timeout),
            prompt_text_limit: config.analysis.prompt_text_limit,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors from classifier providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error(
        "Rate limited{}",
        .retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default()
    )]
    RateLimited { retry_after: Option<Duration> },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response from provider")]
    EmptyResponse,
}

/// Extract a JSON object from a model response.
///
/// Handles, in order:
/// 1. A bare JSON object
/// 2. JSON in a markdown code block
/// 3. The span from the first `{` to the last `}`
pub fn extract_json(response: &str) -> Option<serde_json::Map<String, Value>> {
    let trimmed = response.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str(trimmed) {
        return Some(map);
    }

    if let Some(block) = extract_from_code_block(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str(block.trim()) {
            return Some(map);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str(&trimmed[start..=end]) {
                return Some(map);
            }
        }
    }

    None
}

fn extract_from_code_block(text: &str) -> Option<&str> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = text.find(pattern) {
            let json_start = start + pattern.len();
            if let Some(end) = text[json_start..].find("```") {
                return Some(&text[json_start..json_start + end]);
            }
        }
    }
    None
}

/// Turn a model response into an analysis restricted to `tasks`.
///
/// A response without a decodable JSON object yields a zero-confidence
/// analysis explaining the failure instead of an error.
pub fn parse_classification(response: &str, tasks: &[String], provider: &str) -> CompletionAnalysis {
    let Some(map) = extract_json(response) else {
        return CompletionAnalysis::empty(
            provider,
            0.0,
            format!(
                "Failed to parse JSON from {} response: {}",
                provider,
                truncate_chars(response.trim(), 200)
            ),
        );
    };

    let confidence = map
        .get("confidence")
        .and_then(coerce_number)
        .unwrap_or(DEFAULT_RESPONSE_CONFIDENCE);
    let reasoning = match map.get("reasoning") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    CompletionAnalysis::from_buckets(
        tasks,
        &coerce_strings(map.get("completed")),
        &coerce_strings(map.get("in_progress")),
        &coerce_strings(map.get("blocked")),
        clamp_confidence(confidence),
        reasoning,
        provider,
    )
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}
