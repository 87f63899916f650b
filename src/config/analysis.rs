//! Analysis and provider configuration types.
//!
//! These are pure data containers (serde structs + validation) with no
//! analyzer dependencies. CLI flags take priority over config, which
//! overrides defaults.

use serde::{Deserialize, Serialize};

/// Names accepted by `analysis.provider`.
pub const PROVIDER_NAMES: [&str; 3] = ["github-models", "openai", "heuristic"];

/// `[analysis]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Soft character budget of the evidence digest
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Include reasoning summaries in the digest
    #[serde(default = "default_include_reasoning")]
    pub include_reasoning: bool,
    /// Characters of session text embedded in a remote prompt
    #[serde(default = "default_prompt_text_limit")]
    pub prompt_text_limit: usize,
    /// Remote request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Pin analysis to a single provider
    #[serde(default)]
    pub provider: Option<String>,
}

pub fn default_max_length() -> usize {
    7000
}

pub fn default_include_reasoning() -> bool {
    true
}

pub fn default_prompt_text_limit() -> usize {
    8000
}

pub fn default_timeout() -> u64 {
    60
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            include_reasoning: default_include_reasoning(),
            prompt_text_limit: default_prompt_text_limit(),
            timeout: default_timeout(),
            provider: None,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration values.
    ///
    /// Returns `Ok(())` if all values are within acceptable bounds,
    /// or an error describing the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref provider) = self.provider {
            if !PROVIDER_NAMES.contains(&provider.as_str()) {
                return Err(format!(
                    "Unknown provider '{}'. Valid: {}",
                    provider,
                    PROVIDER_NAMES.join(", ")
                ));
            }
        }
        if self.timeout == 0 {
            return Err("analysis.timeout must be > 0".to_string());
        }
        if self.timeout > 600 {
            return Err(format!(
                "analysis.timeout {} exceeds maximum (600s)",
                self.timeout
            ));
        }
        if self.max_length < 500 {
            return Err(format!(
                "analysis.max_length {} is below minimum (500)",
                self.max_length
            ));
        }
        if self.prompt_text_limit == 0 {
            return Err("analysis.prompt_text_limit must be > 0".to_string());
        }
        Ok(())
    }
}

/// Per-provider overrides.
///
/// Unset fields fall back to the provider's built-in defaults.
///
/// ```toml
/// [providers.openai]
/// model = "gpt-4o"
/// api_key_env = "MY_OPENAI_KEY"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Chat completions URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Environment variable holding the credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if let Some(ref endpoint) = self.endpoint {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(format!(
                    "providers.{}.endpoint must be an http(s) URL, got '{}'",
                    name, endpoint
                ));
            }
        }
        if let Some(ref var) = self.api_key_env {
            if var.trim().is_empty() {
                return Err(format!("providers.{}.api_key_env must not be empty", name));
            }
        }
        Ok(())
    }
}

/// `[providers]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub github_models: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

impl ProvidersConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.github_models.validate("github_models")?;
        self.openai.validate("openai")
    }
}
