//! Ordered provider fallback.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{ClassifierProvider, ProviderError, ProviderKind, ProviderSettings};
use crate::analyzer::types::CompletionAnalysis;

/// Errors raised when no provider produced a result.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("No classifier provider is available")]
    NoProviderAvailable {
        /// Providers skipped because they were unavailable
        skipped: Vec<String>,
    },

    #[error("All {} attempted provider(s) failed; last error: {}", .failures.len(), describe_last(.failures))]
    AllProvidersFailed {
        /// Provider name and error for each attempt, in order
        failures: Vec<(String, ProviderError)>,
    },
}

fn describe_last(failures: &[(String, ProviderError)]) -> String {
    match failures.last() {
        Some((provider, error)) => format!("{}: {}", provider, error),
        None => "none".to_string(),
    }
}

/// Providers tried in order until one succeeds.
///
/// Attempts are strictly sequential. Unavailable providers are skipped and
/// a failing provider only moves the chain on to the next one.
pub struct ProviderChain {
    providers: Vec<Box<dyn ClassifierProvider>>,
}

impl ProviderChain {
    /// Every provider with built-in defaults, in preference order.
    pub fn default_chain() -> Self {
        Self::from_settings(&ProviderSettings::default())
    }

    /// Every provider using `settings`, in preference order.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::with_providers(
            ProviderKind::ALL
                .iter()
                .map(|kind| kind.create_with(settings))
                .collect(),
        )
    }

    /// A chain pinned to a single provider.
    pub fn forced(kind: ProviderKind, settings: &ProviderSettings) -> Self {
        Self::with_providers(vec![kind.create_with(settings)])
    }

    /// A chain over explicit providers, tried in the given order.
    pub fn with_providers(providers: Vec<Box<dyn ClassifierProvider>>) -> Self {
        Self { providers }
    }

    /// Provider names with their availability, in order.
    pub fn availability(&self) -> Vec<(&'static str, bool)> {
        self.providers
            .iter()
            .map(|provider| (provider.name(), provider.is_available()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Return the first successful classification.
    pub fn analyze_completion(
        &self,
        text: &str,
        tasks: &[String],
        context: Option<&str>,
    ) -> Result<CompletionAnalysis, ChainError> {
        let mut failures: Vec<(String, ProviderError)> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for provider in &self.providers {
            if !provider.is_available() {
                debug!(provider = provider.name(), "Skipping unavailable provider");
                skipped.push(provider.name().to_string());
                continue;
            }

            match provider.analyze_completion(text, tasks, context) {
                Ok(analysis) => {
                    info!(
                        provider = provider.name(),
                        confidence = analysis.confidence,
                        "Classification complete"
                    );
                    return Ok(analysis);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    failures.push((provider.name().to_string(), e));
                }
            }
        }

        if failures.is_empty() {
            Err(ChainError::NoProviderAvailable { skipped })
        } else {
            Err(ChainError::AllProvidersFailed { failures })
        }
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
