//! User-friendly error handling for analysis operations.
//!
//! `AnalysisError` carries every failure mode the analyzer can surface with
//! messages suitable for CLI output and for the `reasoning` of an error
//! result.

use std::fmt;
use std::time::Duration;

use crate::analyzer::provider::{ChainError, ProviderError, ProviderKind};

/// Error type for analysis operations.
#[derive(Debug)]
pub enum AnalysisError {
    /// Provider credentials are missing.
    ProviderNotAvailable {
        provider: String,
        /// Environment variable that would enable it
        credential: Option<String>,
    },

    /// Remote provider did not answer in time.
    ProviderTimeout { provider: String, timeout_secs: u64 },

    /// Rate limited by the remote service.
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    /// A single provider failed.
    ProviderFailed { provider: String, reason: String },

    /// Every attempted provider failed.
    AllProvidersFailed {
        /// One entry per attempt, in order
        failures: Vec<AnalysisError>,
    },

    /// The chain had nothing it could run.
    NoProviderAvailable,

    /// No tasks to classify.
    NoTasks,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::ProviderNotAvailable {
                provider,
                credential,
            } => match credential {
                Some(var) => write!(
                    f,
                    "Provider '{}' is not available. Set {} to enable it.",
                    provider, var
                ),
                None => write!(f, "Provider '{}' is not available.", provider),
            },
            AnalysisError::ProviderTimeout {
                provider,
                timeout_secs,
            } => write!(
                f,
                "Provider '{}' timed out after {} seconds. Consider increasing analysis.timeout.",
                provider, timeout_secs
            ),
            AnalysisError::RateLimited {
                provider,
                retry_after,
            } => match retry_after {
                Some(duration) => write!(
                    f,
                    "Provider '{}' is rate limited. Retry after {} seconds.",
                    provider,
                    duration.as_secs()
                ),
                None => write!(
                    f,
                    "Provider '{}' is rate limited. Please wait before retrying.",
                    provider
                ),
            },
            AnalysisError::ProviderFailed { provider, reason } => {
                write!(f, "Provider '{}' failed: {}", provider, reason)
            }
            AnalysisError::AllProvidersFailed { failures } => {
                write!(f, "All {} provider(s) failed.", failures.len())?;
                for error in failures.iter().take(5) {
                    write!(f, "\n  - {}", error)?;
                }
                if failures.len() > 5 {
                    write!(f, "\n  ... and {} more errors", failures.len() - 5)?;
                }
                Ok(())
            }
            AnalysisError::NoProviderAvailable => write!(
                f,
                "No classifier provider is available. Set GITHUB_TOKEN or OPENAI_API_KEY, or use --provider heuristic."
            ),
            AnalysisError::NoTasks => write!(
                f,
                "No tasks to analyze. Pass --task or a --tasks-file with unchecked '- [ ]' items."
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl AnalysisError {
    /// Create from a ProviderError with provider context.
    pub fn from_provider_error(provider: &str, error: &ProviderError) -> Self {
        match error {
            ProviderError::NotAvailable(_) => AnalysisError::ProviderNotAvailable {
                provider: provider.to_string(),
                credential: provider
                    .parse::<ProviderKind>()
                    .ok()
                    .and_then(|kind| kind.credential_env())
                    .map(str::to_string),
            },
            ProviderError::Timeout(duration) => AnalysisError::ProviderTimeout {
                provider: provider.to_string(),
                timeout_secs: duration.as_secs(),
            },
            ProviderError::RateLimited { retry_after } => AnalysisError::RateLimited {
                provider: provider.to_string(),
                retry_after: *retry_after,
            },
            ProviderError::Status { .. }
            | ProviderError::Request(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::EmptyResponse => AnalysisError::ProviderFailed {
                provider: provider.to_string(),
                reason: error.to_string(),
            },
        }
    }

    /// Create from a chain-level failure.
    ///
    /// A single skipped provider (a forced chain) is reported with the
    /// credential that would enable it.
    pub fn from_chain_error(error: &ChainError) -> Self {
        match error {
            ChainError::NoProviderAvailable { skipped } => match skipped.as_slice() {
                [provider] => Self::from_provider_error(
                    provider,
                    &ProviderError::NotAvailable(provider.clone()),
                ),
                _ => AnalysisError::NoProviderAvailable,
            },
            ChainError::AllProvidersFailed { failures } => AnalysisError::AllProvidersFailed {
                failures: failures
                    .iter()
                    .map(|(provider, e)| Self::from_provider_error(provider, e))
                    .collect(),
            },
        }
    }

    /// Check if retrying later could succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            AnalysisError::ProviderTimeout { .. }
            | AnalysisError::RateLimited { .. }
            | AnalysisError::ProviderFailed { .. } => true,
            AnalysisError::AllProvidersFailed { failures } => {
                failures.iter().any(AnalysisError::is_retriable)
            }
            _ => false,
        }
    }
}
