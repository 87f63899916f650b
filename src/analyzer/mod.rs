//! Evidence synthesis and task completion analysis.
//!
//! This module turns a parsed [`Session`](crate::session::Session) into a
//! bounded evidence digest and classifies caller tasks against it.
//!
//! # Module Structure
//!
//! - [`synthesis`] - bounded evidence digest from a session
//! - [`matcher`] - heuristic task-to-evidence matching
//! - [`tasks`] - markdown checkbox task extraction
//! - [`provider`] - classifier providers and the fallback chain
//! - [`service`] - the `SessionAnalyzer` facade
//! - [`types`] - result types

pub mod error;
pub mod matcher;
mod prompt;
pub mod provider;
pub mod service;
pub mod synthesis;
pub mod tasks;
pub mod types;

pub use error::AnalysisError;
pub use matcher::{match_tasks, EvidenceMatcher, MatchConfidence, TaskMatch};
pub use provider::{
    ChainError, ClassifierProvider, GitHubModelsProvider, HeuristicProvider, OpenAiProvider,
    ProviderChain, ProviderError, ProviderKind, ProviderSettings,
};
pub use service::{detect_data_source, AnalyzeOptions, SessionAnalyzer};
pub use synthesis::EvidenceSynthesizer;
pub use tasks::extract_tasks;
pub use types::{AnalysisResult, CompletionAnalysis, DataSource};
