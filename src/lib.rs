//! codex-analyzer library
//!
//! Reconstructs Codex agent sessions from their JSONL event logs, builds
//! bounded evidence digests, and classifies task completion through an
//! ordered chain of providers with a heuristic fallback.

pub mod analyzer;
pub mod config;
pub mod output;
pub mod session;
pub mod text;

pub use analyzer::{AnalysisResult, AnalyzeOptions, CompletionAnalysis, SessionAnalyzer};
pub use config::Config;
pub use session::{EventStreamParser, Session};
