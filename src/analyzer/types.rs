//! Result types produced by classification and analysis.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Provider name recorded when the whole chain failed.
pub const ERROR_PROVIDER: &str = "error";

/// Task classification produced by one provider.
///
/// Task lists are subsets of the caller's tasks, free of duplicates, in the
/// caller's order. A task appears in at most one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionAnalysis {
    pub completed_tasks: Vec<String>,
    pub in_progress_tasks: Vec<String>,
    pub blocked_tasks: Vec<String>,
    /// Self-reported reliability in `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
    /// Name of the provider that produced this result
    pub provider_used: String,
}

impl CompletionAnalysis {
    /// Empty analysis attributed to `provider`.
    pub fn empty(provider: impl Into<String>, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            completed_tasks: Vec::new(),
            in_progress_tasks: Vec::new(),
            blocked_tasks: Vec::new(),
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
            provider_used: provider.into(),
        }
    }

    /// Zero-confidence result used when no provider produced an answer.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::empty(ERROR_PROVIDER, 0.0, reason)
    }

    /// Build an analysis from loosely matching bucket contents.
    ///
    /// Entries are resolved against `tasks` (trimmed, case-insensitive);
    /// unknown entries are dropped. A task claimed by several buckets lands
    /// in the first of completed, blocked, in progress.
    pub fn from_buckets(
        tasks: &[String],
        completed: &[String],
        in_progress: &[String],
        blocked: &[String],
        confidence: f64,
        reasoning: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let mut analysis = Self::empty(provider, confidence, reasoning);
        for task in tasks {
            if analysis.contains(task) {
                continue;
            }
            if mentions(completed, task) {
                analysis.completed_tasks.push(task.clone());
            } else if mentions(blocked, task) {
                analysis.blocked_tasks.push(task.clone());
            } else if mentions(in_progress, task) {
                analysis.in_progress_tasks.push(task.clone());
            }
        }
        analysis
    }

    /// Whether `task` is already classified.
    pub fn contains(&self, task: &str) -> bool {
        self.completed_tasks.iter().any(|t| t == task)
            || self.in_progress_tasks.iter().any(|t| t == task)
            || self.blocked_tasks.iter().any(|t| t == task)
    }

    /// Caller tasks that landed in no bucket.
    pub fn not_started<'a>(&self, tasks: &'a [String]) -> Vec<&'a String> {
        tasks.iter().filter(|task| !self.contains(task)).collect()
    }

    pub fn is_error(&self) -> bool {
        self.provider_used == ERROR_PROVIDER
    }
}

fn mentions(entries: &[String], task: &str) -> bool {
    let task = task.trim();
    entries
        .iter()
        .any(|entry| entry.trim().eq_ignore_ascii_case(task))
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// How the analyzed text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Event stream digest including reasoning
    EventStream,
    /// Event stream digest without reasoning
    EventStreamFiltered,
    /// Input passed through unchanged
    PlainText,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::EventStream => "event_stream",
            DataSource::EventStreamFiltered => "event_stream_filtered",
            DataSource::PlainText => "plain_text",
        }
    }

    pub fn is_event_stream(&self) -> bool {
        !matches!(self, DataSource::PlainText)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: CompletionAnalysis,
    /// Parsed session, absent for plain text input
    pub session: Option<Session>,
    pub data_source: DataSource,
    /// Input length in characters
    pub input_length: usize,
    /// Length of the text handed to the classifier, in characters
    pub analysis_text_length: usize,
}
