//! Regex heuristic provider.
//!
//! A task counts as mentioned when one of its words (4+ characters, counted
//! before punctuation is trimmed) occurs in the session text. A mentioned task is classified by the signal phrases
//! present anywhere in the text, checked in the order completed, blocked,
//! in progress. The first match wins, so text carrying both a completion
//! and a blocker phrase always reports the task completed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ClassifierProvider, ProviderResult};
use crate::analyzer::types::CompletionAnalysis;

/// Fixed confidence of heuristic results.
pub const HEURISTIC_CONFIDENCE: f64 = 0.3;

static COMPLETED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"completed|finished|done|fixed|✓|\[x\]").expect("completion pattern is valid")
});

static IN_PROGRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"working on|started|implementing|in progress").expect("progress pattern is valid")
});

static BLOCKED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"blocked|stuck|failed|error|cannot").expect("blocker pattern is valid")
});

/// Keyword and signal-phrase classifier. Always available, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicProvider;

impl HeuristicProvider {
    pub fn new() -> Self {
        Self
    }

    /// Classify tasks without going through the trait.
    pub fn classify(&self, text: &str, tasks: &[String]) -> CompletionAnalysis {
        let text = text.to_lowercase();
        let completed_signal = COMPLETED_RE.is_match(&text);
        let blocked_signal = BLOCKED_RE.is_match(&text);
        let progress_signal = IN_PROGRESS_RE.is_match(&text);

        let mut analysis = CompletionAnalysis::empty(self.name(), HEURISTIC_CONFIDENCE, "");
        for task in tasks {
            if analysis.contains(task) || !is_mentioned(task, &text) {
                continue;
            }
            if completed_signal {
                analysis.completed_tasks.push(task.clone());
            } else if blocked_signal {
                analysis.blocked_tasks.push(task.clone());
            } else if progress_signal {
                analysis.in_progress_tasks.push(task.clone());
            }
        }

        analysis.reasoning = format!(
            "Keyword heuristic: {} completed, {} in progress, {} blocked of {} task(s)",
            analysis.completed_tasks.len(),
            analysis.in_progress_tasks.len(),
            analysis.blocked_tasks.len(),
            tasks.len()
        );
        analysis
    }
}

fn is_mentioned(task: &str, text: &str) -> bool {
    task.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .any(|word| text.contains(word))
}

impl ClassifierProvider for HeuristicProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn analyze_completion(
        &self,
        text: &str,
        tasks: &[String],
        _context: Option<&str>,
    ) -> ProviderResult<CompletionAnalysis> {
        Ok(self.classify(text, tasks))
    }
}
