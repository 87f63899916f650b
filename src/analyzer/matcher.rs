//! Heuristic task-to-evidence matching.
//!
//! Scores each task against the files a session changed and the commands it
//! ran, without calling any external service. The scorer is conservative and
//! explainable: a task is only reported when it has lexical overlap with the
//! evidence above a threshold or directly names a changed file.
//!
//! # Algorithm
//!
//! 1. Keywords are collected from changed paths (segments, stems, camelCase
//!    parts) and command tokens, then expanded with a synonym table.
//! 2. `score = |task words ∩ keywords| / |task words|` over words of 3+ chars.
//! 3. An explicit file reference (backticks or a file extension) that
//!    resolves to a changed file is **high** confidence.
//! 4. A test-oriented task whose module has a changed `tests/test_<module>`
//!    file is **high** confidence.
//! 5. Otherwise thresholds on the score decide between **high**, **medium**
//!    and omission.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::text::split_camel_case;

/// Groups of interchangeable verbs/nouns used in task descriptions.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["add", "create", "implement", "build"],
    &["fix", "repair", "resolve", "correct", "patch"],
    &["update", "modify", "change", "revise", "edit"],
    &["remove", "delete", "drop", "eliminate"],
    &["test", "tests", "testing", "spec", "specs"],
    &["config", "configuration", "settings", "configure"],
    &["doc", "docs", "documentation", "document"],
];

const HIGH_SCORE: f64 = 0.35;
const HIGH_SCORE_WITH_FILE: f64 = 0.25;
const MEDIUM_SCORE: f64 = 0.2;

static BACKTICK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("backtick pattern is valid"));

static FILE_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[\w./-]*\w\.(?:py|js|jsx|ts|tsx|rs|go|java|kt|rb|php|c|h|cpp|hpp|cs|swift|md|rst|txt|yml|yaml|json|toml|ini|cfg|sh|sql|html|css)\b",
    )
    .expect("file extension pattern is valid")
});

static TEST_TASK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:tests?|unit test|coverage)\b").expect("test task pattern is valid")
});

static TEST_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)tests?/test_([a-z0-9_]+)\.(?:py|js|ts)$")
        .expect("test file pattern is valid")
});

/// Confidence attached to a heuristic match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchConfidence::High => write!(f, "high"),
            MatchConfidence::Medium => write!(f, "medium"),
            MatchConfidence::Low => write!(f, "low"),
        }
    }
}

/// A task with the evidence that suggests it was worked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMatch {
    pub task: String,
    pub confidence: MatchConfidence,
    /// Human-readable explanation of the match
    pub reason: String,
    pub evidence_files: Vec<String>,
}

/// Matches tasks against file and command evidence.
#[derive(Debug, Clone)]
pub struct EvidenceMatcher {
    files: Vec<String>,
    commands: Vec<String>,
    keywords: HashSet<String>,
}

impl EvidenceMatcher {
    /// Build the expanded keyword set from changed files and commands.
    pub fn new(files_changed: &[String], commands: &[String]) -> Self {
        let mut keywords = HashSet::new();
        for path in files_changed {
            path_keywords(path, &mut keywords);
        }
        for command in commands {
            command_keywords(command, &mut keywords);
        }
        expand_synonyms(&mut keywords);

        Self {
            files: files_changed.to_vec(),
            commands: commands.to_vec(),
            keywords,
        }
    }

    /// Matcher over a parsed session's changed paths and commands.
    pub fn from_session(session: &Session) -> Self {
        Self::new(&session.changed_paths(), &session.command_lines())
    }

    /// Expanded keyword set.
    pub fn keywords(&self) -> &HashSet<String> {
        &self.keywords
    }

    /// Match every task; tasks without evidence are omitted.
    pub fn match_tasks(&self, tasks: &[String]) -> Vec<TaskMatch> {
        tasks.iter().filter_map(|task| self.match_task(task)).collect()
    }

    /// Match a single task.
    pub fn match_task(&self, task: &str) -> Option<TaskMatch> {
        if let Some(file) = self.referenced_file(task) {
            return Some(TaskMatch {
                task: task.to_string(),
                confidence: MatchConfidence::High,
                reason: format!("Task references `{}`, which was changed", file),
                evidence_files: vec![file],
            });
        }

        if let Some((file, module)) = self.matching_test_file(task) {
            return Some(TaskMatch {
                task: task.to_string(),
                confidence: MatchConfidence::High,
                reason: format!(
                    "Test file `{}` covers `{}`, which the task mentions",
                    file, module
                ),
                evidence_files: vec![file],
            });
        }

        let words = task_words(task);
        if words.is_empty() {
            return None;
        }
        let overlap = words.iter().filter(|w| self.keywords.contains(*w)).count();
        let score = overlap as f64 / words.len() as f64;

        let matched_files: Vec<String> = self
            .files
            .iter()
            .filter(|file| {
                let lower = file.to_lowercase();
                words.iter().any(|w| lower.contains(w.as_str()))
            })
            .cloned()
            .collect();
        let file_match = !matched_files.is_empty();
        let command_match = self.commands.iter().any(|command| {
            let lower = command.to_lowercase();
            words
                .iter()
                .filter(|w| w.chars().count() > 4)
                .any(|w| lower.contains(w.as_str()))
        });

        let confidence = if score >= HIGH_SCORE && (file_match || command_match) {
            MatchConfidence::High
        } else if score >= HIGH_SCORE_WITH_FILE && file_match {
            MatchConfidence::High
        } else if score >= MEDIUM_SCORE || file_match {
            MatchConfidence::Medium
        } else {
            return None;
        };

        let mut reason = format!(
            "{:.0}% keyword overlap ({} of {} words)",
            score * 100.0,
            overlap,
            words.len()
        );
        if file_match {
            reason.push_str(&format!(", {} changed file(s) match", matched_files.len()));
        }
        if command_match {
            reason.push_str(", corroborated by commands");
        }

        Some(TaskMatch {
            task: task.to_string(),
            confidence,
            reason,
            evidence_files: matched_files,
        })
    }

    /// A changed file named explicitly in the task text.
    fn referenced_file(&self, task: &str) -> Option<String> {
        let references = BACKTICK_RE
            .captures_iter(task)
            .map(|caps| caps[1].trim().to_string())
            .chain(FILE_EXTENSION_RE.find_iter(task).map(|m| m.as_str().to_string()));

        for reference in references {
            let reference = reference.to_lowercase();
            let reference = reference.trim_start_matches("./");
            if reference.is_empty() {
                continue;
            }
            let reference_name = basename(reference);
            let found = self.files.iter().find(|file| {
                let lower = file.to_lowercase();
                basename(&lower) == reference_name || lower.ends_with(reference)
            });
            if let Some(file) = found {
                return Some(file.clone());
            }
        }
        None
    }

    /// A changed `tests/test_<module>` file whose module the task mentions.
    fn matching_test_file(&self, task: &str) -> Option<(String, String)> {
        if !TEST_TASK_RE.is_match(task) {
            return None;
        }
        let task_lower = task.to_lowercase();

        self.files.iter().find_map(|file| {
            let lower = file.to_lowercase().replace('\\', "/");
            let caps = TEST_FILE_RE.captures(&lower)?;
            let module = caps[1].to_string();
            let referenced = module_variants(&module)
                .iter()
                .any(|variant| variant.chars().count() >= 3 && task_lower.contains(variant.as_str()));
            referenced.then(|| (file.clone(), module))
        })
    }
}

/// Convenience wrapper around [`EvidenceMatcher`].
pub fn match_tasks(tasks: &[String], files_changed: &[String], commands: &[String]) -> Vec<TaskMatch> {
    EvidenceMatcher::new(files_changed, commands).match_tasks(tasks)
}

/// Distinct lowercase words of 3+ characters in first-seen order.
fn task_words(task: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in task
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 3)
    {
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

fn insert_keyword(keywords: &mut HashSet<String>, word: &str) {
    if word.chars().count() > 2 {
        keywords.insert(word.to_string());
    }
}

fn path_keywords(path: &str, keywords: &mut HashSet<String>) {
    for segment in path.split(['/', '\\']).filter(|s| !s.is_empty()) {
        insert_keyword(keywords, &segment.to_lowercase());
        let stem = segment
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(segment);
        insert_keyword(keywords, &stem.to_lowercase());
        for part in split_camel_case(stem) {
            insert_keyword(keywords, &part);
        }
    }
}

fn command_keywords(command: &str, keywords: &mut HashSet<String>) {
    for token in command.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        insert_keyword(keywords, &token.to_lowercase());
        for part in split_camel_case(token) {
            insert_keyword(keywords, &part);
        }
    }
}

fn expand_synonyms(keywords: &mut HashSet<String>) {
    let additions: Vec<&str> = SYNONYM_GROUPS
        .iter()
        .filter(|group| group.iter().any(|word| keywords.contains(*word)))
        .flat_map(|group| group.iter().copied())
        .collect();
    keywords.extend(additions.into_iter().map(str::to_string));
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Singular/plural and spaced spellings of a test module name.
fn module_variants(module: &str) -> Vec<String> {
    let mut variants = vec![module.to_string()];
    if let Some(singular) = module.strip_suffix('s') {
        variants.push(singular.to_string());
    } else {
        variants.push(format!("{}s", module));
    }
    if module.contains('_') {
        variants.push(module.replace('_', " "));
    }
    variants
}
