//! Evidence digest synthesis.
//!
//! Condenses a [`Session`] into a structured text digest that fits a
//! classifier's input limits while keeping the highest-signal content.
//!
//! # Section priority
//!
//! | Order | Section             | Per-item cap |
//! |-------|---------------------|--------------|
//! | 1     | Agent Messages      | 2000 chars   |
//! | 2     | Reasoning Summaries | 800 chars    |
//! | 3     | Todo List           | 200 chars    |
//! | 4     | Files Modified      | 500 chars    |
//! | 5     | Commands Executed   | 600 / 200 chars of output |
//!
//! Earlier sections consume the budget first. The budget is a soft target:
//! the first item of every section is always admitted and the command
//! counters are always written, so the digest may overshoot slightly.
//!
//! When the digest ends up shorter than 200 characters but the session has
//! file or command evidence, a "Work Evidence Summary" is prepended. Some
//! runs emit no agent message text at all and would otherwise produce an
//! empty digest.

use crate::session::{CommandExecution, Session};
use crate::text::{char_len, flatten_whitespace, truncate_chars};

/// Default soft budget for the digest in characters.
pub const DEFAULT_MAX_LENGTH: usize = 7000;

/// Per-item cap for agent messages.
pub const AGENT_MESSAGE_CHARS: usize = 2000;
/// Per-item cap for reasoning summaries.
pub const REASONING_CHARS: usize = 800;

const TODO_CHARS: usize = 200;
const FILE_ENTRY_CHARS: usize = 500;
const FILE_PREVIEW_CHARS: usize = 300;
const COMMAND_CHARS: usize = 200;
const SUCCESS_OUTPUT_CHARS: usize = 600;
const FAILED_OUTPUT_CHARS: usize = 200;
const MAX_SUCCESSFUL_COMMANDS: usize = 5;
const MAX_FAILED_COMMANDS: usize = 3;
const MIN_MEANINGFUL_OUTPUT: usize = 20;

/// Digests shorter than this get a work evidence summary.
const FALLBACK_THRESHOLD: usize = 200;
const MAX_SUMMARY_FILES: usize = 15;

/// Commands that say nothing about the work done.
const TRIVIAL_COMMAND_PREFIXES: [&str; 4] = ["cd ", "ls ", "pwd", "echo "];

const TEST_RESULT_MARKERS: [&str; 5] = ["passed", "failed", "error", "warning", "collected"];

/// Builds bounded evidence digests from sessions.
#[derive(Debug, Clone)]
pub struct EvidenceSynthesizer {
    include_reasoning: bool,
    max_length: usize,
}

impl Default for EvidenceSynthesizer {
    fn default() -> Self {
        Self {
            include_reasoning: true,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl EvidenceSynthesizer {
    /// Create a synthesizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or exclude the reasoning section.
    pub fn include_reasoning(mut self, include: bool) -> Self {
        self.include_reasoning = include;
        self
    }

    /// Set the soft character budget.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Produce the evidence digest for a session.
    pub fn synthesize(&self, session: &Session) -> String {
        let mut digest = Digest::new(self.max_length);

        self.agent_messages(session, &mut digest);
        if self.include_reasoning {
            self.reasoning(session, &mut digest);
        }
        self.todo_list(session, &mut digest);
        self.files(session, &mut digest);
        self.commands(session, &mut digest);

        let text = digest.finish();
        let has_work_evidence = !session.file_changes.is_empty() || !session.commands.is_empty();
        if char_len(&text) >= FALLBACK_THRESHOLD || !has_work_evidence {
            return text;
        }

        let summary = work_evidence_summary(session);
        if text.is_empty() {
            summary
        } else {
            format!("{}\n\n{}", summary, text)
        }
    }

    fn agent_messages(&self, session: &Session, digest: &mut Digest) {
        if session.agent_messages.is_empty() {
            return;
        }
        digest.section("Agent Messages");
        let (selected, omitted) = digest.select_recent(&session.agent_messages, AGENT_MESSAGE_CHARS);
        if omitted > 0 {
            digest.line(&format!("({} earlier messages omitted)", omitted));
        }
        for message in selected {
            digest.block(&message);
        }
    }

    fn reasoning(&self, session: &Session, digest: &mut Digest) {
        if session.reasoning_summaries.is_empty() {
            return;
        }
        digest.section("Reasoning Summaries");
        let (selected, omitted) =
            digest.select_recent(&session.reasoning_summaries, REASONING_CHARS);
        if omitted > 0 {
            digest.line(&format!("({} earlier summaries omitted)", omitted));
        }
        for summary in selected {
            digest.block(&summary);
        }
    }

    fn todo_list(&self, session: &Session, digest: &mut Digest) {
        if session.todo_items.is_empty() {
            return;
        }
        digest.section("Todo List");
        for (index, item) in session.todo_items.iter().enumerate() {
            if index > 0 && !digest.has_room() {
                digest.omitted(session.todo_items.len() - index);
                break;
            }
            let line = format!("{} {}", item.status.glyph(), item.task);
            digest.line(&truncate_chars(&line, TODO_CHARS));
        }
    }

    fn files(&self, session: &Session, digest: &mut Digest) {
        if session.file_changes.is_empty() {
            return;
        }
        digest.section("Files Modified");
        for (index, change) in session.file_changes.iter().enumerate() {
            if index > 0 && !digest.has_room() {
                digest.omitted(session.file_changes.len() - index);
                break;
            }
            let mut entry = format!("- {} ({})", change.path, change.change_type);
            if let Some(preview) = change.content_preview.as_deref() {
                let preview = flatten_whitespace(preview);
                if !preview.is_empty() {
                    entry.push_str("\n  Preview: ");
                    entry.push_str(&truncate_chars(&preview, FILE_PREVIEW_CHARS));
                }
            }
            digest.line(&truncate_chars(&entry, FILE_ENTRY_CHARS));
        }
    }

    fn commands(&self, session: &Session, digest: &mut Digest) {
        if session.commands.is_empty() {
            return;
        }
        let successful = session.successful_commands().count();
        let failed = session.commands.len() - successful;

        digest.section("Commands Executed");
        digest.line(&format!(
            "Total: {} | Successful: {} | Failed: {}",
            session.commands.len(),
            successful,
            failed
        ));

        let mut meaningful: Vec<&CommandExecution> = session
            .successful_commands()
            .filter(|c| is_meaningful(c))
            .rev()
            .take(MAX_SUCCESSFUL_COMMANDS)
            .collect();
        meaningful.reverse();

        if !meaningful.is_empty() {
            digest.line("");
            digest.line("### Key Successful Commands");
            for (index, command) in meaningful.iter().enumerate() {
                if index > 0 && !digest.has_room() {
                    digest.omitted(meaningful.len() - index);
                    break;
                }
                digest.line(&format!("$ {}", truncate_chars(&command.command, COMMAND_CHARS)));
                digest.block(&truncate_chars(command.output.trim(), SUCCESS_OUTPUT_CHARS));
            }
        }

        let mut failures: Vec<&CommandExecution> = session
            .failed_commands()
            .rev()
            .take(MAX_FAILED_COMMANDS)
            .collect();
        failures.reverse();

        if !failures.is_empty() {
            digest.line("");
            digest.line("### Failed Commands");
            for (index, command) in failures.iter().enumerate() {
                if index > 0 && !digest.has_room() {
                    digest.omitted(failures.len() - index);
                    break;
                }
                digest.line(&format!(
                    "$ {} (exit {})",
                    truncate_chars(&command.command, COMMAND_CHARS),
                    command.exit_code
                ));
                let output = command.output.trim();
                if !output.is_empty() {
                    digest.block(&truncate_chars(output, FAILED_OUTPUT_CHARS));
                }
            }
        }
    }
}

/// A successful command with enough output to be worth showing.
fn is_meaningful(command: &CommandExecution) -> bool {
    let cmd = command.command.trim_start();
    char_len(command.output.trim()) > MIN_MEANINGFUL_OUTPUT
        && !TRIVIAL_COMMAND_PREFIXES
            .iter()
            .any(|prefix| cmd.starts_with(prefix))
}

/// Character-counted digest writer.
struct Digest {
    out: String,
    len: usize,
    max_length: usize,
}

impl Digest {
    fn new(max_length: usize) -> Self {
        Self {
            out: String::new(),
            len: 0,
            max_length,
        }
    }

    fn has_room(&self) -> bool {
        self.len < self.max_length
    }

    fn remaining(&self) -> usize {
        self.max_length.saturating_sub(self.len)
    }

    fn push(&mut self, text: &str) {
        self.len += char_len(text);
        self.out.push_str(text);
    }

    fn section(&mut self, title: &str) {
        if !self.out.is_empty() {
            self.push("\n");
        }
        self.push(&format!("## {}\n", title));
    }

    fn line(&mut self, line: &str) {
        self.push(line);
        self.push("\n");
    }

    fn block(&mut self, block: &str) {
        self.push(block);
        self.push("\n\n");
    }

    fn omitted(&mut self, count: usize) {
        self.line(&format!("... ({} more omitted)", count));
    }

    /// Pick the most recent items that fit the remaining budget, returned in
    /// chronological order, plus the number of older items left out.
    ///
    /// The newest item is always selected.
    fn select_recent(&self, items: &[String], cap: usize) -> (Vec<String>, usize) {
        let mut budget = self.remaining();
        let mut selected = Vec::new();

        for item in items.iter().rev() {
            let truncated = truncate_chars(item.trim(), cap);
            let cost = char_len(&truncated) + 2;
            if !selected.is_empty() && cost > budget {
                break;
            }
            budget = budget.saturating_sub(cost);
            selected.push(truncated);
        }

        let omitted = items.len() - selected.len();
        selected.reverse();
        (selected, omitted)
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

/// Summary built purely from file and command evidence.
fn work_evidence_summary(session: &Session) -> String {
    let mut lines = vec!["## Work Evidence Summary".to_string()];

    let paths = session.changed_paths();
    if !paths.is_empty() {
        lines.push(format!("Files modified ({}):", paths.len()));
        for path in paths.iter().take(MAX_SUMMARY_FILES) {
            lines.push(format!("- {}", shorten_path(path)));
        }
        if paths.len() > MAX_SUMMARY_FILES {
            lines.push(format!("- ... and {} more", paths.len() - MAX_SUMMARY_FILES));
        }
    }

    if !session.commands.is_empty() {
        let successful = session.successful_commands().count();
        lines.push(format!(
            "Commands run: {} ({} successful, {} failed)",
            session.commands.len(),
            successful,
            session.commands.len() - successful
        ));

        let testing: Vec<&CommandExecution> = session
            .commands
            .iter()
            .filter(|c| CommandCategory::Testing.matches(&c.command))
            .collect();
        let editing = session
            .commands
            .iter()
            .filter(|c| CommandCategory::Editing.matches(&c.command))
            .count();
        let search = session
            .commands
            .iter()
            .filter(|c| CommandCategory::Search.matches(&c.command))
            .count();

        if !testing.is_empty() {
            let passed = testing.iter().filter(|c| c.is_success()).count();
            if passed > 0 {
                lines.push(format!(
                    "Testing commands: {} ({} passed)",
                    testing.len(),
                    passed
                ));
            } else {
                lines.push(format!("Testing commands: {}", testing.len()));
            }
        }
        if editing > 0 {
            lines.push(format!("Editing commands: {}", editing));
        }
        if search > 0 {
            lines.push(format!("Search commands: {}", search));
        }

        if let Some(result) = testing
            .iter()
            .filter(|c| c.is_success())
            .find_map(|c| test_result_line(&c.output))
        {
            lines.push(format!("Test result: {}", result));
        }
    }

    lines.join("\n")
}

/// Buckets used by the work evidence summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandCategory {
    Testing,
    Editing,
    Search,
}

impl CommandCategory {
    fn matches(&self, command: &str) -> bool {
        let lower = command.to_lowercase();
        match self {
            CommandCategory::Testing => lower.contains("pytest") || lower.contains("test"),
            CommandCategory::Editing => ["sed", "cat", "echo >", "vim", "nano"]
                .iter()
                .any(|needle| lower.contains(needle)),
            // `rg` only as a word; as a substring it matches `cargo`
            CommandCategory::Search => {
                lower.contains("grep")
                    || lower
                        .split(|c: char| !c.is_alphanumeric())
                        .any(|word| word == "rg")
            }
        }
    }
}

/// First line of test output that reports a result.
fn test_result_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            TEST_RESULT_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .map(|line| truncate_chars(line, COMMAND_CHARS))
}

/// Keep the last three path segments.
fn shorten_path(path: &str) -> String {
    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if segments.len() <= 3 {
        return segments.join("/");
    }
    segments[segments.len() - 3..].join("/")
}
