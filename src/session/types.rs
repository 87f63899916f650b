//! Typed session model reconstructed from a Codex event stream.
//!
//! A [`Session`] is the aggregate for one agent run. Everything in it is
//! append-only and kept in event order (oldest first).

use serde::{Deserialize, Serialize};

/// Maximum characters kept in a file change content preview.
pub const CONTENT_PREVIEW_CHARS: usize = 500;

/// Reconstructed model of one agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Thread identifier (first `thread.started` wins)
    pub thread_id: Option<String>,
    /// Turns in the order they were started
    pub turns: Vec<Turn>,
    /// Completed agent message texts
    pub agent_messages: Vec<String>,
    /// Completed reasoning summary texts
    pub reasoning_summaries: Vec<String>,
    /// Commands run by the agent
    pub commands: Vec<CommandExecution>,
    /// Files touched by the agent
    pub file_changes: Vec<FileChange>,
    /// Entries of the agent's todo lists
    pub todo_items: Vec<TodoItem>,
    /// Number of lines that decoded and dispatched cleanly
    pub raw_event_count: usize,
    /// Non-fatal per-line failures ("line N: reason")
    pub parse_errors: Vec<String>,
}

impl Session {
    /// Sum of input tokens over all turns.
    pub fn total_input_tokens(&self) -> u64 {
        self.turns.iter().map(|t| t.input_tokens).sum()
    }

    /// Sum of output tokens over all turns.
    pub fn total_output_tokens(&self) -> u64 {
        self.turns.iter().map(|t| t.output_tokens).sum()
    }

    /// Sum of reasoning tokens over all turns.
    pub fn total_reasoning_tokens(&self) -> u64 {
        self.turns.iter().map(|t| t.reasoning_tokens).sum()
    }

    /// Number of turns that reached `completed`.
    pub fn completed_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.completed).count()
    }

    /// Number of turns that reached `failed`.
    pub fn failed_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.failed).count()
    }

    /// Commands that exited with status 0.
    pub fn successful_commands(&self) -> impl DoubleEndedIterator<Item = &CommandExecution> {
        self.commands.iter().filter(|c| c.is_success())
    }

    /// Commands that exited with a non-zero status.
    pub fn failed_commands(&self) -> impl DoubleEndedIterator<Item = &CommandExecution> {
        self.commands.iter().filter(|c| !c.is_success())
    }

    /// Distinct changed paths in first-seen order.
    pub fn changed_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for change in &self.file_changes {
            if !paths.contains(&change.path) {
                paths.push(change.path.clone());
            }
        }
        paths
    }

    /// Command strings in execution order.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.command.clone()).collect()
    }

    /// Whether the session carries any evidence at all.
    pub fn is_empty(&self) -> bool {
        self.agent_messages.is_empty()
            && self.reasoning_summaries.is_empty()
            && self.commands.is_empty()
            && self.file_changes.is_empty()
            && self.todo_items.is_empty()
    }

    /// Look up the first turn with the given id.
    pub fn turn(&self, turn_id: &str) -> Option<&Turn> {
        self.turns.iter().find(|t| t.turn_id == turn_id)
    }

    /// Compact counters used by reports.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            thread_id: self.thread_id.clone(),
            turns: self.turns.len(),
            completed_turns: self.completed_turns(),
            failed_turns: self.failed_turns(),
            agent_messages: self.agent_messages.len(),
            reasoning_summaries: self.reasoning_summaries.len(),
            commands: self.commands.len(),
            successful_commands: self.successful_commands().count(),
            failed_commands: self.failed_commands().count(),
            file_changes: self.file_changes.len(),
            todo_items: self.todo_items.len(),
            total_input_tokens: self.total_input_tokens(),
            total_output_tokens: self.total_output_tokens(),
            total_reasoning_tokens: self.total_reasoning_tokens(),
            raw_event_count: self.raw_event_count,
            parse_errors: self.parse_errors.len(),
        }
    }
}

/// Counters describing a session without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub thread_id: Option<String>,
    pub turns: usize,
    pub completed_turns: usize,
    pub failed_turns: usize,
    pub agent_messages: usize,
    pub reasoning_summaries: usize,
    pub commands: usize,
    pub successful_commands: usize,
    pub failed_commands: usize,
    pub file_changes: usize,
    pub todo_items: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_reasoning_tokens: u64,
    pub raw_event_count: usize,
    pub parse_errors: usize,
}

/// One request/response cycle of the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub completed: bool,
    pub failed: bool,
    pub error: Option<String>,
}

impl Turn {
    /// Create a turn in its initial, non-terminal state.
    pub fn new(turn_id: impl Into<String>) -> Self {
        Self {
            turn_id: turn_id.into(),
            ..Default::default()
        }
    }

    /// Whether the turn reached `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.completed || self.failed
    }
}

/// A shell command run by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandExecution {
    pub command: String,
    pub exit_code: i64,
    pub output: String,
    pub duration_seconds: Option<f64>,
}

impl CommandExecution {
    /// A command is successful iff it exited with 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Kind of modification applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    #[default]
    Modified,
    Deleted,
    Unspecified,
}

impl ChangeType {
    /// Map the change kinds used by both event schemas.
    ///
    /// Unknown kinds map to `Unspecified`.
    pub fn from_kind(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "add" | "added" | "create" | "created" | "new" => ChangeType::Added,
            "update" | "updated" | "modify" | "modified" | "edit" | "edited" => {
                ChangeType::Modified
            }
            "delete" | "deleted" | "remove" | "removed" => ChangeType::Deleted,
            _ => ChangeType::Unspecified,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Added => write!(f, "added"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Deleted => write!(f, "deleted"),
            ChangeType::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// A file touched by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub change_type: ChangeType,
    /// At most [`CONTENT_PREVIEW_CHARS`] characters
    pub content_preview: Option<String>,
}

/// Progress state of a todo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Completed,
    InProgress,
    #[default]
    NotStarted,
    Blocked,
}

impl TodoStatus {
    /// Parse a status string; unknown values are `NotStarted`.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "completed" | "complete" | "done" => TodoStatus::Completed,
            "in_progress" | "active" | "started" => TodoStatus::InProgress,
            "blocked" => TodoStatus::Blocked,
            _ => TodoStatus::NotStarted,
        }
    }

    /// Glyph used when rendering todo lists.
    pub fn glyph(&self) -> char {
        match self {
            TodoStatus::Completed => '✓',
            TodoStatus::InProgress => '→',
            TodoStatus::Blocked => '✗',
            TodoStatus::NotStarted => '○',
        }
    }
}

/// One entry of an agent todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub task: String,
    pub status: TodoStatus,
}
