//! Event stream parser for Codex JSONL output.
//!
//! Turns newline-delimited JSON events into a [`Session`]. The parser is
//! total: malformed lines are recorded in [`Session::parse_errors`] with their
//! 1-based line number and parsing continues with the next line.
//!
//! # Lifecycle
//!
//! ```text
//! thread.started
//! turn.started -> turn.completed | turn.failed
//! item.started -> item.updated* -> item.completed
//! ```
//!
//! Items are buffered by id while they stream and converted into session
//! records on completion. A completion without a prior start is legal; the
//! completed event's own fields are used.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::item::RawItem;
use super::types::{
    ChangeType, CommandExecution, FileChange, Session, TodoItem, TodoStatus, Turn,
    CONTENT_PREVIEW_CHARS,
};
use crate::text::truncate_chars;

/// Failure while dispatching a single decoded event.
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("event is not a JSON object")]
    NotAnObject,

    #[error("field '{field}' is not a valid integer: {value}")]
    InvalidInteger { field: String, value: String },
}

/// Item buffered between `item.started` and `item.completed`.
#[derive(Debug, Default)]
struct PendingItem {
    item_type: Option<String>,
    content: String,
}

/// Parser for Codex event streams.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    session: Session,
    pending: HashMap<String, PendingItem>,
}

impl EventStreamParser {
    /// Parse event text into a session.
    pub fn parse(text: &str) -> Session {
        Self::parse_reader(BufReader::new(text.as_bytes()))
    }

    /// Parse events from any buffered reader.
    ///
    /// Read failures (e.g. invalid UTF-8) are recorded like decode failures.
    pub fn parse_reader<R: BufRead>(reader: R) -> Session {
        let mut parser = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line_num = index + 1;
            match line {
                Ok(line) => parser.consume_line(line_num, &line),
                Err(e) => parser.record_error(line_num, format!("failed to read line: {}", e)),
            }
        }
        parser.finish()
    }

    fn consume_line(&mut self, line_num: usize, line: &str) {
        let trimmed = line.trim().trim_start_matches('\u{feff}');
        if trimmed.is_empty() {
            return;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(e) => {
                self.record_error(line_num, format!("invalid JSON: {}", e));
                return;
            }
        };

        match self.dispatch(&value) {
            Ok(()) => self.session.raw_event_count += 1,
            Err(e) => self.record_error(line_num, e.to_string()),
        }
    }

    fn record_error(&mut self, line_num: usize, message: String) {
        debug!(line = line_num, %message, "skipping event line");
        self.session
            .parse_errors
            .push(format!("line {}: {}", line_num, message));
    }

    fn finish(self) -> Session {
        if !self.pending.is_empty() {
            debug!(
                count = self.pending.len(),
                "discarding items that never completed"
            );
        }
        self.session
    }

    fn dispatch(&mut self, value: &Value) -> Result<(), EventError> {
        let event = value.as_object().ok_or(EventError::NotAnObject)?;

        let event_type = match event.get("type") {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::String(event_type)) => event_type.as_str(),
            Some(other) => {
                debug!(event_type = %other, "ignoring event with non-string type");
                return Ok(());
            }
        };

        match event_type {
            "thread.started" => self.thread_started(event),
            "turn.started" => self.turn_started(event),
            "turn.completed" => self.turn_completed(event)?,
            "turn.failed" => self.turn_failed(event),
            "item.started" => self.item_started(event),
            "item.updated" => self.item_updated(event),
            "item.completed" => self.item_completed(event)?,
            other => debug!(event_type = other, "ignoring unrecognized event"),
        }
        Ok(())
    }

    fn thread_started(&mut self, event: &Map<String, Value>) {
        if self.session.thread_id.is_none() {
            self.session.thread_id = id_field(event, "thread_id");
        }
    }

    fn turn_started(&mut self, event: &Map<String, Value>) {
        let turn_id = id_field(event, "turn_id")
            .unwrap_or_else(|| format!("turn-{}", self.session.turns.len() + 1));
        self.session.turns.push(Turn::new(turn_id));
    }

    fn turn_completed(&mut self, event: &Map<String, Value>) -> Result<(), EventError> {
        let empty = Map::new();
        let usage = event
            .get("token_usage")
            .or_else(|| event.get("usage"))
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let input_tokens = count_field(usage, "input_tokens")?;
        let output_tokens = count_field(usage, "output_tokens")?;
        let reasoning_tokens = count_field(usage, "reasoning_tokens")?;

        match self.target_turn(event) {
            Some(turn) if turn.failed => {
                debug!(turn_id = %turn.turn_id, "ignoring completion of failed turn");
            }
            Some(turn) => {
                turn.completed = true;
                turn.input_tokens = input_tokens;
                turn.output_tokens = output_tokens;
                turn.reasoning_tokens = reasoning_tokens;
            }
            None => debug!("turn.completed for unknown turn"),
        }
        Ok(())
    }

    fn turn_failed(&mut self, event: &Map<String, Value>) {
        let error = match event.get("error") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(Value::Object(obj.clone()).to_string())),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        match self.target_turn(event) {
            Some(turn) if turn.completed => {
                debug!(turn_id = %turn.turn_id, "ignoring failure of completed turn");
            }
            Some(turn) => {
                turn.failed = true;
                turn.error = error;
            }
            None => debug!("turn.failed for unknown turn"),
        }
    }

    /// First turn with the event's id, or the latest open turn when the
    /// event carries no id.
    fn target_turn(&mut self, event: &Map<String, Value>) -> Option<&mut Turn> {
        match id_field(event, "turn_id") {
            Some(turn_id) => self.session.turns.iter_mut().find(|t| t.turn_id == turn_id),
            None => self.session.turns.iter_mut().rev().find(|t| !t.is_terminal()),
        }
    }

    fn item_started(&mut self, event: &Map<String, Value>) {
        let item = RawItem::from_event(event);
        if let Some(id) = item.id {
            self.pending.insert(
                id,
                PendingItem {
                    item_type: item.item_type,
                    content: String::new(),
                },
            );
        }
    }

    fn item_updated(&mut self, event: &Map<String, Value>) {
        let item = RawItem::from_event(event);
        let Some(pending) = item.id.as_ref().and_then(|id| self.pending.get_mut(id)) else {
            return;
        };
        if pending.item_type.is_none() {
            pending.item_type = item.item_type.clone();
        }
        if let Some(fragment) = item.content.as_deref() {
            pending.content.push_str(fragment);
        }
    }

    fn item_completed(&mut self, event: &Map<String, Value>) -> Result<(), EventError> {
        let item = RawItem::from_event(event);
        let pending = item
            .id
            .as_ref()
            .and_then(|id| self.pending.remove(id))
            .unwrap_or_default();

        let item_type = item.item_type.clone().or(pending.item_type);
        let content = if pending.content.is_empty() {
            item.content.clone().unwrap_or_default()
        } else {
            pending.content
        };

        match item_type.as_deref() {
            Some("agent_message") | Some("assistant_message") => {
                if !content.trim().is_empty() {
                    self.session.agent_messages.push(content);
                }
            }
            Some("reasoning") => {
                if !content.trim().is_empty() {
                    self.session.reasoning_summaries.push(content);
                }
            }
            Some("command_execution") => self.command_execution(&item, &content)?,
            Some("file_change") => self.file_change(&item, &content),
            Some("todo_list") => self.todo_list(&item, &content),
            other => debug!(item_type = ?other, "discarding item"),
        }
        Ok(())
    }

    fn command_execution(&mut self, item: &RawItem, content: &str) -> Result<(), EventError> {
        let command = item
            .str_field("command")
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| content.to_string());
        let exit_code = match item.field("exit_code") {
            Some(value) => integer_value("exit_code", value)?,
            None => 0,
        };
        let output = item
            .str_field("output")
            .or_else(|| item.str_field("aggregated_output"))
            .unwrap_or_default();
        let duration_seconds = item
            .field("duration_seconds")
            .or_else(|| item.field("duration"))
            .and_then(Value::as_f64);

        self.session.commands.push(CommandExecution {
            command,
            exit_code,
            output,
            duration_seconds,
        });
        Ok(())
    }

    fn file_change(&mut self, item: &RawItem, content: &str) {
        let content_preview =
            (!content.is_empty()).then(|| truncate_chars(content, CONTENT_PREVIEW_CHARS));

        let changes = item
            .field("changes")
            .and_then(Value::as_array)
            .filter(|changes| !changes.is_empty());

        if let Some(changes) = changes {
            for entry in changes.iter().filter_map(Value::as_object) {
                let Some(path) = entry.get("path").and_then(Value::as_str) else {
                    continue;
                };
                let change_type = change_kind(entry).unwrap_or_default();
                self.session.file_changes.push(FileChange {
                    path: path.to_string(),
                    change_type,
                    content_preview: content_preview.clone(),
                });
            }
            return;
        }

        match item.str_field("path").filter(|p| !p.is_empty()) {
            Some(path) => {
                let change_type = item
                    .str_field("change_type")
                    .map(|kind| ChangeType::from_kind(&kind))
                    .unwrap_or_default();
                self.session.file_changes.push(FileChange {
                    path,
                    change_type,
                    content_preview,
                });
            }
            None => debug!("file_change item without a path"),
        }
    }

    fn todo_list(&mut self, item: &RawItem, content: &str) {
        let entries = match item.field("items") {
            Some(Value::Array(entries)) => entries.clone(),
            _ => match serde_json::from_str::<Value>(content) {
                Ok(Value::Array(entries)) => entries,
                Ok(Value::Object(obj)) => obj
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
        };

        for entry in entries.iter().filter_map(Value::as_object) {
            let task = ["task", "text", "content", "title"]
                .iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_str))
                .unwrap_or_default();
            if task.trim().is_empty() {
                continue;
            }
            let status = match entry.get("status").and_then(Value::as_str) {
                Some(status) => TodoStatus::parse(status),
                None => match entry.get("completed").and_then(Value::as_bool) {
                    Some(true) => TodoStatus::Completed,
                    _ => TodoStatus::NotStarted,
                },
            };
            self.session.todo_items.push(TodoItem {
                task: task.to_string(),
                status,
            });
        }
    }
}

/// Id fields may arrive as strings or numbers.
fn id_field(event: &Map<String, Value>, name: &str) -> Option<String> {
    match event.get(name)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Change kind from a `changes` entry: `"kind": "update"` or
/// `"kind": {"type": "update"}`.
fn change_kind(entry: &Map<String, Value>) -> Option<ChangeType> {
    let kind = entry.get("kind").or_else(|| entry.get("change_type"))?;
    let kind = match kind {
        Value::String(kind) => kind.as_str(),
        Value::Object(obj) => obj.get("type").and_then(Value::as_str)?,
        _ => return None,
    };
    Some(ChangeType::from_kind(kind))
}

/// Non-negative counter; missing or null is 0.
fn count_field(obj: &Map<String, Value>, name: &str) -> Result<u64, EventError> {
    match obj.get(name) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => {
            let count = integer_value(name, value)?;
            u64::try_from(count).map_err(|_| EventError::InvalidInteger {
                field: name.to_string(),
                value: value.to_string(),
            })
        }
    }
}

fn integer_value(field: &str, value: &Value) -> Result<i64, EventError> {
    let parsed = match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| EventError::InvalidInteger {
        field: field.to_string(),
        value: value.to_string(),
    })
}
