//! Session reconstruction from Codex event streams.
//!
//! - [`parser`] - JSONL event stream to [`Session`]
//! - [`types`] - the typed session model
//!
//! ```
//! use codex_analyzer::session::EventStreamParser;
//!
//! let session = EventStreamParser::parse(r#"{"type":"thread.started","thread_id":"t1"}"#);
//! assert_eq!(session.thread_id.as_deref(), Some("t1"));
//! ```

mod item;
mod parser;
mod types;

pub use parser::{EventError, EventStreamParser};
pub use types::{
    ChangeType, CommandExecution, FileChange, Session, SessionSummary, TodoItem, TodoStatus,
    Turn, CONTENT_PREVIEW_CHARS,
};
