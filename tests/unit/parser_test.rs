//! Unit tests for the event stream parser

use std::io::Cursor;

use codex_analyzer::session::{ChangeType, EventStreamParser, TodoStatus};

use crate::helpers::load_fixture;

#[test]
fn flat_fixture_reconstructs_session() {
    let session = EventStreamParser::parse(&load_fixture("flat_session.jsonl"));

    assert_eq!(session.thread_id.as_deref(), Some("thread-flat"));
    assert_eq!(session.raw_event_count, 14);
    assert!(session.parse_errors.is_empty());

    assert_eq!(session.turns.len(), 1);
    let turn = &session.turns[0];
    assert_eq!(turn.turn_id, "turn-1");
    assert!(turn.completed);
    assert!(!turn.failed);
    assert_eq!(
        (turn.input_tokens, turn.output_tokens, turn.reasoning_tokens),
        (1200, 340, 55)
    );

    assert_eq!(
        session.agent_messages,
        vec![
            "I'll add the login rate limiter and cover it with tests.".to_string(),
            "Finished: the rate limiter is implemented and all 4 tests pass.".to_string(),
        ]
    );
    assert_eq!(session.reasoning_summaries.len(), 1);
}

#[test]
fn flat_fixture_records_work_items() {
    let session = EventStreamParser::parse(&load_fixture("flat_session.jsonl"));

    assert_eq!(session.file_changes.len(), 2);
    assert_eq!(session.file_changes[0].path, "src/auth/rate_limit.py");
    assert_eq!(session.file_changes[0].change_type, ChangeType::Added);
    assert_eq!(
        session.file_changes[0].content_preview.as_deref(),
        Some("class RateLimiter:\n    pass\n")
    );
    assert_eq!(session.file_changes[1].content_preview, None);

    assert_eq!(session.commands.len(), 2);
    let pytest = &session.commands[0];
    assert_eq!(pytest.command, "pytest tests/test_rate_limit.py -q");
    assert!(pytest.is_success());
    assert!(pytest.output.contains("4 passed in 0.42s"));
    assert_eq!(pytest.duration_seconds, Some(1.3));

    assert_eq!(session.todo_items.len(), 2);
    assert_eq!(session.todo_items[0].status, TodoStatus::Completed);
    assert_eq!(session.todo_items[1].task, "Document the limiter");
    assert_eq!(session.todo_items[1].status, TodoStatus::NotStarted);
}

#[test]
fn nested_fixture_reconstructs_session() {
    let session = EventStreamParser::parse(&load_fixture("nested_session.jsonl"));

    assert_eq!(session.thread_id.as_deref(), Some("thread-nested"));
    assert_eq!(session.raw_event_count, 9);
    assert!(session.parse_errors.is_empty());

    assert_eq!(session.turns.len(), 1);
    assert_eq!(session.turns[0].turn_id, "turn-1");
    assert!(session.turns[0].completed);
    assert_eq!(session.total_input_tokens(), 800);
    assert_eq!(session.total_output_tokens(), 120);
    assert_eq!(session.total_reasoning_tokens(), 0);

    assert_eq!(session.agent_messages.len(), 1);
    assert_eq!(session.commands.len(), 2);
    assert_eq!(session.commands[0].command, "cargo test config");
    assert!(session.commands[0].output.contains("6 passed"));
    assert_eq!(session.commands[1].exit_code, 101);
    assert_eq!(session.failed_commands().count(), 1);

    assert_eq!(
        session.changed_paths(),
        vec!["src/config/loader.rs".to_string(), "src/config/legacy.rs".to_string()]
    );
    assert_eq!(session.file_changes[0].change_type, ChangeType::Modified);
    assert_eq!(session.file_changes[1].change_type, ChangeType::Deleted);

    assert_eq!(session.todo_items[0].task, "Fix config loader");
    assert_eq!(session.todo_items[0].status, TodoStatus::Completed);
    assert_eq!(session.todo_items[1].status, TodoStatus::NotStarted);
}

#[test]
fn malformed_lines_are_recorded_and_skipped() {
    let session = EventStreamParser::parse(&load_fixture("malformed_session.jsonl"));

    // Line 5 has a numeric type and is ignored without an error.
    assert_eq!(session.raw_event_count, 5);
    assert_eq!(session.parse_errors.len(), 3);
    assert!(session.parse_errors[0].starts_with("line 2: invalid JSON"));
    assert_eq!(session.parse_errors[1], "line 4: event is not a JSON object");
    assert_eq!(
        session.parse_errors[2],
        "line 7: field 'input_tokens' is not a valid integer: \"lots\""
    );

    assert_eq!(session.thread_id.as_deref(), Some("thread-bad"));
    assert_eq!(session.agent_messages, vec!["Still here.".to_string()]);

    let turn = session.turn("t1").expect("turn t1 exists");
    assert!(!turn.completed);
    assert!(turn.failed);
    assert_eq!(turn.error.as_deref(), Some("context window exceeded"));
    assert_eq!(session.failed_turns(), 1);
}

#[test]
fn both_schemas_produce_the_same_message() {
    let flat = EventStreamParser::parse(
        r#"{"type":"item.completed","item_id":"i1","item_type":"agent_message","content":"Done"}"#,
    );
    let nested = EventStreamParser::parse(
        r#"{"type":"item.completed","item":{"id":"i1","type":"agent_message","text":"Done"}}"#,
    );
    assert_eq!(flat.agent_messages, nested.agent_messages);
    assert_eq!(flat.agent_messages, vec!["Done".to_string()]);
}

#[test]
fn parsing_is_idempotent() {
    let content = load_fixture("nested_session.jsonl");
    assert_eq!(EventStreamParser::parse(&content), EventStreamParser::parse(&content));
}

#[test]
fn reader_and_str_parsing_agree() {
    let content = load_fixture("flat_session.jsonl");
    let from_reader = EventStreamParser::parse_reader(Cursor::new(content.as_bytes()));
    assert_eq!(from_reader, EventStreamParser::parse(&content));
}

#[test]
fn token_totals_only_count_completed_turns() {
    let content = concat!(
        "{\"type\":\"turn.started\",\"turn_id\":\"a\"}\n",
        "{\"type\":\"turn.completed\",\"turn_id\":\"a\",\"token_usage\":{\"input_tokens\":10,\"output_tokens\":4}}\n",
        "{\"type\":\"turn.started\",\"turn_id\":\"b\"}\n",
        "{\"type\":\"turn.failed\",\"turn_id\":\"b\",\"error\":\"boom\"}\n",
        "{\"type\":\"turn.completed\",\"turn_id\":\"b\",\"token_usage\":{\"input_tokens\":99}}\n",
    );
    let session = EventStreamParser::parse(content);

    assert_eq!(session.completed_turns(), 1);
    assert_eq!(session.failed_turns(), 1);
    assert_eq!(session.total_input_tokens(), 10);
    assert_eq!(session.total_output_tokens(), 4);
}

#[test]
fn empty_input_yields_empty_session() {
    let session = EventStreamParser::parse("");
    assert!(session.is_empty());
    assert_eq!(session.raw_event_count, 0);
    assert!(session.parse_errors.is_empty());
}

#[test]
fn summary_counts_match_session() {
    let session = EventStreamParser::parse(&load_fixture("flat_session.jsonl"));
    let summary = session.summary();

    assert_eq!(summary.thread_id.as_deref(), Some("thread-flat"));
    assert_eq!(summary.turns, 1);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.successful_commands, 2);
    assert_eq!(summary.file_changes, 2);
    assert_eq!(summary.todo_items, 2);
    assert_eq!(summary.total_input_tokens, 1200);
    assert_eq!(summary.parse_errors, 0);
}
