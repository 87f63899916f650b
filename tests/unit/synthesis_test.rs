//! Unit tests for evidence digest synthesis

use codex_analyzer::analyzer::synthesis::{AGENT_MESSAGE_CHARS, REASONING_CHARS};
use codex_analyzer::analyzer::EvidenceSynthesizer;
use codex_analyzer::session::{ChangeType, CommandExecution, FileChange, Session};
use codex_analyzer::text::char_len;
use codex_analyzer::EventStreamParser;

use crate::helpers::load_fixture;

/// Length of the longest run of `ch` in `text`.
fn longest_run(text: &str, ch: char) -> usize {
    let (mut best, mut current) = (0, 0);
    for c in text.chars() {
        current = if c == ch { current + 1 } else { 0 };
        best = best.max(current);
    }
    best
}

fn flat_session() -> Session {
    EventStreamParser::parse(&load_fixture("flat_session.jsonl"))
}

#[test]
fn digest_contains_every_section_in_priority_order() {
    let digest = EvidenceSynthesizer::new().synthesize(&flat_session());

    let order = [
        "## Agent Messages",
        "## Reasoning Summaries",
        "## Todo List",
        "## Files Modified",
        "## Commands Executed",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|title| digest.find(title).unwrap_or_else(|| panic!("missing {}", title)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn digest_renders_items() {
    let digest = EvidenceSynthesizer::new().synthesize(&flat_session());

    assert!(digest.contains("Finished: the rate limiter is implemented"));
    assert!(digest.contains("✓ Add login rate limiter"));
    assert!(digest.contains("○ Document the limiter"));
    assert!(digest.contains("- src/auth/rate_limit.py (added)"));
    assert!(digest.contains("Preview: class RateLimiter: pass"));
    assert!(digest.contains("Total: 2 | Successful: 2 | Failed: 0"));
    assert!(digest.contains("$ pytest tests/test_rate_limit.py -q"));
    // `ls` output is too short to be worth showing
    assert!(!digest.contains("$ ls"));
}

#[test]
fn reasoning_can_be_excluded() {
    let digest = EvidenceSynthesizer::new()
        .include_reasoning(false)
        .synthesize(&flat_session());
    assert!(!digest.contains("## Reasoning Summaries"));
    assert!(!digest.contains("next to the login handler"));
}

#[test]
fn failed_commands_show_exit_code() {
    let session = EventStreamParser::parse(&load_fixture("nested_session.jsonl"));
    let digest = EvidenceSynthesizer::new().synthesize(&session);

    assert!(digest.contains("### Failed Commands"));
    assert!(digest.contains("$ cargo clippy (exit 101)"));
    assert!(digest.contains("- src/config/legacy.rs (deleted)"));
}

#[test]
fn long_sessions_keep_most_recent_messages_within_budget() {
    let session = Session {
        agent_messages: (0..50)
            .map(|i| format!("message {:02} {}", i, "x".repeat(990)))
            .collect(),
        ..Session::default()
    };

    let digest = EvidenceSynthesizer::new().max_length(3000).synthesize(&session);

    assert!(char_len(&digest) <= 3000);
    assert!(digest.contains("message 49"));
    assert!(digest.contains("message 48"));
    assert!(!digest.contains("message 00"));
    assert!(digest.contains("(48 earlier messages omitted)"));
}

#[test]
fn oversized_message_is_truncated_but_kept() {
    let session = Session {
        agent_messages: vec!["y".repeat(10_000)],
        ..Session::default()
    };

    let digest = EvidenceSynthesizer::new().synthesize(&session);
    assert!(digest.contains('y'));
    assert!(char_len(&digest) < 2100);
}

#[test]
fn reasoning_summary_is_capped_per_item() {
    let session = Session {
        reasoning_summaries: vec!["r".repeat(5000)],
        ..Session::default()
    };

    let digest = EvidenceSynthesizer::new().synthesize(&session);
    let run = longest_run(&digest, 'r');
    assert!(run > 0);
    assert!(run <= REASONING_CHARS);
}

#[test]
fn agent_message_is_capped_per_item() {
    let session = Session {
        agent_messages: vec!["m".repeat(5000)],
        ..Session::default()
    };

    let digest = EvidenceSynthesizer::new().synthesize(&session);
    let run = longest_run(&digest, 'm');
    assert!(run > REASONING_CHARS);
    assert!(run <= AGENT_MESSAGE_CHARS);
}

#[test]
fn short_digest_gets_work_evidence_summary() {
    let session = Session {
        file_changes: vec![FileChange {
            path: "src/lib.rs".to_string(),
            change_type: ChangeType::Modified,
            content_preview: None,
        }],
        commands: vec![CommandExecution {
            command: "cargo test".to_string(),
            exit_code: 0,
            output: "3 passed in 0.1s".to_string(),
            duration_seconds: None,
        }],
        ..Session::default()
    };

    let digest = EvidenceSynthesizer::new().synthesize(&session);
    assert!(digest.starts_with("## Work Evidence Summary"));
    assert!(digest.contains("Files modified (1):"));
    assert!(digest.contains("Commands run: 1 (1 successful, 0 failed)"));
    assert!(digest.contains("## Files Modified"));
}

#[test]
fn empty_session_gives_empty_digest() {
    assert_eq!(EvidenceSynthesizer::new().synthesize(&Session::default()), "");
}
