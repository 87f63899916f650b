//! Unit tests for task-to-evidence matching

use codex_analyzer::analyzer::{extract_tasks, match_tasks, EvidenceMatcher, MatchConfidence};
use codex_analyzer::EventStreamParser;

use crate::helpers::{load_fixture, tasks};

#[test]
fn tasks_file_yields_unchecked_items() {
    let tasks = extract_tasks(&load_fixture("TASKS.md"), false);
    assert_eq!(
        tasks,
        vec![
            "Add login rate limiter",
            "Add unit tests for the rate limit module",
            "Document the limiter in `README.md`",
            "Migrate billing to the new invoice API",
        ]
    );
    assert!(extract_tasks(&load_fixture("TASKS.md"), true).contains(&"Set up CI".to_string()));
}

#[test]
fn flat_session_matches_worked_tasks_only() {
    let session = EventStreamParser::parse(&load_fixture("flat_session.jsonl"));
    let tasks = extract_tasks(&load_fixture("TASKS.md"), false);

    let matches = EvidenceMatcher::from_session(&session).match_tasks(&tasks);
    let matched: Vec<&str> = matches.iter().map(|m| m.task.as_str()).collect();
    assert_eq!(
        matched,
        vec!["Add login rate limiter", "Add unit tests for the rate limit module"]
    );

    assert_eq!(matches[0].confidence, MatchConfidence::High);
    assert_eq!(
        matches[0].evidence_files,
        vec!["src/auth/rate_limit.py", "tests/test_rate_limit.py"]
    );

    assert_eq!(matches[1].confidence, MatchConfidence::High);
    assert_eq!(matches[1].evidence_files, vec!["tests/test_rate_limit.py"]);
    assert!(matches[1].reason.contains("rate_limit"));
}

#[test]
fn nested_session_matches_with_synonyms() {
    let session = EventStreamParser::parse(&load_fixture("nested_session.jsonl"));
    let matcher = EvidenceMatcher::from_session(&session);

    assert!(matcher.keywords().contains("legacy"));
    assert!(matcher.keywords().contains("configuration"));

    let m = matcher
        .match_task("Remove legacy config")
        .expect("legacy removal matches");
    assert_eq!(m.confidence, MatchConfidence::High);
    assert!(m.evidence_files.contains(&"src/config/legacy.rs".to_string()));
}

#[test]
fn unrelated_task_is_omitted() {
    let matches = match_tasks(
        &tasks(&["Migrate billing to the new invoice API"]),
        &tasks(&["src/auth/rate_limit.py"]),
        &tasks(&["pytest -q"]),
    );
    assert!(matches.is_empty());
}

#[test]
fn file_reference_without_extension_path_prefix() {
    let matches = match_tasks(
        &tasks(&["Clean up ./docs/setup.md"]),
        &tasks(&["docs/setup.md"]),
        &[],
    );
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].confidence, MatchConfidence::High);
    assert_eq!(matches[0].evidence_files, vec!["docs/setup.md"]);
}

#[test]
fn match_serializes_with_lowercase_confidence() {
    let matches = match_tasks(
        &tasks(&["Update `main.rs`"]),
        &tasks(&["src/main.rs"]),
        &[],
    );
    let json = serde_json::to_value(&matches).unwrap();
    assert_eq!(json[0]["confidence"], "high");
    assert_eq!(json[0]["evidence_files"][0], "src/main.rs");
}
