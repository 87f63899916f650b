//! Unit tests for the SessionAnalyzer facade

use codex_analyzer::analyzer::{
    detect_data_source, AnalyzeOptions, DataSource, ProviderChain, ProviderKind, SessionAnalyzer,
};
use codex_analyzer::text::char_len;

use crate::helpers::{load_fixture, tasks};

fn heuristic_analyzer(options: AnalyzeOptions) -> SessionAnalyzer {
    SessionAnalyzer::new(options.force_provider(ProviderKind::Heuristic))
}

#[test]
fn event_stream_is_digested_and_classified() {
    let content = load_fixture("flat_session.jsonl");
    let tasks = tasks(&["Add login rate limiter", "Migrate billing to the new invoice API"]);

    let result = heuristic_analyzer(AnalyzeOptions::default()).analyze(&content, &tasks);

    assert_eq!(result.data_source, DataSource::EventStream);
    let session = result.session.as_ref().expect("session is kept");
    assert_eq!(session.thread_id.as_deref(), Some("thread-flat"));
    assert_eq!(result.input_length, char_len(&content));
    assert!(result.analysis_text_length > 0);
    assert_ne!(result.analysis_text_length, result.input_length);

    assert_eq!(result.analysis.provider_used, "heuristic");
    assert_eq!(result.analysis.completed_tasks, vec!["Add login rate limiter"]);
    assert_eq!(
        result.analysis.not_started(&tasks),
        vec!["Migrate billing to the new invoice API"]
    );
}

#[test]
fn plain_text_is_classified_as_is() {
    let content = load_fixture("plain_output.txt");
    let result = heuristic_analyzer(AnalyzeOptions::default())
        .analyze(&content, &tasks(&["Fix the login redirect"]));

    assert_eq!(result.data_source, DataSource::PlainText);
    assert!(result.session.is_none());
    assert_eq!(result.analysis_text_length, result.input_length);
    assert_eq!(result.analysis.completed_tasks, vec!["Fix the login redirect"]);
}

#[test]
fn forced_event_stream_degrades_when_nothing_decodes() {
    let options = AnalyzeOptions::default().data_source(DataSource::EventStream);
    let result = heuristic_analyzer(options)
        .analyze(&load_fixture("plain_output.txt"), &tasks(&["Fix the login redirect"]));

    assert_eq!(result.data_source, DataSource::PlainText);
    assert!(result.session.is_none());
}

#[test]
fn filtered_mode_drops_reasoning() {
    let content = load_fixture("flat_session.jsonl");
    let tasks = tasks(&["Add login rate limiter"]);

    let full = heuristic_analyzer(AnalyzeOptions::default()).analyze(&content, &tasks);
    let filtered = heuristic_analyzer(
        AnalyzeOptions::default().data_source(DataSource::EventStreamFiltered),
    )
    .analyze(&content, &tasks);

    assert_eq!(filtered.data_source, DataSource::EventStreamFiltered);
    assert!(filtered.analysis_text_length < full.analysis_text_length);
}

#[test]
fn malformed_stream_still_produces_result() {
    let content = load_fixture("malformed_session.jsonl");
    let result = heuristic_analyzer(AnalyzeOptions::default()).analyze(&content, &tasks(&["Anything"]));

    assert_eq!(result.data_source, DataSource::EventStream);
    let session = result.session.expect("partial session is kept");
    assert_eq!(session.raw_event_count, 5);
    assert_eq!(session.parse_errors.len(), 3);
}

#[test]
fn empty_input_yields_empty_classification() {
    let result = heuristic_analyzer(AnalyzeOptions::default()).analyze("", &tasks(&["Task A"]));

    assert_eq!(result.data_source, DataSource::PlainText);
    assert_eq!(result.input_length, 0);
    assert!(result.analysis.completed_tasks.is_empty());
    assert_eq!(result.analysis.confidence, 0.3);
}

#[test]
fn chain_failure_becomes_error_result() {
    let analyzer = SessionAnalyzer::with_chain(
        AnalyzeOptions::default(),
        ProviderChain::with_providers(Vec::new()),
    );
    let result = analyzer.analyze("Fixed it", &tasks(&["Fix it"]));

    assert!(result.analysis.is_error());
    assert_eq!(result.analysis.provider_used, "error");
    assert_eq!(result.analysis.confidence, 0.0);
    assert!(result.analysis.reasoning.contains("No classifier provider"));
}

#[test]
fn forced_provider_without_key_names_the_credential() {
    let mut options = AnalyzeOptions::default().force_provider(ProviderKind::OpenAi);
    options.provider_settings.providers.openai.api_key_env =
        Some("CODEX_ANALYZER_TEST_KEY_THAT_IS_NEVER_SET".to_string());
    let result = SessionAnalyzer::new(options).analyze("Fixed it", &tasks(&["Fix it"]));

    assert!(result.analysis.is_error());
    assert!(result
        .analysis
        .reasoning
        .contains("Provider 'openai' is not available. Set OPENAI_API_KEY"));
}

#[test]
fn batch_keeps_input_order() {
    let contents = vec![
        load_fixture("flat_session.jsonl"),
        load_fixture("plain_output.txt"),
        load_fixture("nested_session.jsonl"),
    ];
    let results = heuristic_analyzer(AnalyzeOptions::default())
        .analyze_batch(&contents, &tasks(&["Fix config loader"]));

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].session.as_ref().and_then(|s| s.thread_id.as_deref()),
        Some("thread-flat")
    );
    assert_eq!(results[1].data_source, DataSource::PlainText);
    assert_eq!(
        results[2].session.as_ref().and_then(|s| s.thread_id.as_deref()),
        Some("thread-nested")
    );
}

#[test]
fn detection_tolerates_a_few_bad_lines() {
    assert_eq!(
        detect_data_source(&load_fixture("malformed_session.jsonl")),
        DataSource::EventStream
    );
    assert_eq!(
        detect_data_source(&load_fixture("plain_output.txt")),
        DataSource::PlainText
    );
    assert_eq!(detect_data_source("   \n\n"), DataSource::PlainText);
}

#[test]
fn options_follow_config() {
    let mut config = codex_analyzer::Config::default();
    config.analysis.provider = Some("heuristic".to_string());
    config.analysis.include_reasoning = false;
    config.analysis.max_length = 1234;

    let options = AnalyzeOptions::from_config(&config).unwrap();
    assert_eq!(options.force_provider, Some(ProviderKind::Heuristic));
    assert!(!options.include_reasoning);
    assert_eq!(options.max_length, 1234);
    assert_eq!(SessionAnalyzer::new(options).chain().len(), 1);
}
