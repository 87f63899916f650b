//! Unit tests for classifier providers and the fallback chain

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use codex_analyzer::analyzer::provider::{
    extract_json, parse_classification, ProviderResult, HEURISTIC_CONFIDENCE,
};
use codex_analyzer::analyzer::{
    ChainError, ClassifierProvider, CompletionAnalysis, HeuristicProvider, OpenAiProvider,
    ProviderChain, ProviderError, ProviderKind, ProviderSettings,
};

use crate::helpers::{load_fixture, tasks};

const MISSING_KEY_ENV: &str = "CODEX_ANALYZER_TEST_KEY_THAT_IS_NEVER_SET";

/// Provider with a scripted outcome that counts its calls.
struct ScriptedProvider {
    name: &'static str,
    available: bool,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn boxed(
        name: &'static str,
        available: bool,
        fail: bool,
    ) -> (Box<dyn ClassifierProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            name,
            available,
            fail,
            calls: Arc::clone(&calls),
        };
        (Box::new(provider), calls)
    }
}

impl ClassifierProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn analyze_completion(
        &self,
        _text: &str,
        tasks: &[String],
        _context: Option<&str>,
    ) -> ProviderResult<CompletionAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Status {
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }
        Ok(CompletionAnalysis::from_buckets(
            tasks,
            tasks,
            &[],
            &[],
            0.9,
            "scripted",
            self.name,
        ))
    }
}

fn settings_without_credentials() -> ProviderSettings {
    let mut settings = ProviderSettings::default();
    settings.providers.github_models.api_key_env = Some(MISSING_KEY_ENV.to_string());
    settings.providers.openai.api_key_env = Some(MISSING_KEY_ENV.to_string());
    settings
}

#[test]
fn chain_falls_through_to_heuristic() {
    let chain = ProviderChain::from_settings(&settings_without_credentials());
    assert_eq!(
        chain.availability(),
        vec![("github-models", false), ("openai", false), ("heuristic", true)]
    );

    let analysis = chain
        .analyze_completion(
            &load_fixture("plain_output.txt"),
            &tasks(&["Fix the login redirect"]),
            None,
        )
        .unwrap();
    assert_eq!(analysis.provider_used, "heuristic");
    assert_eq!(analysis.confidence, HEURISTIC_CONFIDENCE);
    assert_eq!(analysis.completed_tasks, vec!["Fix the login redirect"]);
}

#[test]
fn failing_provider_hands_over_to_next() {
    let (first, first_calls) = ScriptedProvider::boxed("first", true, true);
    let (second, second_calls) = ScriptedProvider::boxed("second", true, false);
    let chain = ProviderChain::with_providers(vec![first, second]);

    let analysis = chain
        .analyze_completion("text", &tasks(&["Task A"]), None)
        .unwrap();
    assert_eq!(analysis.provider_used, "second");
    assert_eq!(analysis.completed_tasks, vec!["Task A"]);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unavailable_providers_are_never_called() {
    let (skipped, skipped_calls) = ScriptedProvider::boxed("skipped", false, false);
    let (used, _) = ScriptedProvider::boxed("used", true, false);
    let chain = ProviderChain::with_providers(vec![skipped, used]);

    let analysis = chain.analyze_completion("text", &tasks(&["A"]), None).unwrap();
    assert_eq!(analysis.provider_used, "used");
    assert_eq!(skipped_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn all_failures_are_reported() {
    let (first, _) = ScriptedProvider::boxed("first", true, true);
    let (second, _) = ScriptedProvider::boxed("second", true, true);
    let chain = ProviderChain::with_providers(vec![first, second]);

    match chain.analyze_completion("text", &tasks(&["A"]), None) {
        Err(ChainError::AllProvidersFailed { failures }) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].0, "first");
            assert_eq!(failures[1].0, "second");
            assert!(matches!(
                failures[1].1,
                ProviderError::Status { status: 500, .. }
            ));
        }
        other => panic!("expected AllProvidersFailed, got {:?}", other),
    }
}

#[test]
fn empty_chain_has_no_provider() {
    let chain = ProviderChain::with_providers(Vec::new());
    assert!(chain.is_empty());
    assert!(matches!(
        chain.analyze_completion("text", &tasks(&["A"]), None),
        Err(ChainError::NoProviderAvailable { skipped }) if skipped.is_empty()
    ));
}

#[test]
fn remote_provider_without_key_is_unavailable() {
    let provider = OpenAiProvider::from_settings(&settings_without_credentials());
    assert!(!provider.is_available());
    assert!(matches!(
        provider.analyze_completion("text", &tasks(&["A"]), None),
        Err(ProviderError::NotAvailable(_))
    ));
}

#[test]
fn forced_chain_contains_only_that_provider() {
    let chain = ProviderChain::forced(ProviderKind::Heuristic, &ProviderSettings::default());
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.availability(), vec![("heuristic", true)]);
}

#[test]
fn provider_kind_names_round_trip() {
    for kind in ProviderKind::ALL {
        assert_eq!(kind.as_str().parse::<ProviderKind>(), Ok(kind));
    }
    assert!("bard".parse::<ProviderKind>().is_err());
}

#[test]
fn heuristic_without_signal_leaves_tasks_unclassified() {
    let analysis = HeuristicProvider::new().classify(
        "Looked at the login page",
        &tasks(&["Review login page"]),
    );
    assert!(analysis.completed_tasks.is_empty());
    assert!(analysis.in_progress_tasks.is_empty());
    assert!(analysis.blocked_tasks.is_empty());
    assert_eq!(analysis.provider_used, "heuristic");
}

#[test]
fn heuristic_blocked_signal() {
    let analysis = HeuristicProvider::new().classify(
        "Migration is stuck on the billing schema",
        &tasks(&["Migrate billing"]),
    );
    assert_eq!(analysis.blocked_tasks, vec!["Migrate billing"]);
}

#[test]
fn json_embedded_in_prose_is_extracted() {
    let response = "Sure! Here you go:\n```json\n{\"completed\": [\"A\"], \"confidence\": 0.8}\n```";
    let json = extract_json(response).unwrap();
    assert_eq!(json["confidence"], 0.8);
}

#[test]
fn classification_parse_resolves_tasks_loosely() {
    let response = r#"{"completed": ["  task a "], "in_progress": [], "blocked": ["Task B", "Unknown"], "confidence": 1.7, "reasoning": "ok"}"#;
    let analysis = parse_classification(response, &tasks(&["Task A", "Task B"]), "openai");

    assert_eq!(analysis.completed_tasks, vec!["Task A"]);
    assert_eq!(analysis.blocked_tasks, vec!["Task B"]);
    assert_eq!(analysis.confidence, 1.0);
    assert_eq!(analysis.provider_used, "openai");
}

#[test]
fn unparseable_response_has_zero_confidence() {
    let analysis = parse_classification("I could not decide.", &tasks(&["A"]), "openai");
    assert_eq!(analysis.confidence, 0.0);
    assert!(analysis.completed_tasks.is_empty());
    assert!(analysis.reasoning.starts_with("Failed to parse JSON from openai response"));
}
