//! Prompt building for remote classifiers.

use crate::text::{char_len, truncate_chars};

/// Build the classification prompt.
///
/// Uses the template from `src/analyzer/prompts/classify.txt`. The session
/// text is truncated to `text_limit` characters.
pub fn build_classify_prompt(
    text: &str,
    tasks: &[String],
    context: Option<&str>,
    text_limit: usize,
) -> String {
    const TEMPLATE: &str = include_str!("prompts/classify.txt");

    let task_list = if tasks.is_empty() {
        "(no tasks provided)".to_string()
    } else {
        tasks
            .iter()
            .map(|task| format!("- [ ] {}", task))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let session_text = if char_len(text) > text_limit {
        tracing::debug!(
            chars = char_len(text),
            limit = text_limit,
            "Truncating session text for prompt"
        );
        truncate_chars(text, text_limit)
    } else if text.trim().is_empty() {
        "(no session output)".to_string()
    } else {
        text.to_string()
    };

    let context_section = match context.map(str::trim) {
        Some(context) if !context.is_empty() => {
            format!("\n## Additional Context\n\n{}\n", context)
        }
        _ => String::new(),
    };

    TEMPLATE
        .replace("{task_list}", &task_list)
        .replace("{context_section}", &context_section)
        .replace("{session_text}", &session_text)
}
