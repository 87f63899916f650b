//! Rendering of analysis results for the CLI.
//!
//! JSON output replaces the full session with its counters so the output
//! stays bounded regardless of log size.

use clap::ValueEnum;
use serde::Serialize;

use crate::analyzer::{AnalysisResult, CompletionAnalysis, DataSource};
use crate::session::SessionSummary;

/// Confidence below which the GitHub format emits a warning.
const LOW_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    JsonPretty,
    /// Markdown report
    Markdown,
    /// GitHub Actions workflow annotations
    Github,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    #[serde(flatten)]
    analysis: &'a CompletionAnalysis,
    not_started_tasks: Vec<&'a String>,
    data_source: DataSource,
    input_length: usize,
    analysis_text_length: usize,
    session: Option<SessionSummary>,
}

/// Render `result` for `tasks` in the requested format.
pub fn render(
    result: &AnalysisResult,
    tasks: &[String],
    format: OutputFormat,
) -> serde_json::Result<String> {
    let view = ResultView {
        analysis: &result.analysis,
        not_started_tasks: result.analysis.not_started(tasks),
        data_source: result.data_source,
        input_length: result.input_length,
        analysis_text_length: result.analysis_text_length,
        session: result.session.as_ref().map(|s| s.summary()),
    };

    match format {
        OutputFormat::Json => serde_json::to_string(&view),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&view),
        OutputFormat::Markdown => Ok(render_markdown(&view)),
        OutputFormat::Github => Ok(render_github(&view)),
    }
}

fn render_markdown(view: &ResultView<'_>) -> String {
    let analysis = view.analysis;
    let mut out = String::from("## Codex Session Analysis\n\n");

    out.push_str("| | |\n|---|---|\n");
    out.push_str(&format!("| Provider | {} |\n", analysis.provider_used));
    out.push_str(&format!(
        "| Confidence | {:.0}% |\n",
        analysis.confidence * 100.0
    ));
    out.push_str(&format!("| Data source | {} |\n", view.data_source));
    out.push_str(&format!(
        "| Input | {} chars (analyzed {}) |\n",
        view.input_length, view.analysis_text_length
    ));
    if let Some(ref session) = view.session {
        out.push_str(&format!(
            "| Session | {} turn(s), {} command(s) ({} failed), {} file change(s) |\n",
            session.turns, session.commands, session.failed_commands, session.file_changes
        ));
    }

    let sections: [(&str, Vec<&String>); 4] = [
        ("Completed", analysis.completed_tasks.iter().collect()),
        ("In Progress", analysis.in_progress_tasks.iter().collect()),
        ("Blocked", analysis.blocked_tasks.iter().collect()),
        ("Not Started", view.not_started_tasks.clone()),
    ];
    for (title, tasks) in sections {
        if tasks.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### {} ({})\n\n", title, tasks.len()));
        let mark = if title == "Completed" { "x" } else { " " };
        for task in tasks {
            out.push_str(&format!("- [{}] {}\n", mark, task));
        }
    }

    if !analysis.reasoning.trim().is_empty() {
        out.push_str("\n### Reasoning\n\n");
        out.push_str(analysis.reasoning.trim());
        out.push('\n');
    }
    out
}

fn render_github(view: &ResultView<'_>) -> String {
    let analysis = view.analysis;
    let mut lines = Vec::new();

    if analysis.is_error() {
        lines.push(format!(
            "::error title=Analysis failed::{}",
            escape_data(&analysis.reasoning)
        ));
    }
    for task in &analysis.completed_tasks {
        lines.push(format!("::notice title=Task completed::{}", escape_data(task)));
    }
    for task in &analysis.in_progress_tasks {
        lines.push(format!("::notice title=Task in progress::{}", escape_data(task)));
    }
    for task in &analysis.blocked_tasks {
        lines.push(format!("::warning title=Task blocked::{}", escape_data(task)));
    }
    if !analysis.is_error() && analysis.confidence < LOW_CONFIDENCE {
        lines.push(format!(
            "::warning title=Low confidence::Confidence {:.2} from {}",
            analysis.confidence, analysis.provider_used
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Escape a workflow command message.
fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
