//! Evidence command handler

use anyhow::Result;

use codex_analyzer::analyzer::{AnalysisError, EvidenceMatcher};
use codex_analyzer::EventStreamParser;

use super::{collect_tasks, read_input};
use crate::cli::TaskArgs;

/// Print heuristic task matches as JSON.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &str, task_args: &TaskArgs, pretty: bool) -> Result<()> {
    let tasks = collect_tasks(task_args)?;
    if tasks.is_empty() {
        return Err(AnalysisError::NoTasks.into());
    }

    let content = read_input(file)?;
    let session = EventStreamParser::parse(&content);
    let matches = EvidenceMatcher::from_session(&session).match_tasks(&tasks);

    let json = if pretty {
        serde_json::to_string_pretty(&matches)?
    } else {
        serde_json::to_string(&matches)?
    };
    println!("{}", json);
    Ok(())
}
