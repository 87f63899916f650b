//! Analyze command handler
//!
//! Uses the SessionAnalyzer facade:
//! 1. Load config and merge CLI overrides
//! 2. Collect tasks from flags and the tasks file
//! 3. Analyze the session log
//! 4. Render the result

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use codex_analyzer::analyzer::{AnalysisError, AnalyzeOptions, DataSource, ProviderKind};
use codex_analyzer::output::{render, OutputFormat};
use codex_analyzer::SessionAnalyzer;

use super::{collect_tasks, load_config, read_input};
use crate::cli::TaskArgs;

/// CLI flags that override config values.
#[derive(Debug, Default)]
pub struct Overrides {
    pub data_source: Option<DataSource>,
    pub no_reasoning: bool,
    pub provider: Option<String>,
    pub context: Option<String>,
    pub max_length: Option<usize>,
    pub timeout: Option<u64>,
}

/// Classify tasks against a session log and print the result.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    config_path: Option<&Path>,
    file: &str,
    task_args: &TaskArgs,
    overrides: Overrides,
    format: OutputFormat,
) -> Result<()> {
    let tasks = collect_tasks(task_args)?;
    if tasks.is_empty() {
        return Err(AnalysisError::NoTasks.into());
    }

    let config = load_config(config_path)?;
    let options = build_options(
        AnalyzeOptions::from_config(&config).map_err(|e| anyhow::anyhow!(e))?,
        overrides,
    )?;

    let content = read_input(file)?;
    let analyzer = SessionAnalyzer::new(options);
    let result = analyzer.analyze(&content, &tasks);

    println!("{}", render(&result, &tasks, format)?.trim_end());
    Ok(())
}

/// Apply CLI overrides on top of config-derived options.
pub(crate) fn build_options(mut options: AnalyzeOptions, overrides: Overrides) -> Result<AnalyzeOptions> {
    if let Some(source) = overrides.data_source {
        options = options.data_source(source);
    }
    if overrides.no_reasoning {
        options = options.include_reasoning(false);
    }
    if let Some(ref name) = overrides.provider {
        let kind: ProviderKind = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        options = options.force_provider(kind);
    }
    if let Some(context) = overrides.context {
        options = options.context(context);
    }
    if let Some(max_length) = overrides.max_length {
        options = options.max_length(max_length);
    }
    if let Some(secs) = overrides.timeout {
        if secs == 0 {
            anyhow::bail!("--timeout must be > 0");
        }
        options.provider_settings = options.provider_settings.timeout(Duration::from_secs(secs));
    }
    Ok(options)
}
