//! Command handlers for the codex-analyzer CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod analyze;
pub mod completions;
pub mod config;
pub mod digest;
pub mod evidence;
pub mod parse;
pub mod providers;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use codex_analyzer::analyzer::extract_tasks;
use codex_analyzer::Config;

use crate::cli::TaskArgs;

/// Read a session log from a path, or stdin for `-`.
pub fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read session from stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(file).with_context(|| format!("Failed to read session file: {}", file))
}

/// Load the config from an explicit path or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load_from(path)
        }
        None => Config::load(),
    }
}

/// Tasks from `--task` flags followed by the tasks file, without duplicates.
pub fn collect_tasks(args: &TaskArgs) -> Result<Vec<String>> {
    let mut tasks: Vec<String> = Vec::new();
    let mut push = |task: String| {
        let task = task.trim().to_string();
        if !task.is_empty() && !tasks.contains(&task) {
            tasks.push(task);
        }
    };

    for task in &args.task {
        push(task.clone());
    }
    if let Some(ref path) = args.tasks_file {
        let markdown = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tasks file: {}", path))?;
        for task in extract_tasks(&markdown, args.include_checked) {
            push(task);
        }
    }

    Ok(tasks)
}
