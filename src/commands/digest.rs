//! Digest command handler

use std::path::Path;

use anyhow::Result;

use codex_analyzer::analyzer::EvidenceSynthesizer;
use codex_analyzer::EventStreamParser;

use super::{load_config, read_input};

/// Print the evidence digest a classifier would receive.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    config_path: Option<&Path>,
    file: &str,
    no_reasoning: bool,
    max_length: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let content = read_input(file)?;
    let session = EventStreamParser::parse(&content);
    if session.raw_event_count == 0 {
        anyhow::bail!("No events found in {}; is this a Codex JSONL log?", file);
    }

    let digest = EvidenceSynthesizer::new()
        .include_reasoning(config.analysis.include_reasoning && !no_reasoning)
        .max_length(max_length.unwrap_or(config.analysis.max_length))
        .synthesize(&session);
    println!("{}", digest);
    Ok(())
}
