//! Parse command handler

use anyhow::Result;

use codex_analyzer::EventStreamParser;

use super::read_input;

/// Print the reconstructed session (or its summary) as JSON.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &str, full: bool) -> Result<()> {
    let content = read_input(file)?;
    let session = EventStreamParser::parse(&content);

    for error in &session.parse_errors {
        tracing::warn!("{}", error);
    }

    let json = if full {
        serde_json::to_string_pretty(&session)?
    } else {
        serde_json::to_string_pretty(&session.summary())?
    };
    println!("{}", json);
    Ok(())
}
