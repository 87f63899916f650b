//! Providers command handler

use std::path::Path;

use anyhow::Result;

use codex_analyzer::analyzer::{ProviderKind, ProviderSettings};

use super::load_config;

/// List providers in preference order with their availability.
#[cfg(not(tarpaulin_include))]
pub fn handle(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = ProviderSettings::from_config(&config);

    for (index, kind) in ProviderKind::ALL.iter().enumerate() {
        let provider = kind.create_with(&settings);
        let status = if provider.is_available() {
            "available".to_string()
        } else {
            match credential_env(kind, &config) {
                Some(var) => format!("unavailable (set {})", var),
                None => "unavailable".to_string(),
            }
        };
        let forced = config.analysis.provider.as_deref() == Some(kind.as_str());
        println!(
            "{}. {:<14} {}{}",
            index + 1,
            kind.as_str(),
            status,
            if forced { " [forced by config]" } else { "" }
        );
    }
    Ok(())
}

/// Credential variable after config overrides.
fn credential_env(kind: &ProviderKind, config: &codex_analyzer::Config) -> Option<String> {
    let configured = match kind {
        ProviderKind::GitHubModels => config.providers.github_models.api_key_env.clone(),
        ProviderKind::OpenAi => config.providers.openai.api_key_env.clone(),
        ProviderKind::Heuristic => None,
    };
    configured.or_else(|| kind.credential_env().map(str::to_string))
}
