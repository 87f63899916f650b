//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisConfig, ProvidersConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.analysis.validate()?;
        self.providers.validate()
    }
}
