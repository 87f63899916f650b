//! SessionAnalyzer facade for orchestrating analysis.
//!
//! # Workflow
//!
//! 1. Detect the data source (event stream or plain text)
//! 2. Parse the event stream into a [`Session`]
//! 3. Synthesize the evidence digest
//! 4. Classify tasks through the [`ProviderChain`]
//! 5. Package everything into an [`AnalysisResult`]
//!
//! `analyze` never fails: parse problems degrade to plain text and chain
//! failures become a zero-confidence result.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Config;
use crate::session::{EventStreamParser, Session};
use crate::text::char_len;

use super::error::AnalysisError;
use super::provider::{ProviderChain, ProviderKind, ProviderSettings};
use super::synthesis::{EvidenceSynthesizer, DEFAULT_MAX_LENGTH};
use super::types::{AnalysisResult, CompletionAnalysis, DataSource};

/// Lines sampled by data source detection.
const DETECTION_SAMPLE_LINES: usize = 5;

/// Configuration options for analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Forced data source (None = auto-detect)
    pub data_source: Option<DataSource>,
    /// Include reasoning summaries (ignored in filtered mode)
    pub include_reasoning: bool,
    /// Free-form context handed to the classifier
    pub context: Option<String>,
    /// Pin the chain to one provider
    pub force_provider: Option<ProviderKind>,
    /// Soft budget of the evidence digest
    pub max_length: usize,
    /// Endpoint overrides and request limits
    pub provider_settings: ProviderSettings,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            data_source: None,
            include_reasoning: true,
            context: None,
            force_provider: None,
            max_length: DEFAULT_MAX_LENGTH,
            provider_settings: ProviderSettings::default(),
        }
    }
}

impl AnalyzeOptions {
    /// Options seeded from the config file.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let force_provider = config
            .analysis
            .provider
            .as_deref()
            .map(str::parse::<ProviderKind>)
            .transpose()?;
        Ok(Self {
            data_source: None,
            include_reasoning: config.analysis.include_reasoning,
            context: None,
            force_provider,
            max_length: config.analysis.max_length,
            provider_settings: ProviderSettings::from_config(config),
        })
    }

    pub fn data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    pub fn include_reasoning(mut self, include: bool) -> Self {
        self.include_reasoning = include;
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn force_provider(mut self, kind: ProviderKind) -> Self {
        self.force_provider = Some(kind);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

/// Main analyzer facade.
#[derive(Debug)]
pub struct SessionAnalyzer {
    options: AnalyzeOptions,
    chain: ProviderChain,
}

impl SessionAnalyzer {
    /// Create an analyzer whose chain follows the options.
    pub fn new(options: AnalyzeOptions) -> Self {
        let chain = match options.force_provider {
            Some(kind) => ProviderChain::forced(kind, &options.provider_settings),
            None => ProviderChain::from_settings(&options.provider_settings),
        };
        Self { options, chain }
    }

    /// Create an analyzer with an explicit chain (for testing).
    pub fn with_chain(options: AnalyzeOptions, chain: ProviderChain) -> Self {
        Self { options, chain }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Analyze one session's output against `tasks`.
    pub fn analyze(&self, content: &str, tasks: &[String]) -> AnalysisResult {
        let requested = self
            .options
            .data_source
            .unwrap_or_else(|| detect_data_source(content));

        let (text, session, data_source) = self.prepare(content, requested);
        debug!(
            data_source = %data_source,
            chars = char_len(&text),
            "Prepared analysis text"
        );

        let analysis =
            match self
                .chain
                .analyze_completion(&text, tasks, self.options.context.as_deref())
            {
                Ok(analysis) => analysis,
                Err(e) => {
                    let err = AnalysisError::from_chain_error(&e);
                    warn!(error = %e, retriable = err.is_retriable(), "Provider chain failed");
                    CompletionAnalysis::error(err.to_string())
                }
            };

        AnalysisResult {
            analysis,
            session,
            data_source,
            input_length: char_len(content),
            analysis_text_length: char_len(&text),
        }
    }

    /// Analyze many sessions in parallel against the same tasks.
    ///
    /// Results are returned in input order.
    pub fn analyze_batch(&self, contents: &[String], tasks: &[String]) -> Vec<AnalysisResult> {
        contents
            .par_iter()
            .map(|content| self.analyze(content, tasks))
            .collect()
    }

    /// Produce the classifier text for `source`.
    fn prepare(&self, content: &str, source: DataSource) -> (String, Option<Session>, DataSource) {
        if source == DataSource::PlainText {
            return (content.to_string(), None, DataSource::PlainText);
        }

        let session = EventStreamParser::parse(content);
        if session.raw_event_count == 0 {
            debug!(
                errors = session.parse_errors.len(),
                "No events decoded, treating input as plain text"
            );
            return (content.to_string(), None, DataSource::PlainText);
        }

        let include_reasoning =
            source == DataSource::EventStream && self.options.include_reasoning;
        let digest = EvidenceSynthesizer::new()
            .include_reasoning(include_reasoning)
            .max_length(self.options.max_length)
            .synthesize(&session);
        (digest, Some(session), source)
    }
}

/// Guess whether `content` is an event stream.
///
/// Samples the first five non-empty lines; at least half of them must look
/// like single-line JSON objects.
pub fn detect_data_source(content: &str) -> DataSource {
    let sample: Vec<&str> = content
        .lines()
        .map(|line| line.trim().trim_start_matches('\u{feff}'))
        .filter(|line| !line.is_empty())
        .take(DETECTION_SAMPLE_LINES)
        .collect();
    if sample.is_empty() {
        return DataSource::PlainText;
    }

    let json_lines = sample
        .iter()
        .filter(|line| line.starts_with('{') && line.ends_with('}'))
        .count();
    if json_lines * 2 >= sample.len() {
        DataSource::EventStream
    } else {
        DataSource::PlainText
    }
}
