//! CLI definitions for codex-analyzer
//!
//! This module contains the clap CLI structure definitions, separated from
//! main.rs so command handlers and completions can share them.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use codex_analyzer::analyzer::DataSource;
use codex_analyzer::config::PROVIDER_NAMES;
use codex_analyzer::output::OutputFormat;

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "codex-analyzer")]
#[command(about = "Analyze Codex session logs and classify task completion")]
#[command(
    long_about = "codex-analyzer - Analyze Codex `exec --json` event logs.

Reconstructs the session from its JSONL events, builds a bounded evidence
digest, and classifies tasks as completed, in progress, or blocked using
GitHub Models, OpenAI, or a local keyword heuristic.

QUICK START:
    codex-analyzer analyze session.jsonl --tasks-file TASKS.md
    codex-analyzer digest session.jsonl
    codex-analyzer evidence session.jsonl --task \"Fix login bug\"
    codex-analyzer providers

Logging goes to stderr and is controlled by CODEX_ANALYZER_LOG
(e.g. CODEX_ANALYZER_LOG=debug)."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.config/codex-analyzer/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify tasks against a session log
    #[command(long_about = "Classify tasks against a session log.

The input may be a Codex JSONL event stream or plain agent output; the
format is detected automatically unless --data-source is given. Tasks come
from --task flags and/or unchecked '- [ ]' items in --tasks-file.

EXAMPLES:
    codex-analyzer analyze session.jsonl --tasks-file TASKS.md
    codex-analyzer analyze - --task \"Add retry logic\" < session.jsonl
    codex-analyzer analyze session.jsonl --task \"Fix bug\" --provider heuristic
    codex-analyzer analyze session.jsonl --tasks-file TASKS.md --format markdown")]
    Analyze {
        /// Session log path, or '-' for stdin
        #[arg(help = "Session log path, or '-' for stdin")]
        file: String,

        #[command(flatten)]
        tasks: TaskArgs,

        /// Input interpretation
        #[arg(long, value_enum, default_value_t = DataSourceArg::Auto)]
        data_source: DataSourceArg,

        /// Leave reasoning summaries out of the digest
        #[arg(long)]
        no_reasoning: bool,

        /// Use only this provider
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(PROVIDER_NAMES))]
        provider: Option<String>,

        /// Extra context passed to the classifier
        #[arg(long)]
        context: Option<String>,

        /// Soft character budget of the evidence digest
        #[arg(long)]
        max_length: Option<usize>,

        /// Remote request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::JsonPretty)]
        format: OutputFormat,
    },

    /// Print the parsed session summary as JSON
    Parse {
        /// Session log path, or '-' for stdin
        file: String,

        /// Print the full session instead of the summary
        #[arg(long)]
        full: bool,
    },

    /// Print the evidence digest built from a session
    Digest {
        /// Session log path, or '-' for stdin
        file: String,

        /// Leave reasoning summaries out of the digest
        #[arg(long)]
        no_reasoning: bool,

        /// Soft character budget of the digest
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Match tasks against changed files and commands
    #[command(long_about = "Match tasks against the files a session changed and the commands it ran.

Uses keyword overlap, synonyms, and explicit file references only; no
remote service is called. Tasks without evidence are omitted.

EXAMPLE:
    codex-analyzer evidence session.jsonl --tasks-file TASKS.md")]
    Evidence {
        /// Session log path, or '-' for stdin
        file: String,

        #[command(flatten)]
        tasks: TaskArgs,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show providers in preference order and whether they are available
    Providers,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    /// Task description (repeatable)
    #[arg(long = "task", value_name = "TASK")]
    pub task: Vec<String>,

    /// Markdown file with '- [ ]' task checkboxes
    #[arg(long, value_name = "PATH")]
    pub tasks_file: Option<String>,

    /// Also take checked '- [x]' items from the tasks file
    #[arg(long)]
    pub include_checked: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataSourceArg {
    Auto,
    EventStream,
    EventStreamFiltered,
    PlainText,
}

impl DataSourceArg {
    /// `None` means auto-detect.
    pub fn into_data_source(self) -> Option<DataSource> {
        match self {
            DataSourceArg::Auto => None,
            DataSourceArg::EventStream => Some(DataSource::EventStream),
            DataSourceArg::EventStreamFiltered => Some(DataSource::EventStreamFiltered),
            DataSourceArg::PlainText => Some(DataSource::PlainText),
        }
    }
}
