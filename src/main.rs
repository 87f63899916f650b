//! codex-analyzer - CLI entry point

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, ConfigCommands};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CODEX_ANALYZER_LOG";

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref().map(Path::new);

    match cli.command {
        Commands::Analyze {
            file,
            tasks,
            data_source,
            no_reasoning,
            provider,
            context,
            max_length,
            timeout,
            format,
        } => commands::analyze::handle(
            config_path,
            &file,
            &tasks,
            commands::analyze::Overrides {
                data_source: data_source.into_data_source(),
                no_reasoning,
                provider,
                context,
                max_length,
                timeout,
            },
            format,
        ),
        Commands::Parse { file, full } => commands::parse::handle(&file, full),
        Commands::Digest {
            file,
            no_reasoning,
            max_length,
        } => commands::digest::handle(config_path, &file, no_reasoning, max_length),
        Commands::Evidence {
            file,
            tasks,
            pretty,
        } => commands::evidence::handle(&file, &tasks, pretty),
        Commands::Providers => commands::providers::handle(config_path),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Path => commands::config::handle_path(config_path),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}

/// Log to stderr so stdout stays machine-readable.
///
/// `--verbose` forces debug; otherwise `CODEX_ANALYZER_LOG` applies, falling
/// back to warnings only.
#[cfg(not(tarpaulin_include))]
fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
