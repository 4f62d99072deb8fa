// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - drafts replies to Zulip conversations and posts unread digests.
//!
//! This is the binary entry point.

mod app;
mod doctor;
mod setup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_config::model::AgentConfig;
use parley_config::ParleyConfig;

/// Parley - drafts replies to Zulip conversations and posts unread digests.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of the standard locations.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a fresh draft for every conversation with new messages.
    DraftReplies,
    /// Re-evaluate which conversations are waiting on a reply.
    CheckConversations,
    /// Summarize unread messages and post the digest to the output channel.
    Summarize,
    /// Check, draft and summarize in one run.
    RunAll,
    /// List conversations currently waiting on a reply.
    Pending,
    /// Write a parley.toml interactively.
    Setup {
        /// Overwrite an existing file without asking.
        #[arg(long)]
        force: bool,
    },
    /// Diagnose configuration, database and service reachability.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Setup { force } = cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(parley_config::CONFIG_FILE_NAME));
        if let Err(e) = setup::run_setup(&path, force) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent, cli.verbose);

    if let Commands::Doctor { plain } = cli.command {
        let healthy = doctor::run_doctor(&config, cli.config.as_deref(), plain).await;
        if !healthy {
            std::process::exit(1);
        }
        return;
    }

    if let Err(errors) = parley_config::require_credentials(&config) {
        parley_config::render_errors(&errors);
        std::process::exit(1);
    }

    let command = match cli.command {
        Commands::DraftReplies => app::Command::DraftReplies,
        Commands::CheckConversations => app::Command::CheckConversations,
        Commands::Summarize => app::Command::Summarize,
        Commands::RunAll => app::Command::RunAll,
        Commands::Pending => app::Command::Pending,
        Commands::Setup { .. } | Commands::Doctor { .. } => return,
    };

    if let Err(e) = app::run(&config, command).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<ParleyConfig, Vec<parley_config::ConfigError>> {
    match path {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr and, when `agent.log_file` is set, to that file without
/// ANSI colors. `RUST_LOG` overrides the configured level.
fn init_tracing(agent: &AgentConfig, verbose: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if verbose { "debug" } else { agent.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={level},warn")));

    let file_layer = match open_log_file(&agent.log_file) {
        Ok(Some(file)) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(std::sync::Arc::new(file)),
        ),
        Ok(None) => None,
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {e}", agent.log_file);
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();
}

fn open_log_file(path: &str) -> std::io::Result<Option<std::fs::File>> {
    if path.trim().is_empty() {
        return Ok(None);
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["parley", "run-all", "-v", "--config", "alt.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::RunAll));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["parley"]).is_err());
    }

    #[test]
    fn empty_log_file_disables_file_logging() {
        assert!(open_log_file("  ").unwrap().is_none());
    }
}
