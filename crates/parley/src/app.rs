// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the engine to Zulip, Gemini and SQLite and runs one command.

use std::sync::Arc;

use colored::Colorize;
use parley_config::ParleyConfig;
use parley_core::{ParleyError, StateStore, ThreadState};
use parley_engine::{
    CheckReport, DraftOutcome, DraftReport, Engine, EngineSettings, SummaryOutcome,
};
use parley_gemini::GeminiGenerator;
use parley_storage::SqliteStorage;
use parley_zulip::ZulipGateway;
use tracing::{debug, warn};

/// Engine commands, one pass each (run-all chains three).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DraftReplies,
    CheckConversations,
    Summarize,
    RunAll,
    Pending,
}

/// Builds the collaborators, runs `command` and prints its result.
///
/// The store is closed even when the command fails.
pub async fn run(config: &ParleyConfig, command: Command) -> Result<(), ParleyError> {
    let gateway = Arc::new(ZulipGateway::new(&config.zulip)?);
    let generator = Arc::new(GeminiGenerator::new(&config.gemini)?);
    let store = Arc::new(SqliteStorage::new(config.storage.clone()));
    store.initialize().await?;

    let engine = Engine::new(
        gateway,
        generator,
        store.clone(),
        EngineSettings::from_config(config),
    );
    debug!(?command, "running command");

    let result = execute(&engine, command).await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close state store");
    }
    println!("{}", result?);
    Ok(())
}

async fn execute(engine: &Engine, command: Command) -> Result<String, ParleyError> {
    Ok(match command {
        Command::DraftReplies => render_draft_report(&engine.draft_replies().await?),
        Command::CheckConversations => render_check_report(&engine.check_conversations().await?),
        Command::Summarize => render_summary(&engine.generate_unread_summary().await?),
        Command::RunAll => {
            let report = engine.run_all().await?;
            [
                render_check_report(&report.check),
                render_draft_report(&report.draft),
                render_summary(&report.summary),
            ]
            .join("\n\n")
        }
        Command::Pending => render_pending(&engine.pending_threads().await?),
    })
}

fn render_draft_report(report: &DraftReport) -> String {
    let mut lines = vec![format!(
        "{} drafted, {} skipped, {} failed",
        report.drafted().to_string().green(),
        report.skipped(),
        report.failed().to_string().red(),
    )];
    for (key, outcome) in &report.outcomes {
        let detail = match outcome {
            DraftOutcome::Drafted { draft_id } => format!("drafted (draft {draft_id})").green(),
            DraftOutcome::UpToDate => "up to date".normal(),
            DraftOutcome::NotNeeded => "no reply needed".normal(),
            DraftOutcome::Rejected { reason } => format!("rejected: {reason}").yellow(),
            DraftOutcome::Failed { reason } => format!("failed: {reason}").red(),
        };
        lines.push(format!("  {key}  {detail}"));
    }
    lines.join("\n")
}

fn render_check_report(report: &CheckReport) -> String {
    let mut lines = vec![format!(
        "{} conversations checked, {} waiting on a reply",
        report.threads_seen,
        report.needing_reply.len().to_string().yellow(),
    )];
    lines.extend(report.needing_reply.iter().map(|key| format!("  {key}")));
    lines.extend(
        report
            .failed
            .iter()
            .map(|key| format!("  {key}  {}", "failed".red())),
    );
    lines.join("\n")
}

fn render_summary(outcome: &SummaryOutcome) -> String {
    let status = if outcome.published {
        "published".green()
    } else {
        "not published".red()
    };
    format!(
        "{} ({} messages, {status})\n\n{}",
        outcome.topic.bold(),
        outcome.message_count,
        outcome.text
    )
}

fn render_pending(threads: &[ThreadState]) -> String {
    if threads.is_empty() {
        return "No conversations waiting on a reply.".to_string();
    }
    threads
        .iter()
        .map(|t| {
            let draft = t
                .draft_id
                .map(|id| format!("draft {id}"))
                .unwrap_or_else(|| "no draft".to_string());
            format!(
                "{}  last message {}  {draft}  checked {}",
                t.thread_key.bold(),
                t.last_message_id,
                t.last_checked
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
