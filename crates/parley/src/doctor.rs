// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley doctor` command implementation.
//!
//! Runs diagnostic checks against the parley environment to identify
//! configuration issues, database problems and unreachable services.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use parley_config::ParleyConfig;
use parley_core::{HealthStatus, ParleyError, PluginAdapter};
use parley_gemini::GeminiGenerator;
use parley_zulip::ZulipGateway;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `parley doctor` command.
///
/// Returns `false` when any check failed. With `plain`, disables colored
/// output.
pub async fn run_doctor(config: &ParleyConfig, config_path: Option<&Path>, plain: bool) -> bool {
    let use_color = !plain && std::io::stdout().is_terminal();

    let credentials = check_credentials(config);
    let credentials_ok = credentials.status == CheckStatus::Pass;

    let mut results = vec![check_config(config_path), credentials];
    results.push(check_db_integrity(&config.storage.database_path).await);
    if credentials_ok {
        results.push(check_zulip(config).await);
        results.push(check_gemini(config).await);
    }

    println!();
    println!("  parley doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Pass => {}
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !credentials_ok {
            println!("  Run `parley setup` to write credentials.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    fail_count == 0
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    if use_color {
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Check configuration loads without errors.
fn check_config(path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match path {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check every credential is present.
fn check_credentials(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    match parley_config::require_credentials(config) {
        Ok(()) => CheckResult::new("Credentials", CheckStatus::Pass, "present", start),
        Err(errors) => {
            let missing: Vec<String> = errors
                .iter()
                .map(|e| match e {
                    parley_config::ConfigError::MissingKey { key } => key.clone(),
                    other => other.to_string(),
                })
                .collect();
            CheckResult::new(
                "Credentials",
                CheckStatus::Fail,
                format!("missing {}", missing.join(", ")),
                start,
            )
        }
    }
}

/// SQLite integrity check. A missing database is only a warning.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "Database",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };

    let result = conn
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(rows)
        })
        .await;

    match result {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("Database", CheckStatus::Pass, "integrity ok", start)
        }
        Ok(rows) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("{} integrity issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("integrity check failed: {e}"),
            start,
        ),
    }
}

async fn check_zulip(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let health = match ZulipGateway::new(&config.zulip) {
        Ok(gateway) => gateway.health_check().await,
        Err(e) => Err(e),
    };
    from_health("Zulip", health, start)
}

async fn check_gemini(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let health = match GeminiGenerator::new(&config.gemini) {
        Ok(generator) => generator.health_check().await,
        Err(e) => Err(e),
    };
    from_health("Gemini", health, start)
}

fn from_health(
    name: &str,
    health: Result<HealthStatus, ParleyError>,
    start: Instant,
) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "reachable", start),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new(name, CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new(name, CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}
