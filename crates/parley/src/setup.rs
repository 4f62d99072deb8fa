// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley setup` command implementation.
//!
//! Prompts for credentials and writes a `parley.toml`. API keys are read
//! without echo via `rpassword`.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use parley_config::ParleyConfig;
use parley_core::ParleyError;

/// Answers collected by the setup prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupAnswers {
    pub zulip_email: String,
    pub zulip_api_key: String,
    pub zulip_site: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub style_instructions: String,
}

/// Run the `parley setup` command.
pub fn run_setup(path: &Path, force: bool) -> Result<(), ParleyError> {
    if !std::io::stdin().is_terminal() {
        return Err(ParleyError::Config(
            "setup needs an interactive terminal; write parley.toml by hand instead".to_string(),
        ));
    }

    if path.exists() && !force {
        let overwrite = prompt_line(&format!(
            "{} already exists. Overwrite? [y/N]",
            path.display()
        ))?;
        if !matches!(overwrite.to_lowercase().as_str(), "y" | "yes") {
            println!("Left {} unchanged.", path.display());
            return Ok(());
        }
    }

    let defaults = ParleyConfig::default();
    let answers = SetupAnswers {
        zulip_email: prompt_line("Zulip bot email")?,
        zulip_api_key: prompt_secret("Zulip API key")?,
        zulip_site: prompt_line("Zulip site URL (https://...)")?,
        gemini_api_key: prompt_secret("Gemini API key")?,
        gemini_model: prompt_with_default("Gemini model", &defaults.gemini.model)?,
        style_instructions: prompt_line("Reply style instructions (optional)")?,
    };

    let content = render_config(&answers)?;
    std::fs::write(path, content).map_err(|e| {
        ParleyError::Config(format!("failed to write {}: {e}", path.display()))
    })?;
    println!("Wrote {}.", path.display());
    Ok(())
}

/// Serialize the answers on top of the default configuration.
pub fn render_config(answers: &SetupAnswers) -> Result<String, ParleyError> {
    let mut config = ParleyConfig::default();
    config.zulip.email = non_empty(&answers.zulip_email);
    config.zulip.api_key = non_empty(&answers.zulip_api_key);
    config.zulip.site = non_empty(answers.zulip_site.trim_end_matches('/'));
    config.gemini.api_key = non_empty(&answers.gemini_api_key);
    if let Some(model) = non_empty(&answers.gemini_model) {
        config.gemini.model = model;
    }
    config.gemini.style_instructions = non_empty(&answers.style_instructions);

    toml::to_string_pretty(&config)
        .map_err(|e| ParleyError::Internal(format!("failed to serialize config: {e}")))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn prompt_line(label: &str) -> Result<String, ParleyError> {
    eprint!("{label}: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ParleyError::Internal(format!("failed to read input: {e}")))?;
    Ok(line.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String, ParleyError> {
    let answer = prompt_line(&format!("{label} [{default}]"))?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

fn prompt_secret(label: &str) -> Result<String, ParleyError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map(|s| s.trim().to_string())
        .map_err(|e| ParleyError::Internal(format!("failed to read {label}: {e}")))
}
