// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! [`validate_config`] checks semantic constraints serde cannot express.
//! [`require_credentials`] is a separate, stricter check run only by commands
//! that talk to Zulip or Gemini, so `parley setup` works on an empty config.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(site) = config.zulip.site.as_deref()
        && !site.trim().is_empty()
        && !(site.starts_with("https://") || site.starts_with("http://"))
    {
        errors.push(ConfigError::Validation {
            message: format!("zulip.site `{site}` must start with http:// or https://"),
        });
    }

    if config.zulip.output_channel.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "zulip.output_channel must not be empty".to_string(),
        });
    }

    for (key, value) in [
        ("zulip.recent_limit", config.zulip.recent_limit),
        ("zulip.unread_limit", config.zulip.unread_limit),
        ("zulip.context_limit", config.zulip.context_limit),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1"),
            });
        }
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(filter) = config.drafting.channel_filter.as_deref()
        && filter.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "drafting.channel_filter must not be blank when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that every credential needed to reach Zulip and Gemini is present.
///
/// Blank strings count as missing.
pub fn require_credentials(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let required = [
        ("zulip.email", config.zulip.email.as_deref()),
        ("zulip.api_key", config.zulip.api_key.as_deref()),
        ("zulip.site", config.zulip.site.as_deref()),
        ("gemini.api_key", config.gemini.api_key.as_deref()),
    ];

    let errors: Vec<ConfigError> = required
        .into_iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(key, _)| ConfigError::MissingKey {
            key: key.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
