// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key fails at
//! startup with a suggestion instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level parley configuration.
///
/// Every section is optional and defaults to sensible values; credentials
/// have no default and are checked by [`crate::validation::require_credentials`]
/// before any command talks to the chat platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Logging and identity settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Zulip account and fetch settings.
    #[serde(default)]
    pub zulip: ZulipConfig,

    /// Gemini text generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// State store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Draft pass behavior.
    #[serde(default)]
    pub drafting: DraftingConfig,
}

/// Logging and identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// File that receives a copy of the log. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Display name used in prompts when the profile lookup fails.
    #[serde(default)]
    pub user_full_name: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: default_log_file(),
            user_full_name: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "parley.log".to_string()
}

/// Zulip account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ZulipConfig {
    /// Account email used for basic auth.
    #[serde(default)]
    pub email: Option<String>,

    /// Account API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Organization URL, e.g. `https://example.zulipchat.com`.
    #[serde(default)]
    pub site: Option<String>,

    /// Channel that receives digests. Messages in it are never summarized.
    #[serde(default = "default_output_channel")]
    pub output_channel: String,

    /// Number of recent messages fetched per drafting / checking pass.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,

    /// Number of unread messages fetched for a digest.
    #[serde(default = "default_unread_limit")]
    pub unread_limit: u32,

    /// Number of topic messages loaded as conversation context.
    #[serde(default = "default_context_limit")]
    pub context_limit: u32,

    /// HTTP timeout for Zulip API calls, in seconds.
    #[serde(default = "default_zulip_timeout")]
    pub timeout_secs: u64,
}

impl Default for ZulipConfig {
    fn default() -> Self {
        Self {
            email: None,
            api_key: None,
            site: None,
            output_channel: default_output_channel(),
            recent_limit: default_recent_limit(),
            unread_limit: default_unread_limit(),
            context_limit: default_context_limit(),
            timeout_secs: default_zulip_timeout(),
        }
    }
}

fn default_output_channel() -> String {
    "parley".to_string()
}

fn default_recent_limit() -> u32 {
    500
}

fn default_unread_limit() -> u32 {
    100
}

fn default_context_limit() -> u32 {
    20
}

fn default_zulip_timeout() -> u64 {
    30
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for replies and digests.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (without the `/models/...` suffix).
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Tone and style guidance appended to every reply prompt.
    #[serde(default)]
    pub style_instructions: Option<String>,

    /// HTTP timeout for generation calls, in seconds.
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            style_instructions: None,
            timeout_secs: default_gemini_timeout(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> u64 {
    120
}

/// State store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "parley.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Draft pass configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DraftingConfig {
    /// Restrict passes to one channel. Direct messages are skipped when set.
    #[serde(default)]
    pub channel_filter: Option<String>,

    /// Delete the previous draft of a thread before creating a fresh one.
    #[serde(default)]
    pub delete_superseded_drafts: bool,

    /// Only draft threads where the bot was mentioned and has not replied.
    #[serde(default)]
    pub only_when_reply_needed: bool,
}
