// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parley.toml` > `~/.config/parley/parley.toml` > `/etc/parley/parley.toml`
//! with environment variable overrides via the `PARLEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ParleyConfig;

/// Name of the local and XDG configuration file.
pub const CONFIG_FILE_NAME: &str = "parley.toml";

/// System-wide configuration path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/parley/parley.toml";

/// Config sections that `PARLEY_<SECTION>_<KEY>` variables map into.
const ENV_SECTIONS: &[&str] = &["agent", "zulip", "gemini", "storage", "drafting"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml` (system-wide)
/// 3. `~/.config/parley/parley.toml` (user XDG config)
/// 4. `./parley.toml` (local directory)
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard hierarchy.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("parley").join(CONFIG_FILE_NAME))
}

/// Environment variable that overrides a dotted config key.
///
/// `zulip.api_key` -> `PARLEY_ZULIP_API_KEY`.
pub fn env_var_for_key(key: &str) -> String {
    format!("PARLEY_{}", key.replace('.', "_").to_uppercase())
}

/// Create the environment variable provider.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `PARLEY_ZULIP_API_KEY` maps to `zulip.api_key`, never `zulip.api.key`.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| {
        let key_str = key.as_str();
        ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_names_follow_dotted_keys() {
        assert_eq!(env_var_for_key("zulip.api_key"), "PARLEY_ZULIP_API_KEY");
        assert_eq!(env_var_for_key("gemini.api_key"), "PARLEY_GEMINI_API_KEY");
    }

    #[test]
    fn env_overrides_keep_underscored_keys_intact() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARLEY_ZULIP_API_KEY", "secret");
            jail.set_env("PARLEY_DRAFTING_CHANNEL_FILTER", "eng");
            jail.set_env("PARLEY_ZULIP_RECENT_LIMIT", "50");

            let config = load_config()?;
            assert_eq!(config.zulip.api_key.as_deref(), Some("secret"));
            assert_eq!(config.drafting.channel_filter.as_deref(), Some("eng"));
            assert_eq!(config.zulip.recent_limit, 50);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults_and_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
[zulip]
site = "https://chat.example.com"
output_channel = "digest"
"#,
            )?;
            jail.set_env("PARLEY_ZULIP_OUTPUT_CHANNEL", "from-env");

            let config = load_config()?;
            assert_eq!(config.zulip.site.as_deref(), Some("https://chat.example.com"));
            assert_eq!(config.zulip.output_channel, "from-env");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[storage]\ndatabase_path = \"custom.db\"\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.storage.database_path, "custom.db");
            Ok(())
        });
    }
}
