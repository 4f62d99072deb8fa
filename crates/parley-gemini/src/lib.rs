// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini text generation for parley.
//!
//! Implements [`TextGenerator`] over the Gemini `generateContent` REST API.

pub mod client;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::GeminiConfig;
use parley_core::{
    AdapterType, ConversationKind, HealthStatus, Message, ParleyError, PluginAdapter,
    TextGenerator,
};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::GeminiClient;

/// Gemini implementation of [`TextGenerator`].
pub struct GeminiGenerator {
    client: GeminiClient,
    style: String,
}

impl GeminiGenerator {
    /// Creates a generator from the `[gemini]` configuration section.
    pub fn new(config: &GeminiConfig) -> Result<Self, ParleyError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("gemini.api_key is required".into()))?;

        let client = GeminiClient::new(
            &SecretString::from(api_key.to_string()),
            config.model.clone(),
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = %config.model, "Gemini generator initialized");

        Ok(Self {
            client,
            style: resolve_style(config.style_instructions.as_deref()),
        })
    }
}

fn resolve_style(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(prompt::DEFAULT_STYLE)
        .to_string()
}

#[async_trait]
impl PluginAdapter for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        // Model metadata lookup validates key and model without spending tokens.
        match self.client.probe_model().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate_reply(
        &self,
        context: &str,
        author_name: &str,
        kind: ConversationKind,
    ) -> Result<String, ParleyError> {
        let prompt = prompt::reply_prompt(context, author_name, kind, &self.style);
        debug!(model = self.client.model(), %kind, "generating reply");
        self.client.generate(&prompt).await
    }

    async fn generate_summary(
        &self,
        messages: &[Message],
        author_name: &str,
    ) -> Result<String, ParleyError> {
        let prompt = prompt::summary_prompt(messages, author_name);
        debug!(model = self.client.model(), count = messages.len(), "generating summary");
        self.client.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let err = GeminiGenerator::new(&GeminiConfig::default()).err().unwrap();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn blank_style_falls_back_to_default() {
        assert_eq!(resolve_style(None), prompt::DEFAULT_STYLE);
        assert_eq!(resolve_style(Some("  ")), prompt::DEFAULT_STYLE);
        assert_eq!(resolve_style(Some("Be terse.")), "Be terse.");
    }
}
