// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use parley_core::ParleyError;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    ///
    /// `base_url` is the API root without the `/models/...` suffix.
    pub fn new(
        api_key: &SecretString,
        model: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ParleyError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| ParleyError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the trimmed completion text.
    ///
    /// An empty completion (blocked prompt, no candidates) is an error.
    pub async fn generate(&self, prompt: &str) -> Result<String, ParleyError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| ParleyError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        let body = response.text().await.map_err(|e| ParleyError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(ParleyError::provider(api_error_message(status, &body)));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ParleyError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        parsed.text().ok_or_else(|| {
            ParleyError::provider(format!(
                "Gemini returned no text (reason: {})",
                parsed.block_reason().unwrap_or("unknown")
            ))
        })
    }

    /// Fetches the model's metadata. Succeeds when the key and model are valid.
    pub async fn probe_model(&self) -> Result<(), ParleyError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ParleyError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ParleyError::provider(api_error_message(status, &body)))
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => format!(
            "Gemini API error ({} {}): {}",
            err.error.code, err.error.status, err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}
