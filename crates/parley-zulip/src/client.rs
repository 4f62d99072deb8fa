// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Zulip REST API.
//!
//! Provides [`ZulipClient`], which handles basic authentication, request
//! construction and the `result`/`msg` envelope every endpoint returns.

use std::time::Duration;

use parley_core::ParleyError;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::Envelope;

/// Path prefix of every REST endpoint.
const API_PREFIX: &str = "/api/v1";

/// Authenticated Zulip REST client.
#[derive(Debug, Clone)]
pub struct ZulipClient {
    client: reqwest::Client,
    base_url: String,
    email: String,
    api_key: SecretString,
}

impl ZulipClient {
    /// Creates a client for the organization at `site`.
    pub fn new(
        site: &str,
        email: String,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, ParleyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ParleyError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: format!("{}{API_PREFIX}", site.trim_end_matches('/')),
            email,
            api_key,
        })
    }

    /// `GET` with query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ParleyError> {
        let request = self.request(Method::GET, path).query(query);
        self.send(path, request).await
    }

    /// `POST` with a form-encoded body.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, ParleyError> {
        let request = self.request(Method::POST, path).form(form);
        self.send(path, request).await
    }

    /// `DELETE` without a body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ParleyError> {
        let request = self.request(Method::DELETE, path);
        self.send(path, request).await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .basic_auth(&self.email, Some(self.api_key.expose_secret()))
    }

    /// Sends the request and unwraps the Zulip envelope.
    ///
    /// A non-2xx status or a `result` other than `success` becomes a gateway
    /// error carrying the server's `msg`.
    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ParleyError> {
        let response = request.send().await.map_err(|e| ParleyError::Gateway {
            message: format!("request to {path} failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(path, status = %status, "zulip response received");

        let body = response.text().await.map_err(|e| ParleyError::Gateway {
            message: format!("failed to read response body from {path}: {e}"),
            source: Some(Box::new(e)),
        })?;

        let envelope = serde_json::from_str::<Envelope>(&body).ok();
        match envelope {
            Some(env) if status.is_success() && env.is_success() => {}
            Some(env) => {
                let code = env.code.as_deref().unwrap_or("UNKNOWN");
                return Err(ParleyError::gateway(format!(
                    "Zulip API error on {path} ({status}, {code}): {}",
                    env.msg
                )));
            }
            None => {
                return Err(ParleyError::gateway(format!(
                    "unexpected response from {path} ({status}): {body}"
                )));
            }
        }

        serde_json::from_str(&body).map_err(|e| ParleyError::Gateway {
            message: format!("failed to parse response from {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
