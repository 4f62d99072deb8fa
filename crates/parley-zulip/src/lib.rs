// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zulip chat gateway for parley.
//!
//! Implements [`ChatGateway`] over the Zulip REST API: message fetches with
//! narrows, channel lookup, drafts and channel posts.

pub mod client;
pub mod types;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::ZulipConfig;
use parley_core::{
    AdapterType, ChannelId, ChannelInfo, ChatGateway, DraftId, DraftTarget, HealthStatus, Message,
    ParleyError, PluginAdapter, UserProfile,
};
use secrecy::SecretString;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::client::ZulipClient;
use crate::types::{
    DraftsResponse, Envelope, MessagesResponse, NarrowTerm, ProfileResponse, StreamsResponse,
    WireDraft,
};

/// Zulip implementation of [`ChatGateway`].
pub struct ZulipGateway {
    client: ZulipClient,
    recent_limit: u32,
    unread_limit: u32,
    profile: OnceCell<UserProfile>,
    channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
}

impl ZulipGateway {
    /// Creates a gateway from the `[zulip]` configuration section.
    ///
    /// Fails with [`ParleyError::Config`] when a credential is missing.
    pub fn new(config: &ZulipConfig) -> Result<Self, ParleyError> {
        let site = required(&config.site, "zulip.site")?;
        let email = required(&config.email, "zulip.email")?;
        let api_key = required(&config.api_key, "zulip.api_key")?;

        let client = ZulipClient::new(
            &site,
            email,
            SecretString::from(api_key),
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(site = %site, "Zulip gateway initialized");

        Ok(Self {
            client,
            recent_limit: config.recent_limit,
            unread_limit: config.unread_limit,
            profile: OnceCell::new(),
            channels: Mutex::new(HashMap::new()),
        })
    }

    /// Fetches up to `num_before` newest messages matching `narrow`.
    async fn fetch_narrow(
        &self,
        narrow: Vec<NarrowTerm>,
        num_before: u32,
    ) -> Result<Vec<Message>, ParleyError> {
        let viewer_id = self.current_user().await?.id;
        let narrow_json = serde_json::to_string(&narrow).map_err(|e| ParleyError::Internal(
            format!("failed to encode narrow: {e}"),
        ))?;

        let response: MessagesResponse = self
            .client
            .get(
                "/messages",
                &[
                    ("anchor", "newest".to_string()),
                    ("num_before", num_before.to_string()),
                    ("num_after", "0".to_string()),
                    ("narrow", narrow_json),
                    ("apply_markdown", "false".to_string()),
                ],
            )
            .await?;

        let fetched = response.messages.len();
        let messages: Vec<Message> = response
            .messages
            .into_iter()
            .filter_map(|wire| {
                let id = wire.id;
                let converted = wire.into_message(viewer_id);
                if converted.is_none() {
                    warn!(message_id = id, "dropping channel message without a channel id");
                }
                converted
            })
            .collect();
        debug!(fetched, kept = messages.len(), "messages fetched");
        Ok(messages)
    }

    fn cached_channel(&self, channel_id: ChannelId) -> Option<ChannelInfo> {
        self.channels
            .lock()
            .ok()
            .and_then(|cache| cache.get(&channel_id).cloned())
    }
}

fn required(value: &Option<String>, key: &str) -> Result<String, ParleyError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ParleyError::Config(format!("{key} is required")))
}

fn stream_filter(narrow: &mut Vec<NarrowTerm>, channel_filter: Option<&str>) {
    if let Some(channel) = channel_filter {
        narrow.push(NarrowTerm::new("stream", channel));
    }
}

#[async_trait]
impl PluginAdapter for ZulipGateway {
    fn name(&self) -> &str {
        "zulip"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        match self.current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ChatGateway for ZulipGateway {
    async fn current_user(&self) -> Result<UserProfile, ParleyError> {
        self.profile
            .get_or_try_init(|| async {
                let profile: ProfileResponse = self.client.get("/users/me", &[]).await?;
                debug!(user_id = profile.user_id, "resolved bot profile");
                Ok::<_, ParleyError>(UserProfile {
                    id: profile.user_id,
                    full_name: profile.full_name,
                })
            })
            .await
            .cloned()
    }

    async fn fetch_recent_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError> {
        let mut narrow = Vec::new();
        stream_filter(&mut narrow, channel_filter);
        self.fetch_narrow(narrow, self.recent_limit).await
    }

    async fn fetch_all_direct_messages(&self) -> Result<Vec<Message>, ParleyError> {
        self.fetch_narrow(vec![NarrowTerm::new("is", "private")], self.recent_limit)
            .await
    }

    async fn fetch_unread_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError> {
        let mut narrow = vec![NarrowTerm::new("is", "unread")];
        stream_filter(&mut narrow, channel_filter);
        self.fetch_narrow(narrow, self.unread_limit).await
    }

    async fn fetch_thread_messages(
        &self,
        channel_id: ChannelId,
        topic: &str,
        limit: u32,
    ) -> Result<Vec<Message>, ParleyError> {
        let channel = self
            .resolve_channel(channel_id)
            .await?
            .ok_or_else(|| ParleyError::gateway(format!("unknown channel id {channel_id}")))?;

        let narrow = vec![
            NarrowTerm::new("stream", channel.name),
            NarrowTerm::new("topic", topic),
        ];
        self.fetch_narrow(narrow, limit).await
    }

    async fn resolve_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelInfo>, ParleyError> {
        if let Some(info) = self.cached_channel(channel_id) {
            return Ok(Some(info));
        }

        let response: StreamsResponse = self.client.get("/streams", &[]).await?;
        if let Ok(mut cache) = self.channels.lock() {
            cache.extend(response.streams.iter().map(|s| {
                (
                    s.stream_id,
                    ChannelInfo {
                        id: s.stream_id,
                        name: s.name.clone(),
                    },
                )
            }));
        }

        Ok(response
            .streams
            .into_iter()
            .find(|s| s.stream_id == channel_id)
            .map(|s| ChannelInfo {
                id: s.stream_id,
                name: s.name,
            }))
    }

    async fn create_draft(&self, target: &DraftTarget, body: &str) -> Result<DraftId, ParleyError> {
        let drafts = serde_json::to_string(&[WireDraft::new(target, body)]).map_err(|e| {
            ParleyError::Internal(format!("failed to encode draft: {e}"))
        })?;

        let response: DraftsResponse = self.client.post_form("/drafts", &[("drafts", drafts)]).await?;
        let draft_id = response
            .ids
            .first()
            .copied()
            .ok_or_else(|| ParleyError::gateway("draft created but no id returned"))?;
        debug!(draft_id, kind = %target.kind(), "draft created");
        Ok(draft_id)
    }

    async fn delete_draft(&self, draft_id: DraftId) -> Result<(), ParleyError> {
        let _: Envelope = self.client.delete(&format!("/drafts/{draft_id}")).await?;
        debug!(draft_id, "draft deleted");
        Ok(())
    }

    async fn send_message(
        &self,
        channel_name: &str,
        topic: &str,
        body: &str,
    ) -> Result<(), ParleyError> {
        let _: Envelope = self
            .client
            .post_form(
                "/messages",
                &[
                    ("type", "stream".to_string()),
                    ("to", channel_name.to_string()),
                    ("topic", topic.to_string()),
                    ("content", body.to_string()),
                ],
            )
            .await?;
        debug!(channel = channel_name, topic, "message sent");
        Ok(())
    }
}
