// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat gateway trait for the team chat platform.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelId, ChannelInfo, DraftId, DraftTarget, Message, UserProfile};

/// Reads messages from and writes drafts/messages to the chat platform.
///
/// Every method reports failure through [`ParleyError`]; callers decide
/// whether a failure is fatal for their unit of work.
#[async_trait]
pub trait ChatGateway: PluginAdapter {
    /// Profile of the account the bot acts as.
    async fn current_user(&self) -> Result<UserProfile, ParleyError>;

    /// Most recent messages, read or unread, optionally narrowed to one channel.
    async fn fetch_recent_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError>;

    /// Most recent direct messages, read or unread.
    async fn fetch_all_direct_messages(&self) -> Result<Vec<Message>, ParleyError>;

    /// Unread channel and direct messages, optionally narrowed to one channel.
    async fn fetch_unread_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError>;

    /// Up to `limit` most recent messages of one channel topic.
    async fn fetch_thread_messages(
        &self,
        channel_id: ChannelId,
        topic: &str,
        limit: u32,
    ) -> Result<Vec<Message>, ParleyError>;

    /// Looks up channel metadata; `None` when the channel is unknown.
    async fn resolve_channel(&self, channel_id: ChannelId)
    -> Result<Option<ChannelInfo>, ParleyError>;

    /// Creates a draft and returns its id.
    async fn create_draft(&self, target: &DraftTarget, body: &str)
    -> Result<DraftId, ParleyError>;

    /// Deletes a previously created draft.
    async fn delete_draft(&self, draft_id: DraftId) -> Result<(), ParleyError>;

    /// Posts a message to a channel topic.
    async fn send_message(
        &self,
        channel_name: &str,
        topic: &str,
        body: &str,
    ) -> Result<(), ParleyError>;
}
