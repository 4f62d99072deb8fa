// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat gateway for deterministic testing.
//!
//! `MockGateway` implements `ChatGateway` over in-memory message lists and
//! records every draft, deletion and posted message for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, ChannelId, ChannelInfo, ChatGateway, DraftId, DraftTarget, HealthStatus, Message,
    ParleyError, PluginAdapter, UserProfile,
};

/// Gateway operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    CurrentUser,
    FetchRecent,
    FetchDirect,
    FetchUnread,
    FetchThread,
    CreateDraft,
    DeleteDraft,
    SendMessage,
}

/// A draft recorded by [`MockGateway::create_draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDraft {
    pub id: DraftId,
    pub target: DraftTarget,
    pub body: String,
}

/// A message recorded by [`MockGateway::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: String,
    pub topic: String,
    pub body: String,
}

/// An in-memory chat platform.
///
/// Channel filters match on the message's channel name. Thread history is
/// served from the recent list, newest `limit` messages of the topic.
pub struct MockGateway {
    profile: Mutex<Option<UserProfile>>,
    recent: Mutex<Vec<Message>>,
    direct: Mutex<Vec<Message>>,
    unread: Mutex<Vec<Message>>,
    channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
    failing: Mutex<HashSet<GatewayOp>>,
    drafts: Mutex<Vec<CreatedDraft>>,
    deleted: Mutex<Vec<DraftId>>,
    sent: Mutex<Vec<SentMessage>>,
    next_draft_id: AtomicU64,
    create_draft_calls: AtomicUsize,
}

impl MockGateway {
    /// A gateway acting as `bot_id`, with no messages.
    pub fn new(bot_id: u64, bot_name: &str) -> Self {
        Self {
            profile: Mutex::new(Some(UserProfile {
                id: bot_id,
                full_name: bot_name.to_string(),
            })),
            recent: Mutex::new(Vec::new()),
            direct: Mutex::new(Vec::new()),
            unread: Mutex::new(Vec::new()),
            channels: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            drafts: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            next_draft_id: AtomicU64::new(1),
            create_draft_calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_recent(&self, messages: Vec<Message>) {
        *self.recent.lock().await = messages;
    }

    pub async fn push_recent(&self, message: Message) {
        self.recent.lock().await.push(message);
    }

    pub async fn set_direct(&self, messages: Vec<Message>) {
        *self.direct.lock().await = messages;
    }

    pub async fn set_unread(&self, messages: Vec<Message>) {
        *self.unread.lock().await = messages;
    }

    pub async fn add_channel(&self, id: ChannelId, name: &str) {
        self.channels.lock().await.insert(
            id,
            ChannelInfo {
                id,
                name: name.to_string(),
            },
        );
    }

    /// Make `op` fail until [`MockGateway::recover`] is called.
    pub async fn fail(&self, op: GatewayOp) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: GatewayOp) {
        self.failing.lock().await.remove(&op);
    }

    pub async fn drafts(&self) -> Vec<CreatedDraft> {
        self.drafts.lock().await.clone()
    }

    pub async fn deleted_drafts(&self) -> Vec<DraftId> {
        self.deleted.lock().await.clone()
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Calls to `create_draft`, successful or not.
    pub fn create_draft_calls(&self) -> usize {
        self.create_draft_calls.load(Ordering::SeqCst)
    }

    async fn check(&self, op: GatewayOp) -> Result<(), ParleyError> {
        if self.failing.lock().await.contains(&op) {
            Err(ParleyError::gateway(format!("mock {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

fn in_channel(messages: &[Message], filter: Option<&str>) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| filter.is_none_or(|f| m.display_location() == Some(f)))
        .cloned()
        .collect()
}

#[async_trait]
impl PluginAdapter for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn current_user(&self) -> Result<UserProfile, ParleyError> {
        self.check(GatewayOp::CurrentUser).await?;
        self.profile
            .lock()
            .await
            .clone()
            .ok_or_else(|| ParleyError::gateway("no profile configured"))
    }

    async fn fetch_recent_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError> {
        self.check(GatewayOp::FetchRecent).await?;
        Ok(in_channel(&self.recent.lock().await, channel_filter))
    }

    async fn fetch_all_direct_messages(&self) -> Result<Vec<Message>, ParleyError> {
        self.check(GatewayOp::FetchDirect).await?;
        Ok(self.direct.lock().await.clone())
    }

    async fn fetch_unread_messages(
        &self,
        channel_filter: Option<&str>,
    ) -> Result<Vec<Message>, ParleyError> {
        self.check(GatewayOp::FetchUnread).await?;
        Ok(in_channel(&self.unread.lock().await, channel_filter))
    }

    async fn fetch_thread_messages(
        &self,
        channel_id: ChannelId,
        topic: &str,
        limit: u32,
    ) -> Result<Vec<Message>, ParleyError> {
        self.check(GatewayOp::FetchThread).await?;
        let mut history: Vec<Message> = self
            .recent
            .lock()
            .await
            .iter()
            .filter(|m| m.channel_id() == Some(channel_id) && m.topic() == Some(topic))
            .cloned()
            .collect();
        history.sort_by_key(Message::chrono_key);
        let skip = history.len().saturating_sub(limit as usize);
        Ok(history.split_off(skip))
    }

    async fn resolve_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<ChannelInfo>, ParleyError> {
        Ok(self.channels.lock().await.get(&channel_id).cloned())
    }

    async fn create_draft(&self, target: &DraftTarget, body: &str) -> Result<DraftId, ParleyError> {
        self.create_draft_calls.fetch_add(1, Ordering::SeqCst);
        self.check(GatewayOp::CreateDraft).await?;
        let id = self.next_draft_id.fetch_add(1, Ordering::SeqCst);
        self.drafts.lock().await.push(CreatedDraft {
            id,
            target: target.clone(),
            body: body.to_string(),
        });
        Ok(id)
    }

    async fn delete_draft(&self, draft_id: DraftId) -> Result<(), ParleyError> {
        self.check(GatewayOp::DeleteDraft).await?;
        self.deleted.lock().await.push(draft_id);
        Ok(())
    }

    async fn send_message(
        &self,
        channel_name: &str,
        topic: &str,
        body: &str,
    ) -> Result<(), ParleyError> {
        self.check(GatewayOp::SendMessage).await?;
        self.sent.lock().await.push(SentMessage {
            channel: channel_name.to_string(),
            topic: topic.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::MessageBuilder;

    #[tokio::test]
    async fn filter_matches_channel_name() {
        let gateway = MockGateway::new(99, "Bot");
        gateway
            .set_recent(vec![
                MessageBuilder::channel(1, 7, "eng", "a").build(),
                MessageBuilder::channel(2, 8, "ops", "b").build(),
            ])
            .await;

        let all = gateway.fetch_recent_messages(None).await.unwrap();
        assert_eq!(all.len(), 2);
        let eng = gateway.fetch_recent_messages(Some("eng")).await.unwrap();
        assert_eq!(eng.len(), 1);
        assert_eq!(eng[0].id, 1);
    }

    #[tokio::test]
    async fn thread_history_keeps_newest() {
        let gateway = MockGateway::new(99, "Bot");
        gateway
            .set_recent((1..=5).map(|id| MessageBuilder::channel(id, 7, "eng", "a").build()).collect())
            .await;
        let history = gateway.fetch_thread_messages(7, "a", 2).await.unwrap();
        let ids: Vec<u64> = history.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn failing_ops_report_gateway_errors() {
        let gateway = MockGateway::new(99, "Bot");
        gateway.fail(GatewayOp::CreateDraft).await;
        let target = DraftTarget::direct([3]).unwrap();
        let err = gateway.create_draft(&target, "hi").await.unwrap_err();
        assert!(matches!(err, ParleyError::Gateway { .. }));
        assert_eq!(gateway.create_draft_calls(), 1);
        assert!(gateway.drafts().await.is_empty());

        gateway.recover(GatewayOp::CreateDraft).await;
        assert_eq!(gateway.create_draft(&target, "hi").await.unwrap(), 1);
        assert_eq!(gateway.create_draft(&target, "again").await.unwrap(), 2);
    }
}
