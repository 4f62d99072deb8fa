// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared between the gateway, the store, and the engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ParleyError;

/// Platform-assigned user identifier.
pub type UserId = u64;

/// Platform-assigned, monotonically increasing message identifier.
pub type MessageId = u64;

/// Platform-assigned channel (stream) identifier.
pub type ChannelId = u64;

/// Identifier of a draft held by the chat platform.
pub type DraftId = u64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Gateway,
    Generator,
    Storage,
}

/// The two kinds of conversation on the chat platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// A topic inside a shared channel.
    Channel,
    /// A private message between specific participants.
    Direct,
}

/// A participant of a direct conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
}

/// Where a message was posted.
///
/// Decided once when the message is ingested so downstream code never probes
/// for optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLocation {
    Channel {
        channel_id: ChannelId,
        channel_name: String,
        topic: String,
    },
    /// `participants` is `None` when the platform delivered a recipient field
    /// that was not a list.
    Direct {
        participants: Option<Vec<Participant>>,
    },
}

/// One chat message, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_name: String,
    /// Seconds since the epoch, platform clock.
    pub timestamp: i64,
    pub body: String,
    pub mentions: BTreeSet<UserId>,
    pub location: MessageLocation,
}

impl Message {
    pub fn kind(&self) -> ConversationKind {
        match self.location {
            MessageLocation::Channel { .. } => ConversationKind::Channel,
            MessageLocation::Direct { .. } => ConversationKind::Direct,
        }
    }

    pub fn mentions_user(&self, user_id: UserId) -> bool {
        self.mentions.contains(&user_id)
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        match &self.location {
            MessageLocation::Channel { channel_id, .. } => Some(*channel_id),
            MessageLocation::Direct { .. } => None,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match &self.location {
            MessageLocation::Channel { topic, .. } => Some(topic),
            MessageLocation::Direct { .. } => None,
        }
    }

    /// The channel name a channel message is displayed under.
    pub fn display_location(&self) -> Option<&str> {
        match &self.location {
            MessageLocation::Channel { channel_name, .. } => Some(channel_name),
            MessageLocation::Direct { .. } => None,
        }
    }

    /// Sort key for chronological order: timestamp, ties broken by id.
    pub fn chrono_key(&self) -> (i64, MessageId) {
        (self.timestamp, self.id)
    }
}

/// Sorts messages ascending by timestamp, breaking ties by message id.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by_key(Message::chrono_key);
}

/// A validated draft destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTarget {
    Channel { channel_id: ChannelId, topic: String },
    Direct { recipients: Vec<UserId> },
}

impl DraftTarget {
    /// Builds a channel target. The topic is trimmed; an empty topic or a
    /// missing channel id is rejected.
    pub fn channel(channel_id: Option<ChannelId>, topic: &str) -> Result<Self, ParleyError> {
        let channel_id = channel_id
            .ok_or_else(|| ParleyError::draft_rejected("channel draft without a channel id"))?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ParleyError::draft_rejected(format!(
                "channel draft for channel {channel_id} has an empty topic"
            )));
        }
        Ok(DraftTarget::Channel {
            channel_id,
            topic: topic.to_string(),
        })
    }

    /// Builds a direct target. Recipients are de-duplicated; an empty set is
    /// rejected.
    pub fn direct(recipients: impl IntoIterator<Item = UserId>) -> Result<Self, ParleyError> {
        let recipients: Vec<UserId> = recipients
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if recipients.is_empty() {
            return Err(ParleyError::draft_rejected(
                "direct draft without any recipients",
            ));
        }
        Ok(DraftTarget::Direct { recipients })
    }

    pub fn kind(&self) -> ConversationKind {
        match self {
            DraftTarget::Channel { .. } => ConversationKind::Channel,
            DraftTarget::Direct { .. } => ConversationKind::Direct,
        }
    }
}

/// Profile of the account the bot acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: String,
}

/// Channel metadata resolved from a channel id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
}

/// Persisted per-thread checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    pub thread_key: String,
    pub channel_id: Option<ChannelId>,
    pub topic: Option<String>,
    pub last_message_id: MessageId,
    pub last_message_timestamp: i64,
    pub needs_reply: bool,
    pub draft_id: Option<DraftId>,
    /// Set by the store on every write (RFC 3339, UTC).
    pub last_checked: String,
}

/// Persisted marker for a message whose processing completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedMessage {
    pub message_id: MessageId,
    pub channel_id: Option<ChannelId>,
    pub topic: Option<String>,
    pub sender_id: UserId,
    pub timestamp: i64,
    pub draft_created: bool,
    /// Set by the store on write (RFC 3339, UTC).
    pub processed_at: String,
}

impl ProcessedMessage {
    /// Builds a marker for `message`; `processed_at` is filled in by the store.
    pub fn for_message(message: &Message, draft_created: bool) -> Self {
        Self {
            message_id: message.id,
            channel_id: message.channel_id(),
            topic: message.topic().map(str::to_string),
            sender_id: message.sender_id,
            timestamp: message.timestamp,
            draft_created,
            processed_at: String::new(),
        }
    }
}
