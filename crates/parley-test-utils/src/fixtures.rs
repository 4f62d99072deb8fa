// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message builders for tests.

use std::collections::BTreeSet;

use parley_core::{ChannelId, Message, MessageId, MessageLocation, Participant, UserId};

/// Fluent builder for [`Message`] values.
///
/// Defaults to a channel message in `general`, topic `testing`, sent by user
/// 1 at a timestamp equal to the id.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn channel(id: MessageId, channel_id: ChannelId, channel_name: &str, topic: &str) -> Self {
        Self {
            message: Message {
                id,
                sender_id: 1,
                sender_name: "user1".to_string(),
                timestamp: id as i64,
                body: format!("message {id}"),
                mentions: BTreeSet::new(),
                location: MessageLocation::Channel {
                    channel_id,
                    channel_name: channel_name.to_string(),
                    topic: topic.to_string(),
                },
            },
        }
    }

    /// A direct message among `participants` (which should include the sender).
    pub fn direct(id: MessageId, participants: &[UserId]) -> Self {
        let mut builder = Self::channel(id, 0, "", "");
        builder.message.location = MessageLocation::Direct {
            participants: Some(
                participants
                    .iter()
                    .map(|&id| Participant {
                        id,
                        name: format!("user{id}"),
                    })
                    .collect(),
            ),
        };
        builder
    }

    /// A direct message whose recipient field could not be read.
    pub fn direct_without_recipients(id: MessageId) -> Self {
        let mut builder = Self::channel(id, 0, "", "");
        builder.message.location = MessageLocation::Direct { participants: None };
        builder
    }

    pub fn sent_by(mut self, sender_id: UserId) -> Self {
        self.message.sender_id = sender_id;
        self.message.sender_name = format!("user{sender_id}");
        self
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.message.timestamp = timestamp;
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.message.body = body.to_string();
        self
    }

    pub fn mentioning(mut self, user_id: UserId) -> Self {
        self.message.mentions.insert(user_id);
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
