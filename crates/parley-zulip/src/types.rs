// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zulip REST API wire types.
//!
//! These mirror the JSON the server sends and receives. Conversion into the
//! domain [`Message`] happens once, in [`WireMessage::into_message`], so the
//! rest of the workspace never sees `display_recipient` polymorphism.

use std::collections::BTreeSet;

use parley_core::{DraftTarget, Message, MessageLocation, Participant, UserId};
use serde::{Deserialize, Serialize};

/// Flags that mean the requesting user was mentioned.
const MENTION_FLAGS: &[&str] = &["mentioned", "wildcard_mentioned"];

/// Common response envelope. Every Zulip response carries `result` and `msg`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub result: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: String,
}

/// `GET /messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// `GET /streams`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamsResponse {
    #[serde(default)]
    pub streams: Vec<WireStream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStream {
    pub stream_id: u64,
    pub name: String,
}

/// `POST /drafts`.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftsResponse {
    #[serde(default)]
    pub ids: Vec<u64>,
}

/// One draft in the `drafts` form field of `POST /drafts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireDraft {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub to: Vec<u64>,
    pub topic: String,
    pub content: String,
}

impl WireDraft {
    pub fn new(target: &DraftTarget, content: &str) -> Self {
        match target {
            DraftTarget::Channel { channel_id, topic } => Self {
                kind: "stream",
                to: vec![*channel_id],
                topic: topic.clone(),
                content: content.to_string(),
            },
            DraftTarget::Direct { recipients } => Self {
                kind: "private",
                to: recipients.clone(),
                topic: String::new(),
                content: content.to_string(),
            },
        }
    }
}

/// A narrow term for `GET /messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrowTerm {
    pub operator: &'static str,
    pub operand: String,
}

impl NarrowTerm {
    pub fn new(operator: &'static str, operand: impl Into<String>) -> Self {
        Self {
            operator,
            operand: operand.into(),
        }
    }
}

/// A recipient entry of a private message's `display_recipient` list.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRecipient {
    pub id: UserId,
    #[serde(default)]
    pub full_name: String,
}

/// A message as delivered by `GET /messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: u64,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender_full_name: String,
    pub timestamp: i64,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Channel name (string) for channel messages, recipient list for private ones.
    #[serde(default)]
    pub display_recipient: serde_json::Value,
    #[serde(default)]
    pub stream_id: Option<u64>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl WireMessage {
    /// Converts into a domain message.
    ///
    /// `viewer_id` is the account the request was made as: Zulip reports
    /// mentions of that account through `flags`. Returns `None` for a channel
    /// message that lacks a channel id.
    pub fn into_message(self, viewer_id: UserId) -> Option<Message> {
        let mut mentions = BTreeSet::new();
        if self
            .flags
            .iter()
            .any(|flag| MENTION_FLAGS.contains(&flag.as_str()))
        {
            mentions.insert(viewer_id);
        }

        let location = if self.kind == "stream" {
            MessageLocation::Channel {
                channel_id: self.stream_id?,
                channel_name: self
                    .display_recipient
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                topic: self.subject,
            }
        } else {
            let participants = serde_json::from_value::<Vec<WireRecipient>>(self.display_recipient)
                .ok()
                .map(|list| {
                    list.into_iter()
                        .map(|r| Participant {
                            id: r.id,
                            name: r.full_name,
                        })
                        .collect()
                });
            MessageLocation::Direct { participants }
        };

        Some(Message {
            id: self.id,
            sender_id: self.sender_id,
            sender_name: self.sender_full_name,
            timestamp: self.timestamp,
            body: self.content,
            mentions,
            location,
        })
    }
}
