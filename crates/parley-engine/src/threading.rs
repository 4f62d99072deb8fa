// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread keys and grouping of a flat message stream into conversations.

use std::collections::HashMap;

use parley_core::{ChannelId, ConversationKind, Message, MessageLocation, UserId};

/// One logical conversation: a channel topic or a direct-message group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationThread {
    pub key: String,
    pub messages: Vec<Message>,
}

impl ConversationThread {
    /// The newest message by `(timestamp, id)`.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.iter().max_by_key(|m| m.chrono_key())
    }

    pub fn kind(&self) -> Option<ConversationKind> {
        self.messages.first().map(Message::kind)
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.messages.first().and_then(Message::channel_id)
    }

    pub fn topic(&self) -> Option<&str> {
        self.messages.first().and_then(Message::topic)
    }
}

/// Deterministic key of the conversation `message` belongs to.
///
/// Channel messages key on channel id and the exact topic. Direct messages
/// key on the sorted participant ids without the bot; when the recipient
/// list is missing (or holds only the bot) the sender id stands in.
pub fn thread_key(message: &Message, bot_id: UserId) -> String {
    match &message.location {
        MessageLocation::Channel {
            channel_id, topic, ..
        } => format!("channel:{channel_id}:{topic}"),
        MessageLocation::Direct { participants } => {
            let mut ids: Vec<UserId> = participants
                .iter()
                .flatten()
                .map(|p| p.id)
                .filter(|id| *id != bot_id)
                .collect();
            ids.sort_unstable();
            ids.dedup();

            if ids.is_empty() {
                format!("direct:{}", message.sender_id)
            } else {
                let joined: Vec<String> = ids.iter().map(UserId::to_string).collect();
                format!("direct:{}", joined.join(","))
            }
        }
    }
}

/// Groups messages by thread key.
///
/// Threads appear in the order their first message was seen; messages keep
/// their arrival order inside a thread.
pub fn group_by_thread(
    messages: impl IntoIterator<Item = Message>,
    bot_id: UserId,
) -> Vec<ConversationThread> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut threads: Vec<ConversationThread> = Vec::new();

    for message in messages {
        let key = thread_key(&message, bot_id);
        match index.get(&key) {
            Some(&slot) => threads[slot].messages.push(message),
            None => {
                index.insert(key.clone(), threads.len());
                threads.push(ConversationThread {
                    key,
                    messages: vec![message],
                });
            }
        }
    }

    threads
}
