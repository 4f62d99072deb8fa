// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply-need detection: was the bot mentioned after it last spoke?

use parley_core::{Message, UserId};

/// Whether `bot_id` owes a reply in this thread.
///
/// Scans the messages once in `(timestamp, id)` order, tracking the time of
/// the bot's latest message and of the latest message mentioning the bot.
/// A reply is needed when there is a mention and the bot has not spoken at
/// or after it. A bot message that mentions the bot counts as both.
pub fn needs_reply(messages: &[Message], bot_id: UserId) -> bool {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|m| m.chrono_key());

    let mut last_bot_reply_time: Option<i64> = None;
    let mut last_mention_time: Option<i64> = None;

    for message in ordered {
        if message.sender_id == bot_id {
            last_bot_reply_time = Some(message.timestamp);
        }
        if message.mentions_user(bot_id) {
            last_mention_time = Some(message.timestamp);
        }
    }

    match (last_mention_time, last_bot_reply_time) {
        (Some(mention), Some(reply)) => reply < mention,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
