// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates for reply drafts and unread digests.

use chrono::{Local, TimeZone};
use parley_core::{ConversationKind, Message, MessageLocation};

/// Style guidance used when none is configured.
pub const DEFAULT_STYLE: &str = "Write in a professional and helpful tone.";

/// Builds the prompt asking for a reply written as `user_name`.
pub fn reply_prompt(context: &str, user_name: &str, kind: ConversationKind, style: &str) -> String {
    let conversation = match kind {
        ConversationKind::Channel => "stream/channel",
        ConversationKind::Direct => "private",
    };

    format!(
        "You are an AI assistant helping {user_name} draft replies for Zulip messages.

Context: This is a {conversation} conversation.

Conversation history:
{context}

Please draft a thoughtful and appropriate reply as {user_name}. The reply should:
1. Be contextually appropriate and address the main points or questions raised
2. Match the tone of the conversation
3. Use {user_name}'s voice and perspective
4. Follow these style guidelines: {style}

Only provide the reply text, no additional formatting or explanations."
    )
}

/// Builds the prompt asking for a digest of `messages`.
pub fn summary_prompt(messages: &[Message], user_name: &str) -> String {
    let listing = messages
        .iter()
        .map(summary_line)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an AI assistant helping {user_name} get a summary of unread Zulip messages.

Here are the unread messages:

{listing}

Please provide a concise summary that includes:
1. Key topics or discussions
2. Important questions or requests directed at {user_name}
3. Any urgent or time-sensitive items
4. A brief overview of what's happening in different conversations

Format the summary in a clear, organized way that helps {user_name} quickly understand what needs attention."
    )
}

/// `[time] sender location: body`
fn summary_line(message: &Message) -> String {
    let location = match &message.location {
        MessageLocation::Channel {
            channel_name,
            topic,
            ..
        } => format!(" in #{channel_name} > {topic}"),
        MessageLocation::Direct {
            participants: Some(participants),
        } => {
            let names: Vec<&str> = participants.iter().map(|p| p.name.as_str()).collect();
            format!(" (private message with {})", names.join(", "))
        }
        MessageLocation::Direct { participants: None } => String::new(),
    };

    format!(
        "[{}] {}{location}: {}",
        format_time(message.timestamp),
        message.sender_name,
        message.body
    )
}

fn format_time(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
