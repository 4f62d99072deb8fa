// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context assembly and formatting for reply prompts.

use std::collections::HashSet;

use chrono::{Local, TimeZone};
use parley_core::types::sort_chronologically;
use parley_core::Message;

/// Merges message lists, dropping repeated ids, in chronological order.
pub fn merge_messages(lists: impl IntoIterator<Item = Vec<Message>>) -> Vec<Message> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Message> = lists
        .into_iter()
        .flatten()
        .filter(|m| seen.insert(m.id))
        .collect();
    sort_chronologically(&mut merged);
    merged
}

/// Renders a conversation as `sender [time]: body` lines, oldest first.
pub fn format_context(messages: &[Message]) -> String {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|m| m.chrono_key());
    ordered
        .into_iter()
        .map(|m| format!("{} [{}]: {}", m.sender_name, format_time(m.timestamp), m.body))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_time(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
