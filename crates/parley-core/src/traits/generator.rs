// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text generation trait for reply drafts and digests.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationKind, Message};

/// Produces natural-language text from conversation context.
///
/// Request/response only. A failure means "no text produced" and is never
/// fatal for the caller's pass.
#[async_trait]
pub trait TextGenerator: PluginAdapter {
    /// Drafts a reply written as `author_name` for the formatted conversation.
    async fn generate_reply(
        &self,
        context: &str,
        author_name: &str,
        kind: ConversationKind,
    ) -> Result<String, ParleyError>;

    /// Summarizes a chronologically ordered list of unread messages.
    async fn generate_summary(
        &self,
        messages: &[Message],
        author_name: &str,
    ) -> Result<String, ParleyError>;
}
