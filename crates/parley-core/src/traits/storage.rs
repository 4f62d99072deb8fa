// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State store trait for thread checkpoints, processed markers and bot state.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, ProcessedMessage, ThreadState};

/// Passive persistence for the engine.
///
/// All writes are per-key overwrites and durable once the call returns.
#[async_trait]
pub trait StateStore: PluginAdapter {
    /// Opens the backend (connection, migrations).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), ParleyError>;

    /// Loads the checkpoint for one thread key.
    async fn get_thread(&self, thread_key: &str) -> Result<Option<ThreadState>, ParleyError>;

    /// Creates or overwrites a thread checkpoint.
    ///
    /// `last_message_id` never moves backwards: a write carrying an older id
    /// keeps the stored id and timestamp. `last_checked` is set to now.
    async fn upsert_thread(&self, state: &ThreadState) -> Result<(), ParleyError>;

    /// Refreshes `last_checked` without touching anything else.
    async fn touch_thread(&self, thread_key: &str) -> Result<(), ParleyError>;

    /// Threads flagged `needs_reply`, oldest last message first.
    async fn threads_needing_reply(&self) -> Result<Vec<ThreadState>, ParleyError>;

    /// Records that a message finished processing. Repeated marks overwrite.
    async fn mark_message_processed(&self, record: &ProcessedMessage) -> Result<(), ParleyError>;

    /// Whether a message id has been marked processed.
    async fn is_message_processed(&self, message_id: MessageId) -> Result<bool, ParleyError>;

    /// Reads a bot state value.
    async fn get_bot_state(&self, key: &str) -> Result<Option<String>, ParleyError>;

    /// Writes a bot state value, stamping `updated_at`.
    async fn set_bot_state(&self, key: &str, value: &str) -> Result<(), ParleyError>;
}
