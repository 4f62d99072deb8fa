// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for parley.
//!
//! This crate provides the collaborator traits, the shared error type and the
//! domain types (messages, draft targets, thread checkpoints) used throughout
//! the workspace. Gateway, generator and storage crates implement the traits
//! defined here; the engine consumes them.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ParleyError;
pub use types::{
    AdapterType, ChannelId, ChannelInfo, ConversationKind, DraftId, DraftTarget, HealthStatus,
    Message, MessageId, MessageLocation, Participant, ProcessedMessage, ThreadState, UserId,
    UserProfile,
};

pub use traits::{ChatGateway, PluginAdapter, StateStore, TextGenerator};
