// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for parley.
//!
//! Groups fetched messages into threads, decides which threads owe a reply,
//! keeps one fresh draft per active thread and builds unread digests. All
//! I/O goes through the collaborator traits in `parley-core`.

pub mod checking;
pub mod context;
pub mod drafting;
pub mod engine;
pub mod reply_need;
pub mod summary;
pub mod threading;

pub use checking::CheckReport;
pub use drafting::{resolve_draft_target, DraftOutcome, DraftReport};
pub use engine::{
    Engine, EngineSettings, DEFAULT_USER_NAME, LAST_CHECK_AT, LAST_DRAFT_AT, LAST_SUMMARY_TOPIC,
};
pub use reply_need::needs_reply;
pub use summary::{summary_topic, RunAllReport, SummaryOutcome, NO_UNREAD_SUMMARY, SUMMARY_FAILED};
pub use threading::{group_by_thread, thread_key, ConversationThread};
