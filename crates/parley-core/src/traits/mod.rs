// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The engine talks to the chat platform, the text generation service and the
//! state store only through these traits. All of them extend
//! [`PluginAdapter`] and use `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod gateway;
pub mod generator;
pub mod storage;

pub use adapter::PluginAdapter;
pub use gateway::ChatGateway;
pub use generator::TextGenerator;
pub use storage::StateStore;
