// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for parley integration tests.
//!
//! Provides mock collaborators and a harness wiring them to a real temp
//! SQLite store, so engine tests run without Zulip or Gemini.
//!
//! # Components
//!
//! - [`MockGateway`] - In-memory chat platform that records drafts and posts
//! - [`MockGenerator`] - Text generator with queued responses and call counters
//! - [`FailingStore`] - State store wrapper with per-operation and per-thread failures
//! - [`TestHarness`] - Engine plus mocks plus a temp database
//! - [`fixtures`] - Message builders

pub mod failing_store;
pub mod fixtures;
pub mod harness;
pub mod mock_gateway;
pub mod mock_generator;

pub use failing_store::{FailingStore, StoreOp};
pub use fixtures::MessageBuilder;
pub use harness::{TestHarness, TestHarnessBuilder, BOT_ID};
pub use mock_gateway::{CreatedDraft, GatewayOp, MockGateway, SentMessage};
pub use mock_generator::MockGenerator;
