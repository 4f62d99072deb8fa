// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for engine integration tests.
//!
//! `TestHarness` wires an [`Engine`] to a [`MockGateway`], a
//! [`MockGenerator`] and a real SQLite store in a temp directory. The engine
//! reaches the store through a [`FailingStore`] so tests can inject
//! storage failures.

use std::sync::Arc;

use parley_config::model::StorageConfig;
use parley_core::{ParleyError, StateStore, UserId};
use parley_engine::{Engine, EngineSettings};
use parley_storage::SqliteStorage;

use crate::failing_store::FailingStore;
use crate::mock_gateway::MockGateway;
use crate::mock_generator::MockGenerator;

/// User id the mock gateway reports for the bot.
pub const BOT_ID: UserId = 99;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    settings: EngineSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            settings: EngineSettings::default(),
        }
    }

    /// Set mock generator responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the engine settings.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_channel_filter(mut self, channel: &str) -> Self {
        self.settings.channel_filter = Some(channel.to_string());
        self
    }

    /// Build the harness, opening a fresh database.
    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ParleyError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        store.initialize().await?;

        let gateway = Arc::new(MockGateway::new(BOT_ID, "Parley Bot"));
        let generator = Arc::new(MockGenerator::with_responses(self.responses));
        let store_faults = Arc::new(FailingStore::new(store.clone()));
        let engine = Engine::new(
            gateway.clone(),
            generator.clone(),
            store_faults.clone(),
            self.settings,
        );

        Ok(TestHarness {
            gateway,
            generator,
            store,
            store_faults,
            engine,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete engine with mock collaborators.
///
/// The temp directory lives as long as the harness.
pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub generator: Arc<MockGenerator>,
    /// The underlying store, bypassing injected failures.
    pub store: Arc<SqliteStorage>,
    /// The store as the engine sees it.
    pub store_faults: Arc<FailingStore>,
    pub engine: Engine,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, ParleyError> {
        Self::builder().build().await
    }

    pub fn bot_id(&self) -> UserId {
        BOT_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_empty_store() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.store.threads_needing_reply().await.unwrap().is_empty());
        assert_eq!(harness.engine.settings().output_channel, "parley");
    }
}
