// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StateStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use parley_config::model::StorageConfig;
use parley_core::{
    AdapterType, HealthStatus, MessageId, ParleyError, PluginAdapter, ProcessedMessage,
    StateStore, ThreadState,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed state store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StateStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StateStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| ParleyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Load the processed marker for one message, if any.
    pub async fn processed_message(
        &self,
        message_id: MessageId,
    ) -> Result<Option<ProcessedMessage>, ParleyError> {
        queries::processed::get_processed(self.db()?, message_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StateStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ParleyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        let db = self.db()?;
        if self.config.wal_mode {
            db.checkpoint().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    async fn get_thread(&self, thread_key: &str) -> Result<Option<ThreadState>, ParleyError> {
        queries::threads::get_thread(self.db()?, thread_key).await
    }

    async fn upsert_thread(&self, state: &ThreadState) -> Result<(), ParleyError> {
        queries::threads::upsert_thread(self.db()?, state).await
    }

    async fn touch_thread(&self, thread_key: &str) -> Result<(), ParleyError> {
        queries::threads::touch_thread(self.db()?, thread_key).await
    }

    async fn threads_needing_reply(&self) -> Result<Vec<ThreadState>, ParleyError> {
        queries::threads::threads_needing_reply(self.db()?).await
    }

    async fn mark_message_processed(&self, record: &ProcessedMessage) -> Result<(), ParleyError> {
        queries::processed::mark_processed(self.db()?, record).await
    }

    async fn is_message_processed(&self, message_id: MessageId) -> Result<bool, ParleyError> {
        queries::processed::is_processed(self.db()?, message_id).await
    }

    async fn get_bot_state(&self, key: &str) -> Result<Option<String>, ParleyError> {
        queries::bot_state::get(self.db()?, key).await
    }

    async fn set_bot_state(&self, key: &str, value: &str) -> Result<(), ParleyError> {
        queries::bot_state::set(self.db()?, key, value).await
    }
}
