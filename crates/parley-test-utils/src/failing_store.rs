// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State store wrapper with injectable failures.
//!
//! `FailingStore` delegates to a real store and fails selected operations,
//! either for every call or only for one thread key.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, HealthStatus, MessageId, ParleyError, PluginAdapter, ProcessedMessage,
    StateStore, ThreadState,
};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetThread,
    UpsertThread,
    TouchThread,
    MarkProcessed,
    SetBotState,
}

pub struct FailingStore {
    inner: Arc<dyn StateStore>,
    failing: Mutex<HashSet<StoreOp>>,
    failing_keys: Mutex<HashSet<String>>,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn StateStore>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            failing_keys: Mutex::new(HashSet::new()),
        }
    }

    /// Make `op` fail for every call until [`FailingStore::recover`].
    pub async fn fail(&self, op: StoreOp) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.failing.lock().await.remove(&op);
    }

    /// Make every thread read and write for `thread_key` fail.
    pub async fn fail_thread(&self, thread_key: &str) {
        self.failing_keys.lock().await.insert(thread_key.to_string());
    }

    pub async fn recover_thread(&self, thread_key: &str) {
        self.failing_keys.lock().await.remove(thread_key);
    }

    async fn check(&self, op: StoreOp, thread_key: Option<&str>) -> Result<(), ParleyError> {
        let key_failing = match thread_key {
            Some(key) => self.failing_keys.lock().await.contains(key),
            None => false,
        };
        if key_failing || self.failing.lock().await.contains(&op) {
            return Err(ParleyError::Storage {
                source: format!("injected {op:?} failure").into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing-store"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl StateStore for FailingStore {
    async fn initialize(&self) -> Result<(), ParleyError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.inner.close().await
    }

    async fn get_thread(&self, thread_key: &str) -> Result<Option<ThreadState>, ParleyError> {
        self.check(StoreOp::GetThread, Some(thread_key)).await?;
        self.inner.get_thread(thread_key).await
    }

    async fn upsert_thread(&self, state: &ThreadState) -> Result<(), ParleyError> {
        self.check(StoreOp::UpsertThread, Some(state.thread_key.as_str())).await?;
        self.inner.upsert_thread(state).await
    }

    async fn touch_thread(&self, thread_key: &str) -> Result<(), ParleyError> {
        self.check(StoreOp::TouchThread, Some(thread_key)).await?;
        self.inner.touch_thread(thread_key).await
    }

    async fn threads_needing_reply(&self) -> Result<Vec<ThreadState>, ParleyError> {
        self.inner.threads_needing_reply().await
    }

    async fn mark_message_processed(&self, record: &ProcessedMessage) -> Result<(), ParleyError> {
        self.check(StoreOp::MarkProcessed, None).await?;
        self.inner.mark_message_processed(record).await
    }

    async fn is_message_processed(&self, message_id: MessageId) -> Result<bool, ParleyError> {
        self.inner.is_message_processed(message_id).await
    }

    async fn get_bot_state(&self, key: &str) -> Result<Option<String>, ParleyError> {
        self.inner.get_bot_state(key).await
    }

    async fn set_bot_state(&self, key: &str, value: &str) -> Result<(), ParleyError> {
        self.check(StoreOp::SetBotState, None).await?;
        self.inner.set_bot_state(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestHarness;

    fn state(key: &str) -> ThreadState {
        ThreadState {
            thread_key: key.to_string(),
            channel_id: Some(7),
            topic: Some("a".into()),
            last_message_id: 1,
            last_message_timestamp: 1,
            needs_reply: false,
            draft_id: None,
            last_checked: String::new(),
        }
    }

    #[tokio::test]
    async fn thread_failure_is_scoped_to_its_key() {
        let harness = TestHarness::new().await.unwrap();
        let store = &harness.store_faults;
        store.fail_thread("channel:7:a").await;

        let err = store.upsert_thread(&state("channel:7:a")).await.unwrap_err();
        assert!(matches!(err, ParleyError::Storage { .. }));
        store.upsert_thread(&state("channel:7:b")).await.unwrap();
        assert!(harness.store.get_thread("channel:7:b").await.unwrap().is_some());

        store.recover_thread("channel:7:a").await;
        store.upsert_thread(&state("channel:7:a")).await.unwrap();
    }

    #[tokio::test]
    async fn op_failure_applies_until_recovered() {
        let harness = TestHarness::new().await.unwrap();
        let store = &harness.store_faults;
        store.fail(StoreOp::SetBotState).await;
        assert!(store.set_bot_state("k", "v").await.is_err());
        assert!(store.get_bot_state("k").await.unwrap().is_none());

        store.recover(StoreOp::SetBotState).await;
        store.set_bot_state("k", "v").await.unwrap();
        assert_eq!(store.get_bot_state("k").await.unwrap().as_deref(), Some("v"));
    }
}
