// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generator for deterministic testing.
//!
//! `MockGenerator` implements `TextGenerator` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, ConversationKind, HealthStatus, Message, ParleyError, PluginAdapter,
    TextGenerator,
};

/// A text generator that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue shared by replies and summaries.
/// When the queue is empty a default text is returned.
pub struct MockGenerator {
    responses: Mutex<VecDeque<String>>,
    failing: AtomicBool,
    reply_calls: AtomicUsize,
    summary_calls: AtomicUsize,
    contexts: Mutex<Vec<String>>,
    summary_inputs: Mutex<Vec<Vec<Message>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            failing: AtomicBool::new(false),
            reply_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
            summary_inputs: Mutex::new(Vec::new()),
        }
    }

    pub async fn add_response(&self, text: &str) {
        self.responses.lock().await.push_back(text.to_string());
    }

    /// Make every call fail with a provider error (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn reply_calls(&self) -> usize {
        self.reply_calls.load(Ordering::SeqCst)
    }

    pub fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }

    /// Formatted contexts passed to `generate_reply`, in call order.
    pub async fn contexts(&self) -> Vec<String> {
        self.contexts.lock().await.clone()
    }

    /// Message lists passed to `generate_summary`, in call order.
    pub async fn summary_inputs(&self) -> Vec<Vec<Message>> {
        self.summary_inputs.lock().await.clone()
    }

    async fn next_response(&self, default: &str) -> Result<String, ParleyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ParleyError::provider("mock generator failure"));
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| default.to_string()))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate_reply(
        &self,
        context: &str,
        _author_name: &str,
        _kind: ConversationKind,
    ) -> Result<String, ParleyError> {
        self.reply_calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().await.push(context.to_string());
        self.next_response("mock reply").await
    }

    async fn generate_summary(
        &self,
        messages: &[Message],
        _author_name: &str,
    ) -> Result<String, ParleyError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summary_inputs.lock().await.push(messages.to_vec());
        self.next_response("mock summary").await
    }
}
