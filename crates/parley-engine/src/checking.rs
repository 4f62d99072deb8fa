// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Check pass: re-evaluate every recent thread and persist its reply-need.

use parley_core::{ParleyError, ThreadState, UserId};
use tracing::{debug, info, warn};

use crate::engine::{Engine, LAST_CHECK_AT};
use crate::reply_need::needs_reply;
use crate::threading::{group_by_thread, ConversationThread};

/// Result of one check pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub threads_seen: usize,
    pub needing_reply: Vec<String>,
    /// Threads whose state could not be read or written this pass.
    pub failed: Vec<String>,
}

impl Engine {
    /// Recomputes `needs_reply` for every thread with recent activity.
    ///
    /// Threads that already have a draft keep their stored last message, so a
    /// later drafting pass still notices messages newer than the draft.
    pub async fn check_conversations(&self) -> Result<CheckReport, ParleyError> {
        info!("checking open conversations");
        let bot_id = self.bot_id().await?;
        let threads = group_by_thread(self.fetch_pass_messages().await?, bot_id);

        let mut report = CheckReport::default();
        for thread in &threads {
            if thread.messages.is_empty() {
                continue;
            }
            report.threads_seen += 1;

            match self.check_thread(thread, bot_id).await {
                Ok(true) => report.needing_reply.push(thread.key.clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        thread_key = %thread.key,
                        error = %e,
                        "thread could not be processed this pass"
                    );
                    report.failed.push(thread.key.clone());
                }
            }
        }

        self.record_checkpoint(LAST_CHECK_AT).await;
        info!(
            threads = report.threads_seen,
            needing_reply = report.needing_reply.len(),
            failed = report.failed.len(),
            "check pass complete"
        );
        Ok(report)
    }

    async fn check_thread(
        &self,
        thread: &ConversationThread,
        bot_id: UserId,
    ) -> Result<bool, ParleyError> {
        let Some(latest) = thread.latest() else {
            return Ok(false);
        };

        let context = self.load_context(thread).await;
        let needs = needs_reply(&context, bot_id);
        let existing = self.store.get_thread(&thread.key).await?;

        let (last_message_id, last_message_timestamp, draft_id) = match &existing {
            Some(prev) if prev.draft_id.is_some() => (
                prev.last_message_id,
                prev.last_message_timestamp,
                prev.draft_id,
            ),
            _ => (latest.id, latest.timestamp, None),
        };

        self.store
            .upsert_thread(&ThreadState {
                thread_key: thread.key.clone(),
                channel_id: thread.channel_id(),
                topic: thread.topic().map(str::to_string),
                last_message_id,
                last_message_timestamp,
                needs_reply: needs,
                draft_id,
                last_checked: String::new(),
            })
            .await?;

        debug!(thread_key = %thread.key, needs_reply = needs, "thread checked");
        Ok(needs)
    }
}
