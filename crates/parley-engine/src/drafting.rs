// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drafting pass: one fresh draft per thread with new activity.

use parley_core::{
    DraftId, DraftTarget, Message, MessageLocation, ParleyError, ProcessedMessage, ThreadState,
    UserId,
};
use tracing::{debug, info, warn};

use crate::context::format_context;
use crate::engine::{Engine, LAST_DRAFT_AT};
use crate::reply_need::needs_reply;
use crate::threading::{group_by_thread, ConversationThread};

/// What happened to one thread during a drafting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// A draft was created and the checkpoint advanced.
    Drafted { draft_id: DraftId },
    /// The existing draft already covers the newest message.
    UpToDate,
    /// Reply-need gating is on and no reply is owed.
    NotNeeded,
    /// The draft destination was invalid; nothing was written.
    Rejected { reason: String },
    /// Text generation or draft creation failed; nothing was written.
    Failed { reason: String },
}

/// Result of one drafting pass, per thread key in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftReport {
    pub outcomes: Vec<(String, DraftOutcome)>,
}

impl DraftReport {
    pub fn drafted(&self) -> usize {
        self.count(|o| matches!(o, DraftOutcome::Drafted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DraftOutcome::UpToDate | DraftOutcome::NotNeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DraftOutcome::Rejected { .. } | DraftOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&DraftOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Where a reply to `latest` should go.
///
/// Channel threads reply into the same topic. Direct threads reply to every
/// participant but the bot; with no recipient list, to the sender.
pub fn resolve_draft_target(latest: &Message, bot_id: UserId) -> Result<DraftTarget, ParleyError> {
    match &latest.location {
        MessageLocation::Channel {
            channel_id, topic, ..
        } => DraftTarget::channel(Some(*channel_id), topic),
        MessageLocation::Direct {
            participants: Some(participants),
        } => DraftTarget::direct(
            participants
                .iter()
                .map(|p| p.id)
                .filter(|id| *id != bot_id),
        ),
        MessageLocation::Direct { participants: None } => {
            DraftTarget::direct(Some(latest.sender_id).filter(|id| *id != bot_id))
        }
    }
}

impl Engine {
    /// Creates a fresh draft for every thread with messages newer than its
    /// current draft.
    pub async fn draft_replies(&self) -> Result<DraftReport, ParleyError> {
        info!("drafting replies for recent conversations");
        let bot_id = self.bot_id().await?;
        let author = self.author_name().await;
        let threads = group_by_thread(self.fetch_pass_messages().await?, bot_id);

        let mut report = DraftReport::default();
        for thread in &threads {
            if thread.messages.is_empty() {
                continue;
            }
            let outcome = match self.draft_thread(thread, bot_id, &author).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        thread_key = %thread.key,
                        error = %e,
                        "thread could not be processed this pass"
                    );
                    DraftOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.push((thread.key.clone(), outcome));
        }

        self.record_checkpoint(LAST_DRAFT_AT).await;
        info!(
            drafted = report.drafted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "drafting pass complete"
        );
        Ok(report)
    }

    /// Runs the draft state machine for one thread.
    ///
    /// Gateway and generator failures become a [`DraftOutcome`]. Store errors
    /// are returned and the caller reports the thread as failed.
    async fn draft_thread(
        &self,
        thread: &ConversationThread,
        bot_id: UserId,
        author: &str,
    ) -> Result<DraftOutcome, ParleyError> {
        let key = thread.key.as_str();
        let Some(latest) = thread.latest() else {
            return Ok(DraftOutcome::UpToDate);
        };

        let existing = self.store.get_thread(key).await?;
        if let Some(prev) = &existing
            && prev.draft_id.is_some()
            && prev.last_message_id >= latest.id
        {
            debug!(thread_key = %key, "draft is current, skipping");
            self.store.touch_thread(key).await?;
            return Ok(DraftOutcome::UpToDate);
        }

        let target = match resolve_draft_target(latest, bot_id) {
            Ok(target) => target,
            Err(e) => {
                warn!(thread_key = %key, error = %e, "cannot address a draft for this thread");
                return Ok(DraftOutcome::Rejected {
                    reason: e.to_string(),
                });
            }
        };

        let context = self.load_context(thread).await;
        if self.settings.only_when_reply_needed && !needs_reply(&context, bot_id) {
            debug!(thread_key = %key, "no reply owed, skipping");
            match existing {
                Some(_) => self.store.touch_thread(key).await?,
                None => {
                    self.store
                        .upsert_thread(&tracked_state(key, latest, false, None))
                        .await?
                }
            }
            return Ok(DraftOutcome::NotNeeded);
        }

        let reply = match self
            .generator
            .generate_reply(&format_context(&context), author, target.kind())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(thread_key = %key, error = %e, "reply generation failed");
                return Ok(DraftOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        if self.settings.delete_superseded_drafts
            && let Some(old) = existing.as_ref().and_then(|t| t.draft_id)
        {
            match self.gateway.delete_draft(old).await {
                Ok(()) => debug!(thread_key = %key, draft_id = old, "superseded draft deleted"),
                Err(e) => warn!(
                    thread_key = %key,
                    draft_id = old,
                    error = %e,
                    "failed to delete superseded draft"
                ),
            }
        }

        let draft_id = match self.gateway.create_draft(&target, &reply).await {
            Ok(id) => id,
            Err(e) => {
                warn!(thread_key = %key, error = %e, "draft creation failed");
                return Ok(DraftOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        // The thread record is the skip gate, so it is written first. A draft
        // it cannot record is withdrawn.
        if let Err(e) = self
            .store
            .upsert_thread(&tracked_state(key, latest, true, Some(draft_id)))
            .await
        {
            warn!(
                thread_key = %key,
                draft_id,
                error = %e,
                "failed to record draft, withdrawing it"
            );
            if let Err(del) = self.gateway.delete_draft(draft_id).await {
                warn!(
                    thread_key = %key,
                    draft_id,
                    error = %del,
                    "failed to withdraw unrecorded draft"
                );
            }
            return Ok(DraftOutcome::Failed {
                reason: e.to_string(),
            });
        }

        if let Err(e) = self
            .store
            .mark_message_processed(&ProcessedMessage::for_message(latest, true))
            .await
        {
            warn!(
                thread_key = %key,
                message_id = latest.id,
                error = %e,
                "failed to mark message processed"
            );
        }

        info!(thread_key = %key, draft_id, "draft created");
        Ok(DraftOutcome::Drafted { draft_id })
    }
}

fn tracked_state(
    key: &str,
    latest: &Message,
    needs_reply: bool,
    draft_id: Option<DraftId>,
) -> ThreadState {
    ThreadState {
        thread_key: key.to_string(),
        channel_id: latest.channel_id(),
        topic: latest.topic().map(str::to_string),
        last_message_id: latest.id,
        last_message_timestamp: latest.timestamp,
        needs_reply,
        draft_id,
        last_checked: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Participant;
    use std::collections::BTreeSet;

    const BOT: UserId = 99;

    fn with_location(sender_id: UserId, location: MessageLocation) -> Message {
        Message {
            id: 1,
            sender_id,
            sender_name: String::new(),
            timestamp: 1,
            body: String::new(),
            mentions: BTreeSet::new(),
            location,
        }
    }

    fn participants(ids: &[UserId]) -> Option<Vec<Participant>> {
        Some(
            ids.iter()
                .map(|&id| Participant {
                    id,
                    name: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn channel_target_trims_topic() {
        let msg = with_location(
            5,
            MessageLocation::Channel {
                channel_id: 7,
                channel_name: "eng".into(),
                topic: "  release ".into(),
            },
        );
        assert_eq!(
            resolve_draft_target(&msg, BOT).unwrap(),
            DraftTarget::Channel {
                channel_id: 7,
                topic: "release".into()
            }
        );
    }

    #[test]
    fn whitespace_topic_is_rejected() {
        let msg = with_location(
            5,
            MessageLocation::Channel {
                channel_id: 7,
                channel_name: "eng".into(),
                topic: "   ".into(),
            },
        );
        assert!(matches!(
            resolve_draft_target(&msg, BOT),
            Err(ParleyError::DraftRejected { .. })
        ));
    }

    #[test]
    fn direct_target_excludes_bot() {
        let msg = with_location(5, MessageLocation::Direct { participants: participants(&[5, BOT, 3]) });
        assert_eq!(
            resolve_draft_target(&msg, BOT).unwrap(),
            DraftTarget::Direct { recipients: vec![3, 5] }
        );
    }

    #[test]
    fn direct_target_with_only_bot_is_rejected() {
        let msg = with_location(BOT, MessageLocation::Direct { participants: participants(&[BOT]) });
        assert!(resolve_draft_target(&msg, BOT).is_err());
    }

    #[test]
    fn missing_recipient_list_targets_sender() {
        let msg = with_location(5, MessageLocation::Direct { participants: None });
        assert_eq!(
            resolve_draft_target(&msg, BOT).unwrap(),
            DraftTarget::Direct { recipients: vec![5] }
        );
    }

    #[test]
    fn report_counts_outcomes() {
        let report = DraftReport {
            outcomes: vec![
                ("a".into(), DraftOutcome::Drafted { draft_id: 1 }),
                ("b".into(), DraftOutcome::UpToDate),
                ("c".into(), DraftOutcome::NotNeeded),
                ("d".into(), DraftOutcome::Rejected { reason: "x".into() }),
            ],
        };
        assert_eq!(report.drafted(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
    }
}
