// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread digest: summarize unread messages and publish to the output channel.

use chrono::{DateTime, Local};
use parley_core::ParleyError;
use tracing::{info, warn};

use crate::checking::CheckReport;
use crate::context::merge_messages;
use crate::drafting::DraftReport;
use crate::engine::{Engine, LAST_SUMMARY_TOPIC};

/// Digest text when nothing unread qualifies.
pub const NO_UNREAD_SUMMARY: &str = "No unread messages to summarize.";

/// Digest text when the generator produced nothing.
pub const SUMMARY_FAILED: &str = "Could not generate summary.";

/// Topic a digest is published under, in local time.
pub fn summary_topic(now: DateTime<Local>) -> String {
    format!("Summary {}", now.format("%Y-%m-%d %H:%M"))
}

/// Result of one summary pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub text: String,
    pub topic: String,
    /// Whether the digest reached the output channel.
    pub published: bool,
    /// Unread messages that went into the digest.
    pub message_count: usize,
}

/// Result of `run-all`: check, then draft, then summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAllReport {
    pub check: CheckReport,
    pub draft: DraftReport,
    pub summary: SummaryOutcome,
}

impl Engine {
    /// Summarizes every unread message outside the output channel and posts
    /// the digest there.
    ///
    /// The digest text is returned even when publishing fails.
    pub async fn generate_unread_summary(&self) -> Result<SummaryOutcome, ParleyError> {
        info!("summarizing unread messages");
        let output_channel = self.settings.output_channel.as_str();
        let unread = self.gateway.fetch_unread_messages(None).await?;

        let messages: Vec<_> = merge_messages([unread])
            .into_iter()
            .filter(|m| m.display_location() != Some(output_channel))
            .collect();

        let text = if messages.is_empty() {
            NO_UNREAD_SUMMARY.to_string()
        } else {
            let author = self.author_name().await;
            match self.generator.generate_summary(&messages, &author).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "summary generation failed");
                    SUMMARY_FAILED.to_string()
                }
            }
        };

        let topic = summary_topic(Local::now());
        let published = match self
            .gateway
            .send_message(output_channel, &topic, &text)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(channel = %output_channel, error = %e, "failed to publish summary");
                false
            }
        };

        if published
            && let Err(e) = self.store.set_bot_state(LAST_SUMMARY_TOPIC, &topic).await
        {
            warn!(topic = %topic, error = %e, "failed to record summary topic");
        }

        info!(
            messages = messages.len(),
            published,
            topic = %topic,
            "summary pass complete"
        );
        Ok(SummaryOutcome {
            text,
            topic,
            published,
            message_count: messages.len(),
        })
    }

    /// Check, draft and summarize in sequence. The first pass error stops
    /// the run.
    pub async fn run_all(&self) -> Result<RunAllReport, ParleyError> {
        let check = self.check_conversations().await?;
        let draft = self.draft_replies().await?;
        let summary = self.generate_unread_summary().await?;
        Ok(RunAllReport {
            check,
            draft,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn topic_uses_minute_precision() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 7, 5, 42).unwrap();
        assert_eq!(summary_topic(at), "Summary 2026-03-09 07:05");
    }
}
