// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: collaborators, settings and shared helpers.
//!
//! The passes themselves live in `checking`, `drafting` and `summary`, each
//! adding methods to [`Engine`].

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_core::{
    ChatGateway, Message, ParleyError, StateStore, TextGenerator, ThreadState, UserId,
    UserProfile,
};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::context::merge_messages;
use crate::threading::ConversationThread;

/// Display name used when neither the profile nor the config provides one.
pub const DEFAULT_USER_NAME: &str = "User";

/// BotState key: completion time of the last check pass.
pub const LAST_CHECK_AT: &str = "last_check_at";
/// BotState key: completion time of the last drafting pass.
pub const LAST_DRAFT_AT: &str = "last_draft_at";
/// BotState key: topic of the last published digest.
pub const LAST_SUMMARY_TOPIC: &str = "last_summary_topic";

/// Engine behavior derived from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Channel receiving digests; its messages are never summarized.
    pub output_channel: String,
    /// Restricts drafting and checking to one channel (direct messages skipped).
    pub channel_filter: Option<String>,
    /// Topic messages loaded as context for channel threads.
    pub context_limit: u32,
    /// Delete a thread's previous draft before creating a fresh one.
    pub delete_superseded_drafts: bool,
    /// Draft only threads flagged by the reply-need detector.
    pub only_when_reply_needed: bool,
    /// Display name used when the profile lookup fails.
    pub fallback_user_name: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            output_channel: "parley".to_string(),
            channel_filter: None,
            context_limit: 20,
            delete_superseded_drafts: false,
            only_when_reply_needed: false,
            fallback_user_name: None,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &ParleyConfig) -> Self {
        Self {
            output_channel: config.zulip.output_channel.clone(),
            channel_filter: config
                .drafting
                .channel_filter
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            context_limit: config.zulip.context_limit,
            delete_superseded_drafts: config.drafting.delete_superseded_drafts,
            only_when_reply_needed: config.drafting.only_when_reply_needed,
            fallback_user_name: config.agent.user_full_name.clone(),
        }
    }
}

/// Runs check, draft and summary passes against its collaborators.
///
/// Every pass is sequential: one thread at a time, each collaborator call
/// awaited before the next.
pub struct Engine {
    pub(crate) gateway: Arc<dyn ChatGateway>,
    pub(crate) generator: Arc<dyn TextGenerator>,
    pub(crate) store: Arc<dyn StateStore>,
    pub(crate) settings: EngineSettings,
    profile: OnceCell<UserProfile>,
}

impl Engine {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn StateStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            gateway,
            generator,
            store,
            settings,
            profile: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The bot's profile, fetched once per engine.
    pub(crate) async fn profile(&self) -> Result<&UserProfile, ParleyError> {
        self.profile
            .get_or_try_init(|| self.gateway.current_user())
            .await
    }

    /// The bot's user id. Without it threads cannot be keyed, so a failed
    /// lookup fails the pass.
    pub(crate) async fn bot_id(&self) -> Result<UserId, ParleyError> {
        Ok(self.profile().await?.id)
    }

    /// Name replies and digests are written as.
    ///
    /// Profile name, then the configured fallback, then [`DEFAULT_USER_NAME`].
    pub async fn author_name(&self) -> String {
        let profile_name = match self.profile().await {
            Ok(profile) => Some(profile.full_name.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "could not load bot profile, using fallback name");
                None
            }
        };

        profile_name
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.settings
                    .fallback_user_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string())
    }

    /// Messages a check or draft pass works on.
    ///
    /// Recent messages (narrowed to the channel filter when set) plus, only
    /// without a filter, recent direct messages. A failed direct fetch is
    /// logged and the pass continues with channel messages alone.
    pub(crate) async fn fetch_pass_messages(&self) -> Result<Vec<Message>, ParleyError> {
        let filter = self.settings.channel_filter.as_deref();
        let recent = self.gateway.fetch_recent_messages(filter).await?;

        if filter.is_some() {
            debug!(count = recent.len(), channel = ?filter, "fetched filtered messages");
            return Ok(merge_messages([recent]));
        }

        let direct = match self.gateway.fetch_all_direct_messages().await {
            Ok(direct) => direct,
            Err(e) => {
                warn!(error = %e, "failed to fetch direct messages, continuing without them");
                Vec::new()
            }
        };
        debug!(recent = recent.len(), direct = direct.len(), "fetched pass messages");
        Ok(merge_messages([recent, direct]))
    }

    /// Full conversation for a thread.
    ///
    /// Channel threads add up to `context_limit` topic messages from the
    /// gateway; a failed fetch falls back to the pass's own messages.
    pub(crate) async fn load_context(&self, thread: &ConversationThread) -> Vec<Message> {
        let (Some(channel_id), Some(topic)) = (thread.channel_id(), thread.topic()) else {
            return merge_messages([thread.messages.clone()]);
        };

        match self
            .gateway
            .fetch_thread_messages(channel_id, topic, self.settings.context_limit)
            .await
        {
            Ok(history) => merge_messages([history, thread.messages.clone()]),
            Err(e) => {
                warn!(
                    thread_key = %thread.key,
                    error = %e,
                    "failed to load topic history, using fetched messages only"
                );
                merge_messages([thread.messages.clone()])
            }
        }
    }

    /// Threads whose stored checkpoint says a reply is owed, oldest first.
    pub async fn pending_threads(&self) -> Result<Vec<ThreadState>, ParleyError> {
        self.store.threads_needing_reply().await
    }

    /// Stores the current time under `key`. A failed write is logged only;
    /// the pass's per-thread work is already done.
    pub(crate) async fn record_checkpoint(&self, key: &str) {
        let now = chrono::Utc::now().to_rfc3339();
        if let Err(e) = self.store.set_bot_state(key, &now).await {
            warn!(key, error = %e, "failed to record checkpoint");
        }
    }
}
