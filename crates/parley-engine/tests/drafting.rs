// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drafting and check passes against mock collaborators and a temp store.

use parley_core::{DraftTarget, StateStore};
use parley_engine::{DraftOutcome, EngineSettings, LAST_CHECK_AT, LAST_DRAFT_AT};
use parley_test_utils::{GatewayOp, MessageBuilder, StoreOp, TestHarness, BOT_ID};

const DEPLOYS: &str = "channel:7:deploys";

fn deploy_message(id: u64) -> parley_core::Message {
    MessageBuilder::channel(id, 7, "eng", "deploys")
        .sent_by(5)
        .body("can you check the rollout?")
        .mentioning(BOT_ID)
        .build()
}

#[tokio::test]
async fn first_pass_drafts_and_records_thread() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["On it.".into()])
        .build()
        .await
        .unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);

    let drafts = harness.gateway.drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].body, "On it.");
    assert_eq!(
        drafts[0].target,
        DraftTarget::Channel {
            channel_id: 7,
            topic: "deploys".into()
        }
    );

    let state = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();
    assert_eq!(state.last_message_id, 10);
    assert_eq!(state.draft_id, Some(drafts[0].id));
    assert!(state.needs_reply);
    assert!(harness.store.is_message_processed(10).await.unwrap());
    assert!(harness.store.get_bot_state(LAST_DRAFT_AT).await.unwrap().is_some());
}

#[tokio::test]
async fn repeated_pass_without_new_messages_is_a_skip() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;

    harness.engine.draft_replies().await.unwrap();
    let before = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(
        report.outcomes,
        vec![(DEPLOYS.to_string(), DraftOutcome::UpToDate)]
    );
    assert_eq!(harness.gateway.create_draft_calls(), 1);
    assert_eq!(harness.generator.reply_calls(), 1);

    let after = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();
    assert_eq!(after.last_message_id, before.last_message_id);
    assert_eq!(after.draft_id, before.draft_id);
    assert_eq!(after.needs_reply, before.needs_reply);
}

#[tokio::test]
async fn newer_message_replaces_the_draft() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.engine.draft_replies().await.unwrap();

    harness.gateway.push_recent(deploy_message(11)).await;
    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);

    let drafts = harness.gateway.drafts().await;
    assert_eq!(drafts.len(), 2);
    let state = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();
    assert_eq!(state.last_message_id, 11);
    assert_eq!(state.draft_id, Some(drafts[1].id));
    assert!(harness.gateway.deleted_drafts().await.is_empty());
}

#[tokio::test]
async fn superseded_draft_is_deleted_when_enabled() {
    let harness = TestHarness::builder()
        .with_settings(EngineSettings {
            delete_superseded_drafts: true,
            ..EngineSettings::default()
        })
        .build()
        .await
        .unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.engine.draft_replies().await.unwrap();
    let first = harness.gateway.drafts().await[0].id;

    harness.gateway.push_recent(deploy_message(11)).await;
    harness.engine.draft_replies().await.unwrap();
    assert_eq!(harness.gateway.deleted_drafts().await, vec![first]);
}

#[tokio::test]
async fn failed_delete_does_not_block_new_draft() {
    let harness = TestHarness::builder()
        .with_settings(EngineSettings {
            delete_superseded_drafts: true,
            ..EngineSettings::default()
        })
        .build()
        .await
        .unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.engine.draft_replies().await.unwrap();

    harness.gateway.fail(GatewayOp::DeleteDraft).await;
    harness.gateway.push_recent(deploy_message(11)).await;
    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
    assert_eq!(harness.gateway.drafts().await.len(), 2);
}

#[tokio::test]
async fn whitespace_topic_is_rejected_without_writes() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_recent(vec![MessageBuilder::channel(3, 7, "eng", "   ")
            .sent_by(5)
            .mentioning(BOT_ID)
            .build()])
        .await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert!(matches!(
        report.outcomes[0].1,
        DraftOutcome::Rejected { .. }
    ));
    assert_eq!(harness.gateway.create_draft_calls(), 0);
    assert_eq!(harness.generator.reply_calls(), 0);
    assert!(harness.store.get_thread("channel:7:   ").await.unwrap().is_none());
    assert!(!harness.store.is_message_processed(3).await.unwrap());
}

#[tokio::test]
async fn generator_failure_leaves_thread_untouched_and_continues() {
    let harness = TestHarness::new().await.unwrap();
    harness.generator.set_failing(true);
    harness
        .gateway
        .set_recent(vec![
            deploy_message(10),
            MessageBuilder::channel(11, 7, "eng", "lunch").sent_by(6).build(),
        ])
        .await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.failed(), 2);
    assert_eq!(harness.gateway.create_draft_calls(), 0);
    assert!(harness.store.get_thread(DEPLOYS).await.unwrap().is_none());

    harness.generator.set_failing(false);
    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 2);
}

#[tokio::test]
async fn draft_creation_failure_is_per_thread() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.fail(GatewayOp::CreateDraft).await;
    harness.gateway.set_recent(vec![deploy_message(10)]).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert!(matches!(report.outcomes[0].1, DraftOutcome::Failed { .. }));
    assert!(harness.store.get_thread(DEPLOYS).await.unwrap().is_none());
}

fn topic_message(id: u64, topic: &str) -> parley_core::Message {
    MessageBuilder::channel(id, 7, "eng", topic)
        .sent_by(5)
        .mentioning(BOT_ID)
        .build()
}

#[tokio::test]
async fn store_failure_on_one_thread_does_not_stop_the_pass() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_recent(vec![topic_message(10, "a"), topic_message(11, "b")])
        .await;
    harness.store_faults.fail_thread("channel:7:a").await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.outcomes[0].0, "channel:7:a");
    assert!(matches!(report.outcomes[0].1, DraftOutcome::Failed { .. }));
    assert!(matches!(report.outcomes[1].1, DraftOutcome::Drafted { .. }));

    let drafts = harness.gateway.drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(
        drafts[0].target,
        DraftTarget::Channel {
            channel_id: 7,
            topic: "b".into()
        }
    );
    assert!(harness.store.get_thread("channel:7:b").await.unwrap().is_some());
    assert!(harness.store.get_bot_state(LAST_DRAFT_AT).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_processed_marker_does_not_duplicate_the_draft() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.store_faults.fail(StoreOp::MarkProcessed).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
    assert!(!harness.store.is_message_processed(10).await.unwrap());

    harness.store_faults.recover(StoreOp::MarkProcessed).await;
    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(
        report.outcomes,
        vec![(DEPLOYS.to_string(), DraftOutcome::UpToDate)]
    );
    assert_eq!(harness.gateway.create_draft_calls(), 1);
}

#[tokio::test]
async fn unrecorded_draft_is_withdrawn_and_redrafted_once() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.store_faults.fail(StoreOp::UpsertThread).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert!(matches!(report.outcomes[0].1, DraftOutcome::Failed { .. }));
    let first = harness.gateway.drafts().await[0].id;
    assert_eq!(harness.gateway.deleted_drafts().await, vec![first]);
    assert!(harness.store.get_thread(DEPLOYS).await.unwrap().is_none());

    harness.store_faults.recover(StoreOp::UpsertThread).await;
    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
    harness.engine.draft_replies().await.unwrap();

    let drafts = harness.gateway.drafts().await;
    assert_eq!(drafts.len(), 2);
    assert_eq!(harness.gateway.deleted_drafts().await, vec![first]);
    let state = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();
    assert_eq!(state.draft_id, Some(drafts[1].id));
}

#[tokio::test]
async fn failed_checkpoint_keeps_the_pass_result() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.store_faults.fail(StoreOp::SetBotState).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
    assert!(harness.store.get_bot_state(LAST_DRAFT_AT).await.unwrap().is_none());
}

#[tokio::test]
async fn direct_messages_are_drafted_to_participants_without_bot() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_direct(vec![MessageBuilder::direct(20, &[5, 6, BOT_ID])
            .sent_by(6)
            .body("ping")
            .build()])
        .await;

    harness.engine.draft_replies().await.unwrap();
    let drafts = harness.gateway.drafts().await;
    assert_eq!(
        drafts[0].target,
        DraftTarget::Direct {
            recipients: vec![5, 6]
        }
    );
    assert!(harness.store.get_thread("direct:5,6").await.unwrap().is_some());
}

#[tokio::test]
async fn channel_filter_skips_direct_messages() {
    let harness = TestHarness::builder()
        .with_channel_filter("eng")
        .build()
        .await
        .unwrap();
    harness
        .gateway
        .set_recent(vec![
            deploy_message(10),
            MessageBuilder::channel(12, 8, "ops", "pager").build(),
        ])
        .await;
    harness
        .gateway
        .set_direct(vec![MessageBuilder::direct(20, &[5, BOT_ID]).sent_by(5).build()])
        .await;

    let report = harness.engine.draft_replies().await.unwrap();
    let keys: Vec<&str> = report.outcomes.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec![DEPLOYS]);
}

#[tokio::test]
async fn failed_direct_fetch_does_not_stop_the_pass() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.fail(GatewayOp::FetchDirect).await;
    harness.gateway.set_recent(vec![deploy_message(10)]).await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
}

#[tokio::test]
async fn failed_recent_fetch_fails_the_pass() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.fail(GatewayOp::FetchRecent).await;
    assert!(harness.engine.draft_replies().await.is_err());
    assert!(harness.engine.check_conversations().await.is_err());
}

#[tokio::test]
async fn unknown_bot_identity_fails_the_pass() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.fail(GatewayOp::CurrentUser).await;
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    assert!(harness.engine.draft_replies().await.is_err());
    assert_eq!(harness.gateway.create_draft_calls(), 0);
}

#[tokio::test]
async fn reply_gating_skips_threads_without_a_mention() {
    let harness = TestHarness::builder()
        .with_settings(EngineSettings {
            only_when_reply_needed: true,
            ..EngineSettings::default()
        })
        .build()
        .await
        .unwrap();
    harness
        .gateway
        .set_recent(vec![
            deploy_message(10),
            MessageBuilder::channel(11, 7, "eng", "lunch").sent_by(6).build(),
        ])
        .await;

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
    assert_eq!(
        report.outcomes[1],
        ("channel:7:lunch".to_string(), DraftOutcome::NotNeeded)
    );
    let lunch = harness.store.get_thread("channel:7:lunch").await.unwrap().unwrap();
    assert!(!lunch.needs_reply);
    assert_eq!(lunch.draft_id, None);
}

#[tokio::test]
async fn context_includes_topic_history() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_recent(vec![
            MessageBuilder::channel(8, 7, "eng", "deploys")
                .sent_by(6)
                .body("rollout started")
                .build(),
            deploy_message(10),
        ])
        .await;

    harness.engine.draft_replies().await.unwrap();
    let contexts = harness.generator.contexts().await;
    assert_eq!(contexts.len(), 1);
    let lines: Vec<&str> = contexts[0].lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("user6 ["));
    assert!(lines[0].ends_with("]: rollout started"));
    assert!(lines[1].ends_with("]: can you check the rollout?"));
}

#[tokio::test]
async fn check_pass_flags_threads_and_lists_pending() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_recent(vec![
            deploy_message(10),
            MessageBuilder::channel(11, 7, "eng", "lunch").sent_by(6).build(),
        ])
        .await;

    let report = harness.engine.check_conversations().await.unwrap();
    assert_eq!(report.threads_seen, 2);
    assert_eq!(report.needing_reply, vec![DEPLOYS.to_string()]);
    assert_eq!(harness.gateway.create_draft_calls(), 0);
    assert_eq!(harness.generator.reply_calls(), 0);

    let pending = harness.engine.pending_threads().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].thread_key, DEPLOYS);
    assert!(harness.store.get_bot_state(LAST_CHECK_AT).await.unwrap().is_some());
}

#[tokio::test]
async fn check_pass_clears_flag_after_bot_replies() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.engine.check_conversations().await.unwrap();

    harness
        .gateway
        .push_recent(MessageBuilder::channel(12, 7, "eng", "deploys").sent_by(BOT_ID).build())
        .await;
    let report = harness.engine.check_conversations().await.unwrap();
    assert!(report.needing_reply.is_empty());
    assert!(harness.engine.pending_threads().await.unwrap().is_empty());
}

#[tokio::test]
async fn check_after_draft_keeps_draft_anchor() {
    let harness = TestHarness::new().await.unwrap();
    harness.gateway.set_recent(vec![deploy_message(10)]).await;
    harness.engine.draft_replies().await.unwrap();

    harness.gateway.push_recent(deploy_message(11)).await;
    harness.engine.check_conversations().await.unwrap();
    let state = harness.store.get_thread(DEPLOYS).await.unwrap().unwrap();
    assert_eq!(state.last_message_id, 10);
    assert!(state.draft_id.is_some());

    let report = harness.engine.draft_replies().await.unwrap();
    assert_eq!(report.drafted(), 1);
}

#[tokio::test]
async fn check_pass_continues_past_a_store_failure() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .gateway
        .set_recent(vec![topic_message(10, "a"), topic_message(11, "b")])
        .await;
    harness.store_faults.fail_thread("channel:7:a").await;

    let report = harness.engine.check_conversations().await.unwrap();
    assert_eq!(report.threads_seen, 2);
    assert_eq!(report.failed, vec!["channel:7:a".to_string()]);
    assert_eq!(report.needing_reply, vec!["channel:7:b".to_string()]);
    assert!(harness.store.get_thread("channel:7:a").await.unwrap().is_none());
    assert!(harness.store.get_bot_state(LAST_CHECK_AT).await.unwrap().is_some());
}
