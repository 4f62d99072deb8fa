// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State written through one store instance is visible after reopening.

use parley_config::model::StorageConfig;
use parley_core::{ProcessedMessage, StateStore, ThreadState};
use parley_storage::SqliteStorage;

fn config(path: &std::path::Path) -> StorageConfig {
    StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    }
}

#[tokio::test]
async fn checkpoints_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parley.db");

    {
        let store = SqliteStorage::new(config(&path));
        store.initialize().await.unwrap();
        store
            .upsert_thread(&ThreadState {
                thread_key: "direct:5,9".into(),
                channel_id: None,
                topic: None,
                last_message_id: 120,
                last_message_timestamp: 1_700_000_100,
                needs_reply: true,
                draft_id: Some(31),
                last_checked: String::new(),
            })
            .await
            .unwrap();
        store
            .mark_message_processed(&ProcessedMessage {
                message_id: 120,
                channel_id: None,
                topic: None,
                sender_id: 5,
                timestamp: 1_700_000_100,
                draft_created: true,
                processed_at: String::new(),
            })
            .await
            .unwrap();
        store
            .set_bot_state("last_summary_topic", "Summary 2026-01-01 09:00")
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let store = SqliteStorage::new(config(&path));
    store.initialize().await.unwrap();

    let thread = store.get_thread("direct:5,9").await.unwrap().unwrap();
    assert_eq!(thread.draft_id, Some(31));
    assert!(thread.needs_reply);
    assert!(store.is_message_processed(120).await.unwrap());
    assert_eq!(
        store.get_bot_state("last_summary_topic").await.unwrap().as_deref(),
        Some("Summary 2026-01-01 09:00")
    );

    let pending = store.threads_needing_reply().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(store.processed_message(120).await.unwrap().unwrap().sender_id, 5);
}
