// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread checkpoint queries.

use parley_core::{ParleyError, ThreadState};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{map_tr_err, Database};

const THREAD_COLUMNS: &str = "thread_key, channel_id, topic, last_message_id, \
     last_message_timestamp, needs_reply, draft_id, last_checked";

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<ThreadState> {
    Ok(ThreadState {
        thread_key: row.get(0)?,
        channel_id: row.get::<_, Option<i64>>(1)?.map(|id| id as u64),
        topic: row.get(2)?,
        last_message_id: row.get::<_, i64>(3)? as u64,
        last_message_timestamp: row.get(4)?,
        needs_reply: row.get(5)?,
        draft_id: row.get::<_, Option<i64>>(6)?.map(|id| id as u64),
        last_checked: row.get(7)?,
    })
}

/// Load one thread checkpoint.
pub async fn get_thread(db: &Database, thread_key: &str) -> Result<Option<ThreadState>, ParleyError> {
    let thread_key = thread_key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ThreadState>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {THREAD_COLUMNS} FROM conversation_threads WHERE thread_key = ?1"),
                params![thread_key],
                thread_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or overwrite a thread checkpoint.
///
/// `last_message_id` is monotonic: when the incoming id is older than the
/// stored one, the stored id and timestamp are kept while every other column
/// is overwritten. `last_checked` is always stamped with the current time.
pub async fn upsert_thread(db: &Database, state: &ThreadState) -> Result<(), ParleyError> {
    let state = state.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversation_threads
                    (thread_key, channel_id, topic, last_message_id, last_message_timestamp,
                     needs_reply, draft_id, last_checked)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(thread_key) DO UPDATE SET
                    channel_id = excluded.channel_id,
                    topic = excluded.topic,
                    last_message_timestamp = CASE
                        WHEN excluded.last_message_id >= conversation_threads.last_message_id
                        THEN excluded.last_message_timestamp
                        ELSE conversation_threads.last_message_timestamp
                    END,
                    last_message_id = MAX(conversation_threads.last_message_id, excluded.last_message_id),
                    needs_reply = excluded.needs_reply,
                    draft_id = excluded.draft_id,
                    last_checked = excluded.last_checked",
                params![
                    state.thread_key,
                    state.channel_id.map(|id| id as i64),
                    state.topic,
                    state.last_message_id as i64,
                    state.last_message_timestamp,
                    state.needs_reply,
                    state.draft_id.map(|id| id as i64),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Refresh `last_checked` for an existing thread. Unknown keys are a no-op.
pub async fn touch_thread(db: &Database, thread_key: &str) -> Result<(), ParleyError> {
    let thread_key = thread_key.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE conversation_threads
                 SET last_checked = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE thread_key = ?1",
                params![thread_key],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Threads flagged as needing a reply, oldest last message first.
pub async fn threads_needing_reply(db: &Database) -> Result<Vec<ThreadState>, ParleyError> {
    db.connection()
        .call(|conn| -> Result<Vec<ThreadState>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {THREAD_COLUMNS} FROM conversation_threads
                 WHERE needs_reply = 1
                 ORDER BY last_message_timestamp ASC, last_message_id ASC"
            ))?;
            let rows = stmt.query_map([], thread_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(key: &str, last_id: u64, ts: i64) -> ThreadState {
        ThreadState {
            thread_key: key.to_string(),
            channel_id: Some(3),
            topic: Some("deploys".to_string()),
            last_message_id: last_id,
            last_message_timestamp: ts,
            needs_reply: false,
            draft_id: None,
            last_checked: String::new(),
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips_and_stamps_last_checked() {
        let db = Database::open_in_memory().await.unwrap();
        let mut s = state("channel:3:deploys", 10, 1_000);
        s.draft_id = Some(77);
        upsert_thread(&db, &s).await.unwrap();

        let loaded = get_thread(&db, "channel:3:deploys").await.unwrap().unwrap();
        assert_eq!(loaded.last_message_id, 10);
        assert_eq!(loaded.draft_id, Some(77));
        assert_eq!(loaded.topic.as_deref(), Some("deploys"));
        assert!(loaded.last_checked.ends_with('Z'));
    }

    #[tokio::test]
    async fn missing_thread_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get_thread(&db, "direct:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_message_id_never_moves_backwards() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_thread(&db, &state("k", 20, 2_000)).await.unwrap();

        let mut older = state("k", 5, 500);
        older.needs_reply = true;
        older.draft_id = Some(9);
        upsert_thread(&db, &older).await.unwrap();

        let loaded = get_thread(&db, "k").await.unwrap().unwrap();
        assert_eq!(loaded.last_message_id, 20);
        assert_eq!(loaded.last_message_timestamp, 2_000);
        assert!(loaded.needs_reply);
        assert_eq!(loaded.draft_id, Some(9));
    }

    #[tokio::test]
    async fn newer_write_advances_checkpoint() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_thread(&db, &state("k", 20, 2_000)).await.unwrap();
        upsert_thread(&db, &state("k", 30, 3_000)).await.unwrap();

        let loaded = get_thread(&db, "k").await.unwrap().unwrap();
        assert_eq!(loaded.last_message_id, 30);
        assert_eq!(loaded.last_message_timestamp, 3_000);
    }

    #[tokio::test]
    async fn touch_only_updates_last_checked() {
        let db = Database::open_in_memory().await.unwrap();
        let mut s = state("k", 20, 2_000);
        s.draft_id = Some(4);
        upsert_thread(&db, &s).await.unwrap();
        touch_thread(&db, "k").await.unwrap();
        touch_thread(&db, "unknown").await.unwrap();

        let loaded = get_thread(&db, "k").await.unwrap().unwrap();
        assert_eq!(loaded.last_message_id, 20);
        assert_eq!(loaded.draft_id, Some(4));
        assert!(get_thread(&db, "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn needing_reply_lists_oldest_first() {
        let db = Database::open_in_memory().await.unwrap();
        for (key, id, ts, needs) in [("a", 3, 300, true), ("b", 1, 100, true), ("c", 2, 200, false)] {
            let mut s = state(key, id, ts);
            s.needs_reply = needs;
            upsert_thread(&db, &s).await.unwrap();
        }

        let keys: Vec<String> = threads_needing_reply(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.thread_key)
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
