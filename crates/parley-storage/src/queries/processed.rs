// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Processed-message markers.

use parley_core::{MessageId, ParleyError, ProcessedMessage};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Record that a message finished processing. A repeated mark overwrites.
pub async fn mark_processed(db: &Database, record: &ProcessedMessage) -> Result<(), ParleyError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO processed_messages
                    (message_id, channel_id, topic, sender_id, timestamp, draft_created, processed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![
                    record.message_id as i64,
                    record.channel_id.map(|id| id as i64),
                    record.topic,
                    record.sender_id as i64,
                    record.timestamp,
                    record.draft_created,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Whether a message id has a processed marker.
pub async fn is_processed(db: &Database, message_id: MessageId) -> Result<bool, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM processed_messages WHERE message_id = ?1",
                    params![message_id as i64],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_tr_err)
}

/// Load a processed marker.
pub async fn get_processed(
    db: &Database,
    message_id: MessageId,
) -> Result<Option<ProcessedMessage>, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<Option<ProcessedMessage>, rusqlite::Error> {
            conn.query_row(
                "SELECT message_id, channel_id, topic, sender_id, timestamp, draft_created, processed_at
                 FROM processed_messages WHERE message_id = ?1",
                params![message_id as i64],
                |row| {
                    Ok(ProcessedMessage {
                        message_id: row.get::<_, i64>(0)? as u64,
                        channel_id: row.get::<_, Option<i64>>(1)?.map(|id| id as u64),
                        topic: row.get(2)?,
                        sender_id: row.get::<_, i64>(3)? as u64,
                        timestamp: row.get(4)?,
                        draft_created: row.get(5)?,
                        processed_at: row.get(6)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
