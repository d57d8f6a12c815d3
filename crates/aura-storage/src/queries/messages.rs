// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and window queries.

use aura_core::{AuraError, Message, NewMessage, Sender, UserId};
use rusqlite::params;

use crate::database::{Database, map_tr_err, now_timestamp};

const MESSAGE_COLUMNS: &str = "seq, id, user_id, sender, text, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, rusqlite::Error> {
    let sender: String = row.get(3)?;
    let sender = sender.parse::<Sender>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Message {
        seq: row.get(0)?,
        id: row.get(1)?,
        user_id: UserId(row.get(2)?),
        sender,
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Append a message, registering the user on first write.
///
/// Returns the stored message with its assigned id, `seq` and timestamp.
pub async fn append_message(
    db: &Database,
    namespace: &str,
    user: &UserId,
    message: NewMessage,
) -> Result<Message, AuraError> {
    let namespace = namespace.to_string();
    let user = user.clone();
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<Message, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO users (namespace, id, created_at) VALUES (?1, ?2, ?3)",
                params![namespace, user.as_str(), created_at],
            )?;
            tx.execute(
                "INSERT INTO messages (id, namespace, user_id, sender, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    namespace,
                    user.as_str(),
                    message.sender.to_string(),
                    message.text,
                    created_at,
                ],
            )?;
            let seq = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Message {
                id,
                user_id: user,
                sender: message.sender,
                text: message.text,
                seq,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Up to `limit` of the user's messages, newest first.
pub async fn latest_messages(
    db: &Database,
    namespace: &str,
    user: &UserId,
    limit: usize,
) -> Result<Vec<Message>, AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE namespace = ?1 AND user_id = ?2
                 ORDER BY seq DESC LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![namespace, user, limit], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// The user's messages with `seq` greater than `after`, oldest first.
pub async fn messages_after(
    db: &Database,
    namespace: &str,
    user: &UserId,
    after: i64,
) -> Result<Vec<Message>, AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE namespace = ?1 AND user_id = ?2 AND seq > ?3
                 ORDER BY seq ASC"
            ))?;
            let rows = stmt.query_map(params![namespace, user, after], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Highest `seq` stored for the user, or 0 when they have no messages.
pub async fn high_water_mark(
    db: &Database,
    namespace: &str,
    user: &UserId,
) -> Result<i64, AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COALESCE(MAX(seq), 0) FROM messages WHERE namespace = ?1 AND user_id = ?2",
                params![namespace, user],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
