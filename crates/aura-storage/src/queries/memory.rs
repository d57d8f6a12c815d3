// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory record queries.

use aura_core::{AuraError, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err, now_timestamp};

/// Document key of the single consolidated summary per user.
pub const LONG_TERM_KEY: &str = "long_term";

/// Load the user's summary, if one has been written.
pub async fn load_summary(
    db: &Database,
    namespace: &str,
    user: &UserId,
) -> Result<Option<String>, AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT summary FROM memory WHERE namespace = ?1 AND user_id = ?2 AND doc_key = ?3",
                params![namespace, user, LONG_TERM_KEY],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the user's summary. Last write wins.
pub async fn save_summary(
    db: &Database,
    namespace: &str,
    user: &UserId,
    summary: &str,
) -> Result<(), AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    let summary = summary.to_string();
    let updated_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO memory (namespace, user_id, doc_key, summary, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (namespace, user_id, doc_key)
                 DO UPDATE SET summary = excluded.summary, updated_at = excluded.updated_at",
                params![namespace, user, LONG_TERM_KEY, summary, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
