// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory queries.

use aura_core::{AuraError, UserId};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// All users in the namespace, in registration order.
pub async fn list_users(db: &Database, namespace: &str) -> Result<Vec<UserId>, AuraError> {
    let namespace = namespace.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<UserId>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id FROM users WHERE namespace = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![namespace], |row| row.get::<_, String>(0))?;
            rows.map(|id| id.map(UserId)).collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Register a user explicitly. Existing users are left untouched.
pub async fn ensure_user(db: &Database, namespace: &str, user: &UserId) -> Result<(), AuraError> {
    let namespace = namespace.to_string();
    let user = user.to_string();
    let created_at = crate::database::now_timestamp();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR IGNORE INTO users (namespace, id, created_at) VALUES (?1, ?2, ?3)",
                params![namespace, user, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
