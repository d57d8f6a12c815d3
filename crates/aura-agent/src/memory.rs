// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory accessor.
//!
//! Never fails the caller: read errors yield an empty summary and write
//! errors are logged and dropped.

use std::sync::Arc;

use aura_core::{MemoryStore, UserId};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct MemoryAccessor {
    store: Arc<dyn MemoryStore>,
}

impl MemoryAccessor {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// The user's summary, or an empty string if none exists or the read fails.
    pub async fn get(&self, user: &UserId) -> String {
        match self.store.load_summary(user).await {
            Ok(summary) => summary.unwrap_or_default(),
            Err(e) => {
                warn!(user_id = %user, error = %e, "failed to load memory, using empty summary");
                String::new()
            }
        }
    }

    /// Replaces the user's summary. Failures are logged, not returned;
    /// the result is `true` only if the write landed.
    pub async fn set(&self, user: &UserId, summary: &str) -> bool {
        match self.store.save_summary(user, summary).await {
            Ok(()) => {
                debug!(user_id = %user, chars = summary.len(), "memory updated");
                true
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "failed to save memory");
                false
            }
        }
    }
}
