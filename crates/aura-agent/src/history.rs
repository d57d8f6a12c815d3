// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recent conversation window.

use std::sync::Arc;

use aura_core::{Message, MessageStore, Turn, UserId};
use tracing::warn;

/// Reads the most recent messages of a conversation in chronological order.
#[derive(Clone)]
pub struct HistoryAccessor {
    store: Arc<dyn MessageStore>,
    window: usize,
}

impl HistoryAccessor {
    pub fn new(store: Arc<dyn MessageStore>, window: usize) -> Self {
        Self { store, window }
    }

    /// Up to `window` most recent messages, oldest first.
    ///
    /// A store error is logged and treated as an empty conversation.
    pub async fn recent(&self, user: &UserId) -> Vec<Message> {
        match self.store.latest_messages(user, self.window).await {
            Ok(mut messages) => {
                messages.reverse();
                messages
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "failed to load history");
                Vec::new()
            }
        }
    }
}

/// Maps stored messages to generation turns (`user` stays `user`, anything else is `model`).
pub fn to_turns(messages: &[Message]) -> Vec<Turn> {
    messages.iter().map(Turn::from).collect()
}
