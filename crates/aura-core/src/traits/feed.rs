// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification on per-user message collections.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AuraError;
use crate::types::{ChangeBatch, UserId};

/// A store that can push batches of message changes to subscribers.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Starts watching the user's message collection.
    ///
    /// The returned subscription yields one [`ChangeBatch`] per notification
    /// until it is cancelled or dropped, or until the producer stops.
    async fn subscribe(&self, user: &UserId) -> Result<Subscription, AuraError>;
}

/// Handle to a running change subscription.
///
/// Owns the cancellation token of its producer. Cancelling or dropping the
/// handle stops the producer at its next await point.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<ChangeBatch>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Wraps a producer channel and the token that stops it.
    pub fn new(rx: mpsc::Receiver<ChangeBatch>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Waits for the next batch. Returns `None` once the producer has stopped.
    pub async fn next(&mut self) -> Option<ChangeBatch> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            batch = self.rx.recv() => batch,
            _ = self.cancel.cancelled() => None,
        }
    }

    /// Stops the producer.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
