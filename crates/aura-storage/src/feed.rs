// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling change feed over a user's message collection.
//!
//! Each subscription runs one watcher task that remembers the highest `seq`
//! it has delivered. The watcher wakes on a local append signal or on the
//! poll interval, whichever comes first, so messages written by other
//! processes are still observed.

use std::time::Duration;

use aura_core::{Change, ChangeBatch, UserId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::database::Database;
use crate::queries;

/// Buffered batches per subscription before the watcher waits on the consumer.
pub(crate) const FEED_CAPACITY: usize = 16;

/// Everything a watcher task needs to follow one user's messages.
pub(crate) struct Watcher {
    pub db: Database,
    pub namespace: String,
    pub user: UserId,
    /// Highest `seq` already visible to the subscriber.
    pub cursor: i64,
    pub poll_interval: Duration,
    pub appended: watch::Receiver<u64>,
}

impl Watcher {
    /// Spawn the watcher loop. It exits when `cancel` fires or the receiver is dropped.
    pub(crate) fn spawn(
        self,
        tx: mpsc::Sender<ChangeBatch>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(tx, cancel))
    }

    async fn run(mut self, tx: mpsc::Sender<ChangeBatch>, cancel: CancellationToken) {
        let mut wake_open = true;
        debug!(user_id = %self.user, cursor = self.cursor, "change feed started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = self.appended.changed(), if wake_open => {
                    if changed.is_err() {
                        wake_open = false;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let messages = match queries::messages::messages_after(
                &self.db,
                &self.namespace,
                &self.user,
                self.cursor,
            )
            .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(user_id = %self.user, error = %e, "change feed poll failed");
                    continue;
                }
            };

            let Some(last) = messages.last() else {
                continue;
            };
            self.cursor = last.seq;

            let batch: ChangeBatch = messages.into_iter().map(Change::added).collect();
            debug!(user_id = %self.user, changes = batch.len(), "change feed batch");
            if tx.send(batch).await.is_err() {
                break;
            }
        }

        debug!(user_id = %self.user, "change feed stopped");
    }
}
