// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change listener.
//!
//! Watches one user's message collection and hands each batch of new
//! user-authored messages to the response pipeline, one batch at a time.

use std::sync::Arc;

use aura_core::{
    AuraError, ChangeBatch, ChangeFeed, ChangeKind, Message, Sender, Subscription, UserId,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pipeline::{PipelineOutcome, ResponsePipeline, SummaryState};

pub struct ChangeListener {
    feed: Arc<dyn ChangeFeed>,
    pipeline: Arc<ResponsePipeline>,
    user: UserId,
    state: SummaryState,
}

impl ChangeListener {
    pub fn new(feed: Arc<dyn ChangeFeed>, pipeline: Arc<ResponsePipeline>, user: UserId) -> Self {
        Self {
            feed,
            pipeline,
            user,
            state: SummaryState::default(),
        }
    }

    pub fn summary_state(&self) -> SummaryState {
        self.state
    }

    /// Subscribes, then listens until `cancel` fires or the subscription ends.
    ///
    /// Only a failure to subscribe is returned as an error.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), AuraError> {
        let subscription = self.feed.subscribe(&self.user).await?;
        self.listen(subscription, cancel).await;
        Ok(())
    }

    /// Consumes an existing subscription until `cancel` fires or it ends.
    pub async fn listen(mut self, mut subscription: Subscription, cancel: CancellationToken) {
        info!(user_id = %self.user, "listening for new messages");

        loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(user_id = %self.user, "listener stopping");
                    subscription.cancel();
                    return;
                }
                batch = subscription.next() => batch,
            };

            match batch {
                Some(batch) => {
                    self.handle_batch(batch).await;
                }
                None => {
                    warn!(user_id = %self.user, "change feed closed, listener exiting");
                    return;
                }
            }
        }
    }

    /// Filters a batch to added user messages and runs the pipeline once if any remain.
    pub async fn handle_batch(&mut self, batch: ChangeBatch) -> PipelineOutcome {
        let messages = user_additions(batch);
        if messages.is_empty() {
            debug!(user_id = %self.user, "batch has no new user messages");
            return PipelineOutcome::Skipped;
        }

        info!(user_id = %self.user, batch = messages.len(), "new user messages");
        self.pipeline
            .process(&self.user, &messages, &mut self.state)
            .await
    }
}

fn user_additions(batch: ChangeBatch) -> Vec<Message> {
    batch
        .into_iter()
        .filter(|c| c.kind == ChangeKind::Added && c.message.sender == Sender::User)
        .map(|c| c.message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryAccessor;
    use crate::memory::MemoryAccessor;
    use crate::pipeline::PipelineSettings;
    use crate::prompt::Persona;
    use crate::summarizer::Summarizer;
    use aura_core::{Change, MessageStore, NewMessage};
    use aura_test_utils::{InMemoryStore, MockProvider};
    use std::time::Duration;

    fn listener(
        store: &Arc<InMemoryStore>,
        provider: &Arc<MockProvider>,
        user: &UserId,
    ) -> ChangeListener {
        let memory = MemoryAccessor::new(store.clone());
        let pipeline = ResponsePipeline::new(
            provider.clone(),
            store.clone(),
            memory.clone(),
            HistoryAccessor::new(store.clone(), 15),
            Summarizer::new(provider.clone(), memory, 0.3),
            Persona::new("You are Aura."),
            PipelineSettings {
                temperature: 0.75,
                summary_threshold: 5,
            },
        );
        ChangeListener::new(store.clone(), Arc::new(pipeline), user.clone())
    }

    async fn wait_for_messages(store: &InMemoryStore, user: &UserId, count: usize) {
        for _ in 0..200 {
            if store.messages(user).await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} messages");
    }

    #[tokio::test]
    async fn ai_only_batch_is_ignored() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let mut listener = listener(&store, &provider, &user);

        let ai = store.append_message(&user, NewMessage::ai("check-in")).await.unwrap();
        let outcome = listener.handle_batch(vec![Change::added(ai)]).await;

        assert_eq!(outcome, PipelineOutcome::Skipped);
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn modified_changes_are_ignored() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let mut listener = listener(&store, &provider, &user);

        let msg = store.append_message(&user, NewMessage::user("edited")).await.unwrap();
        let batch = vec![
            Change {
                kind: ChangeKind::Modified,
                message: msg.clone(),
            },
            Change {
                kind: ChangeKind::Removed,
                message: msg,
            },
        ];

        assert_eq!(listener.handle_batch(batch).await, PipelineOutcome::Skipped);
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn mixed_batch_counts_only_user_messages() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let mut listener = listener(&store, &provider, &user);

        let batch: ChangeBatch = store
            .append_batch(
                &user,
                vec![
                    NewMessage::user("one"),
                    NewMessage::ai("hey"),
                    NewMessage::user("two"),
                ],
            )
            .await
            .into_iter()
            .map(Change::added)
            .collect();

        let outcome = listener.handle_batch(batch).await;
        assert!(matches!(outcome, PipelineOutcome::Replied { .. }));
        assert_eq!(listener.summary_state().unsummarized, 2);
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn run_replies_to_each_batch_and_stops_on_cancel() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let cancel = CancellationToken::new();

        let task = tokio::spawn(listener(&store, &provider, &user).run(cancel.clone()));
        // Let the listener subscribe before writing.
        tokio::time::sleep(Duration::from_millis(50)).await;

        store
            .append_batch(&user, vec![NewMessage::user("a"), NewMessage::user("b")])
            .await;
        wait_for_messages(&store, &user, 3).await;

        store.append_message(&user, NewMessage::user("c")).await.unwrap();
        wait_for_messages(&store, &user, 5).await;

        // The listener's own replies must not trigger further replies.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let messages = store.messages(&user).await;
        assert_eq!(messages.len(), 5);
        let ai_count = messages.iter().filter(|m| m.sender == Sender::Ai).count();
        assert_eq!(ai_count, 2);

        cancel.cancel();
        task.await.unwrap().unwrap();
    }
}
