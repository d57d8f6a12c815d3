// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory consolidation.
//!
//! Merges a conversation window into the existing profile text with one
//! generation call. Whatever text comes back replaces the stored summary;
//! on failure the stored summary is left as it was.

use std::sync::Arc;

use aura_core::{GenerationProvider, GenerationRequest, Message, Turn, UserId};
use tracing::{info, warn};

use crate::memory::MemoryAccessor;
use crate::prompt::{render_conversation, summary_prompt};

pub struct Summarizer {
    provider: Arc<dyn GenerationProvider>,
    memory: MemoryAccessor,
    temperature: f32,
}

impl Summarizer {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        memory: MemoryAccessor,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            memory,
            temperature,
        }
    }

    /// Builds the consolidation request for a window and the prior summary.
    pub fn request(&self, history: &[Message], existing_summary: &str) -> GenerationRequest {
        let conversation = render_conversation(history);
        GenerationRequest {
            system_prompt: String::new(),
            turns: vec![Turn::user(summary_prompt(existing_summary, &conversation))],
            temperature: self.temperature,
        }
    }

    /// Generates and stores an updated summary. Returns `true` only if the
    /// new summary was stored.
    pub async fn summarize(
        &self,
        user: &UserId,
        history: &[Message],
        existing_summary: &str,
    ) -> bool {
        info!(user_id = %user, messages = history.len(), "summarizing conversation");
        let request = self.request(history, existing_summary);

        match self.provider.complete(request).await {
            Ok(response) => self.memory.set(user, &response.text).await,
            Err(e) => {
                warn!(user_id = %user, error = %e, "summarization failed, keeping existing memory");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{MessageStore, NewMessage};
    use aura_test_utils::{InMemoryStore, MockProvider};

    async fn setup(
        provider: MockProvider,
    ) -> (Arc<InMemoryStore>, Arc<MockProvider>, Summarizer, Vec<Message>) {
        let store = InMemoryStore::shared();
        let user = UserId::from("u");
        store.append_message(&user, NewMessage::user("I adopted a cat")).await.unwrap();
        store.append_message(&user, NewMessage::ai("Congrats!")).await.unwrap();
        let history = store.messages(&user).await;

        let provider = Arc::new(provider);
        let summarizer = Summarizer::new(provider.clone(), MemoryAccessor::new(store.clone()), 0.3);
        (store, provider, summarizer, history)
    }

    #[tokio::test]
    async fn successful_summary_replaces_memory() {
        let (store, provider, summarizer, history) =
            setup(MockProvider::with_responses(vec!["User has a cat.".into()])).await;
        let user = UserId::from("u");

        assert!(summarizer.summarize(&user, &history, "User likes tea.").await);
        assert_eq!(store.summary(&user).await.as_deref(), Some("User has a cat."));

        let req = &provider.requests().await[0];
        assert!(req.system_prompt.is_empty());
        assert_eq!(req.temperature, 0.3);
        assert!(req.turns[0].text.contains("User likes tea."));
        assert!(req.turns[0].text.contains("user: I adopted a cat\nai: Congrats!"));
    }

    #[tokio::test]
    async fn failed_summary_leaves_memory_unchanged() {
        let (store, _provider, summarizer, history) = setup(MockProvider::failing()).await;
        let user = UserId::from("u");
        store.set_summary(&user, "User likes tea.").await;

        assert!(!summarizer.summarize(&user, &history, "User likes tea.").await);
        assert_eq!(store.summary(&user).await.as_deref(), Some("User likes tea."));
    }

    #[tokio::test]
    async fn store_failure_is_not_reported_as_summarized() {
        let (store, provider, summarizer, history) =
            setup(MockProvider::with_responses(vec!["User has a cat.".into()])).await;
        let user = UserId::from("u");
        store.set_summary(&user, "User likes tea.").await;
        store.set_fail_writes(true);

        assert!(!summarizer.summarize(&user, &history, "User likes tea.").await);
        assert_eq!(provider.call_count().await, 1);
        assert_eq!(store.summary(&user).await.as_deref(), Some("User likes tea."));
    }

    #[tokio::test]
    async fn returned_text_is_stored_unvalidated() {
        let (store, _provider, summarizer, history) =
            setup(MockProvider::with_responses(vec!["".into()])).await;
        let user = UserId::from("u");
        store.set_summary(&user, "old").await;

        assert!(summarizer.summarize(&user, &history, "old").await);
        assert_eq!(store.summary(&user).await.as_deref(), Some(""));
    }
}
