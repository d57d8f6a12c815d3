// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response pipeline.
//!
//! Turns a batch of new user messages into exactly one AI reply, then
//! consolidates memory once enough messages have accumulated.

use std::sync::Arc;

use aura_config::model::AuraConfig;
use aura_core::{
    GenerationProvider, GenerationRequest, MemoryStore, Message, MessageStore, NewMessage, UserId,
};
use tracing::{debug, info, warn};

use crate::history::{HistoryAccessor, to_turns};
use crate::memory::MemoryAccessor;
use crate::prompt::{Persona, REPLY_FALLBACK};
use crate::summarizer::Summarizer;

/// Messages received since the last summarization, for one user.
///
/// Owned by whoever drives the pipeline for that user. Not persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryState {
    pub unsummarized: u32,
}

/// Tunables for reply generation and summarization cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub temperature: f32,
    pub summary_threshold: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &AuraConfig) -> Self {
        Self {
            temperature: config.gemini.temperature,
            summary_threshold: config.memory.summary_threshold,
        }
    }
}

/// What a single [`ResponsePipeline::process`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The batch was empty.
    Skipped,
    /// No messages were visible for the user; nothing was generated or written.
    NoHistory,
    Replied {
        /// The fallback text was sent because generation failed.
        fallback: bool,
        /// A new memory summary was stored after the reply.
        summarized: bool,
    },
}

pub struct ResponsePipeline {
    provider: Arc<dyn GenerationProvider>,
    messages: Arc<dyn MessageStore>,
    memory: MemoryAccessor,
    history: HistoryAccessor,
    summarizer: Summarizer,
    persona: Persona,
    settings: PipelineSettings,
}

impl ResponsePipeline {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        messages: Arc<dyn MessageStore>,
        memory: MemoryAccessor,
        history: HistoryAccessor,
        summarizer: Summarizer,
        persona: Persona,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            messages,
            memory,
            history,
            summarizer,
            persona,
            settings,
        }
    }

    /// Wires a pipeline over a single store that holds both messages and memory.
    pub fn from_config<S>(
        config: &AuraConfig,
        provider: Arc<dyn GenerationProvider>,
        store: Arc<S>,
        persona: Persona,
    ) -> Self
    where
        S: MessageStore + MemoryStore + 'static,
    {
        let memory = MemoryAccessor::new(store.clone());
        Self::new(
            provider.clone(),
            store.clone(),
            memory.clone(),
            HistoryAccessor::new(store, config.memory.history_window),
            Summarizer::new(provider, memory, config.gemini.summary_temperature),
            persona,
            PipelineSettings::from_config(config),
        )
    }

    /// Processes one batch of newly arrived user messages.
    ///
    /// Never fails: generation errors are replaced by [`REPLY_FALLBACK`] and
    /// store errors are logged.
    pub async fn process(
        &self,
        user: &UserId,
        batch: &[Message],
        state: &mut SummaryState,
    ) -> PipelineOutcome {
        if batch.is_empty() {
            return PipelineOutcome::Skipped;
        }

        state.unsummarized = state
            .unsummarized
            .saturating_add(u32::try_from(batch.len()).unwrap_or(u32::MAX));
        debug!(
            user_id = %user,
            batch = batch.len(),
            unsummarized = state.unsummarized,
            "processing batch"
        );

        let summary = self.memory.get(user).await;
        let history = self.history.recent(user).await;
        if history.is_empty() {
            warn!(user_id = %user, "no history visible, skipping reply");
            return PipelineOutcome::NoHistory;
        }

        let request = GenerationRequest {
            system_prompt: self.persona.system_prompt(&summary),
            turns: to_turns(&history),
            temperature: self.settings.temperature,
        };

        let (reply, fallback) = match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    user_id = %user,
                    model = %response.model,
                    input_tokens = response.usage.map(|u| u.input_tokens),
                    output_tokens = response.usage.map(|u| u.output_tokens),
                    "reply generated"
                );
                (response.text, false)
            }
            Err(e) => {
                warn!(user_id = %user, error = %e, "reply generation failed, sending fallback");
                (REPLY_FALLBACK.to_string(), true)
            }
        };

        match self.messages.append_message(user, NewMessage::ai(reply)).await {
            Ok(stored) => info!(user_id = %user, message_id = %stored.id, fallback, "reply sent"),
            Err(e) => warn!(user_id = %user, error = %e, "failed to store reply"),
        }

        let mut summarized = false;
        let threshold = self.settings.summary_threshold.max(1);
        if state.unsummarized >= threshold {
            summarized = self.summarizer.summarize(user, &history, &summary).await;
            state.unsummarized %= threshold;
        }

        PipelineOutcome::Replied {
            fallback,
            summarized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::Sender;
    use aura_test_utils::{InMemoryStore, MockProvider};
    use tracing_test::traced_test;

    const PERSONA: &str = "You are Aura.";

    fn pipeline(store: &Arc<InMemoryStore>, provider: &Arc<MockProvider>) -> ResponsePipeline {
        let memory = MemoryAccessor::new(store.clone());
        ResponsePipeline::new(
            provider.clone(),
            store.clone(),
            memory.clone(),
            HistoryAccessor::new(store.clone(), 15),
            Summarizer::new(provider.clone(), memory, 0.3),
            Persona::new(PERSONA),
            PipelineSettings {
                temperature: 0.75,
                summary_threshold: 5,
            },
        )
    }

    async fn user_batch(store: &InMemoryStore, user: &UserId, n: usize) -> Vec<Message> {
        store
            .append_batch(
                user,
                (0..n).map(|i| NewMessage::user(format!("message {i}"))).collect(),
            )
            .await
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let mut state = SummaryState::default();

        let outcome = pipeline(&store, &provider)
            .process(&UserId::from("u"), &[], &mut state)
            .await;

        assert_eq!(outcome, PipelineOutcome::Skipped);
        assert_eq!(state.unsummarized, 0);
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn replies_once_per_batch() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::with_responses(vec!["Hi there!".into()]));
        let user = UserId::from("u");
        let batch = user_batch(&store, &user, 3).await;
        let mut state = SummaryState::default();

        let outcome = pipeline(&store, &provider).process(&user, &batch, &mut state).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Replied {
                fallback: false,
                summarized: false
            }
        );
        let messages = store.messages(&user).await;
        assert_eq!(messages.len(), 4);
        let reply = messages.last().unwrap();
        assert_eq!(reply.sender, Sender::Ai);
        assert_eq!(reply.text, "Hi there!");
        assert_eq!(state.unsummarized, 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn reply_log_carries_token_usage() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::with_responses(vec!["Hello.".into()]));
        let user = UserId::from("u");
        let batch = user_batch(&store, &user, 1).await;

        pipeline(&store, &provider)
            .process(&user, &batch, &mut SummaryState::default())
            .await;

        assert!(logs_contain("reply generated"));
        assert!(logs_contain("input_tokens=10"));
        assert!(logs_contain("output_tokens=20"));
    }

    #[tokio::test]
    async fn generation_failure_sends_fallback() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::failing());
        let user = UserId::from("u");
        let batch = user_batch(&store, &user, 1).await;
        let mut state = SummaryState::default();

        let outcome = pipeline(&store, &provider).process(&user, &batch, &mut state).await;

        assert!(matches!(outcome, PipelineOutcome::Replied { fallback: true, .. }));
        let reply = store.messages(&user).await.pop().unwrap();
        assert_eq!(reply.sender, Sender::Ai);
        assert_eq!(reply.text, REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn empty_history_skips_generation_and_writes() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let batch = user_batch(&store, &user, 1).await;
        store.set_fail_reads(true);
        let mut state = SummaryState::default();

        let outcome = pipeline(&store, &provider).process(&user, &batch, &mut state).await;

        assert_eq!(outcome, PipelineOutcome::NoHistory);
        assert_eq!(state.unsummarized, 1);
        assert_eq!(provider.call_count().await, 0);
        assert_eq!(store.messages(&user).await.len(), 1);
    }

    #[tokio::test]
    async fn memory_block_only_when_summary_present() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let p = pipeline(&store, &provider);
        let mut state = SummaryState::default();

        let batch = user_batch(&store, &user, 1).await;
        p.process(&user, &batch, &mut state).await;
        store.set_summary(&user, "User has a cat named Miso.").await;
        let batch = user_batch(&store, &user, 1).await;
        p.process(&user, &batch, &mut state).await;

        let requests = provider.requests().await;
        assert_eq!(requests[0].system_prompt, PERSONA);
        assert!(!requests[0].system_prompt.contains("remember"));
        assert!(requests[1].system_prompt.starts_with(PERSONA));
        assert!(requests[1].system_prompt.contains("what you remember"));
        assert!(requests[1].system_prompt.ends_with("User has a cat named Miso."));
        assert_eq!(requests[1].temperature, 0.75);
    }

    #[tokio::test]
    async fn history_window_includes_replies_in_order() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let p = pipeline(&store, &provider);
        let mut state = SummaryState::default();

        let batch = user_batch(&store, &user, 1).await;
        p.process(&user, &batch, &mut state).await;
        let batch = user_batch(&store, &user, 1).await;
        p.process(&user, &batch, &mut state).await;

        let turns = &provider.requests().await[1].turns;
        let roles: Vec<_> = turns.iter().map(|t| t.role.to_string()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
    }

    #[tokio::test]
    async fn summarizes_once_when_threshold_crossed() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let p = pipeline(&store, &provider);
        let mut state = SummaryState::default();

        let mut summarized = Vec::new();
        for _ in 0..3 {
            let batch = user_batch(&store, &user, 2).await;
            match p.process(&user, &batch, &mut state).await {
                PipelineOutcome::Replied { summarized: s, .. } => summarized.push(s),
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(summarized, vec![false, false, true]);
        assert_eq!(state.unsummarized, 1);
        // Three replies plus one summary.
        assert_eq!(provider.call_count().await, 4);
        assert!(store.summary(&user).await.is_some());
    }

    #[tokio::test]
    async fn summary_failure_still_resets_counter() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        provider.push_response("reply").await;
        provider.push_failure("summary down").await;
        let user = UserId::from("u");
        store.set_summary(&user, "User likes tea.").await;
        let mut state = SummaryState { unsummarized: 4 };

        let batch = user_batch(&store, &user, 1).await;
        let outcome = pipeline(&store, &provider).process(&user, &batch, &mut state).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Replied {
                fallback: false,
                summarized: false
            }
        );
        assert_eq!(state.unsummarized, 0);
        assert_eq!(store.summary(&user).await.as_deref(), Some("User likes tea."));
    }

    #[tokio::test]
    async fn from_config_uses_configured_window_and_temperatures() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let mut config = AuraConfig::default();
        config.memory.history_window = 2;
        config.memory.summary_threshold = 1;
        config.gemini.temperature = 1.1;
        config.gemini.summary_temperature = 0.2;

        let p = ResponsePipeline::from_config(
            &config,
            provider.clone(),
            store.clone(),
            Persona::new(PERSONA),
        );
        let batch = user_batch(&store, &user, 3).await;
        let mut state = SummaryState::default();
        let outcome = p.process(&user, &batch, &mut state).await;

        assert_eq!(
            outcome,
            PipelineOutcome::Replied {
                fallback: false,
                summarized: true
            }
        );
        let requests = provider.requests().await;
        assert_eq!(requests[0].turns.len(), 2);
        assert_eq!(requests[0].temperature, 1.1);
        assert_eq!(requests[1].temperature, 0.2);
    }

    #[tokio::test]
    async fn reply_store_failure_does_not_panic() {
        let store = InMemoryStore::shared();
        let provider = Arc::new(MockProvider::new());
        let user = UserId::from("u");
        let batch = user_batch(&store, &user, 1).await;
        store.fail_appends_for(&user).await;
        let mut state = SummaryState::default();

        let outcome = pipeline(&store, &provider).process(&user, &batch, &mut state).await;
        assert!(matches!(outcome, PipelineOutcome::Replied { fallback: false, .. }));
        assert_eq!(store.messages(&user).await.len(), 1);
    }
}
