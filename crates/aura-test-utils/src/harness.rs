// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the companion stack over a temp SQLite database
//! and a [`MockProvider`], with the change listener running as a background
//! task. Provides `send_user_message()` to drive the full reply path.

use std::sync::Arc;
use std::time::Duration;

use aura_agent::{ChangeListener, Persona, ResponsePipeline};
use aura_config::model::{AuraConfig, StorageConfig};
use aura_core::{
    AuraError, ChangeFeed, Message, MessageStore, NewMessage, Sender, StorageAdapter, UserId,
};
use aura_storage::SqliteStorage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::mock_provider::MockProvider;

/// Persona used when none is configured.
pub const TEST_PERSONA: &str = "You are a test companion.";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    failing: bool,
    user: UserId,
    summary_threshold: Option<u32>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            failing: false,
            user: UserId::from("test-user"),
            summary_threshold: None,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Make every generation call fail once scripted responses run out.
    pub fn with_failing_provider(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = UserId::from(user);
        self
    }

    pub fn with_summary_threshold(mut self, threshold: u32) -> Self {
        self.summary_threshold = Some(threshold);
        self
    }

    /// Build the harness and start the listener.
    pub async fn build(self) -> Result<TestHarness, AuraError> {
        let temp_dir = tempfile::TempDir::new().map_err(AuraError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = AuraConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
                namespace: "aura-test".to_string(),
                poll_interval_ms: 20,
            },
            ..AuraConfig::default()
        };
        if let Some(threshold) = self.summary_threshold {
            config.memory.summary_threshold = threshold;
        }

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let provider = if self.failing {
            MockProvider::failing()
        } else {
            MockProvider::new()
        };
        for response in self.responses {
            provider.push_response(response).await;
        }
        let provider = Arc::new(provider);

        let pipeline = ResponsePipeline::from_config(
            &config,
            provider.clone(),
            storage.clone(),
            Persona::new(TEST_PERSONA),
        );
        let listener = ChangeListener::new(storage.clone(), Arc::new(pipeline), self.user.clone());
        // Subscribe before returning so no message sent by the test is missed.
        let subscription = storage.subscribe(&self.user).await?;
        let cancel = CancellationToken::new();
        let listener_task = tokio::spawn(listener.listen(subscription, cancel.clone()));

        Ok(TestHarness {
            mock_provider: provider,
            storage,
            user: self.user,
            config,
            cancel,
            listener_task: Some(listener_task),
            _temp_dir: temp_dir,
        })
    }
}

/// A running companion over temp storage and a mock provider.
pub struct TestHarness {
    /// The mock generation provider.
    pub mock_provider: Arc<MockProvider>,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// The user the listener is attached to.
    pub user: UserId,
    pub config: AuraConfig,
    cancel: CancellationToken,
    listener_task: Option<JoinHandle<()>>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Append a user message, as the chat frontend would.
    pub async fn send_user_message(&self, text: &str) -> Result<Message, AuraError> {
        self.storage
            .append_message(&self.user, NewMessage::user(text))
            .await
    }

    /// The conversation, oldest first (up to 1000 messages).
    pub async fn conversation(&self) -> Result<Vec<Message>, AuraError> {
        let mut messages = self.storage.latest_messages(&self.user, 1000).await?;
        messages.reverse();
        Ok(messages)
    }

    /// Waits until at least `count` AI messages exist, or fails after `timeout`.
    pub async fn wait_for_ai_messages(
        &self,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<Message>, AuraError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let ai: Vec<Message> = self
                .conversation()
                .await?
                .into_iter()
                .filter(|m| m.sender == Sender::Ai)
                .collect();
            if ai.len() >= count {
                return Ok(ai);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AuraError::Timeout { duration: timeout });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Stops the listener and closes storage.
    pub async fn shutdown(mut self) -> Result<(), AuraError> {
        self.cancel.cancel();
        if let Some(task) = self.listener_task.take() {
            task.await
                .map_err(|e| AuraError::Internal(format!("listener task panicked: {e}")))?;
        }
        self.storage.close().await
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
