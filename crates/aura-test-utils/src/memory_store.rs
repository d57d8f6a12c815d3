// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store with a push-based change feed.
//!
//! Implements the message, memory and change feed traits without SQLite,
//! plus switches for injecting store failures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use aura_core::{
    AuraError, Change, ChangeBatch, ChangeFeed, MemoryStore, Message, MessageStore, NewMessage,
    Subscription, UserId,
};

#[derive(Default)]
struct State {
    next_seq: i64,
    users: Vec<UserId>,
    messages: HashMap<UserId, Vec<Message>>,
    summaries: HashMap<UserId, String>,
    subscribers: Vec<(UserId, mpsc::Sender<ChangeBatch>)>,
    failing_appends: HashSet<UserId>,
}

/// A thread-safe in-memory store.
///
/// Every append is published to subscribers of that user as a single-change
/// batch; [`InMemoryStore::append_batch`] publishes several messages as one.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every read operation fail with a storage error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write operation fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make appends for one user fail while others succeed.
    pub async fn fail_appends_for(&self, user: &UserId) {
        self.state.lock().await.failing_appends.insert(user.clone());
    }

    /// Register a user without writing a message.
    pub async fn add_user(&self, user: &UserId) {
        let mut state = self.state.lock().await;
        register(&mut state, user);
    }

    /// Store several messages and publish them to subscribers as one batch.
    pub async fn append_batch(&self, user: &UserId, messages: Vec<NewMessage>) -> Vec<Message> {
        let mut state = self.state.lock().await;
        let stored: Vec<Message> = messages
            .into_iter()
            .map(|m| insert(&mut state, user, m))
            .collect();
        let batch = stored.iter().cloned().map(Change::added).collect();
        let senders = senders_for(&mut state, user);
        drop(state);
        publish(senders, batch).await;
        stored
    }

    /// Publish an arbitrary batch without storing anything.
    pub async fn emit(&self, user: &UserId, batch: ChangeBatch) {
        let senders = senders_for(&mut *self.state.lock().await, user);
        publish(senders, batch).await;
    }

    /// All messages stored for the user, oldest first.
    pub async fn messages(&self, user: &UserId) -> Vec<Message> {
        self.state
            .lock()
            .await
            .messages
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    /// The stored summary, bypassing failure switches.
    pub async fn summary(&self, user: &UserId) -> Option<String> {
        self.state.lock().await.summaries.get(user).cloned()
    }

    /// Seed a summary, bypassing failure switches.
    pub async fn set_summary(&self, user: &UserId, summary: &str) {
        self.state
            .lock()
            .await
            .summaries
            .insert(user.clone(), summary.to_string());
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), AuraError> {
        if flag.load(Ordering::SeqCst) {
            Err(AuraError::storage(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

fn register(state: &mut State, user: &UserId) {
    if !state.users.contains(user) {
        state.users.push(user.clone());
    }
}

fn insert(state: &mut State, user: &UserId, message: NewMessage) -> Message {
    register(state, user);
    state.next_seq += 1;
    let stored = Message {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.clone(),
        sender: message.sender,
        text: message.text,
        seq: state.next_seq,
        created_at: chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    };
    state
        .messages
        .entry(user.clone())
        .or_default()
        .push(stored.clone());
    stored
}

fn senders_for(state: &mut State, user: &UserId) -> Vec<mpsc::Sender<ChangeBatch>> {
    state.subscribers.retain(|(_, tx)| !tx.is_closed());
    state
        .subscribers
        .iter()
        .filter(|(u, _)| u == user)
        .map(|(_, tx)| tx.clone())
        .collect()
}

async fn publish(senders: Vec<mpsc::Sender<ChangeBatch>>, batch: ChangeBatch) {
    for tx in senders {
        let _ = tx.send(batch.clone()).await;
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn append_message(
        &self,
        user: &UserId,
        message: NewMessage,
    ) -> Result<Message, AuraError> {
        self.check(&self.fail_writes, "write")?;
        let mut state = self.state.lock().await;
        if state.failing_appends.contains(user) {
            return Err(AuraError::storage(format!("injected append failure for {user}")));
        }
        let stored = insert(&mut state, user, message);
        let senders = senders_for(&mut state, user);
        drop(state);
        publish(senders, vec![Change::added(stored.clone())]).await;
        Ok(stored)
    }

    async fn latest_messages(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Message>, AuraError> {
        self.check(&self.fail_reads, "read")?;
        let state = self.state.lock().await;
        Ok(state
            .messages
            .get(user)
            .map(|msgs| msgs.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_users(&self) -> Result<Vec<UserId>, AuraError> {
        self.check(&self.fail_reads, "read")?;
        Ok(self.state.lock().await.users.clone())
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn load_summary(&self, user: &UserId) -> Result<Option<String>, AuraError> {
        self.check(&self.fail_reads, "read")?;
        Ok(self.summary(user).await)
    }

    async fn save_summary(&self, user: &UserId, summary: &str) -> Result<(), AuraError> {
        self.check(&self.fail_writes, "write")?;
        self.set_summary(user, summary).await;
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for InMemoryStore {
    async fn subscribe(&self, user: &UserId) -> Result<Subscription, AuraError> {
        let (tx, rx) = mpsc::channel(64);
        self.state.lock().await.subscribers.push((user.clone(), tx));
        Ok(Subscription::new(rx, CancellationToken::new()))
    }
}
