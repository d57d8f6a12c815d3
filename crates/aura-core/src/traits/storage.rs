// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store traits: message collections, memory records, user directory.

use async_trait::async_trait;

use crate::error::AuraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Message, NewMessage, UserId};

/// Append-only per-user message collections plus the enumerable user directory.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Appends a message to the user's collection.
    ///
    /// The store assigns the id, ordering key and timestamp, and registers
    /// the user in the directory if this is their first message.
    async fn append_message(&self, user: &UserId, message: NewMessage)
    -> Result<Message, AuraError>;

    /// Returns up to `limit` of the user's messages, newest first.
    async fn latest_messages(&self, user: &UserId, limit: usize)
    -> Result<Vec<Message>, AuraError>;

    /// Enumerates every known user in the namespace.
    async fn list_users(&self) -> Result<Vec<UserId>, AuraError>;
}

/// The single long-term memory record kept per user.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Loads the stored summary, or `None` if the user has no memory record yet.
    async fn load_summary(&self, user: &UserId) -> Result<Option<String>, AuraError>;

    /// Replaces the stored summary entirely.
    async fn save_summary(&self, user: &UserId, summary: &str) -> Result<(), AuraError>;
}

/// Lifecycle of a persistent storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), AuraError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), AuraError>;
}
