// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Aura backend.
//!
//! Providers and stores extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod feed;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use feed::{ChangeFeed, Subscription};
pub use provider::GenerationProvider;
pub use storage::{MemoryStore, MessageStore, StorageAdapter};
