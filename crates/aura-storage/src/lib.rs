// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite document store for the Aura companion backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, namespaced
//! message collections, per-user memory records, an enumerable user
//! directory, and a polling change feed.

pub mod adapter;
pub mod database;
mod feed;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
