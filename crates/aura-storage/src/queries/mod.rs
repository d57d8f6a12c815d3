// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for SQLite tables.

pub mod memory;
pub mod messages;
pub mod users;
