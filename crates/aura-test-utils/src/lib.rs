// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Aura integration testing.
//!
//! Provides mock adapters and a test harness for end-to-end testing
//! without a real generation service.

pub mod harness;
pub mod memory_store;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::InMemoryStore;
pub use mock_provider::MockProvider;
