// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Aura companion backend.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Aura workspace. Stores and generation
//! providers implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AuraError;
pub use types::{
    AdapterType, Change, ChangeBatch, ChangeKind, GenerationRequest, GenerationResponse,
    HealthStatus, Message, NewMessage, Role, Sender, TokenUsage, Turn, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    ChangeFeed, GenerationProvider, MemoryStore, MessageStore, PluginAdapter, StorageAdapter,
    Subscription,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aura_error_has_all_variants() {
        let _config = AuraError::Config("test".into());
        let _storage = AuraError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _generation = AuraError::Generation {
            message: "test".into(),
            source: None,
        };
        let _auth = AuraError::Auth("test".into());
        let _timeout = AuraError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = AuraError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Storage] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn error_display_includes_context() {
        let err = AuraError::generation("empty completion");
        assert_eq!(err.to_string(), "generation error: empty completion");

        let err = AuraError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
    }
}
