// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints serde cannot express: clock times,
//! non-zero windows, temperature ranges and non-empty identifiers.

use crate::diagnostic::ConfigError;
use crate::model::{AuraConfig, parse_clock_time};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &AuraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.user_id.trim().is_empty() {
        fail("agent.user_id must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.gemini.model.trim().is_empty() {
        fail("gemini.model must not be empty".to_string());
    }

    for (key, value) in [
        ("gemini.temperature", config.gemini.temperature),
        ("gemini.summary_temperature", config.gemini.summary_temperature),
    ] {
        if !(0.0..=2.0).contains(&value) {
            fail(format!("{key} must be between 0.0 and 2.0, got {value}"));
        }
    }

    if config.gemini.timeout_secs == 0 {
        fail("gemini.timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.namespace.trim().is_empty() {
        fail("storage.namespace must not be empty".to_string());
    }

    if config.storage.poll_interval_ms == 0 {
        fail("storage.poll_interval_ms must be at least 1".to_string());
    }

    if config.memory.history_window == 0 {
        fail("memory.history_window must be at least 1".to_string());
    }

    if config.memory.summary_threshold == 0 {
        fail("memory.summary_threshold must be at least 1".to_string());
    }

    for (key, value) in [
        ("checkin.morning", &config.checkin.morning),
        ("checkin.evening", &config.checkin.evening),
    ] {
        if parse_clock_time(value).is_none() {
            fail(format!("{key} `{value}` is not a valid HH:MM time"));
        }
    }

    if config.checkin.tick_secs == 0 {
        fail("checkin.tick_secs must be at least 1".to_string());
    }

    if config.auth.credential_path.trim().is_empty() {
        fail("auth.credential_path must not be empty".to_string());
    }

    if config.auth.token_ttl_secs == 0 {
        fail("auth.token_ttl_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&AuraConfig::default()).is_ok());
    }

    #[test]
    fn invalid_checkin_time_fails_validation() {
        let mut config = AuraConfig::default();
        config.checkin.morning = "9am".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "checkin.morning"));
    }

    #[test]
    fn zero_window_and_threshold_fail_validation() {
        let mut config = AuraConfig::default();
        config.memory.history_window = 0;
        config.memory.summary_threshold = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_error(&errors, "history_window"));
        assert!(has_error(&errors, "summary_threshold"));
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let mut config = AuraConfig::default();
        config.gemini.temperature = 3.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "gemini.temperature"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = AuraConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "agent.log_level"));
    }

    #[test]
    fn empty_namespace_fails_validation() {
        let mut config = AuraConfig::default();
        config.storage.namespace = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage.namespace"));
    }
}
