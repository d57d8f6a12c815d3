// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Aura companion backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Top-level Aura configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuraConfig {
    /// Companion identity and persona settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini text generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// History window and summarization settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Proactive check-in schedule.
    #[serde(default)]
    pub checkin: CheckinConfig,

    /// Service credential and login token settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Companion identity and persona configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the companion.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// The user served by `aura serve` and `aura shell`.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline persona text. Overridden by `persona_file` if both set.
    #[serde(default)]
    pub persona: Option<String>,

    /// Path to a text file containing the persona.
    #[serde(default)]
    pub persona_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            user_id: default_user_id(),
            log_level: default_log_level(),
            persona: None,
            persona_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "Aura".to_string()
}

fn default_user_id() -> String {
    "local-dev-user".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for replies, summaries and check-ins.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for replies and check-ins.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Sampling temperature for memory summaries.
    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,

    /// API base URL, overridable for testing.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP errors. Zero sends each request once.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            summary_temperature: default_summary_temperature(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.75
}

fn default_summary_temperature() -> f32 {
    0.3
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Application namespace scoping every record.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How often the change feed polls for messages written by other processes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            namespace: default_namespace(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("aura").join("aura.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("aura.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_namespace() -> String {
    "aura-ai-companion-mvp".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// History window and summarization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Number of most recent messages sent as conversation context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// User messages processed between memory consolidations.
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            summary_threshold: default_summary_threshold(),
        }
    }
}

fn default_history_window() -> usize {
    15
}

fn default_summary_threshold() -> u32 {
    5
}

/// Proactive check-in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckinConfig {
    /// Whether the scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Local time of the morning check-in, `HH:MM`.
    #[serde(default = "default_morning")]
    pub morning: String,

    /// Local time of the evening check-in, `HH:MM`.
    #[serde(default = "default_evening")]
    pub evening: String,

    /// Send one check-in when `aura serve` starts.
    #[serde(default = "default_true")]
    pub startup_message: bool,

    /// Append the user's memory summary to check-in prompts.
    #[serde(default = "default_true")]
    pub personalize: bool,

    /// Scheduler tick interval in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl CheckinConfig {
    /// Parsed morning time, if valid.
    pub fn morning_time(&self) -> Option<NaiveTime> {
        parse_clock_time(&self.morning)
    }

    /// Parsed evening time, if valid.
    pub fn evening_time(&self) -> Option<NaiveTime> {
        parse_clock_time(&self.evening)
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            morning: default_morning(),
            evening: default_evening(),
            startup_message: true,
            personalize: true,
            tick_secs: default_tick_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_morning() -> String {
    "09:00".to_string()
}

fn default_evening() -> String {
    "22:00".to_string()
}

fn default_tick_secs() -> u64 {
    1
}

/// Parses a wall-clock time of day in `HH:MM` form.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Service credential and login token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Path to the hex-encoded Ed25519 service key seed.
    #[serde(default = "default_credential_path")]
    pub credential_path: String,

    /// Identity minted by `aura token`.
    #[serde(default = "default_user_id")]
    pub test_user_id: String,

    /// Login token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credential_path: default_credential_path(),
            test_user_id: default_user_id(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn default_credential_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("aura").join("service-key.hex"))
        .unwrap_or_else(|| std::path::PathBuf::from("service-key.hex"))
        .to_string_lossy()
        .into_owned()
}

fn default_token_ttl_secs() -> u64 {
    3600
}
