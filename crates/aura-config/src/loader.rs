// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./aura.toml` > `~/.config/aura/aura.toml` > `/etc/aura/aura.toml`
//! with environment variable overrides via `AURA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AuraConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/aura/aura.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "aura.toml";

/// The user's XDG configuration file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aura").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/aura/aura.toml` (system-wide)
/// 3. `~/.config/aura/aura.toml` (user XDG config)
/// 4. `./aura.toml` (local directory)
/// 5. `AURA_*` environment variables
pub fn load_config() -> Result<AuraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<AuraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AuraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AuraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AuraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AuraConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Top-level config sections, in the order env keys are matched against them.
const SECTIONS: [&str; 6] = ["agent", "gemini", "storage", "memory", "checkin", "auth"];

/// Environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `AURA_GEMINI_API_KEY` must become `gemini.api_key`.
fn env_provider() -> Env {
    Env::prefixed("AURA_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env key (any case) to its dotted config path.
///
/// Only a leading section name is rewritten; keys without one are passed
/// through lowercased so they surface as unknown-key diagnostics.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(field) = key.strip_prefix(section).and_then(|rest| rest.strip_prefix('_')) {
            return format!("{section}.{field}");
        }
    }
    key
}
