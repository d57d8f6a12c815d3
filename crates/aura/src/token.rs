// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aura token` command implementation.
//!
//! Mints a login token for `auth.test_user_id`, signed with the service key
//! at `auth.credential_path`. The token goes to stdout, everything else to
//! stderr.

use std::path::Path;

use aura_auth::{ServiceKey, mint_token};
use aura_config::model::AuraConfig;
use aura_core::AuraError;
use chrono::{TimeDelta, Utc};

/// Runs the `aura token` command.
pub fn run_token(config: &AuraConfig, init: bool) -> Result<(), AuraError> {
    let token = mint_for_config(config, init)?;
    eprintln!("Login token for {}:", config.auth.test_user_id);
    println!("{token}");
    Ok(())
}

fn mint_for_config(config: &AuraConfig, init: bool) -> Result<String, AuraError> {
    let path = Path::new(&config.auth.credential_path);
    let key = if init {
        let (key, created) = ServiceKey::load_or_create(path)?;
        if created {
            eprintln!("Created service key at {}", path.display());
        }
        key
    } else {
        ServiceKey::load(path).inspect_err(|_| {
            eprintln!("hint: run `aura token --init` to create the service key");
        })?
    };

    let ttl = TimeDelta::try_seconds(i64::try_from(config.auth.token_ttl_secs).unwrap_or(i64::MAX))
        .ok_or_else(|| AuraError::Config("auth.token_ttl_secs is too large".to_string()))?;
    mint_token(&key, &config.auth.test_user_id, ttl, Utc::now())
}
