// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed login tokens.
//!
//! Format: `base64url(claims_json).base64url(signature)`, unpadded, where the
//! signature covers the encoded claims segment.

use aura_core::AuraError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};

use crate::key::ServiceKey;

/// Claims carried by a login token. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginClaims {
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

impl LoginClaims {
    pub fn new(uid: impl Into<String>, issued_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            uid: uid.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Mints a token for `uid`, valid for `ttl` from `now`.
pub fn mint_token(
    key: &ServiceKey,
    uid: &str,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> Result<String, AuraError> {
    let claims = LoginClaims::new(uid, now, ttl);
    let json = serde_json::to_vec(&claims)
        .map_err(|e| AuraError::Internal(format!("failed to encode claims: {e}")))?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = key.sign(payload.as_bytes());
    Ok(format!(
        "{payload}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Checks the signature and expiry of `token` and returns its claims.
pub fn verify_token(
    key: &ServiceKey,
    token: &str,
    now: DateTime<Utc>,
) -> Result<LoginClaims, AuraError> {
    let (payload, signature) = token
        .split_once('.')
        .ok_or_else(|| AuraError::Auth("malformed token".to_string()))?;

    let sig_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| AuraError::Auth(format!("malformed token signature: {e}")))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| AuraError::Auth("token signature has wrong length".to_string()))?;
    key.verify(payload.as_bytes(), &Signature::from_bytes(&sig_bytes))?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuraError::Auth(format!("malformed token claims: {e}")))?;
    let claims: LoginClaims = serde_json::from_slice(&json)
        .map_err(|e| AuraError::Auth(format!("malformed token claims: {e}")))?;

    if claims.is_expired(now) {
        return Err(AuraError::Auth("token expired".to_string()));
    }
    Ok(claims)
}
