// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 service key persisted as a hex-encoded seed.

use std::path::Path;

use aura_core::AuraError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use tracing::info;

/// The signing key for login tokens.
pub struct ServiceKey {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl ServiceKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self::from_bytes(&SigningKey::generate(&mut OsRng).to_bytes())
    }

    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Parse a hex-encoded 32-byte seed. Surrounding whitespace is ignored.
    pub fn from_hex(encoded: &str) -> Result<Self, AuraError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| AuraError::Auth(format!("service key is not valid hex: {e}")))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            AuraError::Auth(format!(
                "service key must be 32 bytes, found {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(&seed))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    pub fn load(path: &Path) -> Result<Self, AuraError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuraError::Auth(format!(
                "cannot read service key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_hex(&contents)
    }

    /// Writes the seed to `path`, creating parent directories. Owner-only on Unix.
    pub fn save(&self, path: &Path) -> Result<(), AuraError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuraError::Auth(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(path, format!("{}\n", self.to_hex())).map_err(|e| {
            AuraError::Auth(format!(
                "cannot write service key {}: {e}",
                path.display()
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| AuraError::Auth(format!("cannot restrict {}: {e}", path.display())),
            )?;
        }
        Ok(())
    }

    /// Loads the key at `path`, or generates and saves one if the file is absent.
    ///
    /// The flag is `true` when a new key was created.
    pub fn load_or_create(path: &Path) -> Result<(Self, bool), AuraError> {
        if path.exists() {
            return Ok((Self::load(path)?, false));
        }
        let key = Self::generate();
        key.save(path)?;
        info!(path = %path.display(), "created service key");
        Ok((key, true))
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), AuraError> {
        self.verifying_key
            .verify(message, signature)
            .map_err(|e| AuraError::Auth(format!("signature verification failed: {e}")))
    }
}
