// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login credential bootstrap.
//!
//! A service key (an Ed25519 seed stored hex-encoded on disk) signs short
//! login tokens for a fixed identity, so the chat frontend can be tested
//! locally without an external identity provider.

pub mod key;
pub mod token;

pub use key::ServiceKey;
pub use token::{LoginClaims, mint_token, verify_token};
