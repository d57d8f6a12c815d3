// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation provider trait for text-completion services (Gemini, mocks).

use async_trait::async_trait;

use crate::error::AuraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, GenerationResponse};

/// Adapter for a stateless text-completion service.
///
/// Implementations perform exactly one request per call. Failures are
/// reported as [`AuraError::Generation`]; callers substitute their own
/// fallback text.
#[async_trait]
pub trait GenerationProvider: PluginAdapter {
    /// Sends a completion request and returns the generated text.
    async fn complete(&self, request: GenerationRequest)
    -> Result<GenerationResponse, AuraError>;
}
