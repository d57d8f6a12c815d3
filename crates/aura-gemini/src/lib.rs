// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini text generation provider for Aura.
//!
//! Implements [`GenerationProvider`] over the stateless `generateContent`
//! REST endpoint.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use aura_config::model::GeminiConfig;
use aura_core::{
    AdapterType, AuraError, GenerationProvider, GenerationRequest, GenerationResponse,
    HealthStatus, PluginAdapter, TokenUsage, Turn,
};
use tracing::{debug, info};

use crate::client::{ClientSettings, GeminiClient};
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part, SystemInstruction};

/// Environment variable consulted when `gemini.api_key` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider implementing [`GenerationProvider`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    model: String,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` configuration section.
    pub fn new(config: &GeminiConfig) -> Result<Self, AuraError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(ClientSettings {
            api_key,
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        })?;

        info!(model = %config.model, "Gemini provider initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// The model every request is sent to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AuraError> {
        // No probe request: it would spend quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AuraError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, AuraError> {
        let api_request = to_generate_request(&request);
        let response = self
            .client
            .generate_content(&self.model, &api_request)
            .await?;

        let text = response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            AuraError::generation(format!("Gemini returned no text ({reason})"))
        })?;

        Ok(GenerationResponse {
            text,
            model: response.model_version.unwrap_or_else(|| self.model.clone()),
            usage: response.usage_metadata.map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        })
    }
}

/// Resolves the API key from config or environment.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, AuraError> {
    if let Some(key) = config_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            AuraError::Config(format!(
                "Gemini API key not found. Set gemini.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })
}

/// Maps a [`GenerationRequest`] onto the Gemini wire format.
///
/// Consecutive turns with the same role are merged into one content entry,
/// since the API expects user and model turns to alternate.
fn to_generate_request(request: &GenerationRequest) -> GenerateContentRequest {
    let system_instruction = (!request.system_prompt.is_empty()).then(|| SystemInstruction {
        parts: vec![Part::text(&request.system_prompt)],
    });

    GenerateContentRequest {
        system_instruction,
        contents: merge_turns(&request.turns),
        generation_config: GenerationConfig {
            temperature: request.temperature,
        },
    }
}

fn merge_turns(turns: &[Turn]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::with_capacity(turns.len());
    for turn in turns {
        let role = turn.role.to_string();
        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.push(Part::text(&turn.text)),
            _ => contents.push(Content {
                role,
                parts: vec![Part::text(&turn.text)],
            }),
        }
    }
    contents
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::Role;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn turn(role: Role, text: &str) -> Turn {
        Turn {
            role,
            text: text.into(),
        }
    }

    fn test_config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".into()),
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("g-123".into())).unwrap(), "g-123");
    }

    #[test]
    fn resolve_api_key_empty_config_falls_back_to_env() {
        // Succeeds only if GEMINI_API_KEY is set; never returns the empty string.
        if let Ok(key) = resolve_api_key(&Some(String::new())) {
            assert!(!key.is_empty());
        }
    }

    #[test]
    fn resolve_api_key_missing_reports_config_error() {
        if let Err(err) = resolve_api_key(&None) {
            assert!(matches!(err, AuraError::Config(_)));
            assert!(err.to_string().contains("API key not found"));
        }
    }

    #[test]
    fn consecutive_same_role_turns_are_merged() {
        let turns = vec![
            turn(Role::User, "hi"),
            turn(Role::User, "are you there?"),
            turn(Role::Model, "yes!"),
            turn(Role::User, "great"),
        ];
        let contents = merge_turns(&turns);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts.len(), 2);
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].parts[0].text.as_deref(), Some("great"));
    }

    #[test]
    fn request_carries_system_prompt_and_temperature() {
        let req = to_generate_request(&GenerationRequest {
            system_prompt: "You are Aura.".into(),
            turns: vec![turn(Role::User, "hello")],
            temperature: 0.75,
        });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are Aura.");
        assert_eq!(json["generationConfig"]["temperature"], 0.75);
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let req = to_generate_request(&GenerationRequest {
            system_prompt: String::new(),
            turns: vec![turn(Role::User, "hello")],
            temperature: 0.3,
        });
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn complete_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "persona"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Good morning!"}]}}],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&test_config(&server.uri())).unwrap();
        let resp = provider
            .complete(GenerationRequest {
                system_prompt: "persona".into(),
                turns: vec![turn(Role::User, "morning")],
                temperature: 0.75,
            })
            .await
            .unwrap();
        assert_eq!(resp.text, "Good morning!");
        assert_eq!(resp.model, "gemini-2.0-flash");
        assert_eq!(resp.usage.unwrap().output_tokens, 3);
    }

    #[tokio::test]
    async fn complete_without_text_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&test_config(&server.uri())).unwrap();
        let err = provider
            .complete(GenerationRequest {
                system_prompt: String::new(),
                turns: vec![turn(Role::User, "x")],
                temperature: 0.75,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuraError::Generation { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = GeminiProvider::new(&test_config("http://localhost:1")).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
        assert_eq!(provider.model(), "gemini-2.0-flash");
    }
}
