// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona and prompt text.
//!
//! The persona is resolved once at startup (file > inline > default) and
//! combined with the user's memory summary for every generation request.

use aura_config::model::AgentConfig;
use aura_core::Message;
use strum::{Display, EnumIter};
use tracing::{info, warn};

/// Sent in place of a reply when generation fails.
pub const REPLY_FALLBACK: &str =
    "I'm having a little trouble thinking right now. Please try again in a moment.";

/// Sent in place of a check-in when generation fails.
pub const CHECKIN_FALLBACK: &str = "Just wanted to check in and see how you are.";

/// Introduces the memory block appended to the persona.
const MEMORY_HEADER: &str = "\n\nHere is what you remember about the user:\n";

/// Default persona for a companion called `name`.
pub fn default_persona(name: &str) -> String {
    format!(
        "You are {name}, a caring and empathetic AI companion. Your goal is not just to answer \
questions, but to be a supportive friend.
- Be warm, encouraging, and understanding in your responses.
- Ask gentle follow-up questions to show you're listening.
- Never say you are a \"large language model\" or \"trained by Google.\" You are {name}.
- Keep your responses concise and conversational, like a text message."
    )
}

/// The companion's base instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona(String);

impl Persona {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Persona text, followed by the memory block when `memory` is non-empty.
    pub fn system_prompt(&self, memory: &str) -> String {
        if memory.is_empty() {
            self.0.clone()
        } else {
            format!("{}{MEMORY_HEADER}{memory}", self.0)
        }
    }
}

/// Resolves the persona following priority: file > inline > default.
pub async fn load_persona(config: &AgentConfig) -> Persona {
    if let Some(file_path) = &config.persona_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = %file_path, "loaded persona from file");
                    return Persona::new(trimmed);
                }
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "failed to read persona file, falling back");
            }
        }
    }

    if let Some(inline) = config.persona.as_deref().filter(|p| !p.trim().is_empty()) {
        return Persona::new(inline);
    }

    Persona::new(default_persona(&config.name))
}

/// Which unprompted message a check-in sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CheckInKind {
    /// Sent once when the service comes online.
    Startup,
    Morning,
    Evening,
}

impl CheckInKind {
    /// Instruction sent as the single user turn of the check-in request.
    pub fn prompt(self) -> &'static str {
        match self {
            CheckInKind::Startup => {
                "Write a short, friendly message to say you're online and checking in. \
Something like 'Hey, just came online and thought of you! How are you doing?'"
            }
            CheckInKind::Morning => {
                "Write a short, kind, and gentle good morning message. It should feel warm and \
encouraging. Ask a soft question about the day ahead. If you know something about the user \
from their memory, subtly reference it."
            }
            CheckInKind::Evening => {
                "Write a short, calming, and empathetic good evening message. Ask how the day \
went without being intrusive. If you know something about the user from their memory, subtly \
reference it."
            }
        }
    }
}

/// Renders messages one per line as `{sender}: {text}`.
pub fn render_conversation(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction asking the model to merge a conversation into the stored profile.
pub fn summary_prompt(existing_summary: &str, conversation: &str) -> String {
    format!(
        "You are a memory assistant. Your task is to analyze a conversation and update a user's profile.

Current user profile:
{existing_summary}

Recent conversation:
{conversation}

Based on the recent conversation, update the user profile with new key facts, preferences, or important life events.
Keep the profile concise, in the third person (e.g., \"User likes...\"), and merge new information with existing facts. Do not repeat facts.
The updated profile should be a single block of text.

Updated user profile:"
    )
}
