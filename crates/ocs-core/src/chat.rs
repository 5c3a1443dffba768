//! OpenAI-compatible chat-completion wire types

use crate::config::AiSettings;
use crate::{OcsError, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// Tool-call replies carry `"content": null`
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_SYSTEM.to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }
}

/// Request body sent to the chat-completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
}

impl ChatPayload {
    /// Build the payload for a rendered user prompt.
    ///
    /// The system message is only included when the system prompt is non-empty.
    pub fn new(settings: &AiSettings, prompt: impl Into<String>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !settings.system_prompt.is_empty() {
            messages.push(ChatMessage::system(settings.system_prompt.clone()));
        }
        messages.push(ChatMessage::user(prompt));

        Self {
            model: settings.model.clone(),
            messages,
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
        }
    }

    /// Serialize to the JSON request body
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| OcsError::PayloadBuild(e.to_string()))
    }
}

/// Decoded chat-completion reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub error: Option<ChatReplyError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Error object some endpoints return with a 2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReplyError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// String or number depending on the provider
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ChatReply {
    /// Extract the first choice's trimmed content.
    ///
    /// An `error` field wins over any choices. No choices, or blank content,
    /// is [`OcsError::EmptyAnswer`].
    pub fn into_answer(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(OcsError::UpstreamLogical(error.message));
        }

        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(OcsError::EmptyAnswer)
    }
}
