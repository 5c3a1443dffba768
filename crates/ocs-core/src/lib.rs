//! OCS-AI Core - Domain types, configuration and text processing
//!
//! This crate holds everything the HTTP front end needs that is not HTTP:
//! - Configuration loading and first-run bootstrap
//! - Prompt template rendering
//! - Answer extraction from free-text model replies
//! - Chat-completion wire types
//! - Common error types and the outbound [`ChatClient`] seam

pub mod answer;
pub mod chat;
pub mod config;
pub mod prompt;

pub use answer::{format_answer, parse_answer, FormattedAnswer};
pub use chat::{ChatChoice, ChatMessage, ChatPayload, ChatReply, ChatReplyError};
pub use config::{
    default_config_path, ensure_config_file, AiConfig, AiSettings, AppConfig, ConfigError,
    LoggingConfig, ServerConfig,
};
pub use prompt::{render_prompt, QuestionFields};

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Failures that can occur while answering a single query.
///
/// The `Display` text of each variant is what the caller sees in the
/// `message` field of a `{code: 0}` response.
#[derive(Error, Debug)]
pub enum OcsError {
    #[error("缺少必要参数: {0}")]
    Validation(String),

    #[error("构建AI请求失败: {0}")]
    PayloadBuild(String),

    #[error("请求AI接口失败: {0}")]
    Transport(String),

    #[error("读取AI响应失败: {0}")]
    ResponseRead(String),

    #[error("AI接口返回错误: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("解析AI响应失败: {0}")]
    ReplyParse(String),

    #[error("AI接口错误: {0}")]
    UpstreamLogical(String),

    #[error("AI接口未返回有效答案")]
    EmptyAnswer,
}

impl OcsError {
    /// Short machine-readable name of the failure class, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::PayloadBuild(_) => "payload_build",
            Self::Transport(_) => "transport",
            Self::ResponseRead(_) => "response_read",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::ReplyParse(_) => "reply_parse",
            Self::UpstreamLogical(_) => "upstream_logical",
            Self::EmptyAnswer => "empty_answer",
        }
    }
}

pub type Result<T> = std::result::Result<T, OcsError>;

// ============================================================================
// Outbound chat client
// ============================================================================

/// Client for an OpenAI-compatible chat-completion endpoint
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// POST `payload` to the endpoint described by `settings` and decode the reply.
    ///
    /// Transport failures, non-success statuses and undecodable bodies are
    /// errors. A decoded reply may still carry an upstream `error` field or no
    /// usable content; see [`ChatReply::into_answer`].
    async fn complete(&self, settings: &AiSettings, payload: &ChatPayload) -> Result<ChatReply>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OcsError::Validation("title".to_string()).to_string(),
            "缺少必要参数: title"
        );
        assert_eq!(OcsError::EmptyAnswer.to_string(), "AI接口未返回有效答案");

        let err = OcsError::UpstreamStatus {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "AI接口返回错误: rate limited");
        assert_eq!(err.kind(), "upstream_status");
    }
}
