//! OCS-AI LLM - outbound chat-completion client
//!
//! Implements [`ocs_core::ChatClient`] over reqwest for any endpoint that
//! speaks the OpenAI chat-completions protocol.

pub mod openai;

pub use openai::OpenAiChatClient;
