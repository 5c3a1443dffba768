//! Application state management

use ocs_core::{AppConfig, ChatClient};
use std::sync::Arc;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Outbound chat-completion client
    pub chat_client: Arc<dyn ChatClient>,
}

impl AppState {
    pub fn new(config: AppConfig, chat_client: Arc<dyn ChatClient>) -> Self {
        Self {
            config,
            chat_client,
        }
    }
}
