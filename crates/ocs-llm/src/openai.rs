//! OpenAI-compatible chat-completion client
//!
//! One POST per call, no retries and no streaming. The reqwest client is
//! built once at startup and shared, so connections are pooled by reqwest.

use async_trait::async_trait;
use ocs_core::{AiConfig, AiSettings, ChatClient, ChatPayload, ChatReply, OcsError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Chat-completion client with a fixed request timeout
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    timeout: Duration,
}

impl OpenAiChatClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcsError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Create from config
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        Self::new(config.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, settings: &AiSettings, payload: &ChatPayload) -> Result<ChatReply> {
        let body = payload.to_json()?;

        let mut request = self
            .client
            .post(&settings.base_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);

        if let Some(key) = &settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                OcsError::PayloadBuild(e.to_string())
            } else {
                OcsError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| OcsError::ResponseRead(e.to_string()))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).trim().to_string();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Chat endpoint returned error status"
            );
            return Err(OcsError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| OcsError::ReplyParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, api_key: Option<&str>) -> AiSettings {
        let mut settings = AiConfig::default().resolve();
        settings.base_url = format!("{}/v1/chat/completions", server.uri());
        settings.api_key = api_key.map(str::to_string);
        settings
    }

    fn client() -> OpenAiChatClient {
        OpenAiChatClient::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = OpenAiChatClient::from_config(&AiConfig::default()).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_complete_sends_payload_and_headers() {
        let server = MockServer::start().await;
        let settings = settings_for(&server, Some("sk-test"));
        let payload = ChatPayload::new(&settings, "题目：1+1=?");

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(body_json(serde_json::to_value(&payload).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "答案：2"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client().complete(&settings, &payload).await.unwrap();
        assert_eq!(reply.into_answer().unwrap(), "答案：2");
    }

    #[tokio::test]
    async fn test_no_authorization_without_key() {
        let server = MockServer::start().await;
        let settings = settings_for(&server, None);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "A"}}]
            })))
            .mount(&server)
            .await;

        let payload = ChatPayload::new(&settings, "q");
        client().complete(&settings, &payload).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_preserved() {
        let server = MockServer::start().await;
        let settings = settings_for(&server, Some("bad-key"));

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("  {\"error\":\"invalid api key\"}\n"),
            )
            .mount(&server)
            .await;

        let payload = ChatPayload::new(&settings, "q");
        let err = client().complete(&settings, &payload).await.unwrap_err();

        match err {
            OcsError::UpstreamStatus { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "{\"error\":\"invalid api key\"}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_reply() {
        let server = MockServer::start().await;
        let settings = settings_for(&server, None);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let payload = ChatPayload::new(&settings, "q");
        let err = client().complete(&settings, &payload).await.unwrap_err();
        assert!(matches!(err, OcsError::ReplyParse(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        let settings = settings_for(&server, None);

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiChatClient::new(Duration::from_millis(50)).unwrap();
        let payload = ChatPayload::new(&settings, "q");
        let err = client.complete(&settings, &payload).await.unwrap_err();
        assert!(matches!(err, OcsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let mut settings = AiConfig::default().resolve();
        settings.base_url = "http://127.0.0.1:1/v1/chat/completions".to_string();

        let payload = ChatPayload::new(&settings, "q");
        let err = client().complete(&settings, &payload).await.unwrap_err();
        assert!(matches!(err, OcsError::Transport(_)));
    }
}
