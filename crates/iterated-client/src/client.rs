use async_trait::async_trait;
use iterated_core::{BackendError, ChatRequest, ChatResponse, TutorBackend};
use reqwest::Client;
use serde::Deserialize;

use crate::error::ClientError;

pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone)]
pub struct TutorClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TutorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post one chat turn.
    ///
    /// The endpoint answers failures with a JSON body and a 500, so the body
    /// is decoded regardless of status; only a body that is not a chat
    /// response is an error.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_PATH))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            log::debug!(
                "chat endpoint returned {} with error {:?}",
                status,
                chat_response.error
            );
        }

        Ok(chat_response)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json().await?)
    }

    pub async fn health_check(&self) -> bool {
        match self.health().await {
            Ok(health) => health.status == "healthy",
            Err(e) => {
                log::debug!("health check failed: {}", e);
                false
            }
        }
    }

    /// Ask the backend to release a session
    pub async fn end_session(&self, session_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(format!("{}/api/session/{}", self.base_url, session_id))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(ClientError::Status { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl TutorBackend for TutorClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        Ok(self.chat(request).await?)
    }

    async fn end_session(&self, session_id: &str) -> Result<(), BackendError> {
        Ok(TutorClient::end_session(self, session_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterated_core::{ChatSession, Completion, APOLOGY};
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", CHAT_PATH)
            .match_body(Matcher::PartialJson(json!({
                "message": "2+2?",
                "sessionId": "1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"message":"Why do you think so?","timestamp":"2024-01-01T00:00:00.000Z"}"#)
            .create_async()
            .await;

        let client = TutorClient::new(&server.url());
        let request = ChatRequest::new("2+2?").with_session("1");
        let response = client.chat(&request).await.unwrap();

        assert_eq!(response.reply_text(), Some("Why do you think so?"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_failure_body_is_decoded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":false,"error":"Internal server error"}"#)
            .create_async()
            .await;

        let client = TutorClient::new(&server.url());
        let response = client.chat(&ChatRequest::new("hi")).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Internal server error"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(502)
            .with_body("<html>Bad gateway</html>")
            .create_async()
            .await;

        let client = TutorClient::new(&server.url());
        let err = client.chat(&ChatRequest::new("hi")).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidResponse { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = TutorClient::new("http://127.0.0.1:1");
        let err = TutorBackend::send(&client, &ChatRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
    }

    #[tokio::test]
    async fn test_session_apologizes_when_server_misbehaves() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = TutorClient::new(&server.url());
        let mut session = ChatSession::default();
        session.start_session("What is 2+2?", "").unwrap();

        let completion = session.send_message(&client, "4?").await.unwrap();

        assert!(matches!(completion, Completion::Apology(_)));
        assert_eq!(session.transcript().last().unwrap().content(), APOLOGY);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_health_and_end_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", HEALTH_PATH)
            .with_status(200)
            .with_body(r#"{"status":"healthy","timestamp":"2024-01-01T00:00:00Z"}"#)
            .create_async()
            .await;
        let end = server
            .mock("DELETE", "/api/session/abc")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"Session ended"}"#)
            .create_async()
            .await;

        let client = TutorClient::new(&format!("{}/", server.url()));
        assert!(client.health_check().await);
        client.end_session("abc").await.unwrap();
        end.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_false_when_down() {
        let client = TutorClient::new("http://127.0.0.1:1");
        assert!(!client.health_check().await);
    }
}
