//! Outbound replies through the LINE Messaging API.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;

/// Production LINE API host.
pub const DEFAULT_LINE_API_ENDPOINT: &str = "https://api.line.me";

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Plain text message, serialized as `{"type":"text","text":...}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename = "text")]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyMessageRequest<'a> {
    reply_token: &'a str,
    messages: &'a [TextMessage],
}

/// Sends replies addressed by an event's reply token.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<TextMessage>,
    ) -> Result<(), AppError>;
}

/// `reqwest` client for the LINE reply endpoint.
#[derive(Clone)]
pub struct LineMessagingClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl LineMessagingClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_LINE_API_ENDPOINT, access_token)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    fn reply_url(&self) -> String {
        format!("{}{}", self.endpoint, REPLY_PATH)
    }
}

#[async_trait]
impl Messenger for LineMessagingClient {
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<TextMessage>,
    ) -> Result<(), AppError> {
        let request = ReplyMessageRequest {
            reply_token,
            messages: &messages,
        };
        let response = self
            .http
            .post(self.reply_url())
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Messaging(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Messaging(format!(
                "reply API returned {status}: {body}"
            )));
        }

        debug!(message_count = messages.len(), "reply sent");
        Ok(())
    }
}
