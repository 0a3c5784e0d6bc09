//! Webhook payload sent by the LINE platform.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;

/// Body of a webhook callback. `events` is empty for console verification requests.
///
/// Events stay raw until [`WebhookPayload::into_events`] so that one
/// malformed event cannot sink the rest of the batch.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(body).map_err(|e| AppError::Payload(e.to_string()))
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events.into_iter().map(Event::from_value).collect()
    }
}

/// Webhook event kinds. Only `join` is acted upon.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Join(JoinEvent),
    #[serde(other)]
    Unsupported,
}

impl Event {
    /// Decode one event; anything that does not fit the model is `Unsupported`.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(error = %err, "skipping malformed webhook event");
            Event::Unsupported
        })
    }
}

/// The bot was added to a group or multi-person chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinEvent {
    /// Absent for events delivered in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub source: Source,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
    #[serde(default)]
    pub delivery_context: Option<DeliveryContext>,
}

impl JoinEvent {
    pub fn is_redelivery(&self) -> bool {
        self.delivery_context
            .as_ref()
            .map_or(false, |ctx| ctx.is_redelivery)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(default)]
    pub is_redelivery: bool,
}

/// Where an event originated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
}

impl Source {
    /// Identifier of the chat the bot joined; `None` for one-to-one sources.
    pub fn chat_id(&self) -> Option<&str> {
        match self {
            Source::Group { group_id, .. } => Some(group_id),
            Source::Room { room_id, .. } => Some(room_id),
            Source::User { .. } => None,
        }
    }
}
