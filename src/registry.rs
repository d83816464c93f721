//! Session registry: obtains the conversation (room) id for a chat session.
//!
//! The backend owns the endpoint; the client only POSTs to it and accepts a
//! handful of response shapes: a bare JSON string or number, an object with
//! `roomId` / `room_id` / `id`, or a plain-text token.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::types::ConversationId;

const ID_FIELDS: [&str; 3] = ["roomId", "room_id", "id"];

/// Source of conversation ids.
#[async_trait::async_trait]
pub trait SessionRegistry: Send + Sync {
    async fn fetch_conversation_id(&self) -> Result<ConversationId, ChatError>;
}

/// Registry backed by the marketplace HTTP API.
pub struct HttpRegistry {
    client: reqwest::Client,
    url: String,
}

impl HttpRegistry {
    /// Build a registry client from config.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Network`] if the session token is not a valid
    /// header value or the HTTP client fails to build.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.session_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|error| ChatError::Network(format!("invalid session token: {error}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|error| ChatError::Network(format!("http client build failed: {error}")))?;

        Ok(Self { client, url: config.room_url() })
    }
}

#[async_trait::async_trait]
impl SessionRegistry for HttpRegistry {
    async fn fetch_conversation_id(&self) -> Result<ConversationId, ChatError> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|error| ChatError::Network(format!("room request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ChatError::Network(format!("room response unreadable: {error}")))?;

        if !status.is_success() {
            return Err(ChatError::Network(format!("room request failed: HTTP {}", status.as_u16())));
        }

        let id = parse_conversation_id(&body)
            .ok_or_else(|| ChatError::Network(format!("room response carried no conversation id: {body}")))?;
        debug!(conversation = %id, "registry: fetched room id");
        Ok(id)
    }
}

/// Extract a conversation id from a room endpoint response body.
#[must_use]
pub fn parse_conversation_id(body: &str) -> Option<ConversationId> {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ID_FIELDS.iter().find_map(|key| map.get(*key).and_then(scalar_id)),
        Ok(value) => scalar_id(&value),
        // Plain-text tokens only; a stray HTML or prose body is not an id.
        Err(_) if !trimmed.contains(char::is_whitespace) => ConversationId::parse(trimmed),
        Err(_) => None,
    }
}

fn scalar_id(value: &Value) -> Option<ConversationId> {
    match value {
        Value::String(text) => ConversationId::parse(text),
        Value::Number(number) => ConversationId::parse(&number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
