//! Chat client configuration parsed from environment variables.

use std::time::Duration;

use crate::error::ConfigError;
use crate::types::ConversationId;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ROOM_PATH: &str = "/api/chat/room";
pub const DEFAULT_WS_PATH: &str = "/ws-stomp";
pub const DEFAULT_SUBSCRIBE_PREFIX: &str = "/sub/chat/room";
pub const DEFAULT_PUBLISH_DESTINATION: &str = "/pub/chat/message";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// How message bodies are framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    /// Raw UTF-8 text.
    #[default]
    Text,
    /// `{"roomId": <id>, "message": <text>}` envelopes.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub api_base_url: String,
    pub room_path: String,
    pub ws_url: String,
    pub subscribe_prefix: String,
    pub publish_destination: String,
    pub session_token: Option<String>,
    pub body_format: BodyFormat,
    pub clear_on_reopen: bool,
    pub timeouts: Timeouts,
}

impl ChatConfig {
    /// Defaults for a given API base URL, with the WebSocket URL derived from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is `http(s)://`.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = base_url.trim_end_matches('/').to_owned();
        let ws_url = derive_ws_url(&api_base_url)?;
        Ok(Self {
            api_base_url,
            room_path: DEFAULT_ROOM_PATH.to_owned(),
            ws_url,
            subscribe_prefix: DEFAULT_SUBSCRIBE_PREFIX.to_owned(),
            publish_destination: DEFAULT_PUBLISH_DESTINATION.to_owned(),
            session_token: None,
            body_format: BodyFormat::Text,
            clear_on_reopen: false,
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed chat config from environment variables.
    ///
    /// All optional:
    /// - `MARKETCHAT_API_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `MARKETCHAT_ROOM_PATH`: default `/api/chat/room`
    /// - `MARKETCHAT_WS_URL`: derived from the base URL when absent
    /// - `MARKETCHAT_SUBSCRIBE_PREFIX`: default `/sub/chat/room`
    /// - `MARKETCHAT_PUBLISH_DESTINATION`: default `/pub/chat/message`
    /// - `MARKETCHAT_SESSION_TOKEN`: bearer token for HTTP and CONNECT
    /// - `MARKETCHAT_BODY_FORMAT`: `text` (default) or `json`
    /// - `MARKETCHAT_CLEAR_ON_REOPEN`: `false` (default) or `true`
    /// - `MARKETCHAT_REQUEST_TIMEOUT_SECS`: default 10
    /// - `MARKETCHAT_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid base URL, body format, or boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ChatConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`ChatConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MARKETCHAT_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let mut config = Self::for_base_url(&base_url)?;

        if let Some(path) = lookup("MARKETCHAT_ROOM_PATH") {
            config.room_path = path;
        }
        if let Some(ws_url) = lookup("MARKETCHAT_WS_URL") {
            config.ws_url = ws_url;
        }
        if let Some(prefix) = lookup("MARKETCHAT_SUBSCRIBE_PREFIX") {
            config.subscribe_prefix = prefix.trim_end_matches('/').to_owned();
        }
        if let Some(destination) = lookup("MARKETCHAT_PUBLISH_DESTINATION") {
            config.publish_destination = destination;
        }
        config.session_token = lookup("MARKETCHAT_SESSION_TOKEN").filter(|token| !token.is_empty());
        config.body_format = parse_body_format(lookup("MARKETCHAT_BODY_FORMAT").as_deref())?;
        config.clear_on_reopen = parse_bool("MARKETCHAT_CLEAR_ON_REOPEN", lookup("MARKETCHAT_CLEAR_ON_REOPEN").as_deref())?;
        config.timeouts = Timeouts {
            request_secs: parse_secs(lookup("MARKETCHAT_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_secs(lookup("MARKETCHAT_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(config)
    }

    /// Apply command-line endpoint overrides.
    ///
    /// A new base URL re-derives the WebSocket URL unless one is also given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for a non-HTTP base URL.
    pub fn override_endpoints(&mut self, base_url: Option<&str>, ws_url: Option<&str>) -> Result<(), ConfigError> {
        if let Some(base_url) = base_url {
            self.api_base_url = base_url.trim_end_matches('/').to_owned();
            self.ws_url = derive_ws_url(&self.api_base_url)?;
        }
        if let Some(ws_url) = ws_url {
            self.ws_url = ws_url.to_owned();
        }
        Ok(())
    }

    /// Full URL of the room-id endpoint.
    #[must_use]
    pub fn room_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.room_path)
    }

    /// STOMP destination carrying inbound messages for one room.
    #[must_use]
    pub fn subscribe_destination(&self, conversation: &ConversationId) -> String {
        format!("{}/{}", self.subscribe_prefix, conversation)
    }
}

/// Map an HTTP base URL onto the STOMP WebSocket endpoint.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is `http(s)://`.
pub fn derive_ws_url(base_url: &str) -> Result<String, ConfigError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{DEFAULT_WS_PATH}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{DEFAULT_WS_PATH}"));
    }

    Err(ConfigError::InvalidBaseUrl(base_url.to_owned()))
}

/// Positive whole seconds; zero or garbage falls back to `default`.
fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

fn parse_body_format(raw: Option<&str>) -> Result<BodyFormat, ConfigError> {
    match raw.unwrap_or("text") {
        "text" => Ok(BodyFormat::Text),
        "json" => Ok(BodyFormat::Json),
        other => Err(ConfigError::Parse(format!(
            "unsupported MARKETCHAT_BODY_FORMAT '{other}' (expected 'text' or 'json')"
        ))),
    }
}

fn parse_bool(key: &str, raw: Option<&str>) -> Result<bool, ConfigError> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("" | "0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(ConfigError::Parse(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
