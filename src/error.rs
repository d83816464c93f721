//! Error types for the chat pipeline.
//!
//! ERROR HANDLING
//! ==============
//! `ChatError` mirrors the three failure points of a chat session: fetching
//! the room id, opening the subscription, and publishing. The widget catches
//! all three at its boundary and logs them with their `error_code`, so
//! nothing here is ever shown to the user directly.

/// Grepable error code and retry hint, attached to log lines.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Failure inside a chat session operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The room id could not be fetched from the registry.
    #[error("network error: {0}")]
    Network(String),

    /// The messaging subscription could not be established.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// An outgoing message could not be handed to the transport.
    #[error("publish error: {0}")]
    Publish(String),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Subscription(_) => "E_SUBSCRIPTION",
            Self::Publish(_) => "E_PUBLISH",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Subscription(_))
    }
}

/// Failure while building a [`crate::ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),

    /// The API base URL is not an `http://` or `https://` URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
            Self::InvalidBaseUrl(_) => "E_INVALID_BASE_URL",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
