//! Core chat data model: conversation ids, messages, connection state.

use std::fmt;

/// Opaque identifier scoping a chat session to one buyer/seller room.
///
/// Never empty; construction trims surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConversationId(String);

impl ConversationId {
    /// Build an id from raw text. Returns `None` for empty or blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A received chat message. Only the text body is tracked client-side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    body: String,
}

impl Message {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Connection state of the chat widget.
///
/// `Open` carries the room id and the delivery generation of its
/// subscription, so an open state without an id cannot be represented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Closed,
    Open {
        conversation: ConversationId,
        generation: u64,
    },
}

impl ConnectionState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[must_use]
    pub fn conversation(&self) -> Option<&ConversationId> {
        match self {
            Self::Open { conversation, .. } => Some(conversation),
            Self::Closed => None,
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
