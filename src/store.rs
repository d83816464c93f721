//! Message store: the ordered log of chat text received for the open room.
//!
//! Append-only while a session is open. There is no eviction and no
//! capacity bound, so a very long-lived session grows without limit.

use crate::types::Message;

#[derive(Clone, Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message body at the end of the log.
    pub fn append(&mut self, text: impl Into<String>) {
        self.messages.push(Message::new(text));
    }

    /// All messages in arrival order.
    #[must_use]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
