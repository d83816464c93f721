//! Transport connector: the publish/subscribe link to the message broker.
//!
//! DESIGN
//! ======
//! A subscription does not hold a callback into the widget. Instead it owns
//! a [`DeliverySink`]: a channel sender stamped with the generation number
//! the widget assigned to that subscription. The widget drains the channel
//! and drops any delivery whose generation is not the one it currently has
//! open, so a delivery already in flight when the widget closes can never
//! reach the store.
//!
//! A subscription that ends on its own (broker hangup, read failure) sends
//! one final [`Inbound::Lost`] so the widget can leave the Open state.

pub mod stomp;

use tokio::sync::mpsc;

use crate::error::ChatError;
use crate::types::ConversationId;

/// What a subscription pushed to the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// One MESSAGE body.
    Message(String),
    /// The subscription ended without a disconnect. Nothing follows it.
    Lost(String),
}

/// One inbound event, tagged with the subscription generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub generation: u64,
    pub inbound: Inbound,
}

impl Delivery {
    #[must_use]
    pub fn message(generation: u64, body: impl Into<String>) -> Self {
        Self { generation, inbound: Inbound::Message(body.into()) }
    }

    /// Message body, or `None` for a lost subscription.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match &self.inbound {
            Inbound::Message(body) => Some(body),
            Inbound::Lost(_) => None,
        }
    }
}

/// Sending half of the delivery channel handed to [`Transport::connect`].
#[derive(Clone, Debug)]
pub struct DeliverySink {
    generation: u64,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl DeliverySink {
    #[must_use]
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<Delivery>) -> Self {
        Self { generation, tx }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Push one inbound body. Returns `false` once the receiver is gone.
    pub fn deliver(&self, body: impl Into<String>) -> bool {
        self.tx.send(Delivery::message(self.generation, body)).is_ok()
    }

    /// Report that the subscription ended on its own.
    pub fn lost(&self, reason: impl Into<String>) -> bool {
        self.tx
            .send(Delivery { generation: self.generation, inbound: Inbound::Lost(reason.into()) })
            .is_ok()
    }
}

/// Bidirectional messaging channel bound to one conversation at a time.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Subscribe to `conversation`; every inbound message goes to `sink`
    /// exactly once, in arrival order.
    async fn connect(&self, conversation: &ConversationId, sink: DeliverySink) -> Result<(), ChatError>;

    /// Fire-and-forget publish. No broker acknowledgement is awaited.
    async fn send(&self, conversation: &ConversationId, text: &str) -> Result<(), ChatError>;

    /// Tear down the active subscription. No-op when already disconnected.
    /// Once this returns the sink handed to `connect` receives nothing more.
    async fn disconnect(&self);
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
