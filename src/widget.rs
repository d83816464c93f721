//! Headless chat widget: toggles the room open/closed and owns the log.
//!
//! STATE MACHINE
//! =============
//! `Closed → Open → Closed`, toggle-driven:
//! - toggle while Closed: fetch room id, connect, then Open.
//! - toggle while Open: drain pending deliveries, disconnect, then Closed.
//! - submit while Open: publish the input, then clear it.
//!
//! Any failure while opening is logged and the widget stays Closed. There is
//! no retry. Publish failures are logged and dropped. A subscription the
//! transport reports lost moves the widget back to Closed.
//!
//! Every operation takes `&mut self`, so toggles on one widget are
//! serialized: a second open cannot start while the first is in flight.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::registry::SessionRegistry;
use crate::store::MessageStore;
use crate::transport::{Delivery, DeliverySink, Inbound, Transport};
use crate::types::{ConnectionState, ConversationId, Message};
use crate::view::{self, Bubble};

enum Accepted {
    Message,
    Lost,
    Stale,
}

pub struct ChatWidget {
    registry: Arc<dyn SessionRegistry>,
    transport: Arc<dyn Transport>,
    state: ConnectionState,
    store: MessageStore,
    input: String,
    clear_on_reopen: bool,
    /// Generation handed to the most recent connect attempt.
    last_generation: u64,
    deliveries_tx: mpsc::UnboundedSender<Delivery>,
    deliveries_rx: mpsc::UnboundedReceiver<Delivery>,
}

impl ChatWidget {
    #[must_use]
    pub fn new(registry: Arc<dyn SessionRegistry>, transport: Arc<dyn Transport>) -> Self {
        let (deliveries_tx, deliveries_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            transport,
            state: ConnectionState::Closed,
            store: MessageStore::new(),
            input: String::new(),
            clear_on_reopen: false,
            last_generation: 0,
            deliveries_tx,
            deliveries_rx,
        }
    }

    /// Clear the message log each time the room is reopened.
    #[must_use]
    pub fn with_clear_on_reopen(mut self, clear: bool) -> Self {
        self.clear_on_reopen = clear;
        self
    }

    #[must_use]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    #[must_use]
    pub fn conversation(&self) -> Option<&ConversationId> {
        self.state.conversation()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    #[must_use]
    pub fn bubbles(&self) -> Vec<Bubble<'_>> {
        view::bubbles(self.store.all())
    }

    /// Open the room if closed, close it if open. Returns the new state.
    pub async fn toggle(&mut self) -> ConnectionState {
        if self.state.is_open() {
            self.close().await;
        } else {
            self.open().await;
        }
        self.state.clone()
    }

    /// Publish the current input and clear it. Ignored while closed or when
    /// the input is blank; the input is left untouched in both cases.
    pub async fn submit(&mut self) {
        let ConnectionState::Open { conversation, .. } = &self.state else {
            debug!("chat: submit ignored while closed");
            return;
        };
        if self.input.trim().is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.input);
        if let Err(error) = self.transport.send(conversation, &text).await {
            warn!(%error, code = error.error_code(), %conversation, "chat: publish dropped");
        }
    }

    /// Move every queued delivery into the store without waiting.
    /// Returns how many were accepted.
    pub fn pump(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(delivery) = self.deliveries_rx.try_recv() {
            if matches!(self.accept(delivery), Accepted::Message) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Wait for the next delivery accepted into the store.
    ///
    /// Stale deliveries are discarded while waiting. While closed this only
    /// returns once the room is reopened and a message arrives. Returns
    /// `None` when the open subscription is lost; the widget is Closed then.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            let delivery = self.deliveries_rx.recv().await?;
            match self.accept(delivery) {
                Accepted::Message => return self.store.last().cloned(),
                Accepted::Lost => return None,
                Accepted::Stale => {}
            }
        }
    }

    async fn open(&mut self) {
        let conversation = match self.registry.fetch_conversation_id().await {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, code = error.error_code(), retryable = error.retryable(), "chat: room lookup failed");
                return;
            }
        };

        self.last_generation = self.last_generation.wrapping_add(1);
        let generation = self.last_generation;
        let sink = DeliverySink::new(generation, self.deliveries_tx.clone());
        if let Err(error) = self.transport.connect(&conversation, sink).await {
            warn!(%error, code = error.error_code(), %conversation, "chat: subscribe failed");
            return;
        }

        if self.clear_on_reopen {
            self.store.clear();
        }
        info!(%conversation, generation, "chat: opened");
        self.state = ConnectionState::Open { conversation, generation };
    }

    async fn close(&mut self) {
        // Anything that arrived while open still belongs in the log.
        self.pump();
        self.transport.disconnect().await;
        self.state = ConnectionState::Closed;
        info!("chat: closed");
    }

    fn accept(&mut self, delivery: Delivery) -> Accepted {
        let current = match &self.state {
            ConnectionState::Open { generation, .. } => *generation == delivery.generation,
            ConnectionState::Closed => false,
        };
        if !current {
            debug!(generation = delivery.generation, "chat: dropped stale delivery");
            return Accepted::Stale;
        }

        match delivery.inbound {
            Inbound::Message(body) => {
                self.store.append(body);
                Accepted::Message
            }
            Inbound::Lost(reason) => {
                // The transport drops the dead connection on the next connect.
                warn!(%reason, generation = delivery.generation, "chat: subscription lost, closing");
                self.state = ConnectionState::Closed;
                Accepted::Lost
            }
        }
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
