//! Marketplace chat client: session lifecycle and message delivery.
//!
//! ARCHITECTURE
//! ============
//! Leaf first:
//! - `registry` obtains a conversation (room) id over HTTP.
//! - `transport` opens a STOMP-over-WebSocket subscription bound to that id
//!   and publishes outgoing text.
//! - `store` keeps the ordered log of received message bodies.
//! - `widget` is the headless chat widget: a toggle-driven state machine
//!   that owns the connection state and the store.
//! - `view` turns the store into renderable chat bubbles.
//!
//! DESIGN
//! ======
//! Inbound messages never reach the store through a shared callback. The
//! transport pushes generation-tagged deliveries into a channel owned by the
//! widget, and the widget only accepts deliveries whose generation matches
//! the subscription it currently holds open.

pub mod config;
pub mod error;
pub mod registry;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;
pub mod widget;

pub use config::{BodyFormat, ChatConfig};
pub use error::{ChatError, ConfigError, ErrorCode};
pub use registry::{HttpRegistry, SessionRegistry};
pub use store::MessageStore;
pub use transport::stomp::StompTransport;
pub use transport::{Delivery, DeliverySink, Inbound, Transport};
pub use types::{ConnectionState, ConversationId, Message};
pub use view::{Bubble, Side};
pub use widget::ChatWidget;
