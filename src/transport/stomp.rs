//! STOMP-over-WebSocket transport.
//!
//! LIFECYCLE
//! =========
//! 1. Open the WebSocket, send CONNECT, wait for CONNECTED.
//! 2. SUBSCRIBE to `{subscribe_prefix}/{room}`.
//! 3. Spawn a reader (MESSAGE → sink) and a writer (outgoing queue → socket).
//! 4. Disconnect: abort the reader and wait for it to stop, queue UNSUBSCRIBE
//!    + DISCONNECT, close the queue and give the writer a bounded window to
//!    flush.
//!
//! At most one connection is held. Connecting while connected tears the old
//! connection down first. A reader that stops on its own (broker hangup or
//! read error) sends [`Inbound::Lost`](super::Inbound::Lost) and the
//! connection stops counting as connected.

use std::time::Duration;

use frames::{Command, Frame, decode_frame, encode_frame, is_heartbeat};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DeliverySink, Transport};
use crate::config::{BodyFormat, ChatConfig};
use crate::error::ChatError;
use crate::types::ConversationId;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub struct StompTransport {
    config: ChatConfig,
    active: Mutex<Option<ActiveConnection>>,
}

struct ActiveConnection {
    conversation: ConversationId,
    subscription_id: String,
    outgoing: mpsc::UnboundedSender<WsMessage>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ActiveConnection {
    /// False once the reader has stopped: the subscription is gone.
    fn is_live(&self) -> bool {
        !self.reader.is_finished()
    }

    async fn shutdown(self, flush: Duration) {
        // Deliveries stop here, before anything else is sent. The reader may
        // be mid-poll on another worker, so wait until it has really stopped.
        self.reader.abort();
        let _ = self.reader.await;

        for frame in [Frame::unsubscribe(&self.subscription_id), Frame::disconnect()] {
            let _ = self.outgoing.send(WsMessage::text(encode_frame(&frame)));
        }
        drop(self.outgoing);

        let mut writer = self.writer;
        if tokio::time::timeout(flush, &mut writer).await.is_err() {
            warn!(conversation = %self.conversation, "stomp: writer did not flush before timeout");
            writer.abort();
        }
    }
}

impl StompTransport {
    #[must_use]
    pub fn new(config: &ChatConfig) -> Self {
        Self { config: config.clone(), active: Mutex::new(None) }
    }

    /// Whether a connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.active.lock().await.as_ref().is_some_and(ActiveConnection::is_live)
    }

    fn connect_frame(&self) -> Frame {
        let frame = Frame::connect(ws_host(&self.config.ws_url));
        match &self.config.session_token {
            Some(token) => frame.with_header("Authorization", format!("Bearer {token}")),
            None => frame,
        }
    }
}

#[async_trait::async_trait]
impl Transport for StompTransport {
    async fn connect(&self, conversation: &ConversationId, sink: DeliverySink) -> Result<(), ChatError> {
        let timeout = self.config.timeouts.connect();
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            debug!(conversation = %previous.conversation, "stomp: replacing active connection");
            previous.shutdown(timeout).await;
        }

        let (stream, _) = tokio::time::timeout(timeout, connect_async(self.config.ws_url.as_str()))
            .await
            .map_err(|_| ChatError::Subscription(format!("timed out opening {}", self.config.ws_url)))?
            .map_err(|error| ChatError::Subscription(format!("websocket connect failed: {error}")))?;
        let (mut write, mut read) = stream.split();

        send_frame(&mut write, &self.connect_frame()).await?;
        tokio::time::timeout(timeout, await_connected(&mut read))
            .await
            .map_err(|_| ChatError::Subscription("timed out waiting for CONNECTED".to_owned()))??;

        let subscription_id = format!("sub-{}", Uuid::new_v4());
        let destination = self.config.subscribe_destination(conversation);
        send_frame(&mut write, &Frame::subscribe(&subscription_id, &destination)).await?;

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(write, outgoing_rx));
        let reader = tokio::spawn(read_loop(read, sink, subscription_id.clone(), self.config.body_format));

        info!(%conversation, %destination, "stomp: subscribed");
        *active = Some(ActiveConnection {
            conversation: conversation.clone(),
            subscription_id,
            outgoing,
            reader,
            writer,
        });
        Ok(())
    }

    async fn send(&self, conversation: &ConversationId, text: &str) -> Result<(), ChatError> {
        let active = self.active.lock().await;
        let Some(connection) = active.as_ref() else {
            return Err(ChatError::Publish("not connected".to_owned()));
        };
        if connection.conversation != *conversation {
            return Err(ChatError::Publish(format!("not subscribed to room {conversation}")));
        }
        if !connection.is_live() {
            return Err(ChatError::Publish("subscription lost".to_owned()));
        }

        let frame = outbound_frame(&self.config, conversation, text);
        connection
            .outgoing
            .send(WsMessage::text(encode_frame(&frame)))
            .map_err(|_| ChatError::Publish("connection writer has stopped".to_owned()))?;
        debug!(%conversation, bytes = text.len(), "stomp: queued SEND");
        Ok(())
    }

    async fn disconnect(&self) {
        let Some(connection) = self.active.lock().await.take() else {
            return;
        };
        let conversation = connection.conversation.clone();
        connection.shutdown(self.config.timeouts.connect()).await;
        info!(%conversation, "stomp: disconnected");
    }
}

async fn send_frame(write: &mut SplitSink<WsStream, WsMessage>, frame: &Frame) -> Result<(), ChatError> {
    write
        .send(WsMessage::text(encode_frame(frame)))
        .await
        .map_err(|error| ChatError::Subscription(format!("websocket send failed: {error}")))
}

async fn await_connected(read: &mut SplitStream<WsStream>) -> Result<(), ChatError> {
    while let Some(message) = read.next().await {
        let message = message.map_err(|error| ChatError::Subscription(format!("websocket read failed: {error}")))?;
        match message {
            WsMessage::Text(text) => {
                if is_heartbeat(text.as_str()) {
                    continue;
                }
                let frame = decode_frame(text.as_str())
                    .map_err(|error| ChatError::Subscription(format!("bad frame from broker: {error}")))?;
                match frame.command {
                    Command::Connected => return Ok(()),
                    Command::Error => {
                        let reason = frame.header(frames::MESSAGE).unwrap_or(&frame.body).to_owned();
                        return Err(ChatError::Subscription(format!("broker rejected CONNECT: {reason}")));
                    }
                    other => debug!(command = other.as_str(), "stomp: ignoring frame before CONNECTED"),
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    Err(ChatError::Subscription("websocket closed before CONNECTED".to_owned()))
}

async fn read_loop(mut read: SplitStream<WsStream>, sink: DeliverySink, subscription_id: String, format: BodyFormat) {
    let reason = loop {
        let text = match read.next().await {
            Some(Ok(WsMessage::Text(text))) => text,
            Some(Ok(WsMessage::Close(_))) | None => break "broker closed the connection".to_owned(),
            Some(Ok(_)) => continue,
            Some(Err(error)) => break format!("websocket read failed: {error}"),
        };
        if is_heartbeat(text.as_str()) {
            continue;
        }

        let frame = match decode_frame(text.as_str()) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, "stomp: dropping undecodable frame");
                continue;
            }
        };

        match frame.command {
            Command::Message => {
                if frame
                    .header(frames::SUBSCRIPTION)
                    .is_some_and(|id| id != subscription_id)
                {
                    debug!("stomp: MESSAGE for another subscription");
                    continue;
                }
                if !sink.deliver(inbound_body(format, &frame.body)) {
                    return;
                }
            }
            Command::Error => {
                warn!(reason = frame.header(frames::MESSAGE).unwrap_or_default(), "stomp: broker error frame");
            }
            other => debug!(command = other.as_str(), "stomp: ignoring frame"),
        }
    };

    warn!(%reason, "stomp: subscription lost");
    sink.lost(reason);
}

async fn write_loop(mut write: SplitSink<WsStream, WsMessage>, mut outgoing: mpsc::UnboundedReceiver<WsMessage>) {
    while let Some(message) = outgoing.recv().await {
        if let Err(error) = write.send(message).await {
            warn!(%error, "stomp: websocket write failed");
            return;
        }
    }
    let _ = write.close().await;
}

/// SEND frame for one outgoing chat message.
#[must_use]
pub fn outbound_frame(config: &ChatConfig, conversation: &ConversationId, text: &str) -> Frame {
    let destination = config.publish_destination.as_str();
    match config.body_format {
        BodyFormat::Text => Frame::send(destination, TEXT_CONTENT_TYPE, text),
        BodyFormat::Json => {
            let body = serde_json::json!({ "roomId": conversation.as_str(), "message": text });
            Frame::send(destination, JSON_CONTENT_TYPE, body.to_string())
        }
    }
}

/// Chat text carried by an inbound MESSAGE body.
///
/// JSON envelopes are unwrapped to their `message` field; anything else is
/// passed through verbatim.
#[must_use]
pub fn inbound_body(format: BodyFormat, body: &str) -> String {
    if format == BodyFormat::Json {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
            if let Some(text) = map.get("message").and_then(Value::as_str) {
                return text.to_owned();
            }
        }
    }
    body.to_owned()
}

/// Host part of a WebSocket URL, used as the CONNECT `host` header.
fn ws_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

#[cfg(test)]
#[path = "stomp_test.rs"]
mod tests;
