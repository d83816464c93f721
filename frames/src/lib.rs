//! STOMP 1.2 frame model and text codec for the realtime chat transport.
//!
//! This crate owns the wire representation spoken over the chat WebSocket.
//! Every WebSocket text message carries exactly one frame: a command line,
//! `name:value` header lines, a blank line, the body and a NUL terminator.

use std::fmt::Write as _;

/// Header carrying the body length in bytes.
pub const CONTENT_LENGTH: &str = "content-length";

/// Header carrying the body MIME type.
pub const CONTENT_TYPE: &str = "content-type";

/// Header naming the subscribe/publish destination.
pub const DESTINATION: &str = "destination";

/// Header identifying a subscription on SUBSCRIBE/UNSUBSCRIBE/MESSAGE.
pub const SUBSCRIPTION_ID: &str = "id";

/// Header on MESSAGE frames echoing the subscription they belong to.
pub const SUBSCRIPTION: &str = "subscription";

/// Header carrying the short error description on ERROR frames.
pub const MESSAGE: &str = "message";

/// Error returned by [`decode_frame`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The payload contained nothing but end-of-line octets (or nothing at all).
    #[error("frame is empty")]
    Empty,
    /// The command line does not name a STOMP command.
    #[error("unknown frame command: {0}")]
    UnknownCommand(String),
    /// The payload ended before the blank line closing the header block.
    #[error("frame ended inside the header block")]
    Truncated,
    /// A header line has no `:` separator.
    #[error("malformed header line: {0}")]
    MalformedHeader(String),
    /// A header contains a backslash escape outside `\\ \n \r \c`.
    #[error("invalid header escape sequence: {0}")]
    InvalidEscape(String),
    /// The `content-length` header is not a number or overruns the payload.
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),
    /// No NUL octet where the body should end.
    #[error("frame is missing its NUL terminator")]
    MissingTerminator,
}

/// STOMP frame command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    /// Wire spelling of the command.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Stomp => "STOMP",
            Self::Connected => "CONNECTED",
            Self::Send => "SEND",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Ack => "ACK",
            Self::Nack => "NACK",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Abort => "ABORT",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
        }
    }

    /// Parse a command line (without its EOL).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownCommand`] for anything that is not a
    /// STOMP 1.2 command.
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let command = match line {
            "CONNECT" => Self::Connect,
            "STOMP" => Self::Stomp,
            "CONNECTED" => Self::Connected,
            "SEND" => Self::Send,
            "SUBSCRIBE" => Self::Subscribe,
            "UNSUBSCRIBE" => Self::Unsubscribe,
            "ACK" => Self::Ack,
            "NACK" => Self::Nack,
            "BEGIN" => Self::Begin,
            "COMMIT" => Self::Commit,
            "ABORT" => Self::Abort,
            "DISCONNECT" => Self::Disconnect,
            "MESSAGE" => Self::Message,
            "RECEIPT" => Self::Receipt,
            "ERROR" => Self::Error,
            other => return Err(CodecError::UnknownCommand(other.to_owned())),
        };
        Ok(command)
    }

    /// CONNECT and CONNECTED headers are never escaped (STOMP 1.0 compatibility).
    fn escapes_headers(self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

/// A single STOMP frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    /// Headers in wire order. Repeated names are kept; lookup returns the first.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self { command, headers: Vec::new(), body: String::new() }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Value of the first header named `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// CONNECT frame negotiating STOMP 1.2 with heart-beating disabled.
    #[must_use]
    pub fn connect(host: &str) -> Self {
        Self::new(Command::Connect)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
    }

    /// SUBSCRIBE frame with automatic acknowledgement.
    #[must_use]
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(Command::Subscribe)
            .with_header(SUBSCRIPTION_ID, id)
            .with_header(DESTINATION, destination)
            .with_header("ack", "auto")
    }

    #[must_use]
    pub fn unsubscribe(id: &str) -> Self {
        Self::new(Command::Unsubscribe).with_header(SUBSCRIPTION_ID, id)
    }

    #[must_use]
    pub fn send(destination: &str, content_type: &str, body: impl Into<String>) -> Self {
        Self::new(Command::Send)
            .with_header(DESTINATION, destination)
            .with_header(CONTENT_TYPE, content_type)
            .with_body(body)
    }

    #[must_use]
    pub fn disconnect() -> Self {
        Self::new(Command::Disconnect)
    }
}

/// Encode a frame into its text wire form, NUL terminator included.
///
/// A `content-length` header is appended to any frame with a non-empty
/// body that does not already declare one.
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    let escape = frame.command.escapes_headers();
    let mut out = String::with_capacity(frame.body.len() + 64);

    out.push_str(frame.command.as_str());
    out.push('\n');
    for (name, value) in &frame.headers {
        push_header_part(&mut out, name, escape);
        out.push(':');
        push_header_part(&mut out, value, escape);
        out.push('\n');
    }
    if !frame.body.is_empty() && frame.header(CONTENT_LENGTH).is_none() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{CONTENT_LENGTH}:{}", frame.body.len());
    }
    out.push('\n');
    out.push_str(&frame.body);
    out.push('\0');
    out
}

/// Decode one frame from its text wire form.
///
/// Leading EOLs (heart-beats) are skipped and anything after the NUL
/// terminator is ignored.
///
/// # Errors
///
/// See [`CodecError`] for the individual failure cases.
pub fn decode_frame(raw: &str) -> Result<Frame, CodecError> {
    let raw = raw.trim_start_matches(['\r', '\n']);
    if raw.is_empty() {
        return Err(CodecError::Empty);
    }

    let (command_line, mut rest) = split_line(raw).ok_or(CodecError::Truncated)?;
    let command = Command::parse(command_line)?;
    let escape = command.escapes_headers();

    let mut headers = Vec::new();
    loop {
        let (line, next) = split_line(rest).ok_or(CodecError::Truncated)?;
        rest = next;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| CodecError::MalformedHeader(line.to_owned()))?;
        if escape {
            headers.push((unescape(name)?, unescape(value)?));
        } else {
            headers.push((name.to_owned(), value.to_owned()));
        }
    }

    let declared = headers
        .iter()
        .find(|(name, _)| name == CONTENT_LENGTH)
        .map(|(_, value)| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| CodecError::InvalidContentLength(value.clone()))
        })
        .transpose()?;

    let body = match declared {
        Some(len) => {
            let body = rest
                .get(..len)
                .ok_or_else(|| CodecError::InvalidContentLength(len.to_string()))?;
            if !rest[len..].starts_with('\0') {
                return Err(CodecError::MissingTerminator);
            }
            body
        }
        None => {
            let end = rest.find('\0').ok_or(CodecError::MissingTerminator)?;
            &rest[..end]
        }
    };

    Ok(Frame { command, headers, body: body.to_owned() })
}

/// True when `raw` is a heart-beat: one or more EOLs and nothing else.
#[must_use]
pub fn is_heartbeat(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|ch| ch == '\n' || ch == '\r')
}

/// Split off one line, accepting both LF and CRLF endings.
fn split_line(raw: &str) -> Option<(&str, &str)> {
    let idx = raw.find('\n')?;
    let line = &raw[..idx];
    let line = line.strip_suffix('\r').unwrap_or(line);
    Some((line, &raw[idx + 1..]))
}

fn push_header_part(out: &mut String, raw: &str, escape: bool) {
    if !escape {
        out.push_str(raw);
        return;
    }
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
}

fn unescape(raw: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some(other) => return Err(CodecError::InvalidEscape(format!("\\{other}"))),
            None => return Err(CodecError::InvalidEscape("\\".to_owned())),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
