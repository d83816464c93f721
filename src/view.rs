//! Chat bubble view model.
//!
//! The panel always opens with a fixed seller greeting on the left; every
//! stored message follows on the right, in arrival order.

use std::fmt;

use crate::types::Message;

/// Greeting shown at the top of every chat panel.
pub const GREETING: &str = "비쌉니다 4달라에 주세요";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bubble<'a> {
    pub side: Side,
    pub text: &'a str,
}

impl<'a> Bubble<'a> {
    #[must_use]
    pub fn left(text: &'a str) -> Self {
        Self { side: Side::Left, text }
    }

    #[must_use]
    pub fn right(text: &'a str) -> Self {
        Self { side: Side::Right, text }
    }
}

impl fmt::Display for Bubble<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Left => write!(f, "< {}", self.text),
            Side::Right => write!(f, "  > {}", self.text),
        }
    }
}

/// Greeting plus one bubble per message.
#[must_use]
pub fn bubbles(messages: &[Message]) -> Vec<Bubble<'_>> {
    std::iter::once(Bubble::left(GREETING))
        .chain(messages.iter().map(|message| Bubble::right(message.body())))
        .collect()
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
