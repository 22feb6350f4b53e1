//! Message payload type

use core::fmt;
use serde::{Deserialize, Serialize};

/// A single mailbox message
///
/// Messages are opaque 32-bit values. There is no reserved or sentinel
/// value: zero is an ordinary payload and is queued like any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(u32);

impl Message {
    /// Creates a message carrying `value`
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the payload
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Message {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Message> for u32 {
    fn from(message: Message) -> Self {
        message.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msg({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_a_valid_payload() {
        let msg = Message::new(0);
        assert_eq!(msg.value(), 0);
        assert_eq!(msg, Message::default());
    }

    #[test]
    fn test_conversions() {
        let msg: Message = 1000u32.into();
        assert_eq!(msg.value(), 1000);
        assert_eq!(u32::from(msg), 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Message::new(42)), "Msg(42)");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Message::new(17)).unwrap();
        assert_eq!(json, "17");
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Message::new(17));
    }
}
