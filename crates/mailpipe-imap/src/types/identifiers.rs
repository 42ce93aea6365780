//! Command tags and message sequence numbers.

use std::num::NonZeroU32;

/// IMAP command tag.
///
/// Every client command carries a unique alphanumeric tag; the server
/// echoes it in the completion response so request and response can be
/// correlated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sequence number.
///
/// Sequence numbers start at 1 and are ephemeral: every EXPUNGE renumbers
/// the messages that follow the removed one, so a number is only valid
/// against the mailbox state it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqNum(pub NonZeroU32);

impl SeqNum {
    /// Creates a new sequence number, rejecting 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SeqNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_display() {
        let tag = Tag::new("A001");
        assert_eq!(tag.as_str(), "A001");
        assert_eq!(format!("{tag}"), "A001");
    }

    #[test]
    fn seq_num_ordering() {
        let a = SeqNum::new(1).unwrap();
        let b = SeqNum::new(2).unwrap();
        assert!(a < b);
        assert_eq!(format!("{b}"), "2");
    }
}
