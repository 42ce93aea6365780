//! Mailbox names and selection state.

use super::Flag;

/// Mailbox name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox (case-insensitive per RFC).
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a selected mailbox.
///
/// Produced by SELECT and refreshed by untagged EXISTS/RECENT/EXPUNGE
/// responses. The snapshot goes stale the moment messages are expunged;
/// callers must re-derive it before computing new sequence ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// UIDVALIDITY value, when reported.
    pub uid_validity: Option<u32>,
    /// Next UID to be assigned, when reported.
    pub uid_next: Option<u32>,
    /// Flags defined for this mailbox.
    pub flags: Vec<Flag>,
    /// Whether the mailbox was selected read-only.
    pub read_only: bool,
}
