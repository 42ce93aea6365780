//! IMAP command builder.
//!
//! Types and serialization for the commands this client issues.

mod serialize;
mod tag_generator;

use crate::types::{Flag, Mailbox, SeqRange};

pub use tag_generator::TagGenerator;

use serialize::{write_astring, write_mailbox, write_store_action};

/// STORE action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Replace flags.
    SetFlags(Vec<Flag>),
    /// Add flags.
    AddFlags(Vec<Flag>),
    /// Remove flags.
    RemoveFlags(Vec<Flag>),
}

/// IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// CAPABILITY command.
    Capability,
    /// NOOP command.
    Noop,
    /// LOGOUT command.
    Logout,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// SELECT command.
    Select {
        /// Mailbox to select.
        mailbox: Mailbox,
    },
    /// FETCH of whole message bodies over a sequence range.
    Fetch {
        /// Sequence range to fetch.
        range: SeqRange,
        /// Use BODY.PEEK[] so the fetch does not set \Seen.
        peek: bool,
    },
    /// STORE command.
    Store {
        /// Sequence range to modify.
        range: SeqRange,
        /// Flag modification to apply.
        action: StoreAction,
    },
    /// EXPUNGE command.
    Expunge,
    /// IDLE command (RFC 2177).
    Idle,
    /// DONE (to end IDLE; sent without a tag).
    Done,
}

impl Command {
    /// Serializes the command to wire bytes with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();

        // DONE is the untagged continuation of IDLE
        if !matches!(self, Self::Done) {
            buf.extend_from_slice(tag.as_bytes());
            buf.push(b' ');
        }

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }

            Self::Select { mailbox } => {
                buf.extend_from_slice(b"SELECT ");
                write_mailbox(&mut buf, mailbox);
            }

            Self::Fetch { range, peek } => {
                buf.extend_from_slice(b"FETCH ");
                buf.extend_from_slice(range.to_string().as_bytes());
                if *peek {
                    buf.extend_from_slice(b" BODY.PEEK[]");
                } else {
                    buf.extend_from_slice(b" BODY[]");
                }
            }

            Self::Store { range, action } => {
                buf.extend_from_slice(b"STORE ");
                buf.extend_from_slice(range.to_string().as_bytes());
                buf.push(b' ');
                write_store_action(&mut buf, action);
            }

            Self::Expunge => buf.extend_from_slice(b"EXPUNGE"),
            Self::Idle => buf.extend_from_slice(b"IDLE"),
            Self::Done => buf.extend_from_slice(b"DONE"),
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}
