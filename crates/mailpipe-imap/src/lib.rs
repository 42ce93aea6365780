//! # mailpipe-imap
//!
//! A deliberately small async IMAP client covering exactly what a
//! watch-fetch-delete pipeline needs: greeting and CAPABILITY handling,
//! LOGIN, SELECT, a streaming whole-body FETCH, STORE of flags, EXPUNGE,
//! and IDLE (RFC 2177) for push notifications.
//!
//! ## Design
//!
//! - **Type-state connection management**: the connection moves through
//!   `NotAuthenticated` → `Authenticated` → `Selected`, and each state only
//!   exposes the commands that are valid in it.
//! - **Framed I/O**: CRLF-terminated lines with IMAP literal support,
//!   buffered over a plaintext or rustls TLS stream.
//! - **Sans-I/O parsing**: responses are tokenized and parsed from complete
//!   byte slices, independent of the transport.
//! - **Streaming fetch**: message bodies are delivered one at a time
//!   through a bounded channel as they arrive from the server, so a large
//!   mailbox never has to fit in memory.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpipe_imap::{connect, Client, Config, Security, SeqRange};
//!
//! let stream = connect(&Config::new("imap.example.com", 993, Security::Tls)).await?;
//! let client = Client::from_stream(stream).await?;
//! let client = client.login("user", "secret").await?;
//! let mut client = client.select("INBOX").await?;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(10);
//! let range = SeqRange::to_end(client.status().exists).unwrap();
//! let fetch = client.fetch_stream(range, tx);
//! // ... consume rx concurrently, then await fetch ...
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, StoreAction, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, FramedStream, IdleEvent, IdleHandle, ImapStream,
    NotAuthenticated, RawMessage, Security, Selected, connect,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Capability, Flag, Mailbox, MailboxStatus, ResponseCode, SeqNum, SeqRange, Status, Tag,
};
