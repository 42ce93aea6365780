//! # mailpipe-mime
//!
//! MIME message parsing for mail extraction pipelines.
//!
//! ## Features
//!
//! - **Header parsing**: continuation unfolding, case-insensitive lookup,
//!   multi-valued headers in arrival order
//! - **Decoding**: Base64, Quoted-Printable and RFC 2047 encoded words
//! - **Part tree**: multipart messages flattened to their leaf parts in
//!   declaration order, each classified as inline or attachment
//! - **Addresses**: RFC 5322 address lists rendered to display form
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpipe_mime::{Message, PartKind};
//!
//! let raw = b"From: Alice <alice@example.com>\r\n\
//!             Subject: Hi\r\n\
//!             Content-Type: text/plain\r\n\
//!             \r\n\
//!             Hello, World!";
//!
//! let message = Message::parse(raw)?;
//! for part in &message.parts {
//!     match part.kind() {
//!         PartKind::Inline => println!("{}", part.body_text()?),
//!         PartKind::Attachment => println!("attachment: {:?}", part.filename()?),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use address::Address;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, PartKind, TransferEncoding};
