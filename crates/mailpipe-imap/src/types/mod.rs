//! Core IMAP types.
//!
//! Fundamental protocol types shared by the command builder, the response
//! parser and the client: identifiers, sequence ranges, mailbox state,
//! flags, capabilities and response codes.

mod capability;
mod flags;
mod identifiers;
mod mailbox;
mod sequence;

pub use capability::{Capability, ResponseCode, Status};
pub use flags::Flag;
pub use identifiers::{SeqNum, Tag};
pub use mailbox::{Mailbox, MailboxStatus};
pub use sequence::SeqRange;
