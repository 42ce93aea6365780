//! Parsed response data types.

use crate::types::{Capability, Flag, ResponseCode, SeqNum};

/// One data item inside a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// Message flags.
    Flags(Vec<Flag>),
    /// UID of the message.
    Uid(u32),
    /// A BODY section with its payload.
    ///
    /// `data` is `None` when the server answered NIL for the section.
    Body {
        /// Section specifier (empty for the whole message).
        section: String,
        /// Section payload.
        data: Option<Vec<u8>>,
    },
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK` status with optional code.
    Ok {
        /// Optional bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* NO` status.
    No {
        /// Optional bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BAD` status.
    Bad {
        /// Optional bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* PREAUTH` greeting.
    PreAuth {
        /// Optional bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BYE` (server is disconnecting).
    Bye {
        /// Optional bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// CAPABILITY listing.
    Capability(Vec<Capability>),
    /// FLAGS defined for the selected mailbox.
    Flags(Vec<Flag>),
    /// EXISTS: current message count.
    Exists(u32),
    /// RECENT: recent message count.
    Recent(u32),
    /// EXPUNGE: a message was removed.
    Expunge(SeqNum),
    /// FETCH data for one message.
    Fetch {
        /// Message sequence number.
        seq: SeqNum,
        /// Fetch data items.
        items: Vec<FetchItem>,
    },
}
