//! Capabilities, response statuses and response codes.

use super::{Flag, SeqNum};

/// Server capability advertised in a greeting or CAPABILITY response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501).
    Imap4Rev1,
    /// `IMAP4rev2` (RFC 9051).
    Imap4Rev2,
    /// IDLE push notifications (RFC 2177).
    Idle,
    /// LOGIN is disabled (e.g. plaintext before STARTTLS).
    LoginDisabled,
    /// A SASL authentication mechanism (`AUTH=<mechanism>`).
    Auth(String),
    /// Any capability this client does not interpret.
    Unknown(String),
}

impl Capability {
    /// Parses a capability token.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "IDLE" => Self::Idle,
            "LOGINDISABLED" => Self::LoginDisabled,
            _ => upper.strip_prefix("AUTH=").map_or_else(
                || Self::Unknown(s.to_string()),
                |mech| Self::Auth(mech.to_string()),
            ),
        }
    }
}

/// Status of a tagged or untagged status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed.
    No,
    /// Command was malformed or invalid in this state.
    Bad,
    /// Server is closing the connection.
    Bye,
    /// Connection starts pre-authenticated.
    PreAuth,
}

impl Status {
    /// Returns true for `OK` and `PREAUTH`.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// Bracketed response code carried by a status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// ALERT: text that should be surfaced to the operator.
    Alert,
    /// CAPABILITY list embedded in a greeting or completion.
    Capability(Vec<Capability>),
    /// PERMANENTFLAGS: flags that can be stored permanently.
    PermanentFlags(Vec<Flag>),
    /// READ-ONLY: mailbox selected read-only.
    ReadOnly,
    /// READ-WRITE: mailbox selected read-write.
    ReadWrite,
    /// UIDNEXT: next UID the server will assign.
    UidNext(u32),
    /// UIDVALIDITY value of the mailbox.
    UidValidity(u32),
    /// UNSEEN: first unseen message.
    Unseen(SeqNum),
    /// Any code this client does not interpret.
    Unknown(String),
}
