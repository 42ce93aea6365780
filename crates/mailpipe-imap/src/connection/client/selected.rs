//! Implementation for the selected state: streaming fetch, flag store,
//! expunge and polling.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use super::Client;
use super::states::Selected;
use crate::command::{Command, StoreAction};
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::types::{MailboxStatus, SeqNum, SeqRange, Status};
use crate::{Error, Result};

/// A raw message delivered by [`Client::fetch_stream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Sequence number within the fetched range.
    pub seq: SeqNum,
    /// Full message bytes, or `None` when the server returned no body.
    pub body: Option<Vec<u8>>,
}

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the name of the selected mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        self.state.mailbox()
    }

    /// Returns the latest mailbox snapshot.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        self.state.status()
    }

    /// Fetches whole message bodies for `range`, delivering each one
    /// through `sender` as soon as it is parsed.
    ///
    /// The bounded channel is the backpressure boundary: when the consumer
    /// falls behind, this method blocks on `send` instead of buffering the
    /// mailbox in memory. If the receiver is dropped, the remaining
    /// responses are still read so the protocol stays in sync, but nothing
    /// more is delivered.
    ///
    /// Returns once the server completes the FETCH; a NO/BAD/BYE completion
    /// is an error.
    pub async fn fetch_stream(
        &mut self,
        range: SeqRange,
        sender: mpsc::Sender<RawMessage>,
    ) -> Result<()> {
        let tag = self.tag_gen.next();
        let cmd = Command::Fetch { range, peek: false }.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let mut receiver_gone = false;
        loop {
            let response = self.stream.read_response().await?;
            match ResponseParser::parse(&response) {
                Ok(Response::Untagged(UntaggedResponse::Fetch { seq, items })) => {
                    if receiver_gone {
                        continue;
                    }
                    let body = items
                        .into_iter()
                        .find_map(|item| match item {
                            FetchItem::Body { data, .. } => Some(data),
                            _ => None,
                        })
                        .flatten();
                    if sender.send(RawMessage { seq, body }).await.is_err() {
                        tracing::debug!("fetch receiver dropped, draining remaining responses");
                        receiver_gone = true;
                    }
                }
                Ok(Response::Untagged(UntaggedResponse::Exists(n))) => {
                    self.state.status.exists = n;
                }
                Ok(Response::Tagged {
                    tag: resp_tag,
                    status,
                    text,
                    ..
                }) if resp_tag.as_str() == tag => {
                    return match status {
                        Status::Ok => Ok(()),
                        Status::No => Err(Error::No(text)),
                        Status::Bad => Err(Error::Bad(text)),
                        Status::Bye => Err(Error::Bye(text)),
                        Status::PreAuth => {
                            Err(Error::Protocol("unexpected PREAUTH in FETCH".to_string()))
                        }
                    };
                }
                // Other untagged chatter and unparseable lines are ignored.
                Ok(_) | Err(_) => {}
            }
        }
    }

    /// Modifies message flags over a sequence range.
    pub async fn store(&mut self, range: SeqRange, action: StoreAction) -> Result<()> {
        let tag = self.tag_gen.next();
        let cmd = Command::Store { range, action }.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let responses = self.stream.read_until_tagged(&tag).await?;
        Self::check_tagged_ok(&responses, &tag)?;
        Ok(())
    }

    /// Permanently removes messages marked `\Deleted`.
    ///
    /// Returns the sequence numbers reported expunged and updates the
    /// mailbox snapshot accordingly. The snapshot is nevertheless stale for
    /// sequence-range purposes: callers must re-derive state before
    /// computing new ranges.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Expunge.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let responses = self.stream.read_until_tagged(&tag).await?;
        let mut expunged = Vec::new();
        let mut reported_exists = None;

        for response_bytes in &responses {
            if let Ok(Response::Untagged(untagged)) = ResponseParser::parse(response_bytes) {
                match untagged {
                    UntaggedResponse::Expunge(seq) => expunged.push(seq),
                    UntaggedResponse::Exists(n) => reported_exists = Some(n),
                    _ => {}
                }
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;

        let removed = u32::try_from(expunged.len()).unwrap_or(u32::MAX);
        self.state.status.exists = reported_exists
            .unwrap_or_else(|| self.state.status.exists.saturating_sub(removed));
        Ok(expunged)
    }

    /// Sends NOOP and reports a changed message count, if the server
    /// announced one.
    pub async fn noop(&mut self) -> Result<Option<u32>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Noop.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        let responses = self.stream.read_until_tagged(&tag).await?;
        let mut changed = None;

        for response_bytes in &responses {
            if let Ok(Response::Untagged(untagged)) = ResponseParser::parse(response_bytes) {
                match untagged {
                    UntaggedResponse::Exists(n) => {
                        if n != self.state.status.exists {
                            changed = Some(n);
                        }
                        self.state.status.exists = n;
                    }
                    UntaggedResponse::Recent(n) => self.state.status.recent = n,
                    _ => {}
                }
            }
        }

        Self::check_tagged_ok(&responses, &tag)?;
        Ok(changed)
    }
}
