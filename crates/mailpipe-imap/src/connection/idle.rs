//! IMAP IDLE support (RFC 2177).
//!
//! IDLE lets the server push mailbox changes to a connected client instead
//! of being polled. The handle wraps an active IDLE session: `wait()`
//! blocks for the next event (or the renewal interval), `done()` sends the
//! DONE acknowledgment and drains the session to its tagged completion.

#![allow(clippy::missing_errors_doc)]

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;

use super::client::{Client, Selected};
use super::framed::FramedStream;
use crate::command::Command;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{SeqNum, Status};
use crate::{Error, Result};

/// Event observed during IDLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    /// New message count (EXISTS).
    Exists(u32),
    /// Recent count changed (RECENT).
    Recent(u32),
    /// A message was expunged.
    Expunge(SeqNum),
    /// The renewal interval elapsed without an event.
    Timeout,
    /// The server ended IDLE on its own, without any event.
    ///
    /// Distinguished so callers can treat a spontaneous end of the wait as
    /// an error instead of silently retrying.
    Terminated,
}

/// Handle for an active IDLE session.
///
/// Exactly one handle exists per session; it borrows the connection, so no
/// other command can be issued until `done()` is called.
pub struct IdleHandle<'a, S> {
    stream: &'a mut FramedStream<S>,
    tag: String,
}

impl<'a, S> IdleHandle<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) const fn new(stream: &'a mut FramedStream<S>, tag: String) -> Self {
        Self { stream, tag }
    }

    /// Waits for the next server event.
    ///
    /// With `renew` set, returns [`IdleEvent::Timeout`] once that interval
    /// elapses so the caller can re-issue IDLE; with `None` the wait blocks
    /// indefinitely. Untagged responses that do not describe a mailbox
    /// change are skipped.
    pub async fn wait(&mut self, renew: Option<Duration>) -> Result<IdleEvent> {
        loop {
            let response = match renew {
                Some(limit) => match timeout(limit, self.stream.read_response()).await {
                    Ok(result) => result?,
                    Err(_) => return Ok(IdleEvent::Timeout),
                },
                None => self.stream.read_response().await?,
            };

            if let Some(event) = self.classify(&response)? {
                return Ok(event);
            }
        }
    }

    /// Maps one response to an event, or `None` for chatter to skip.
    fn classify(&self, response: &[u8]) -> Result<Option<IdleEvent>> {
        match ResponseParser::parse(response)? {
            Response::Untagged(untagged) => Ok(match untagged {
                UntaggedResponse::Exists(n) => Some(IdleEvent::Exists(n)),
                UntaggedResponse::Recent(n) => Some(IdleEvent::Recent(n)),
                UntaggedResponse::Expunge(seq) => Some(IdleEvent::Expunge(seq)),
                UntaggedResponse::Bye { text, .. } => return Err(Error::Bye(text)),
                _ => None,
            }),
            Response::Continuation { .. } => Err(Error::Protocol(
                "unexpected continuation during IDLE".to_string(),
            )),
            Response::Tagged {
                tag, status, text, ..
            } => {
                if tag.as_str() == self.tag {
                    match status {
                        // The server completed IDLE without us sending DONE.
                        Status::Ok => Ok(Some(IdleEvent::Terminated)),
                        Status::No => Err(Error::No(text)),
                        Status::Bad => Err(Error::Bad(text)),
                        Status::Bye => Err(Error::Bye(text)),
                        Status::PreAuth => {
                            Err(Error::Protocol("unexpected PREAUTH in IDLE".to_string()))
                        }
                    }
                } else {
                    Err(Error::Protocol(format!(
                        "unexpected tag {} during IDLE",
                        tag.as_str()
                    )))
                }
            }
        }
    }

    /// Exits IDLE by sending DONE and draining to the tagged completion.
    ///
    /// This is the cancellation acknowledgment: it blocks until the server
    /// confirms, and nothing bounds that wait if the server never answers.
    pub async fn done(self) -> Result<()> {
        let cmd = Command::Done.serialize("");
        self.stream.write_command(&cmd).await?;

        loop {
            let response = self.stream.read_response().await?;
            if let Ok(Response::Tagged {
                tag, status, text, ..
            }) = ResponseParser::parse(&response)
                && tag.as_str() == self.tag
            {
                return match status {
                    Status::Ok => Ok(()),
                    Status::No => Err(Error::No(text)),
                    Status::Bad => Err(Error::Bad(text)),
                    Status::Bye => Err(Error::Bye(text)),
                    Status::PreAuth => {
                        Err(Error::Protocol("unexpected PREAUTH after DONE".to_string()))
                    }
                };
            }
            // Events that raced with DONE are drained and dropped here.
        }
    }
}

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Enters IDLE and returns a handle for waiting on events.
    ///
    /// Check `supports_idle()` first; servers without the capability answer
    /// BAD. Call [`IdleHandle::done`] to return the connection to normal
    /// command mode.
    pub async fn idle(&mut self) -> Result<IdleHandle<'_, S>> {
        let tag = self.tag_gen.next();
        let cmd = Command::Idle.serialize(&tag);
        self.stream.write_command(&cmd).await?;

        // The server acknowledges IDLE with a continuation request.
        loop {
            let response = self.stream.read_response().await?;
            match ResponseParser::parse(&response)? {
                Response::Continuation { .. } => return Ok(IdleHandle::new(&mut self.stream, tag)),
                Response::Tagged {
                    tag: resp_tag,
                    status,
                    text,
                    ..
                } if resp_tag.as_str() == tag => {
                    return match status {
                        Status::No => Err(Error::No(text)),
                        Status::Bad => Err(Error::Bad(text)),
                        Status::Bye => Err(Error::Bye(text)),
                        _ => Err(Error::Protocol("unexpected response to IDLE".to_string())),
                    };
                }
                // Untagged responses may arrive before the continuation.
                _ => {}
            }
        }
    }
}
