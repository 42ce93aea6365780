//! Change detection: block until the mailbox changes.
//!
//! Servers with IDLE get a push-style wait that self-renews on the
//! configured interval; everything else falls back to timed NOOP polling.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use mailpipe_imap::{Client, Error, IdleEvent, MailboxStatus, Result, Selected};

/// Blocks until the mailbox reports a new message count, then returns the
/// freshly derived state.
///
/// With IDLE support, `poll` is the renewal interval (`None` blocks
/// indefinitely). A mailbox-size update wins only when it is observed
/// before the wait completes: the update is acknowledged by draining IDLE
/// to completion first, and only then is the new state returned. The wait
/// ending without any update is the distinguished [`Error::IdleEnded`],
/// surfaced to the caller instead of being retried. The acknowledgment
/// itself has no secondary timeout; a server that never answers DONE
/// blocks forever.
///
/// Without IDLE support, the mailbox is polled with NOOP every `poll`
/// interval (a `None`/zero interval degenerates to continuous polling).
///
/// # Errors
///
/// Any transport or protocol failure, and the distinguished
/// [`Error::IdleEnded`] condition.
pub async fn wait_for_change<S>(
    client: &mut Client<S, Selected>,
    poll: Option<Duration>,
) -> Result<MailboxStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if client.supports_idle() {
        idle_wait(client, poll).await
    } else {
        poll_wait(client, poll.unwrap_or(Duration::ZERO)).await
    }
}

/// Push-style wait over IDLE.
async fn idle_wait<S>(
    client: &mut Client<S, Selected>,
    renew: Option<Duration>,
) -> Result<MailboxStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let mut handle = client.idle().await?;
        loop {
            match handle.wait(renew).await? {
                IdleEvent::Exists(count) => {
                    debug!(count, "mailbox update observed");
                    // Acknowledge the cancellation before reporting.
                    handle.done().await?;
                    let mut status = client.status().clone();
                    status.exists = count;
                    return Ok(status);
                }
                IdleEvent::Timeout => {
                    // Renewal interval elapsed; re-issue IDLE.
                    handle.done().await?;
                    break;
                }
                IdleEvent::Terminated => return Err(Error::IdleEnded),
                IdleEvent::Recent(_) | IdleEvent::Expunge(_) => {
                    // Not a size update; keep waiting.
                }
            }
        }
    }
}

/// Timed NOOP polling for servers without IDLE.
async fn poll_wait<S>(
    client: &mut Client<S, Selected>,
    interval: Duration,
) -> Result<MailboxStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        tokio::time::sleep(interval).await;
        if let Some(count) = client.noop().await? {
            debug!(count, "mailbox changed during poll");
            let mut status = client.status().clone();
            status.exists = count;
            return Ok(status);
        }
    }
}
