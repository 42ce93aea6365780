//! The processing loop: fetch a batch, extract and render each message,
//! delete the batch, wait for the next change.

use std::io::Write;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mailpipe_imap::{
    Client, Flag, MailboxStatus, Selected, SeqRange, StoreAction, connect,
};

use crate::config::Args;
use crate::render::Renderer;
use crate::{extract, watch};

/// Bound of the fetch queue; the producer blocks once this many raw
/// messages are waiting for extraction.
const FETCH_QUEUE_CAPACITY: usize = 10;

/// Connects, authenticates, selects the mailbox and runs the processing
/// loop until a fatal error.
///
/// There is no retry at any level: dial, authentication, selection, fetch
/// and wait failures all end the process, and availability is left to an
/// external supervisor. The connection is logged out on every exit path.
///
/// # Errors
///
/// Returns the first fatal error.
pub async fn run(args: &Args) -> anyhow::Result<()> {
    let template = args.template_source()?;
    let renderer = Renderer::new(template);

    let config = args.imap_config();
    debug!(host = %config.host, port = config.port, "connecting");
    let stream = connect(&config).await?;

    let client = Client::from_stream(stream).await?;
    let client = client.login(&args.username, &args.password).await?;
    let mut client = client.select(&args.mailbox).await?;
    info!(
        mailbox = %client.mailbox(),
        exists = client.status().exists,
        "mailbox selected"
    );

    let mut out = std::io::stdout();
    let result = drive(&mut client, &renderer, args.poll_interval(), &mut out).await;

    // Logout on every exit path; the error (if any) is what matters.
    let _ = client.logout().await;
    result
}

/// The loop proper: batch, then wait, forever (until an error).
async fn drive<S, W>(
    client: &mut Client<S, Selected>,
    renderer: &Renderer,
    poll: Option<std::time::Duration>,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    let mut status = client.status().clone();
    loop {
        process_batch(client, &status, renderer, out).await?;
        // The snapshot is stale after cleanup; always re-derive it.
        status = watch::wait_for_change(client, poll).await?;
    }
}

/// Processes one batch: stream-fetch `1:N`, extract and render each
/// message, then mark the whole range deleted and expunge it.
///
/// An empty mailbox is a no-op (no fetch, no cleanup). Render failures are
/// message-local and logged; the message still counts as processed, so
/// cleanup deletes it regardless (lossy by design). Only a fetch-level or
/// structural extraction failure aborts the batch before cleanup.
pub async fn process_batch<S, W>(
    client: &mut Client<S, Selected>,
    status: &MailboxStatus,
    renderer: &Renderer,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: Write,
{
    let Some(range) = SeqRange::to_end(status.exists) else {
        return Ok(());
    };
    debug!(%range, "fetching batch");

    let capture_date = extract::capture_time();
    let (tx, mut rx) = mpsc::channel(FETCH_QUEUE_CAPACITY);

    // Producer and consumer run concurrently on this task; the bounded
    // queue is the only thing between them.
    let fetch = client.fetch_stream(range, tx);
    let consume = async {
        while let Some(raw) = rx.recv().await {
            let seq = raw.seq.get();
            let Some(body) = raw.body else {
                debug!(seq, "server returned no body, skipping");
                continue;
            };

            // Structural extraction failures abort the whole batch.
            let record = extract::extract(&body, &capture_date)?;

            if let Err(e) = renderer.render(&record, out) {
                warn!(seq, error = %e, "render failed, message is dropped");
            }
        }
        Ok::<(), anyhow::Error>(())
    };
    let (fetch_result, consume_result) = tokio::join!(fetch, consume);

    // Either failure aborts before cleanup runs.
    consume_result?;
    fetch_result?;

    // Cleanup is unconditional per batch: it does not distinguish messages
    // that rendered from messages that failed to render.
    client
        .store(range, StoreAction::AddFlags(vec![Flag::Deleted]))
        .await?;
    let expunged = client.expunge().await?;
    debug!(count = expunged.len(), "batch expunged");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::{Builder, Mock};

    async fn selected(mock: Mock) -> Client<Mock, Selected> {
        let client = Client::from_stream(mock).await.unwrap();
        let client = client.login("user", "secret").await.unwrap();
        client.select("INBOX").await.unwrap()
    }

    /// Scripted login + select returning `exists` messages.
    fn session(builder: &mut Builder, exists: u32) {
        let select = format!("* {exists} EXISTS\r\nA0002 OK done\r\n");
        builder
            .read(b"* OK [CAPABILITY IMAP4rev1 IDLE] ready\r\n")
            .write(b"A0001 LOGIN user secret\r\n")
            .read(b"A0001 OK done\r\n")
            .write(b"A0002 SELECT INBOX\r\n")
            .read(select.as_bytes());
    }

    fn raw_message(subject: &str, body: &str) -> Vec<u8> {
        format!(
            "From: a@example.com\r\nSubject: {subject}\r\n\
             Content-Type: text/plain\r\n\r\n{body}"
        )
        .into_bytes()
    }

    fn fetch_line(seq: u32, raw: &[u8]) -> Vec<u8> {
        let mut line = format!("* {seq} FETCH (BODY[] {{{}}}\r\n", raw.len()).into_bytes();
        line.extend_from_slice(raw);
        line.extend_from_slice(b")\r\n");
        line
    }

    #[tokio::test]
    async fn empty_mailbox_is_a_complete_no_op() {
        let mut builder = Builder::new();
        session(&mut builder, 0);
        let mut client = selected(builder.build()).await;

        let renderer = Renderer::new("{{ Header.Subject }}\n");
        let mut out = Vec::new();
        let status = client.status().clone();

        // No fetch, store or expunge is scripted: any write would panic.
        process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn batch_renders_in_order_and_empties_the_mailbox() {
        let first = raw_message("one", "first body");
        let second = raw_message("two", "second body");

        let mut builder = Builder::new();
        session(&mut builder, 2);
        builder
            .write(b"A0003 FETCH 1:2 BODY[]\r\n")
            .read(&fetch_line(1, &first))
            .read(&fetch_line(2, &second))
            .read(b"A0003 OK FETCH done\r\n")
            .write(b"A0004 STORE 1:2 +FLAGS (\\Deleted)\r\n")
            .read(b"A0004 OK STORE done\r\n")
            .write(b"A0005 EXPUNGE\r\n")
            .read(b"* 1 EXPUNGE\r\n* 1 EXPUNGE\r\nA0005 OK done\r\n");
        let mut client = selected(builder.build()).await;

        let renderer = Renderer::new("{{ Header.Subject }}\n");
        let mut out = Vec::new();
        let status = client.status().clone();

        process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\n");
        assert_eq!(client.status().exists, 0);
    }

    #[tokio::test]
    async fn render_failure_still_deletes_the_whole_batch() {
        let failing = raw_message("bad", "body");
        let fine = raw_message("good", "body");

        let mut builder = Builder::new();
        session(&mut builder, 2);
        builder
            .write(b"A0003 FETCH 1:2 BODY[]\r\n")
            .read(&fetch_line(1, &failing))
            .read(&fetch_line(2, &fine))
            .read(b"A0003 OK FETCH done\r\n")
            .write(b"A0004 STORE 1:2 +FLAGS (\\Deleted)\r\n")
            .read(b"A0004 OK STORE done\r\n")
            .write(b"A0005 EXPUNGE\r\n")
            .read(b"* 1 EXPUNGE\r\n* 1 EXPUNGE\r\nA0005 OK done\r\n");
        let mut client = selected(builder.build()).await;

        // An invalid pattern, but only when the subject says so: the first
        // message fails to render, the second succeeds.
        let renderer = Renderer::new(
            "{% if Header.Subject == \"bad\" %}{{ re(\"(\", \"x\") }}{% endif %}{{ Header.Subject }}\n",
        );
        let mut out = Vec::new();
        let status = client.status().clone();

        process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap();

        // Both messages were deleted even though one render failed.
        assert_eq!(String::from_utf8(out).unwrap(), "good\n");
        assert_eq!(client.status().exists, 0);
    }

    #[tokio::test]
    async fn missing_body_is_skipped_not_fatal() {
        let fine = raw_message("present", "body");

        let mut builder = Builder::new();
        session(&mut builder, 2);
        builder
            .write(b"A0003 FETCH 1:2 BODY[]\r\n")
            .read(b"* 1 FETCH (BODY[] NIL)\r\n")
            .read(&fetch_line(2, &fine))
            .read(b"A0003 OK FETCH done\r\n")
            .write(b"A0004 STORE 1:2 +FLAGS (\\Deleted)\r\n")
            .read(b"A0004 OK STORE done\r\n")
            .write(b"A0005 EXPUNGE\r\n")
            .read(b"* 1 EXPUNGE\r\n* 1 EXPUNGE\r\nA0005 OK done\r\n");
        let mut client = selected(builder.build()).await;

        let renderer = Renderer::new("{{ Header.Subject }}\n");
        let mut out = Vec::new();
        let status = client.status().clone();

        process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "present\n");
    }

    #[tokio::test]
    async fn structural_failure_aborts_before_cleanup() {
        let broken = b"Content-Type: multipart/mixed; boundary=b\r\n\r\nno delimiter".to_vec();

        let mut builder = Builder::new();
        session(&mut builder, 1);
        builder
            .write(b"A0003 FETCH 1 BODY[]\r\n")
            .read(&fetch_line(1, &broken))
            .read(b"A0003 OK FETCH done\r\n");
        // No STORE/EXPUNGE scripted: cleanup must not run.
        let mut client = selected(builder.build()).await;

        let renderer = Renderer::new("{{ Header.Subject }}\n");
        let mut out = Vec::new();
        let status = client.status().clone();

        let err = process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("multipart"));
    }

    #[tokio::test]
    async fn fetch_failure_aborts_before_cleanup() {
        let mut builder = Builder::new();
        session(&mut builder, 1);
        builder
            .write(b"A0003 FETCH 1 BODY[]\r\n")
            .read(b"A0003 NO FETCH failed\r\n");
        let mut client = selected(builder.build()).await;

        let renderer = Renderer::new("{{ Header.Subject }}\n");
        let mut out = Vec::new();
        let status = client.status().clone();

        let err = process_batch(&mut client, &status, &renderer, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("NO"));
    }
}
