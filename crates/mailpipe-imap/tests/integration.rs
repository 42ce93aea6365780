//! Integration tests for the IMAP client.
//!
//! A mock stream plays back scripted server responses and records what the
//! client sends, so whole command flows run without a real server.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::mpsc;

use mailpipe_imap::{
    Client, Flag, IdleEvent, ResponseParser, SeqRange, StoreAction, UntaggedResponse,
};

/// Mock stream that returns predefined responses and captures commands.
struct MockStream {
    responses: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                responses: Cursor::new(responses.to_vec()),
                sent: Arc::clone(&sent),
            },
            sent,
        )
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let data = self.responses.get_ref();
        let pos = usize::try_from(self.responses.position()).unwrap_or(usize::MAX);

        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }

        let remaining = &data[pos..];
        let to_read = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..to_read]);
        self.responses.set_position((pos + to_read) as u64);

        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn sent_text(sent: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(sent.lock().unwrap().clone()).unwrap()
}

#[tokio::test]
async fn greeting_with_capabilities() {
    let greeting = b"* OK [CAPABILITY IMAP4rev1 IDLE] Service Ready\r\n";
    let (stream, sent) = MockStream::new(greeting);

    let client = Client::from_stream(stream).await.unwrap();
    assert!(client.supports_idle());
    // Capabilities came with the greeting, so nothing was sent.
    assert!(sent_text(&sent).is_empty());
}

#[tokio::test]
async fn greeting_without_capabilities_triggers_command() {
    let script = b"* OK Service Ready\r\n\
                   * CAPABILITY IMAP4rev1\r\n\
                   A0001 OK CAPABILITY completed\r\n";
    let (stream, sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    assert!(!client.supports_idle());
    assert_eq!(sent_text(&sent), "A0001 CAPABILITY\r\n");
}

#[tokio::test]
async fn bye_greeting_is_an_error() {
    let (stream, _sent) = MockStream::new(b"* BYE shutting down\r\n");
    assert!(Client::from_stream(stream).await.is_err());
}

#[tokio::test]
async fn login_and_select_reach_selected_state() {
    let script = b"* OK [CAPABILITY IMAP4rev1 IDLE] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 18 EXISTS\r\n\
                   * 2 RECENT\r\n\
                   * FLAGS (\\Answered \\Seen \\Deleted)\r\n\
                   * OK [UIDVALIDITY 3857529045] UIDs valid\r\n\
                   A0002 OK [READ-WRITE] SELECT completed\r\n";
    let (stream, sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let client = client.select("INBOX").await.unwrap();

    assert_eq!(client.mailbox(), "INBOX");
    assert_eq!(client.status().exists, 18);
    assert_eq!(client.status().recent, 2);
    assert_eq!(client.status().uid_validity, Some(3_857_529_045));

    let sent = sent_text(&sent);
    assert!(sent.contains("A0001 LOGIN user secret\r\n"));
    assert!(sent.contains("A0002 SELECT INBOX\r\n"));
}

#[tokio::test]
async fn failed_login_is_no_error() {
    let script = b"* OK [CAPABILITY IMAP4rev1] ready\r\n\
                   A0001 NO [AUTHENTICATIONFAILED] bad credentials\r\n";
    let (stream, _sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let err = client.login("user", "wrong").await.unwrap_err();
    assert!(err.to_string().contains("NO"));
}

#[tokio::test]
async fn fetch_stream_delivers_messages_in_order() {
    let script = b"* OK [CAPABILITY IMAP4rev1] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 3 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   * 1 FETCH (BODY[] {5}\r\nfirst)\r\n\
                   * 2 FETCH (BODY[] NIL)\r\n\
                   * 3 FETCH (BODY[] {5}\r\nthird)\r\n\
                   A0003 OK FETCH completed\r\n";
    let (stream, sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();

    let range = SeqRange::to_end(client.status().exists).unwrap();
    let (tx, mut rx) = mpsc::channel(10);
    client.fetch_stream(range, tx).await.unwrap();

    let mut messages = Vec::new();
    while let Some(raw) = rx.recv().await {
        messages.push(raw);
    }

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].seq.get(), 1);
    assert_eq!(messages[0].body.as_deref(), Some(b"first".as_slice()));
    assert_eq!(messages[1].seq.get(), 2);
    assert_eq!(messages[1].body, None);
    assert_eq!(messages[2].seq.get(), 3);
    assert_eq!(messages[2].body.as_deref(), Some(b"third".as_slice()));

    assert!(sent_text(&sent).contains("A0003 FETCH 1:3 BODY[]\r\n"));
}

#[tokio::test]
async fn fetch_stream_surfaces_server_failure() {
    let script = b"* OK [CAPABILITY IMAP4rev1] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 1 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   A0003 NO FETCH failed\r\n";
    let (stream, _sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();

    let (tx, _rx) = mpsc::channel(10);
    let err = client
        .fetch_stream(SeqRange::single(1).unwrap(), tx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("NO"));
}

#[tokio::test]
async fn store_and_expunge_empty_the_mailbox() {
    let script = b"* OK [CAPABILITY IMAP4rev1] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 2 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   * 1 FETCH (FLAGS (\\Deleted))\r\n\
                   * 2 FETCH (FLAGS (\\Deleted))\r\n\
                   A0003 OK STORE completed\r\n\
                   * 1 EXPUNGE\r\n\
                   * 1 EXPUNGE\r\n\
                   A0004 OK EXPUNGE completed\r\n";
    let (stream, sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();
    assert_eq!(client.status().exists, 2);

    let range = SeqRange::to_end(2).unwrap();
    client
        .store(range, StoreAction::AddFlags(vec![Flag::Deleted]))
        .await
        .unwrap();
    let expunged = client.expunge().await.unwrap();

    assert_eq!(expunged.len(), 2);
    assert_eq!(client.status().exists, 0);

    let sent = sent_text(&sent);
    assert!(sent.contains("A0003 STORE 1:2 +FLAGS (\\Deleted)\r\n"));
    assert!(sent.contains("A0004 EXPUNGE\r\n"));
}

#[tokio::test]
async fn idle_reports_exists_event_and_done_completes() {
    let script = b"* OK [CAPABILITY IMAP4rev1 IDLE] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 0 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   + idling\r\n\
                   * 5 EXISTS\r\n\
                   A0003 OK IDLE terminated\r\n";
    let (stream, sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();

    let mut handle = client.idle().await.unwrap();
    let event = handle.wait(None).await.unwrap();
    assert_eq!(event, IdleEvent::Exists(5));
    handle.done().await.unwrap();

    let sent = sent_text(&sent);
    assert!(sent.contains("A0003 IDLE\r\n"));
    assert!(sent.ends_with("DONE\r\n"));
}

#[tokio::test]
async fn idle_ended_by_server_is_terminated() {
    let script = b"* OK [CAPABILITY IMAP4rev1 IDLE] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 0 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   + idling\r\n\
                   A0003 OK IDLE done\r\n";
    let (stream, _sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();

    let mut handle = client.idle().await.unwrap();
    let event = handle.wait(None).await.unwrap();
    assert_eq!(event, IdleEvent::Terminated);
}

#[tokio::test]
async fn noop_detects_count_change() {
    let script = b"* OK [CAPABILITY IMAP4rev1] ready\r\n\
                   A0001 OK LOGIN completed\r\n\
                   * 1 EXISTS\r\n\
                   A0002 OK SELECT completed\r\n\
                   A0003 OK NOOP completed\r\n\
                   * 4 EXISTS\r\n\
                   A0004 OK NOOP completed\r\n";
    let (stream, _sent) = MockStream::new(script);

    let client = Client::from_stream(stream).await.unwrap();
    let client = client.login("user", "secret").await.unwrap();
    let mut client = client.select("INBOX").await.unwrap();

    assert_eq!(client.noop().await.unwrap(), None);
    assert_eq!(client.noop().await.unwrap(), Some(4));
    assert_eq!(client.status().exists, 4);
}

#[test]
fn parser_is_reachable_from_the_crate_root() {
    let parsed = ResponseParser::parse(b"* 7 EXISTS\r\n").unwrap();
    assert_eq!(
        parsed,
        mailpipe_imap::Response::Untagged(UntaggedResponse::Exists(7))
    );
}
