//! Message extraction: raw RFC 5322 bytes to the normalized record.

use chrono::{DateTime, Local, SecondsFormat};
use tracing::{debug, warn};

use mailpipe_mime::{Address, PartKind};

use crate::record::{Attachment, Header, Message};

/// Returns the current local time in the record's timestamp format.
#[must_use]
pub fn capture_time() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Extracts a normalized record from raw message bytes.
///
/// Envelope fields degrade individually: an unparseable date falls back to
/// `capture_date`, undecodable subjects and address lists become empty, an
/// unreadable inline part contributes an empty body string and an
/// undecodable attachment name becomes empty. Only a structurally broken
/// MIME part tree is an error.
///
/// # Errors
///
/// Propagates [`mailpipe_mime::Error`] for structural failures walking the
/// part tree.
pub fn extract(raw: &[u8], capture_date: &str) -> Result<Message, mailpipe_mime::Error> {
    let parsed = mailpipe_mime::Message::parse(raw)?;

    let mut message = Message {
        date: capture_date.to_string(),
        header: Header {
            date: capture_date.to_string(),
            ..Header::default()
        },
        ..Message::default()
    };

    if let Some(raw_date) = parsed.date() {
        match DateTime::parse_from_rfc2822(raw_date) {
            Ok(date) => {
                message.header.date = date
                    .with_timezone(&Local)
                    .to_rfc3339_opts(SecondsFormat::Secs, true);
            }
            Err(e) => debug!(error = %e, date = raw_date, "unparseable Date header"),
        }
    }

    if let Some(raw_from) = parsed.from() {
        match Address::parse_list(raw_from) {
            Ok(list) => message.header.from = display_list(&list),
            Err(e) => debug!(error = %e, "unparseable From header"),
        }
    }

    if let Some(raw_to) = parsed.to() {
        match Address::parse_list(raw_to) {
            Ok(list) => message.header.to = display_list(&list),
            Err(e) => debug!(error = %e, "unparseable To header"),
        }
    }

    match parsed.subject() {
        Ok(Some(subject)) => message.header.subject = subject,
        Ok(None) => {}
        Err(e) => debug!(error = %e, "undecodable Subject header"),
    }

    for (name, values) in parsed.headers.iter() {
        message
            .header
            .map
            .insert(name.to_string(), values.to_vec());
    }

    for part in &parsed.parts {
        match part.kind() {
            PartKind::Inline => {
                let text = match part.body_text() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to read inline part");
                        String::new()
                    }
                };
                message.body.push(text);
            }
            PartKind::Attachment => {
                let name = match part.filename() {
                    Ok(name) => name.unwrap_or_default(),
                    Err(e) => {
                        warn!(error = %e, "failed to decode attachment filename");
                        String::new()
                    }
                };
                // Attachment content is never read; only the name travels.
                message.attachment.push(Attachment {
                    name,
                    content: String::new(),
                });
            }
        }
    }

    Ok(message)
}

fn display_list(addresses: &[Address]) -> Vec<String> {
    addresses.iter().map(ToString::to_string).collect()
}
