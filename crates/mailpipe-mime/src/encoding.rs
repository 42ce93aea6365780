//! Decoding utilities: Base64, Quoted-Printable and RFC 2047 encoded
//! words.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Soft line breaks are removed; `=XX` escapes become raw bytes.
///
/// # Errors
///
/// Returns an error on an invalid or truncated escape sequence.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut bytes = text.bytes().peekable();

    while let Some(b) = bytes.next() {
        if b != b'=' {
            result.push(b);
            continue;
        }

        // Soft line break: "=\r\n" or "=\n".
        match bytes.peek() {
            Some(b'\r') => {
                bytes.next();
                if bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
                continue;
            }
            Some(b'\n') => {
                bytes.next();
                continue;
            }
            _ => {}
        }

        let hex: Vec<u8> = bytes.by_ref().take(2).collect();
        if hex.len() != 2 {
            return Err(Error::InvalidEncoding(
                "incomplete quoted-printable escape".to_string(),
            ));
        }
        let hex_str = std::str::from_utf8(&hex)
            .map_err(|_| Error::InvalidEncoding("non-ASCII escape".to_string()))?;
        let byte = u8::from_str_radix(hex_str, 16)
            .map_err(|e| Error::InvalidEncoding(format!("invalid hex escape: {e}")))?;
        result.push(byte);
    }

    Ok(result)
}

/// Decodes a header value containing RFC 2047 encoded words.
///
/// Format of one word: `=?charset?encoding?encoded-text?=`. Plain text
/// around encoded words is kept; whitespace between two adjacent encoded
/// words is dropped per the RFC. Decoded bytes are converted to UTF-8
/// lossily, whatever charset the word declares.
///
/// # Errors
///
/// Returns an error if a recognized encoded word is malformed.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let mut result = String::new();
    let mut rest = text;
    let mut last_was_encoded = false;

    while let Some(start) = rest.find("=?") {
        let (before, after_marker) = rest.split_at(start);

        let Some((word, tail)) = split_encoded_word(after_marker) else {
            // Not actually an encoded word; emit up to and past the marker.
            result.push_str(before);
            result.push_str("=?");
            rest = &after_marker[2..];
            last_was_encoded = false;
            continue;
        };

        // Whitespace between adjacent encoded words is dropped.
        let ws_between = before.chars().all(char::is_whitespace) && last_was_encoded;
        if !ws_between {
            result.push_str(before);
        }

        result.push_str(&decode_encoded_word(word)?);
        last_was_encoded = true;
        rest = tail;
    }

    result.push_str(rest);
    Ok(result)
}

/// Splits `=?...?=` off the front of `text` (which starts with `=?`).
fn split_encoded_word(text: &str) -> Option<(&str, &str)> {
    let inner = &text[2..];
    // charset ? encoding ? payload ?=
    let q1 = inner.find('?')?;
    let q2 = inner[q1 + 1..].find('?')? + q1 + 1;
    let end = inner[q2 + 1..].find("?=")? + q2 + 1;
    Some((&text[..end + 4], &text[end + 4..]))
}

/// Decodes a single well-formed encoded word.
fn decode_encoded_word(word: &str) -> Result<String> {
    let inner = &word[2..word.len() - 2];
    let mut parts = inner.splitn(3, '?');
    let _charset = parts
        .next()
        .ok_or_else(|| Error::InvalidEncoding("missing charset".to_string()))?;
    let encoding = parts
        .next()
        .ok_or_else(|| Error::InvalidEncoding("missing encoding".to_string()))?;
    let payload = parts
        .next()
        .ok_or_else(|| Error::InvalidEncoding("missing payload".to_string()))?;

    let bytes = match encoding.to_uppercase().as_str() {
        "B" => decode_base64(payload)?,
        "Q" => decode_quoted_printable(&payload.replace('_', " "))?,
        other => {
            return Err(Error::InvalidEncoding(format!(
                "unknown encoded-word encoding: {other}"
            )));
        }
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
