//! MIME message structure: header/body split, multipart walking and part
//! classification.

use crate::content_type::{ContentType, Disposition};
use crate::encoding::{decode_base64, decode_quoted_printable, decode_rfc2047};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Maximum multipart nesting depth accepted before the structure is
/// treated as malformed.
const MAX_DEPTH: usize = 8;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses a transfer encoding token, defaulting to 7-bit.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// How a body part is meant to be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// Part of the displayed message body.
    Inline,
    /// A named attachment.
    Attachment,
}

/// One leaf part of a message.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers (for a single-part message, the message headers).
    pub headers: Headers,
    /// Raw part body, still transfer-encoded.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Gets the content type, defaulting to `text/plain` when absent or
    /// malformed.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Classifies the part from its content disposition.
    ///
    /// Anything that does not explicitly declare itself an attachment is
    /// inline.
    #[must_use]
    pub fn kind(&self) -> PartKind {
        let is_attachment = self
            .headers
            .get("content-disposition")
            .is_some_and(|v| Disposition::parse(v).is_attachment());
        if is_attachment {
            PartKind::Attachment
        } else {
            PartKind::Inline
        }
    }

    /// Returns the declared filename with RFC 2047 words decoded.
    ///
    /// Looks at the disposition's `filename` first, then the content
    /// type's `name` parameter. `None` when neither declares one.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared name carries a malformed encoded
    /// word.
    pub fn filename(&self) -> Result<Option<String>> {
        let declared = self
            .headers
            .get("content-disposition")
            .and_then(|v| Disposition::parse(v).filename().map(str::to_string))
            .or_else(|| self.content_type().name().map(str::to_string));

        declared.map(|name| decode_rfc2047(&name)).transpose()
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer encoding data is invalid.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => {
                let body_str = String::from_utf8_lossy(&self.body);
                let cleaned: String = body_str.chars().filter(|c| !c.is_whitespace()).collect();
                decode_base64(&cleaned)
            }
            TransferEncoding::QuotedPrintable => {
                decode_quoted_printable(&String::from_utf8_lossy(&self.body))
            }
            _ => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as text (lossy UTF-8).
    ///
    /// # Errors
    ///
    /// Returns an error if transfer decoding fails.
    pub fn body_text(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.decode_body()?).into_owned())
    }
}

/// A parsed MIME message: top-level headers plus its leaf parts in
/// declaration order.
///
/// Multipart containers are walked recursively; only leaves appear in
/// `parts`. A non-multipart message contributes exactly one part carrying
/// the message headers.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Leaf parts in declaration order.
    pub parts: Vec<Part>,
}

impl Message {
    /// Parses a raw RFC 5322 message.
    ///
    /// Header fields degrade individually (garbage lines are skipped, a
    /// malformed content type falls back to `text/plain`); only a broken
    /// part structure is an error: a multipart without a boundary
    /// parameter, a boundary that never appears, a missing closing
    /// boundary, or absurd nesting.
    ///
    /// # Errors
    ///
    /// Returns an error on a structurally invalid multipart tree.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (header_bytes, body) = split_header_body(raw);
        let headers = Headers::parse(&String::from_utf8_lossy(header_bytes));

        let mut parts = Vec::new();
        collect_parts(&headers, body, &mut parts, 0)?;

        Ok(Self { headers, parts })
    }

    /// Gets the raw From header, if present.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the raw To header, if present.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the subject with RFC 2047 words decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject carries a malformed encoded word.
    pub fn subject(&self) -> Result<Option<String>> {
        self.headers.get_decoded("subject")
    }

    /// Gets the raw Date header, if present.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }
}

/// Splits a raw message at the first blank line.
fn split_header_body(raw: &[u8]) -> (&[u8], &[u8]) {
    if let Some(pos) = find(raw, b"\r\n\r\n") {
        (&raw[..pos + 2], &raw[pos + 4..])
    } else if let Some(pos) = find(raw, b"\n\n") {
        (&raw[..pos + 1], &raw[pos + 2..])
    } else {
        (raw, &[])
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Recursively walks a (possibly multipart) body, appending leaf parts in
/// declaration order.
fn collect_parts(
    headers: &Headers,
    body: &[u8],
    parts: &mut Vec<Part>,
    depth: usize,
) -> Result<()> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| ContentType::parse(v).ok())
        .unwrap_or_else(ContentType::text_plain);

    if !content_type.is_multipart() {
        parts.push(Part::new(headers.clone(), body.to_vec()));
        return Ok(());
    }

    if depth >= MAX_DEPTH {
        return Err(Error::InvalidMultipart(format!(
            "nesting deeper than {MAX_DEPTH} levels"
        )));
    }

    let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
    for section in split_multipart(body, boundary)? {
        let (header_bytes, section_body) = split_header_body(section);
        let section_headers = Headers::parse(&String::from_utf8_lossy(header_bytes));
        collect_parts(&section_headers, section_body, parts, depth + 1)?;
    }

    Ok(())
}

/// Splits a multipart body into its raw sections, dropping preamble and
/// epilogue.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>> {
    let delimiter = format!("--{boundary}");
    let closing = format!("--{boundary}--");

    let mut sections = Vec::new();
    let mut current_start: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = find(&body[pos..], b"\n").map_or(body.len(), |i| pos + i + 1);
        let line = trim_line(&body[pos..line_end]);

        if line == closing.as_bytes() {
            if let Some(start) = current_start {
                sections.push(section_slice(body, start, pos));
            }
            return Ok(sections);
        }
        if line == delimiter.as_bytes() {
            if let Some(start) = current_start {
                sections.push(section_slice(body, start, pos));
            }
            current_start = Some(line_end);
        }

        pos = line_end;
    }

    if current_start.is_none() {
        return Err(Error::InvalidMultipart(format!(
            "boundary {boundary:?} not found"
        )));
    }
    Err(Error::InvalidMultipart(
        "missing closing boundary".to_string(),
    ))
}

/// Strips the line terminator and transport padding for comparison.
fn trim_line(line: &[u8]) -> &[u8] {
    let mut line = line;
    while let Some((&last, rest)) = line.split_last() {
        if matches!(last, b'\r' | b'\n' | b' ' | b'\t') {
            line = rest;
        } else {
            break;
        }
    }
    line
}

/// A section spans from `start` to the line before `delimiter_start`,
/// excluding the CRLF that belongs to the delimiter line.
fn section_slice(body: &[u8], start: usize, delimiter_start: usize) -> &[u8] {
    let mut end = delimiter_start;
    if end > start && body[end - 1] == b'\n' {
        end -= 1;
        if end > start && body[end - 1] == b'\r' {
            end -= 1;
        }
    }
    &body[start..end]
}
