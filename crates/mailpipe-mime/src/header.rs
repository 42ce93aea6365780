//! MIME header handling.

use crate::encoding::decode_rfc2047;
use crate::error::Result;
use std::collections::HashMap;

/// Collection of message headers.
///
/// Lookup is case-insensitive; names are normalized to lower case. Values
/// for the same name keep their arrival order, so multi-valued headers
/// (Received, for instance) survive intact.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets all values for a header, in arrival order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns an iterator over `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Parses headers from raw text, unfolding continuation lines.
    ///
    /// Lines without a colon are skipped rather than failing the whole
    /// block; real mail contains enough garbage that strictness here would
    /// reject otherwise usable messages.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current_name: Option<String> = None;
        let mut current_value = String::new();

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                // Continuation of the previous header.
                if current_name.is_some() {
                    current_value.push(' ');
                    current_value.push_str(line.trim());
                }
            } else {
                if let Some(name) = current_name.take() {
                    headers.add(name, current_value.trim().to_string());
                    current_value.clear();
                }
                if let Some((name, value)) = line.split_once(':') {
                    current_name = Some(name.trim().to_string());
                    current_value = value.trim().to_string();
                }
            }
        }

        if let Some(name) = current_name {
            headers.add(name, current_value.trim().to_string());
        }

        headers
    }

    /// Gets the first value for a header with RFC 2047 words decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the value carries a malformed encoded word.
    pub fn get_decoded(&self, name: &str) -> Result<Option<String>> {
        self.get(name).map(decode_rfc2047).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn multi_valued_headers_keep_order() {
        let mut headers = Headers::new();
        headers.add("Received", "from a");
        headers.add("Received", "from b");
        assert_eq!(headers.get_all("received"), vec!["from a", "from b"]);
        assert_eq!(headers.get("received"), Some("from a"));
    }

    #[test]
    fn parse_with_continuation() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "body is not parsed here\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("from"), Some("sender@example.com"));
        assert_eq!(
            headers.get("content-type"),
            Some("text/plain; charset=utf-8")
        );
        assert!(headers.get("body").is_none());
    }

    #[test]
    fn parse_skips_garbage_lines() {
        let headers = Headers::parse("not a header line\r\nSubject: ok\r\n\r\n");
        assert_eq!(headers.get("subject"), Some("ok"));
    }

    #[test]
    fn decoded_subject() {
        let mut headers = Headers::new();
        headers.add("Subject", "=?utf-8?B?SMOpbGxv?=");
        assert_eq!(
            headers.get_decoded("subject").unwrap(),
            Some("Héllo".to_string())
        );
    }

    #[test]
    fn iter_exposes_every_value() {
        let mut headers = Headers::new();
        headers.add("X-One", "1");
        headers.add("X-Two", "2a");
        headers.add("X-Two", "2b");

        let total: usize = headers.iter().map(|(_, v)| v.len()).sum();
        assert_eq!(total, 3);
    }
}
