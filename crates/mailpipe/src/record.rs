//! The normalized message record handed to the template.
//!
//! Field names serialize in PascalCase; that is the data contract the
//! template language sees (`Header.From`, `Body`, `Attachment`, ...).

use std::collections::HashMap;

use serde::Serialize;

/// Envelope headers of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    /// From addresses in display form, order preserved.
    pub from: Vec<String>,
    /// To addresses in display form, order preserved.
    pub to: Vec<String>,
    /// Message date as RFC 3339 text; capture time when the message's own
    /// date is missing or unparseable.
    pub date: String,
    /// Subject; empty when absent or undecodable.
    pub subject: String,
    /// Every header as raw values, multi-valued headers preserved in
    /// arrival order.
    pub map: HashMap<String, Vec<String>>,
}

/// One attachment of a message.
///
/// `content` is always empty: attachment bytes are deliberately never
/// buffered, only the declared name travels with the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    /// Declared filename; empty when undeclared or undecodable.
    pub name: String,
    /// Always empty.
    pub content: String,
}

/// The normalized record for one fetched message.
///
/// Built completely before rendering and immutable afterwards; records are
/// transient and dropped once rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    /// Capture timestamp, independent of `header.date`.
    pub date: String,
    /// Envelope headers.
    pub header: Header,
    /// One entry per inline MIME part, declaration order; a part that
    /// failed to read contributes an empty string.
    pub body: Vec<String>,
    /// One entry per attachment part, declaration order.
    pub attachment: Vec<Attachment>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_names() {
        let message = Message {
            date: "2024-01-01T00:00:00Z".to_string(),
            header: Header {
                from: vec!["<a@example.com>".to_string()],
                subject: "hi".to_string(),
                ..Default::default()
            },
            body: vec!["text".to_string()],
            attachment: vec![Attachment {
                name: "x.pdf".to_string(),
                content: String::new(),
            }],
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["Header"]["Subject"], "hi");
        assert_eq!(value["Header"]["From"][0], "<a@example.com>");
        assert_eq!(value["Body"][0], "text");
        assert_eq!(value["Attachment"][0]["Name"], "x.pdf");
        assert_eq!(value["Attachment"][0]["Content"], "");
    }
}
