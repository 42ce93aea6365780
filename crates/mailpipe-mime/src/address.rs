//! RFC 5322 address lists.

use crate::encoding::decode_rfc2047;
use crate::error::{Error, Result};

/// A single mailbox address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name, if one was given.
    pub name: Option<String>,
    /// The `local@domain` address itself.
    pub address: String,
}

impl Address {
    /// Parses a comma-separated address list.
    ///
    /// Accepted forms per entry: `user@example.com`, `<user@example.com>`,
    /// `Display Name <user@example.com>` and `"Quoted Name"
    /// <user@example.com>`. Display names have RFC 2047 words decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry has no parseable address.
    pub fn parse_list(input: &str) -> Result<Vec<Self>> {
        let mut addresses = Vec::new();
        for entry in split_entries(input) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            addresses.push(Self::parse(entry)?);
        }
        Ok(addresses)
    }

    /// Parses a single address entry.
    ///
    /// # Errors
    ///
    /// Returns an error when no address can be extracted.
    pub fn parse(entry: &str) -> Result<Self> {
        if let Some(open) = entry.rfind('<') {
            let close = entry[open..]
                .find('>')
                .map(|i| i + open)
                .ok_or_else(|| Error::InvalidAddress(format!("unclosed angle bracket: {entry}")))?;

            let address = entry[open + 1..close].trim();
            if address.is_empty() {
                return Err(Error::InvalidAddress(format!("empty address: {entry}")));
            }

            let raw_name = entry[..open].trim().trim_matches('"').trim();
            let name = if raw_name.is_empty() {
                None
            } else {
                Some(decode_rfc2047(raw_name)?)
            };

            return Ok(Self {
                name,
                address: address.to_string(),
            });
        }

        if !entry.contains('@') {
            return Err(Error::InvalidAddress(entry.to_string()));
        }

        Ok(Self {
            name: None,
            address: entry.to_string(),
        })
    }
}

impl std::fmt::Display for Address {
    /// Renders the standard display form: `Name <addr>` with the name
    /// quoted when it contains specials, or the bare address.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) if needs_quoting(name) => {
                write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.address)
            }
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}

/// Returns true when a display name cannot stand as a bare phrase.
fn needs_quoting(name: &str) -> bool {
    !name.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c == ' '
            || "!#$%&'*+-/=?^_`{|}~.".contains(c)
    })
}

/// Splits on commas that are outside quoted strings and angle brackets.
fn split_entries(input: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_angle = false;

    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => {
                entries.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&input[start..]);
    entries
}
