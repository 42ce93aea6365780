//! IMAP response parser.
//!
//! Parses complete server responses (a line plus any embedded literals)
//! into structured values. The grammar subset follows RFC 9051 for the
//! responses this client can receive: status responses with codes,
//! CAPABILITY, FLAGS, the numeric EXISTS/RECENT/EXPUNGE/FETCH family and
//! continuation requests.

#![allow(clippy::missing_errors_doc)]

mod lexer;
mod types;

pub use lexer::{Lexer, Token};
pub use types::{FetchItem, UntaggedResponse};

use crate::types::{Capability, Flag, ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text after the `+`.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => {
                let text = match lexer.next_token()? {
                    Token::Space => Some(lexer.rest_of_line()),
                    _ => None,
                };
                Ok(Response::Continuation { text })
            }
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("expected *, + or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;
        let status = Self::parse_status(lexer)?;
        let (code, text) = Self::parse_resp_text(lexer)?;

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        match lexer.next_token()? {
            Token::Atom(word) => {
                let upper = word.to_uppercase();
                let untagged = match upper.as_str() {
                    "OK" => {
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Ok { code, text }
                    }
                    "NO" => {
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::No { code, text }
                    }
                    "BAD" => {
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Bad { code, text }
                    }
                    "PREAUTH" => {
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::PreAuth { code, text }
                    }
                    "BYE" => {
                        let (code, text) = Self::parse_resp_text(lexer)?;
                        UntaggedResponse::Bye { code, text }
                    }
                    "CAPABILITY" => UntaggedResponse::Capability(Self::parse_capabilities(lexer)?),
                    "FLAGS" => {
                        lexer.expect_space()?;
                        UntaggedResponse::Flags(Self::parse_flag_list(lexer)?)
                    }
                    _ => {
                        return Err(lexer.error(&format!("unrecognized untagged response {word}")));
                    }
                };
                Ok(Response::Untagged(untagged))
            }
            Token::Number(n) => {
                lexer.expect_space()?;
                let word = match lexer.next_token()? {
                    Token::Atom(s) => s.to_uppercase(),
                    token => return Err(lexer.error(&format!("expected atom, got {token:?}"))),
                };
                let untagged = match word.as_str() {
                    "EXISTS" => UntaggedResponse::Exists(n),
                    "RECENT" => UntaggedResponse::Recent(n),
                    "EXPUNGE" => {
                        let seq = SeqNum::new(n)
                            .ok_or_else(|| lexer.error("EXPUNGE with sequence number 0"))?;
                        UntaggedResponse::Expunge(seq)
                    }
                    "FETCH" => {
                        let seq = SeqNum::new(n)
                            .ok_or_else(|| lexer.error("FETCH with sequence number 0"))?;
                        lexer.expect_space()?;
                        let items = Self::parse_fetch_items(lexer)?;
                        UntaggedResponse::Fetch { seq, items }
                    }
                    _ => return Err(lexer.error(&format!("unrecognized numeric response {word}"))),
                };
                Ok(Response::Untagged(untagged))
            }
            token => Err(lexer.error(&format!("unexpected token {token:?}"))),
        }
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        match lexer.next_token()? {
            Token::Atom(s) => match s.to_uppercase().as_str() {
                "OK" => Ok(Status::Ok),
                "NO" => Ok(Status::No),
                "BAD" => Ok(Status::Bad),
                "BYE" => Ok(Status::Bye),
                "PREAUTH" => Ok(Status::PreAuth),
                other => Err(lexer.error(&format!("unknown status {other}"))),
            },
            token => Err(lexer.error(&format!("expected status, got {token:?}"))),
        }
    }

    /// Parses `resp-text`: an optional bracketed code followed by free text.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        // Status responses may end right after the status word.
        if lexer.peek().is_none() || lexer.peek() == Some(b'\r') {
            let _ = lexer.rest_of_line();
            return Ok((None, String::new()));
        }
        lexer.expect_space()?;

        let code = if lexer.peek() == Some(b'[') {
            let _ = lexer.next_token()?; // consume [
            let code = Self::parse_response_code(lexer)?;
            if lexer.peek() == Some(b' ') {
                lexer.expect_space()?;
            }
            Some(code)
        } else {
            None
        };

        Ok((code, lexer.rest_of_line()))
    }

    fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
        let word = match lexer.next_token()? {
            Token::Atom(s) => s.to_uppercase(),
            token => return Err(lexer.error(&format!("expected code atom, got {token:?}"))),
        };

        let code = match word.as_str() {
            "ALERT" => ResponseCode::Alert,
            "READ-ONLY" => ResponseCode::ReadOnly,
            "READ-WRITE" => ResponseCode::ReadWrite,
            "CAPABILITY" => {
                let mut caps = Vec::new();
                loop {
                    match lexer.next_token()? {
                        Token::Space => {}
                        Token::Atom(s) => caps.push(Capability::parse(s)),
                        Token::RBracket => return Ok(ResponseCode::Capability(caps)),
                        token => {
                            return Err(lexer.error(&format!("bad capability token {token:?}")));
                        }
                    }
                }
            }
            "PERMANENTFLAGS" => {
                lexer.expect_space()?;
                let flags = Self::parse_flag_list(lexer)?;
                ResponseCode::PermanentFlags(flags)
            }
            "UIDNEXT" => {
                lexer.expect_space()?;
                ResponseCode::UidNext(lexer.read_number()?)
            }
            "UIDVALIDITY" => {
                lexer.expect_space()?;
                ResponseCode::UidValidity(lexer.read_number()?)
            }
            "UNSEEN" => {
                lexer.expect_space()?;
                let n = lexer.read_number()?;
                let seq = SeqNum::new(n).ok_or_else(|| lexer.error("UNSEEN 0"))?;
                ResponseCode::Unseen(seq)
            }
            _ => {
                // Swallow the unknown code's arguments up to the bracket.
                loop {
                    match lexer.next_token()? {
                        Token::RBracket => return Ok(ResponseCode::Unknown(word)),
                        Token::Crlf | Token::Eof => {
                            return Err(lexer.error("unterminated response code"));
                        }
                        _ => {}
                    }
                }
            }
        };

        match lexer.next_token()? {
            Token::RBracket => Ok(code),
            token => Err(lexer.error(&format!("expected ], got {token:?}"))),
        }
    }

    fn parse_capabilities(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
        let mut caps = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::Space => {}
                Token::Atom(s) => caps.push(Capability::parse(s)),
                Token::Crlf | Token::Eof => return Ok(caps),
                token => return Err(lexer.error(&format!("bad capability token {token:?}"))),
            }
        }
    }

    /// Parses a parenthesized flag list.
    fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Vec<Flag>> {
        match lexer.next_token()? {
            Token::LParen => {}
            token => return Err(lexer.error(&format!("expected (, got {token:?}"))),
        }

        let mut flags = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::RParen => return Ok(flags),
                Token::Space => {}
                Token::Atom(s) => flags.push(Flag::parse(s)),
                token => return Err(lexer.error(&format!("bad flag token {token:?}"))),
            }
        }
    }

    /// Parses the parenthesized item list of a FETCH response.
    fn parse_fetch_items(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
        match lexer.next_token()? {
            Token::LParen => {}
            token => return Err(lexer.error(&format!("expected (, got {token:?}"))),
        }

        let mut items = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::RParen => return Ok(items),
                Token::Space => {}
                Token::Atom(name) => match name.to_uppercase().as_str() {
                    "FLAGS" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::Flags(Self::parse_flag_list(lexer)?));
                    }
                    "UID" => {
                        lexer.expect_space()?;
                        items.push(FetchItem::Uid(lexer.read_number()?));
                    }
                    "BODY" | "RFC822" => {
                        let section = Self::parse_body_section(lexer)?;
                        lexer.expect_space()?;
                        let data = match lexer.next_token()? {
                            Token::Literal(d) => Some(d),
                            Token::QuotedString(s) => Some(s.into_bytes()),
                            Token::Nil => None,
                            token => {
                                return Err(lexer.error(&format!("bad body payload {token:?}")));
                            }
                        };
                        items.push(FetchItem::Body { section, data });
                    }
                    // Items this client never requested; skip their value.
                    _ => Self::skip_fetch_value(lexer)?,
                },
                token => return Err(lexer.error(&format!("bad fetch token {token:?}"))),
            }
        }
    }

    /// Parses an optional `[section]` after BODY.
    fn parse_body_section(lexer: &mut Lexer<'_>) -> Result<String> {
        if lexer.peek() != Some(b'[') {
            return Ok(String::new());
        }
        let _ = lexer.next_token()?; // consume [

        let mut section = String::new();
        loop {
            match lexer.next_token()? {
                Token::RBracket => return Ok(section),
                Token::Atom(s) => section.push_str(s),
                Token::Number(n) => section.push_str(&n.to_string()),
                Token::Space => section.push(' '),
                token => return Err(lexer.error(&format!("bad body section {token:?}"))),
            }
        }
    }

    /// Skips the value of an uninterpreted fetch item.
    fn skip_fetch_value(lexer: &mut Lexer<'_>) -> Result<()> {
        lexer.expect_space()?;
        let mut depth = 0usize;
        loop {
            match lexer.next_token()? {
                Token::LParen => depth += 1,
                Token::RParen => {
                    if depth == 0 {
                        return Err(lexer.error("unbalanced parenthesis in fetch item"));
                    }
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Token::Crlf | Token::Eof => return Err(lexer.error("truncated fetch item")),
                _ if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }
}
