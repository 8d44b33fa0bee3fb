//! Reader/writer for the nested labelled-section token stream format used to
//! save and restore automata and grammars (`spec.md` §6.1).
//!
//! A stream is a sequence of elements: `<Name attr="value" ...>` opens a
//! section, `</Name>` closes it, `<Name attr="value"/>` is self-closing, and
//! the text between an open and close tag is a sequence of whitespace- or
//! quote-delimited words, each either a quoted string, a decimal or
//! `0x`-prefixed integer, or a bare identifier. `Location`/`TokenError`
//! follow the teacher's `cranelift-reader` lexer: every error carries the
//! 1-based line it was found on, and the `err!` macro builds one inline.

use std::fmt;

/// The line a token or error came from. Line 0 is reserved for
/// command-line-argument-derived errors that have no file position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line_number: usize,
}

#[derive(Debug)]
pub struct TokenError {
    pub location: Location,
    pub message: String,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.location.line_number == 0 {
            write!(f, "token stream: {}", self.message)
        } else {
            write!(f, "line {}: {}", self.location.line_number, self.message)
        }
    }
}

impl std::error::Error for TokenError {}

pub type TokenResult<T> = Result<T, TokenError>;

macro_rules! err {
    ( $loc:expr, $msg:expr ) => {
        Err($crate::tokens::TokenError {
            location: $loc,
            message: $msg.to_string(),
        })
    };
    ( $loc:expr, $fmt:expr, $( $arg:expr ),+ ) => {
        Err($crate::tokens::TokenError {
            location: $loc,
            message: format!( $fmt, $( $arg ),+ ),
        })
    };
}

/// One lexical unit: a bare word between tags, or a tag boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A quoted string, with quotes stripped.
    Str(String),
    /// A decimal or `0x`-prefixed integer.
    Int(i64),
    /// A bare identifier (anything else word-shaped).
    Ident(String),
    /// `<Name attr="value" ...>` (not self-closing).
    BeginSection { name: String, attrs: Vec<(String, String)> },
    /// `</Name>`.
    EndSection(String),
    /// `<Name attr="value" .../>`, reported as begin immediately followed by
    /// end so callers don't need a separate self-closing case.
    SelfClosing { name: String, attrs: Vec<(String, String)> },
}

/// A located token, as produced by [`lex`].
#[derive(Debug, Clone)]
pub struct Located {
    pub token: Token,
    pub location: Location,
}

/// Tokenize an entire token stream. Scans line by line so every token can be
/// blamed on its source line in error messages.
pub fn lex(input: &str) -> TokenResult<Vec<Located>> {
    let mut out = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let location = Location { line_number: idx + 1 };
        lex_line(line, location, &mut out)?;
    }
    Ok(out)
}

fn lex_line(line: &str, location: Location, out: &mut Vec<Located>) -> TokenResult<()> {
    let mut chars = line.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '<' {
            let rest = &line[i..];
            let end = rest.find('>').ok_or_else(|| TokenError {
                location,
                message: format!("unterminated tag: {rest}"),
            })?;
            let tag = &rest[1..end];
            out.push(Located {
                token: parse_tag(tag, location)?,
                location,
            });
            for _ in 0..=end {
                chars.next();
            }
            continue;
        }
        if c == '"' {
            chars.next();
            let mut s = String::new();
            let mut closed = false;
            for (_, ch) in chars.by_ref() {
                if ch == '"' {
                    closed = true;
                    break;
                }
                s.push(ch);
            }
            if !closed {
                return err!(location, "unterminated quoted string");
            }
            out.push(Located {
                token: Token::Str(s),
                location,
            });
            continue;
        }
        // bare word: identifier or integer, up to next whitespace/`<`/`"`.
        let mut word = String::new();
        while let Some(&(_, ch)) = chars.peek() {
            if ch.is_whitespace() || ch == '<' || ch == '"' {
                break;
            }
            word.push(ch);
            chars.next();
        }
        out.push(Located {
            token: parse_word(&word, location)?,
            location,
        });
    }
    Ok(())
}

fn parse_word(word: &str, location: Location) -> TokenResult<Token> {
    if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .map(Token::Int)
            .or_else(|_| err!(location, "malformed hex integer: {}", word));
    }
    if let Ok(n) = word.parse::<i64>() {
        return Ok(Token::Int(n));
    }
    Ok(Token::Ident(word.to_string()))
}

fn parse_tag(tag: &str, location: Location) -> TokenResult<Token> {
    let (tag, self_closing) = match tag.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (tag, false),
    };
    if let Some(name) = tag.strip_prefix('/') {
        if self_closing {
            return err!(location, "malformed tag: </{}/", name);
        }
        return Ok(Token::EndSection(name.trim().to_string()));
    }

    let mut parts = tag.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_string();
    if name.is_empty() {
        return err!(location, "empty tag name");
    }
    let attrs = parts.next().map(|rest| parse_attrs(rest, location)).transpose()?.unwrap_or_default();

    if self_closing {
        Ok(Token::SelfClosing { name, attrs })
    } else {
        Ok(Token::BeginSection { name, attrs })
    }
}

fn parse_attrs(rest: &str, location: Location) -> TokenResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut chars = rest.char_indices().peekable();
    loop {
        while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let Some(&(start, _)) = chars.peek() else {
            break;
        };
        let mut key_end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == '=' {
                break;
            }
            key_end = i + c.len_utf8();
            chars.next();
        }
        let key = rest[start..key_end].trim().to_string();
        match chars.next() {
            Some((_, '=')) => {}
            _ => return err!(location, "attribute `{}` missing `=value`", key),
        }
        match chars.next() {
            Some((_, '"')) => {}
            _ => return err!(location, "attribute `{}` value must be quoted", key),
        }
        let mut value = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if c == '"' {
                closed = true;
                break;
            }
            value.push(c);
        }
        if !closed {
            return err!(location, "unterminated attribute value for `{}`", key);
        }
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Parse a `<Flags value="0x..">` self-closing element already recognized
/// as [`Token::SelfClosing`] into its raw bit word (`spec.md` §6.2).
pub fn flags_value(attrs: &[(String, String)], location: Location) -> TokenResult<u32> {
    let raw = attrs
        .iter()
        .find(|(k, _)| k == "value")
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| TokenError {
            location,
            message: "<Flags> element missing `value` attribute".to_string(),
        })?;
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    u32::from_str_radix(hex, 16).or_else(|_| err!(location, "malformed flags value: {}", raw))
}

/// Decode a Base64 `DataFile`/`ImageFile` blob body into raw bytes. desflow
/// treats the bytes as opaque — interpreting them is `flxinstall`'s job.
pub fn decode_blob(body: &str, location: Location) -> TokenResult<Vec<u8>> {
    use base64::Engine;
    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| TokenError {
            location,
            message: format!("malformed base64 blob: {e}"),
        })
}

/// Encode raw bytes as a Base64 `DataFile`/`ImageFile` blob body.
pub fn encode_blob(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Incrementally builds a token stream, mirroring [`lex`]'s grammar.
#[derive(Default)]
pub struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    pub fn begin_section(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.write_indent();
        self.out.push('<');
        self.out.push_str(name);
        for (k, v) in attrs {
            self.out.push(' ');
            self.out.push_str(k);
            self.out.push_str("=\"");
            self.out.push_str(v);
            self.out.push('"');
        }
        self.out.push_str(">\n");
        self.indent += 1;
    }

    pub fn end_section(&mut self, name: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.write_indent();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    pub fn self_closing(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.write_indent();
        self.out.push('<');
        self.out.push_str(name);
        for (k, v) in attrs {
            self.out.push(' ');
            self.out.push_str(k);
            self.out.push_str("=\"");
            self.out.push_str(v);
            self.out.push('"');
        }
        self.out.push_str("/>\n");
    }

    pub fn word(&mut self, s: &str) {
        self.write_indent();
        self.out.push_str(s);
        self.out.push('\n');
    }

    pub fn quoted(&mut self, s: &str) {
        self.write_indent();
        self.out.push('"');
        self.out.push_str(s);
        self.out.push('"');
        self.out.push('\n');
    }

    pub fn flags(&mut self, bits: u32) {
        self.self_closing("Flags", &[("value", &format!("0x{bits:02x}"))]);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_section_with_attrs_and_words() {
        let input = "<Generator name=\"g\">\n  q0 q1 0x0a\n</Generator>\n";
        let tokens = lex(input).unwrap();
        assert!(matches!(
            &tokens[0].token,
            Token::BeginSection { name, attrs } if name == "Generator" && attrs == &[("name".to_string(), "g".to_string())]
        ));
        assert_eq!(tokens[1].token, Token::Ident("q0".to_string()));
        assert_eq!(tokens[2].token, Token::Ident("q1".to_string()));
        assert_eq!(tokens[3].token, Token::Int(10));
        assert!(matches!(&tokens[4].token, Token::EndSection(name) if name == "Generator"));
    }

    #[test]
    fn self_closing_flags_element() {
        let tokens = lex("<Flags value=\"0x0a\"/>\n").unwrap();
        let Token::SelfClosing { name, attrs } = &tokens[0].token else {
            panic!("expected self-closing element");
        };
        assert_eq!(name, "Flags");
        assert_eq!(flags_value(attrs, tokens[0].location).unwrap(), 0x0a);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(lex("\"oops\n").is_err());
    }

    #[test]
    fn blob_round_trips_through_base64() {
        let bytes = vec![0u8, 1, 2, 255, 254];
        let encoded = encode_blob(&bytes);
        let decoded = decode_blob(&encoded, Location::default()).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn writer_round_trip_lexes_back() {
        let mut w = Writer::new();
        w.begin_section("Generator", &[("name", "g")]);
        w.word("q0");
        w.flags(0x0a);
        w.end_section("Generator");
        let text = w.finish();
        let tokens = lex(&text).unwrap();
        assert_eq!(tokens.len(), 4);
    }
}
