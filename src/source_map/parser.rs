//! Position-tracking JSON parser.
//!
//! Parses JSON text into a [`Spanned`] tree that remembers where every value,
//! object member and array element sits in the source. Lines and columns are
//! 1-indexed; columns count characters, not bytes.

use std::fmt;

/// Nesting deeper than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 512;

/// Inclusive source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

/// A parsed JSON value with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub value: SpannedValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpannedValue {
    Null,
    Bool(bool),
    /// The number's source text, kept verbatim.
    Number(String),
    String(String),
    Array(Vec<Spanned>),
    Object(Vec<Member>),
}

/// An object member. Its `span` runs from the key's opening quote to the end
/// of the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub span: Span,
    pub value: Spanned,
}

impl Spanned {
    /// Descend one path segment: an object member by key (last duplicate
    /// wins) or an array element by decimal index.
    pub fn get(&self, segment: &str) -> Option<&Spanned> {
        match &self.value {
            SpannedValue::Object(members) => members
                .iter()
                .rev()
                .find(|m| m.key == segment)
                .map(|m| &m.value),
            SpannedValue::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// The recorded position of the child named by `segment`.
    pub fn position(&self, segment: &str) -> Option<Span> {
        match &self.value {
            SpannedValue::Object(members) => members
                .iter()
                .rev()
                .find(|m| m.key == segment)
                .map(|m| m.span),
            SpannedValue::Array(items) => items
                .get(segment.parse::<usize>().ok()?)
                .map(|item| item.span),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse `text` as a single JSON value.
pub fn parse(text: &str) -> Result<Spanned, ParseError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    // Position of the most recently consumed character.
    prev_line: usize,
    prev_column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            prev_line: 1,
            prev_column: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl fmt::Display) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        // UTF-8 continuation bytes belong to the previous character.
        if byte & 0xC0 == 0x80 {
            return Some(byte);
        }
        self.prev_line = self.line;
        self.prev_column = self.column;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), ParseError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.bump();
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            ))),
            None => Err(self.error(format!("expected '{}', found end of input", expected as char))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }

    fn start(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn span_from(&self, (first_line, first_column): (usize, usize)) -> Span {
        Span {
            first_line,
            first_column,
            last_line: self.prev_line,
            last_column: self.prev_column,
        }
    }

    fn parse_value(&mut self) -> Result<Spanned, ParseError> {
        let start = self.start();
        let value = match self.peek() {
            Some(b'{') => self.nested(Self::parse_object)?,
            Some(b'[') => self.nested(Self::parse_array)?,
            Some(b'"') => SpannedValue::String(self.parse_string()?),
            Some(b't') => self.parse_literal("true", SpannedValue::Bool(true))?,
            Some(b'f') => self.parse_literal("false", SpannedValue::Bool(false))?,
            Some(b'n') => self.parse_literal("null", SpannedValue::Null)?,
            Some(b'-' | b'0'..=b'9') => SpannedValue::Number(self.parse_number()?),
            Some(b) => return Err(self.error(format!("unexpected character '{}'", b as char))),
            None => return Err(self.error("unexpected end of input")),
        };
        Ok(Spanned {
            value,
            span: self.span_from(start),
        })
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<SpannedValue, ParseError>,
    ) -> Result<SpannedValue, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_object(&mut self) -> Result<SpannedValue, ParseError> {
        self.expect(b'{')?;
        let mut members = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(SpannedValue::Object(members));
        }
        loop {
            self.skip_whitespace();
            let start = self.start();
            if self.peek() != Some(b'"') {
                return Err(self.error("expected string key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            members.push(Member {
                key,
                span: self.span_from(start),
                value,
            });
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b'}') => return Ok(SpannedValue::Object(members)),
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<SpannedValue, ParseError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.bump();
            return Ok(SpannedValue::Array(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => return Ok(SpannedValue::Array(items)),
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
    }

    fn parse_literal(&mut self, word: &str, value: SpannedValue) -> Result<SpannedValue, ParseError> {
        if !self.bytes[self.pos..].starts_with(word.as_bytes()) {
            return Err(self.error(format!("invalid literal, expected '{word}'")));
        }
        for _ in 0..word.len() {
            self.bump();
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<String, ParseError> {
        let begin = self.pos;
        if self.peek() == Some(b'-') {
            self.bump();
        }
        match self.peek() {
            Some(b'0') => {
                self.bump();
            }
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.error("invalid number")),
        }
        if self.peek() == Some(b'.') {
            self.bump();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expected digit after decimal point"));
            }
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expected digit in exponent"));
            }
            self.digits();
        }
        Ok(String::from_utf8_lossy(&self.bytes[begin..self.pos]).into_owned())
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect(b'"')?;
        let mut buf = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => {
                    let c = self.parse_escape()?;
                    let mut utf8 = [0u8; 4];
                    buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
                Some(b) if b < 0x20 => return Err(self.error("control character in string")),
                Some(b) => buf.push(b),
            }
        }
        // The input is a &str and escapes are re-encoded, so the buffer is UTF-8.
        String::from_utf8(buf).map_err(|e| self.error(e))
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let c = match self.bump() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{0008}',
            Some(b'f') => '\u{000C}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                let high = self.hex4()?;
                if (0xD800..0xDC00).contains(&high) {
                    self.expect(b'\\')?;
                    self.expect(b'u')?;
                    let low = self.hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error("invalid low surrogate"));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair"))?
                } else {
                    char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"))?
                }
            }
            _ => return Err(self.error("invalid escape sequence")),
        };
        Ok(c)
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|b| (b as char).to_digit(16))
                .ok_or_else(|| self.error("invalid hex digit in unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }
}
