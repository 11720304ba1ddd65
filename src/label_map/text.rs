//! Protobuf text-format reader for label maps.
//!
//! Only the `StringIntLabelMap` schema is understood:
//!
//! ```text
//! # comment
//! item {
//!   id: 1
//!   name: 'face'
//!   display_name: "face"
//! }
//! ```
//!
//! Message values may use `{}` or `<>`; the colon before a message value is
//! optional. Integers follow C literal rules (`0x1f` hex, `017` octal).
//! Scalars repeated within one item keep the last value.

use std::fmt;

use super::{LabelMap, LabelMapEntry};

/// A syntax or schema error in a text-format label map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFormatError {
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column of the offending token.
    pub column: usize,
    pub message: String,
}

impl fmt::Display for TextFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for TextFormatError {}

/// Parses a text-format label map.
pub(super) fn parse(input: &str) -> Result<LabelMap, TextFormatError> {
    Parser::new(input).parse_label_map()
}

/// Fuzz-only entrypoint for text-format parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_text(input: &str) -> Result<(), TextFormatError> {
    let _ = parse(input)?;
    Ok(())
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse_label_map(&mut self) -> Result<LabelMap, TextFormatError> {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }

            let start = self.pos;
            let field = self.expect_ident()?;
            if field != "item" {
                return Err(self.error_at(
                    start,
                    format!("message StringIntLabelMap has no field named '{}'", field),
                ));
            }

            self.skip_whitespace();
            self.eat(':');
            let close = self.expect_open()?;
            items.push(self.parse_item(close)?);
            self.skip_separator();
        }

        Ok(LabelMap { items })
    }

    fn parse_item(&mut self, close: char) -> Result<LabelMapEntry, TextFormatError> {
        let mut id = None;
        let mut name = None;
        let mut display_name = None;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                None => {
                    return Err(self.error(format!("expected '{}', found end of input", close)));
                }
                Some(_) => {}
            }

            let start = self.pos;
            let field = self.expect_ident()?;
            match field.as_str() {
                "id" => {
                    self.expect_colon()?;
                    id = Some(self.parse_int32()?);
                }
                "name" => {
                    self.expect_colon()?;
                    name = Some(self.parse_string()?);
                }
                "display_name" => {
                    self.expect_colon()?;
                    display_name = Some(self.parse_string()?);
                }
                other => {
                    return Err(self.error_at(
                        start,
                        format!(
                            "message StringIntLabelMapItem has no field named '{}'",
                            other
                        ),
                    ));
                }
            }
            self.skip_separator();
        }

        Ok(LabelMapEntry {
            id: id.unwrap_or_default(),
            name: name.unwrap_or_default(),
            display_name,
        })
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    fn expect_ident(&mut self) -> Result<String, TextFormatError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(c) => return Err(self.error(format!("expected identifier, found '{}'", c))),
            None => return Err(self.error("expected identifier, found end of input")),
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn expect_colon(&mut self) -> Result<(), TextFormatError> {
        self.skip_whitespace();
        if self.eat(':') {
            Ok(())
        } else {
            Err(self.error("expected ':'"))
        }
    }

    fn expect_open(&mut self) -> Result<char, TextFormatError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                Ok('}')
            }
            Some('<') => {
                self.pos += 1;
                Ok('>')
            }
            _ => Err(self.error("expected '{' or '<'")),
        }
    }

    fn parse_int32(&mut self) -> Result<i32, TextFormatError> {
        self.skip_whitespace();
        let start = self.pos;

        let negative = if self.eat('-') {
            true
        } else {
            self.eat('+');
            false
        };

        // `0x` is hex; any other leading zero is octal.
        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => {
                self.pos += 2;
                16
            }
            (Some('0'), Some(c)) if c.is_ascii_digit() => 8,
            _ => 10,
        };

        let digits_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_digit(radix)) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(self.error_at(start, "expected integer"));
        }
        if matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(self.error_at(start, "expected integer"));
        }

        let digits: String = self.chars[digits_start..self.pos].iter().collect();
        let magnitude = i64::from_str_radix(&digits, radix)
            .map_err(|_| self.error_at(start, "integer out of range for int32"))?;
        let value = if negative { -magnitude } else { magnitude };

        i32::try_from(value).map_err(|_| self.error_at(start, "integer out of range for int32"))
    }

    /// Parses one or more adjacent string literals and concatenates them.
    fn parse_string(&mut self) -> Result<String, TextFormatError> {
        self.skip_whitespace();
        let start = self.pos;
        if !matches!(self.peek(), Some('\'' | '"')) {
            return Err(self.error("expected string"));
        }

        let mut bytes = Vec::new();
        while let Some(quote @ ('\'' | '"')) = self.peek() {
            self.pos += 1;
            self.parse_string_body(quote, &mut bytes)?;
            self.skip_whitespace();
        }

        String::from_utf8(bytes).map_err(|_| self.error_at(start, "string is not valid UTF-8"))
    }

    fn parse_string_body(&mut self, quote: char, out: &mut Vec<u8>) -> Result<(), TextFormatError> {
        loop {
            let c = match self.bump() {
                Some('\n') | None => return Err(self.error("unterminated string")),
                Some(c) => c,
            };

            if c == quote {
                return Ok(());
            }
            if c != '\\' {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }

            let escape = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            match escape {
                'n' => out.push(b'\n'),
                't' => out.push(b'\t'),
                'r' => out.push(b'\r'),
                'a' => out.push(0x07),
                'b' => out.push(0x08),
                'f' => out.push(0x0c),
                'v' => out.push(0x0b),
                '\\' | '\'' | '"' | '?' => out.push(escape as u8),
                'x' | 'X' => {
                    let value = self.take_digits(16, 2);
                    match value {
                        Some(v) => out.push(v as u8),
                        None => return Err(self.error("expected hex digits after '\\x'")),
                    }
                }
                '0'..='7' => {
                    self.pos -= 1;
                    let value = self.take_digits(8, 3).unwrap_or_default();
                    if value > 0xff {
                        return Err(self.error("octal escape out of range"));
                    }
                    out.push(value as u8);
                }
                other => return Err(self.error(format!("invalid escape sequence '\\{}'", other))),
            }
        }
    }

    /// Consumes up to `max` digits in `radix`, returning their value.
    fn take_digits(&mut self, radix: u32, max: usize) -> Option<u32> {
        let mut value = None;
        for _ in 0..max {
            match self.peek().and_then(|c| c.to_digit(radix)) {
                Some(d) => {
                    value = Some(value.unwrap_or(0) * radix + d);
                    self.pos += 1;
                }
                None => break,
            }
        }
        value
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while !matches!(self.peek(), Some('\n') | None) {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn skip_separator(&mut self) {
        self.skip_whitespace();
        if !self.eat(',') {
            self.eat(';');
        }
    }

    fn error(&self, message: impl Into<String>) -> TextFormatError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> TextFormatError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        TextFormatError {
            line,
            column,
            message: message.into(),
        }
    }
}
