use crate::error::Error;
use crate::syntax::token::{SourceLocation, Token, TokenKind};

/// Produces tokens one at a time; the evaluator pulls them as it goes.
/// Once the input is exhausted every further call returns `Eof`.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    loc: SourceLocation,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, source_name: &str) -> Self {
        Self { source, pos: 0, loc: SourceLocation::start(source_name) }
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_whitespace();

        let loc = self.loc.clone();
        if self.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, loc));
        }

        let kind = match self.peek() {
            b'(' => { self.advance(); TokenKind::OpenCall }
            b')' => { self.advance(); TokenKind::CloseCall }
            b'{' => { self.advance(); TokenKind::OpenList }
            b'}' => { self.advance(); TokenKind::CloseList }
            b'=' => { self.advance(); TokenKind::Equals }
            b',' => { self.advance(); TokenKind::Comma }
            b'!' => { self.advance(); TokenKind::Null }

            b':' => {
                self.advance();
                if self.peek() == b'=' {
                    self.advance();
                    TokenKind::PropSet
                } else {
                    return Err(Error::lex(&loc, "Unrecognized character ':', did you mean ':='?"));
                }
            }

            b'-' => {
                self.advance();
                return self.read_number(true, loc);
            }
            b'"' => {
                self.advance();
                return self.read_string(loc);
            }

            b'0'..=b'9' => return self.read_number(false, loc),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let word = self.read_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                TokenKind::Ident(word.to_string())
            }

            _ => {
                let ch = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                return Err(Error::lex(&loc, format!("Unrecognized character '{ch}'")));
            }
        };

        Ok(Token::new(kind, loc))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source.as_bytes()[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.loc.line += 1;
            self.loc.column = 1;
        } else if (ch & 0xC0) != 0x80 {
            // UTF-8 continuation bytes stay on the same column
            self.loc.column += 1;
        }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source.as_bytes()[self.pos] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                _ => break,
            }
        }
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while !self.is_at_end() && pred(self.peek()) {
            self.advance();
        }
        &self.source[start..self.pos]
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_number(&mut self, negative: bool, loc: SourceLocation) -> Result<Token, Error> {
        let section = self.read_while(|b| b.is_ascii_digit() || b == b'.');

        let kind = if section.contains('.') {
            let value: f64 = section
                .parse()
                .map_err(|_| Error::lex(&loc, format!("Invalid number: '{section}'")))?;
            TokenKind::Float(if negative { -value } else { value })
        } else {
            // parse with the sign attached so i64::MIN is accepted
            let text = if negative { format!("-{section}") } else { section.to_string() };
            let value: i64 = text
                .parse()
                .map_err(|_| Error::lex(&loc, format!("Invalid integer: '{section}'")))?;
            TokenKind::Int(value)
        };

        Ok(Token::new(kind, loc))
    }

    fn read_string(&mut self, loc: SourceLocation) -> Result<Token, Error> {
        let content = self.read_while(|b| b != b'"');
        if self.is_at_end() {
            return Err(Error::lex(&loc, "Unterminated string"));
        }
        self.advance(); // closing quote
        Ok(Token::new(TokenKind::Str(content.to_string()), loc))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
