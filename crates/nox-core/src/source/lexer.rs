//! Raw C++ lexer.
//!
//! Converts a slice of source text into [`Token`]s carrying absolute byte
//! offsets. It works on raw text, like a compiler's raw-mode lexer: macros
//! are not expanded, preprocessor lines and comments are trivia.

use crate::error::{NoxError, Result};
use crate::span::TextRange;

use super::token::{Token, TokenKind};

/// Pull-based lexer over `text[start..end]`.
pub struct Lexer<'a> {
    bytes: &'a [u8],
    cursor: usize,
    end: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    /// Lex the whole of `text`.
    pub fn new(text: &'a str) -> Self {
        Self::with_range(text, 0, text.len())
    }

    /// Lex `text[start..end]`; offsets in the produced tokens stay absolute.
    pub fn with_range(text: &'a str, start: usize, end: usize) -> Self {
        let end = end.min(text.len());
        let at_line_start = start == 0 || text.as_bytes().get(start - 1) == Some(&b'\n');
        Self {
            bytes: text.as_bytes(),
            cursor: start.min(end),
            end,
            at_line_start,
        }
    }

    /// Collect every remaining token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Pull the next token, or `None` at the end of the range.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_trivia()?;

        let start = self.cursor;
        let Some(byte) = self.peek() else {
            return Ok(None);
        };
        self.at_line_start = false;

        let kind = match byte {
            b if is_ident_start(b) => return self.lex_identifier().map(Some),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.lex_number(),
            b'"' => self.lex_quoted(b'"')?,
            b'\'' => self.lex_quoted(b'\'')?,
            _ => self.lex_punctuator(),
        };

        Ok(Some(self.token(kind, start)))
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, start as u32, self.cursor as u32)
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        let index = self.cursor + ahead;
        if index < self.end {
            Some(self.bytes[index])
        } else {
            None
        }
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    /// Consume whitespace, comments and preprocessor lines.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.bump();
                    self.at_line_start = true;
                }
                Some(b) if b.is_ascii_whitespace() => self.bump(),
                Some(b'\\') if self.peek_at(1) == Some(b'\n') => {
                    self.bump();
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment()?,
                Some(b'#') if self.at_line_start => self.skip_line(),
                _ => return Ok(()),
            }
        }
    }

    /// Skip to the end of the line, honouring backslash continuations.
    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\\' && self.peek_at(1) == Some(b'\n') {
                self.bump();
                self.bump();
                continue;
            }
            if b == b'\n' {
                return;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.cursor;
        self.bump();
        self.bump();
        while let Some(b) = self.peek() {
            if b == b'*' && self.peek_at(1) == Some(b'/') {
                self.bump();
                self.bump();
                return Ok(());
            }
            self.bump();
        }
        Err(NoxError::lex(
            "unterminated block comment",
            TextRange::new(start as u32, self.cursor as u32),
        ))
    }

    fn lex_identifier(&mut self) -> Result<Token> {
        let start = self.cursor;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let ident = String::from_utf8_lossy(&self.bytes[start..self.cursor]).into_owned();

        // Encoding prefixes glue onto the literal that follows.
        if is_literal_prefix(&ident) {
            match self.peek() {
                Some(b'"') if ident.ends_with('R') => {
                    let kind = self.lex_raw_string(start)?;
                    return Ok(self.token(kind, start));
                }
                Some(quote @ (b'"' | b'\'')) => {
                    let kind = self.lex_quoted(quote)?;
                    return Ok(self.token(kind, start));
                }
                _ => {}
            }
        }

        Ok(self.token(TokenKind::Ident(ident), start))
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.cursor;
        let mut is_float = false;
        let mut prev = 0u8;

        while let Some(b) = self.peek() {
            let continues = b.is_ascii_alphanumeric()
                || b == b'_'
                || b == b'\''
                || b == b'.'
                || ((b == b'+' || b == b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P'));
            if !continues {
                break;
            }
            if b == b'.' {
                is_float = true;
            }
            prev = b;
            self.bump();
        }

        let spelling: String = self.bytes[start..self.cursor]
            .iter()
            .filter(|b| **b != b'\'')
            .map(|b| *b as char)
            .collect();

        if is_float {
            return TokenKind::NumberLiteral;
        }

        parse_integer(&spelling)
            .map(TokenKind::IntLiteral)
            .unwrap_or(TokenKind::NumberLiteral)
    }

    fn lex_quoted(&mut self, quote: u8) -> Result<TokenKind> {
        let start = self.cursor;
        self.bump();
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.bump();
                    if self.peek().is_some() {
                        self.bump();
                    }
                }
                b'\n' => break,
                b if b == quote => {
                    self.bump();
                    self.consume_ud_suffix();
                    return Ok(if quote == b'"' {
                        TokenKind::StringLiteral
                    } else {
                        TokenKind::CharLiteral
                    });
                }
                _ => self.bump(),
            }
        }
        Err(NoxError::lex(
            if quote == b'"' {
                "unterminated string literal"
            } else {
                "unterminated character literal"
            },
            TextRange::new(start as u32, self.cursor as u32),
        ))
    }

    /// `R"delim( ... )delim"`, cursor on the opening quote.
    fn lex_raw_string(&mut self, start: usize) -> Result<TokenKind> {
        self.bump();
        let delim_start = self.cursor;
        while self.peek().is_some_and(|b| b != b'(' && b != b'\n') {
            self.bump();
        }
        if self.peek() != Some(b'(') {
            return Err(NoxError::lex(
                "malformed raw string delimiter",
                TextRange::new(start as u32, self.cursor as u32),
            ));
        }
        let mut closing = Vec::with_capacity(self.cursor - delim_start + 2);
        closing.push(b')');
        closing.extend_from_slice(&self.bytes[delim_start..self.cursor]);
        closing.push(b'"');
        self.bump();

        while self.cursor < self.end {
            if self.bytes[self.cursor..self.end].starts_with(&closing) {
                self.cursor += closing.len();
                self.consume_ud_suffix();
                return Ok(TokenKind::StringLiteral);
            }
            self.bump();
        }
        Err(NoxError::lex(
            "unterminated raw string literal",
            TextRange::new(start as u32, self.cursor as u32),
        ))
    }

    fn consume_ud_suffix(&mut self) {
        if self.peek().is_some_and(is_ident_start) {
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
        }
    }

    fn lex_punctuator(&mut self) -> TokenKind {
        let first = self.peek().unwrap_or(b' ');
        let second = self.peek_at(1);
        self.bump();

        let mut take = |kind: TokenKind| {
            self.bump();
            kind
        };

        match (first, second) {
            (b':', Some(b':')) => take(TokenKind::ColonColon),
            (b'&', Some(b'&')) => take(TokenKind::AmpAmp),
            (b'|', Some(b'|')) => take(TokenKind::PipePipe),
            (b'!', Some(b'=')) => take(TokenKind::BangEq),
            (b'=', Some(b'=')) => take(TokenKind::EqEq),
            (b'<', Some(b'=')) => take(TokenKind::Le),
            (b'>', Some(b'=')) => take(TokenKind::Ge),
            (b'-', Some(b'>')) => take(TokenKind::Arrow),
            (b'(', _) => TokenKind::LParen,
            (b')', _) => TokenKind::RParen,
            (b'[', _) => TokenKind::LBracket,
            (b']', _) => TokenKind::RBracket,
            (b'{', _) => TokenKind::LBrace,
            (b'}', _) => TokenKind::RBrace,
            (b';', _) => TokenKind::Semi,
            (b':', _) => TokenKind::Colon,
            (b',', _) => TokenKind::Comma,
            (b'~', _) => TokenKind::Tilde,
            (b'&', _) => TokenKind::Amp,
            (b'|', _) => TokenKind::Pipe,
            (b'!', _) => TokenKind::Bang,
            (b'=', _) => TokenKind::Eq,
            (b'<', _) => TokenKind::Lt,
            (b'>', _) => TokenKind::Gt,
            (b'+', _) => TokenKind::Plus,
            (b'-', _) => TokenKind::Minus,
            (b'*', _) => TokenKind::Star,
            (b'/', _) => TokenKind::Slash,
            (b'%', _) => TokenKind::Percent,
            (b'.', _) => TokenKind::Dot,
            (b'?', _) => TokenKind::Question,
            (b'#', _) => TokenKind::Hash,
            (other, _) => TokenKind::Other(other as char),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn is_literal_prefix(ident: &str) -> bool {
    matches!(ident, "L" | "u" | "U" | "u8" | "R" | "LR" | "uR" | "UR" | "u8R")
}

/// Parse an integer literal spelling (separators already removed).
fn parse_integer(spelling: &str) -> Option<i64> {
    let lower = spelling.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };

    let digits = digits.trim_end_matches(['u', 'l', 'z']);
    if digits.is_empty() {
        return if radix == 8 { Some(0) } else { None };
    }
    i64::from_str_radix(digits, radix).ok()
}
