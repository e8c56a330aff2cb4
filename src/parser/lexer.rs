//! Tokenizer for Zero source.
//!
//! Streams tokens via `next`/`peek`. Whitespace (space, tab, carriage
//! return) is skipped; newlines are significant and emitted as tokens.
//! One character of lookahead suffices for every construct.

use crate::parser::token::{Token, TokenKind};
use crate::source::{SourceId, SourceManager, Span};

pub struct Lexer<'src> {
    content: &'src str,
    source_id: SourceId,
    /// Start of the token currently being scanned.
    start: u32,
    /// Current scan position.
    current: u32,
    peeked: Option<Token<'src>>,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer over the given source. An invalid id lexes as an
    /// empty file.
    pub fn new(sm: &'src SourceManager, id: SourceId) -> Lexer<'src> {
        let content = sm.get(id).map(|f| f.content.as_str()).unwrap_or("");
        Lexer {
            content,
            source_id: id,
            start: 0,
            current: 0,
            peeked: None,
        }
    }

    /// Returns the next token and advances. Once the input is exhausted,
    /// returns EOF tokens indefinitely.
    pub fn next(&mut self) -> Token<'src> {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan_token()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Token<'src> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token());
        }
        self.peeked.unwrap()
    }

    pub fn at_end(&self) -> bool {
        match self.peeked {
            Some(tok) => tok.is_eof(),
            None => self.is_at_end(),
        }
    }

    // -----------------------------------------------------------------
    // Scanning helpers
    // -----------------------------------------------------------------

    fn peek_byte(&self) -> Option<u8> {
        self.content.as_bytes().get(self.current as usize).copied()
    }

    fn peek_next_byte(&self) -> Option<u8> {
        self.content
            .as_bytes()
            .get(self.current as usize + 1)
            .copied()
    }

    fn advance(&mut self) -> u8 {
        let b = self.content.as_bytes()[self.current as usize];
        self.current += 1;
        b
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek_byte() == Some(expected) {
            self.current += 1;
            return true;
        }
        false
    }

    fn is_at_end(&self) -> bool {
        self.current as usize >= self.content.len()
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\r') | Some(b'\t') => {
                    self.current += 1;
                }
                Some(b'/') if self.peek_next_byte() == Some(b'/') => {
                    // Line comment: runs to the next newline, exclusive.
                    while !self.is_at_end() && self.peek_byte() != Some(b'\n') {
                        self.current += 1;
                    }
                }
                _ => return,
            }
        }
    }

    // -----------------------------------------------------------------
    // Token construction
    // -----------------------------------------------------------------

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token {
            kind,
            span: Span::range(self.source_id, self.start, self.current),
            text: &self.content[self.start as usize..self.current as usize],
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token {
            kind: TokenKind::Error,
            span: Span::range(self.source_id, self.start, self.current.max(self.start + 1)),
            text: message,
        }
    }

    fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        if c.is_ascii_alphabetic() || c == b'_' {
            return self.scan_identifier();
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LParen),
            b')' => self.make_token(TokenKind::RParen),
            b'{' => self.make_token(TokenKind::LBrace),
            b'}' => self.make_token(TokenKind::RBrace),
            b'[' => self.make_token(TokenKind::LBracket),
            b']' => self.make_token(TokenKind::RBracket),
            b',' => self.make_token(TokenKind::Comma),
            b':' => self.make_token(TokenKind::Colon),
            b';' => self.make_token(TokenKind::Semicolon),
            b'\n' => self.make_token(TokenKind::Newline),

            b'+' => self.make_token(TokenKind::Plus),
            b'*' => self.make_token(TokenKind::Star),
            b'/' => self.make_token(TokenKind::Slash),

            b'-' => {
                if self.match_byte(b'>') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }
            b'=' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::EqEq)
                } else {
                    self.make_token(TokenKind::Eq)
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::BangEq)
                } else {
                    self.make_token(TokenKind::Bang)
                }
            }
            b'<' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::LtEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            b'>' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }

            b'"' => self.scan_string(),

            _ => self.error_token("Unexpected character"),
        }
    }

    fn scan_identifier(&mut self) -> Token<'src> {
        while self
            .peek_byte()
            .map_or(false, |b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.current += 1;
        }
        let text = &self.content[self.start as usize..self.current as usize];
        let kind = match text {
            "fn" => TokenKind::Fn,
            "let" => TokenKind::Let,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "use" => TokenKind::Use,
            _ => TokenKind::Ident,
        };
        self.make_token(kind)
    }

    fn scan_number(&mut self) -> Token<'src> {
        while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
            self.current += 1;
        }
        // A dot begins a float only when followed by at least one digit.
        if self.peek_byte() == Some(b'.')
            && self.peek_next_byte().map_or(false, |b| b.is_ascii_digit())
        {
            self.current += 1;
            while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
                self.current += 1;
            }
            return self.make_token(TokenKind::FloatLit);
        }
        self.make_token(TokenKind::IntLit)
    }

    /// Scans a `"..."` literal. The token text keeps the quotes and the raw
    /// escape sequences; the parser strips and interprets them when it
    /// materializes the literal's value.
    fn scan_string(&mut self) -> Token<'src> {
        loop {
            match self.peek_byte() {
                None => return self.error_token("Unterminated string literal"),
                Some(b'"') => {
                    self.current += 1;
                    return self.make_token(TokenKind::StringLit);
                }
                Some(b'\\') => {
                    // Keep the escape verbatim; skip the escaped byte so an
                    // escaped quote does not end the literal.
                    self.current += 1;
                    if !self.is_at_end() {
                        self.current += 1;
                    }
                }
                Some(_) => {
                    self.current += 1;
                }
            }
        }
    }
}
