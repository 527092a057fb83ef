//! Lexer for Kiln source units.
//!
//! Turns source text into a [`TokenList`] plus lexical diagnostics. Lexing
//! never stops early: an invalid character becomes a `TokenKind::Error`
//! token, and an unterminated string still yields a string token, so the
//! parser always sees a complete token stream ending in `Eof`.

mod cook_escape;
mod cursor;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Span, Token, TokenKind, TokenList};

use cursor::Cursor;

/// Output of [`lex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Lex a source unit.
pub fn lex(source: &str) -> LexOutput {
    if u32::try_from(source.len()).is_err() {
        let diag = Diagnostic::error(ErrorCode::E0002)
            .with_message("source text exceeds the 4 GiB limit")
            .with_note("split the unit into several smaller units");
        return LexOutput {
            tokens: TokenList::new(Vec::new(), 0),
            diagnostics: vec![diag],
        };
    }

    let mut lexer = Lexer {
        cursor: Cursor::new(source),
        tokens: Vec::new(),
        diagnostics: Vec::new(),
    };
    lexer.run();
    let end = Span::from_range(source.len()..source.len()).end;
    LexOutput {
        tokens: TokenList::new(lexer.tokens, end),
        diagnostics: lexer.diagnostics,
    }
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl Lexer<'_> {
    fn run(&mut self) {
        loop {
            self.skip_trivia();
            if self.cursor.is_eof() {
                break;
            }
            self.next_token();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = Span::from_range(start..self.cursor.pos());
        self.tokens.push(Token::new(kind, span));
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.cursor.current(), self.cursor.peek()) {
                (b' ' | b'\t' | b'\r' | b'\n', _) => self.cursor.advance(),
                (b'/', b'/') => self.cursor.eat_until_newline_or_eof(),
                (b'/', b'*') => {
                    let start = self.cursor.pos();
                    self.cursor.advance_n(2);
                    if !self.cursor.eat_block_comment_body() {
                        self.diagnostics.push(
                            Diagnostic::error(ErrorCode::E0001)
                                .with_message("unterminated block comment")
                                .with_label(
                                    Span::from_range(start..start + 2),
                                    "comment starts here",
                                )
                                .with_suggestion("close the comment with `*/`"),
                        );
                    }
                }
                (b, _) if b >= 0x80 => match self.cursor.current_char() {
                    Some(c) if c.is_whitespace() => self.cursor.advance_char(),
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn next_token(&mut self) {
        let start = self.cursor.pos();
        let b = self.cursor.current();
        match b {
            b'0'..=b'9' => self.number(start),
            b'"' => self.string(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.ident(start),
            _ if b >= 0x80 => match self.cursor.current_char() {
                Some(c) if is_ident_start(c) => self.ident(start),
                Some(c) => {
                    self.cursor.advance_char();
                    self.invalid_char(c, start);
                }
                None => {
                    self.cursor.advance();
                    self.push(TokenKind::Error, start);
                }
            },
            _ => self.punct(start, b),
        }
    }

    fn ident(&mut self, start: usize) {
        self.cursor.eat_chars_while(is_ident_continue);
        let text = self.cursor.slice_from(start);
        let kind = TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        self.push(kind, start);
    }

    fn number(&mut self, start: usize) {
        let hex = self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X');
        let (digits_start, radix) = if hex {
            self.cursor.advance_n(2);
            (self.cursor.pos(), 16)
        } else {
            (start, 10)
        };
        if hex {
            self.cursor.eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
        } else {
            self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
        }
        let digits_end = self.cursor.pos();

        // `12abc` is one bad literal, not a number followed by a name.
        let mut malformed = false;
        if let Some(c) = self.cursor.current_char() {
            if is_ident_continue(c) {
                self.cursor.eat_chars_while(is_ident_continue);
                malformed = true;
            }
        }

        let digits: String = self
            .cursor
            .slice(digits_start, digits_end)
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let value = if malformed || digits.is_empty() {
            None
        } else {
            u64::from_str_radix(&digits, radix).ok()
        };

        match value {
            Some(v) => self.push(TokenKind::Int(v), start),
            None => {
                let text = self.cursor.slice_from(start).to_string();
                self.push(TokenKind::Int(0), start);
                let span = Span::from_range(start..self.cursor.pos());
                let message = if malformed || digits.is_empty() {
                    format!("invalid number literal `{text}`")
                } else {
                    format!("number literal `{text}` is too large")
                };
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E0003)
                        .with_message(message)
                        .with_label(span, "invalid literal"),
                );
            }
        }
    }

    fn string(&mut self, start: usize) {
        self.cursor.advance(); // opening quote
        let terminated = loop {
            match self.cursor.skip_to_string_delim() {
                b'"' => break true,
                b'\\' => {
                    self.cursor.advance();
                    if matches!(self.cursor.current(), b'\n' | b'\r') || self.cursor.is_eof() {
                        break false;
                    }
                    self.cursor.advance_char();
                }
                _ => break false,
            }
        };

        let content_end = self.cursor.pos();
        let raw = self.cursor.slice(start + 1, content_end);
        let cooked = cook_escape::unescape_string(raw, start + 1, &mut self.diagnostics);
        if terminated {
            self.cursor.advance(); // closing quote
        } else {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E0001)
                    .with_message("unterminated string literal")
                    .with_label(
                        Span::from_range(start..content_end),
                        "string starts here and is never closed",
                    )
                    .with_suggestion("add a closing `\"` before the end of the line"),
            );
        }
        self.push(TokenKind::Str(cooked), start);
    }

    fn invalid_char(&mut self, c: char, start: usize) {
        self.push(TokenKind::Error, start);
        let span = Span::from_range(start..self.cursor.pos());
        self.diagnostics.push(
            Diagnostic::error(ErrorCode::E0002)
                .with_message(format!("invalid character `{}`", c.escape_default()))
                .with_label(span, "not valid here"),
        );
    }

    fn punct(&mut self, start: usize, b: u8) {
        let next = self.cursor.peek();
        let (kind, len) = match (b, next) {
            (b'=', b'=') => (TokenKind::EqEq, 2),
            (b'=', b'>') => (TokenKind::FatArrow, 2),
            (b'!', b'=') => (TokenKind::NotEq, 2),
            (b'<', b'=') => (TokenKind::LtEq, 2),
            (b'>', b'=') => (TokenKind::GtEq, 2),
            (b'+', b'=') => (TokenKind::PlusEq, 2),
            (b'-', b'=') => (TokenKind::MinusEq, 2),
            (b'&', b'&') => (TokenKind::AmpAmp, 2),
            (b'|', b'|') => (TokenKind::PipePipe, 2),
            (b'{', _) => (TokenKind::LBrace, 1),
            (b'}', _) => (TokenKind::RBrace, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b'?', _) => (TokenKind::Question, 1),
            (b'=', _) => (TokenKind::Eq, 1),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'!', _) => (TokenKind::Bang, 1),
            _ => {
                self.cursor.advance();
                self.invalid_char(char::from(b), start);
                return;
            }
        };
        self.cursor.advance_n(len);
        self.push(kind, start);
    }
}
