//! Token cursor for the parser.

use kiln_ir::{Ident, Span, Token, TokenKind, TokenList};
use tracing::trace;

use crate::error::{PResult, ParseError};
use kiln_diagnostic::ErrorCode;

/// Position in a [`TokenList`]. Never moves past the trailing `Eof`.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn current(&self) -> &'a Token {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos == 0 {
            Span::point(self.current_span().start)
        } else {
            self.tokens.get(self.pos - 1).span
        }
    }

    /// Kind of the token `n` positions ahead (0 = current).
    #[inline]
    pub(crate) fn peek_kind_at(&self, n: usize) -> &'a TokenKind {
        &self.tokens.get(self.pos + n).kind
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Kind check that ignores literal payloads.
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind().tag() == kind.tag()
    }

    #[inline]
    pub(crate) fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Consume the current token. At `Eof` the cursor stays put.
    pub(crate) fn advance(&mut self) -> &'a Token {
        let token = self.current();
        trace!(
            pos = self.pos,
            kind = ?token.kind,
            span_start = token.span.start,
            span_end = token.span.end,
            "advance"
        );
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect the current token to be of the given kind, advance and return
    /// its span.
    #[inline]
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.make_expect_error(kind))
        }
    }

    #[cold]
    #[inline(never)]
    fn make_expect_error(&self, kind: &TokenKind) -> ParseError {
        ParseError::expected(&kind.describe(), self.current_kind(), self.current_span())
    }

    /// Expect and consume an identifier.
    pub(crate) fn expect_ident(&mut self, what: &str) -> PResult<Ident> {
        let token = self.current();
        if let TokenKind::Ident(name) = &token.kind {
            self.advance();
            Ok(Ident::with_span(name.clone(), token.span))
        } else {
            Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected {what}, found {}", token.kind.describe()),
                token.span,
            )
            .with_context(format!("expected {what}")))
        }
    }
}
