//! Type references and dotted names.

use kiln_diagnostic::ErrorCode;
use kiln_ir::{Ident, PredefinedType, QualifiedName, TokenKind, TypeRef};

use crate::error::{PResult, ParseError};
use crate::Parser;

impl Parser<'_> {
    /// `Ident ('.' Ident)*`
    pub(crate) fn parse_qualified_name(&mut self, what: &str) -> PResult<QualifiedName> {
        let mut segments: Vec<Ident> = vec![self.cursor.expect_ident(what)?];
        while self.cursor.check(&TokenKind::Dot) {
            self.cursor.advance();
            segments.push(self.cursor.expect_ident("name segment after `.`")?);
        }
        Ok(QualifiedName::new(segments))
    }

    /// A predefined type keyword or a dotted type name.
    pub(crate) fn parse_type(&mut self) -> PResult<TypeRef> {
        let ty = match self.cursor.current_kind() {
            TokenKind::IntKw => PredefinedType::Int,
            TokenKind::BoolKw => PredefinedType::Bool,
            TokenKind::StringKw => PredefinedType::String,
            TokenKind::VoidKw => PredefinedType::Void,
            TokenKind::Ident(_) => return self.parse_qualified_name("type").map(TypeRef::Named),
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    format!("expected type, found {}", other.describe()),
                    self.cursor.current_span(),
                )
                .with_context("expected type"));
            }
        };
        let span = self.cursor.advance().span;
        Ok(TypeRef::Predefined { ty, span })
    }

    /// True if the tokens at the cursor spell `Type Ident`, i.e. the start of
    /// a local variable declaration rather than an expression.
    pub(crate) fn at_local_decl(&self) -> bool {
        if self.cursor.current_kind().is_predefined_type() {
            return true;
        }
        if !self.cursor.check_ident() {
            return false;
        }
        let mut n = 1;
        while matches!(self.cursor.peek_kind_at(n), TokenKind::Dot)
            && matches!(self.cursor.peek_kind_at(n + 1), TokenKind::Ident(_))
        {
            n += 2;
        }
        matches!(self.cursor.peek_kind_at(n), TokenKind::Ident(_))
    }
}
