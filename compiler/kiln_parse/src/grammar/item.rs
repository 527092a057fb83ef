//! Usings, namespaces, type declarations and members.

use kiln_diagnostic::{unclosed_delimiter, Diagnostic, ErrorCode};
use kiln_ir::{
    CompilationUnit, FieldDecl, Member, MethodBody, MethodDecl, Modifiers, NamespaceDecl,
    NamespaceMember, Param, Span, TokenKind, TypeDecl, TypeDeclKind, UsingDirective,
};

use crate::error::{PResult, ParseError};
use crate::recovery::{skip_group, synchronize, TokenSet, ITEM_BOUNDARY, MEMBER_BOUNDARY};
use crate::Parser;

const ACCESS: Modifiers = Modifiers::PUBLIC
    .union(Modifiers::PRIVATE)
    .union(Modifiers::INTERNAL);

impl Parser<'_> {
    pub(crate) fn parse_unit(&mut self) -> CompilationUnit {
        let (usings, members) = self.parse_scope(false);
        CompilationUnit { usings, members }
    }

    /// Usings and declarations up to `}` (when `nested`) or end of input.
    fn parse_scope(&mut self, nested: bool) -> (Vec<UsingDirective>, Vec<NamespaceMember>) {
        let mut usings = Vec::new();
        let mut members = Vec::new();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof => break,
                TokenKind::RBrace if nested => break,
                _ => {}
            }
            let start = self.cursor.position();
            if self.cursor.check(&TokenKind::Using) {
                match self.parse_using() {
                    Ok(using) => {
                        if !members.is_empty() {
                            self.report_diag(
                                Diagnostic::error(ErrorCode::E1006)
                                    .with_message("using directives must precede declarations")
                                    .with_label(using.span, "after a declaration")
                                    .with_suggestion("move this directive above the first declaration"),
                            );
                        }
                        usings.push(using);
                    }
                    Err(error) => {
                        self.report(error);
                        self.recover(start, ITEM_BOUNDARY);
                    }
                }
                continue;
            }
            match self.parse_namespace_member() {
                Ok(member) => members.push(member),
                Err(error) => {
                    self.report(error);
                    self.recover(start, ITEM_BOUNDARY);
                }
            }
        }
        (usings, members)
    }

    /// `using Name;`
    fn parse_using(&mut self) -> PResult<UsingDirective> {
        let start = self.cursor.expect(&TokenKind::Using)?;
        let name = self.parse_qualified_name("namespace name")?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(UsingDirective {
            name,
            span: self.span_from(start),
        })
    }

    fn parse_namespace_member(&mut self) -> PResult<NamespaceMember> {
        if self.cursor.check(&TokenKind::Namespace) {
            return self.parse_namespace().map(NamespaceMember::Namespace);
        }
        self.parse_type_decl().map(NamespaceMember::Type)
    }

    /// `namespace Name { ... }`
    fn parse_namespace(&mut self) -> PResult<NamespaceDecl> {
        let start = self.cursor.expect(&TokenKind::Namespace)?;
        let name = self.parse_qualified_name("namespace name")?;
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let (usings, members) = self.parse_scope(true);
        self.close_brace(open);
        Ok(NamespaceDecl {
            name,
            usings,
            members,
            span: self.span_from(start),
        })
    }

    /// Consume the `}` closing `open`, or report it as unclosed at EOF.
    fn close_brace(&mut self, open: Span) {
        if !self.cursor.eat(&TokenKind::RBrace) {
            let diag = unclosed_delimiter(open, self.cursor.current_span(), '{');
            self.report_diag(diag);
        }
    }

    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            let flag = match self.cursor.current_kind() {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Internal => Modifiers::INTERNAL,
                TokenKind::Static => Modifiers::STATIC,
                TokenKind::Sealed => Modifiers::SEALED,
                _ => return modifiers,
            };
            let token = self.cursor.advance();
            let word = token.kind.text();
            if modifiers.contains(flag) {
                self.report_diag(
                    Diagnostic::error(ErrorCode::E2023)
                        .with_message(format!("duplicate `{word}` modifier"))
                        .with_label(token.span, "repeated here"),
                );
            } else if ACCESS.contains(flag) && modifiers.intersects(ACCESS) {
                self.report_diag(
                    Diagnostic::error(ErrorCode::E2023)
                        .with_message("more than one access modifier")
                        .with_label(token.span, format!("`{word}` conflicts with an earlier one")),
                );
            }
            modifiers |= flag;
        }
    }

    /// `modifiers ('class' | 'interface') Name (':' bases)? { members }`
    fn parse_type_decl(&mut self) -> PResult<TypeDecl> {
        let start = self.cursor.current_span();
        let modifiers = self.parse_modifiers();
        let kind = match self.cursor.current_kind() {
            TokenKind::Class => TypeDeclKind::Class,
            TokenKind::Interface => TypeDeclKind::Interface,
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1006,
                    format!(
                        "expected a namespace or type declaration, found {}",
                        other.describe()
                    ),
                    self.cursor.current_span(),
                )
                .with_context("expected `namespace`, `class` or `interface`"));
            }
        };
        self.cursor.advance();
        let name = self.cursor.expect_ident("type name")?;

        let mut bases = Vec::new();
        if self.cursor.eat(&TokenKind::Colon) {
            loop {
                bases.push(self.parse_type()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            let member_start = self.cursor.position();
            match self.parse_member(kind) {
                Ok(member) => members.push(member),
                Err(error) => {
                    self.report(error);
                    self.recover_member(member_start);
                }
            }
        }
        self.close_brace(open);

        Ok(TypeDecl {
            kind,
            modifiers,
            name,
            bases,
            members,
            span: self.span_from(start),
        })
    }

    /// A method or field of a type declared with `owner`.
    pub(crate) fn parse_member(&mut self, owner: TypeDeclKind) -> PResult<Member> {
        let start = self.cursor.current_span();
        let modifiers = self.parse_modifiers();
        let ty = self.parse_type()?;
        let name = self.cursor.expect_ident("member name")?;

        if !self.cursor.check(&TokenKind::LParen) {
            let init = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.cursor.expect(&TokenKind::Semicolon)?;
            return Ok(Member::Field(FieldDecl {
                modifiers,
                ty,
                name,
                init,
                span: self.span_from(start),
            }));
        }

        let params = self.parse_params()?;
        let body = match self.cursor.current_kind() {
            TokenKind::LBrace => Some(MethodBody::Block(self.parse_block()?)),
            TokenKind::FatArrow => {
                self.cursor.advance();
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                Some(MethodBody::Expr(expr))
            }
            TokenKind::Semicolon => {
                let semi = self.cursor.advance().span;
                if owner == TypeDeclKind::Class {
                    self.report_diag(
                        Diagnostic::error(ErrorCode::E1007)
                            .with_message(format!("method `{name}` must declare a body"))
                            .with_label(name.span.merge(semi), "no body")
                            .with_suggestion("add a block `{ ... }` or an expression body `=> ...;`"),
                    );
                }
                None
            }
            other => {
                return Err(ParseError::expected(
                    "method body",
                    other,
                    self.cursor.current_span(),
                )
                .with_note("a method body is a block, `=> expression;`, or `;`"));
            }
        };

        Ok(Member::Method(MethodDecl {
            modifiers,
            return_type: ty,
            name,
            params,
            body,
            span: self.span_from(start),
        }))
    }

    /// `( (Type name (, Type name)*)? )`
    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let open = self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.cursor.check(&TokenKind::RParen) {
            loop {
                let start = self.cursor.current_span();
                let ty = self.parse_type()?;
                let name = self.cursor.expect_ident("parameter name")?;
                params.push(Param {
                    ty,
                    name,
                    span: self.span_from(start),
                });
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(open, &TokenKind::RParen, '(')?;
        Ok(params)
    }

    /// Consume a closing delimiter, reporting an unclosed group at EOF.
    pub(crate) fn expect_closing(
        &mut self,
        open: Span,
        close: &TokenKind,
        open_char: char,
    ) -> PResult<Span> {
        if self.cursor.is_at_end() {
            return Err(unclosed_delimiter(open, self.cursor.current_span(), open_char).into());
        }
        self.cursor.expect(close)
    }

    /// Skip past a malformed member. A method body that follows a broken
    /// signature is skipped whole.
    fn recover_member(&mut self, start: usize) {
        synchronize(&mut self.cursor, MEMBER_BOUNDARY);
        match self.cursor.current_kind() {
            TokenKind::Semicolon => {
                self.cursor.advance();
            }
            TokenKind::LBrace => skip_group(&mut self.cursor),
            _ if self.cursor.position() == start => {
                self.cursor.advance();
            }
            _ => {}
        }
    }

    /// Skip to `boundary`, always consuming at least one token.
    pub(crate) fn recover(&mut self, start: usize, boundary: TokenSet) {
        synchronize(&mut self.cursor, boundary);
        if self.cursor.position() == start {
            if matches!(
                self.cursor.current_kind(),
                TokenKind::LBrace | TokenKind::LParen
            ) {
                skip_group(&mut self.cursor);
            } else {
                self.cursor.advance();
            }
        }
    }
}
