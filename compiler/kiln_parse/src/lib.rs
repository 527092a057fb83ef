//! Recursive descent parser for Kiln.
//!
//! Produces a [`CompilationUnit`] together with every syntax diagnostic
//! found. Errors never stop the parse: each failed production is recorded
//! and the parser resynchronizes at the next item, member or statement
//! boundary.
//!
//! Besides whole units, the crate parses single fragments
//! ([`parse_statement`], [`parse_expression`], [`parse_type_name`],
//! [`parse_name`], [`parse_member`]) for building trees from snippets.

mod cursor;
mod error;
mod grammar;
mod recovery;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{CompilationUnit, Expr, Member, QualifiedName, Span, Stmt, TokenList, TypeRef};
use kiln_stack::{ensure_sufficient_stack, NestingLimit};
use tracing::debug;

use cursor::Cursor;
use error::{PResult, ParseError};

/// Output of [`parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutput {
    pub unit: CompilationUnit,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    diagnostics: Vec<Diagnostic>,
    nesting: NestingLimit,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            diagnostics: Vec::new(),
            nesting: NestingLimit::default(),
        }
    }

    /// Record a failed production.
    fn report(&mut self, error: ParseError) {
        debug!(span = %error.span(), "syntax error");
        self.diagnostics.push(error.into_diagnostic());
    }

    fn report_diag(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// Run `f` one nesting level deeper, on a stack with room to spare.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.descend()?;
        let result = ensure_sufficient_stack(|| f(self));
        self.nesting.exit();
        result
    }

    /// Charge one nesting level without recursing. The caller releases it.
    fn descend(&mut self) -> PResult<()> {
        self.nesting.enter().map_err(|too_deep| {
            ParseError::new(
                ErrorCode::E1008,
                too_deep.to_string(),
                self.cursor.current_span(),
            )
            .with_context("nested too deeply")
            .with_note("split the expression or block into smaller pieces")
        })
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    /// Require end of input after a fragment.
    fn expect_end(&mut self) -> PResult<()> {
        if self.cursor.is_at_end() {
            Ok(())
        } else {
            let kind = self.cursor.current_kind();
            Err(ParseError::new(
                ErrorCode::E1001,
                format!("unexpected {} after the end of the fragment", kind.describe()),
                self.cursor.current_span(),
            )
            .with_context("unexpected trailing input"))
        }
    }

    fn finish_fragment<T>(mut self, result: PResult<T>) -> Result<T, Vec<Diagnostic>> {
        let result = result.and_then(|value| self.expect_end().map(|()| value));
        match result {
            Ok(value) if !self.diagnostics.iter().any(Diagnostic::is_error) => Ok(value),
            Ok(_) => Err(self.diagnostics),
            Err(error) => {
                self.report(error);
                Err(self.diagnostics)
            }
        }
    }
}

/// Parse a token list into a compilation unit.
pub fn parse(tokens: &TokenList) -> ParseOutput {
    let mut parser = Parser::new(tokens);
    let unit = parser.parse_unit();
    debug!(
        members = unit.members.len(),
        errors = parser.diagnostics.len(),
        "parsed compilation unit"
    );
    ParseOutput {
        unit,
        diagnostics: parser.diagnostics,
    }
}

/// Lex and parse source text. Lexical diagnostics come first.
pub fn parse_source(source: &str) -> ParseOutput {
    let lexed = kiln_lexer::lex(source);
    let mut output = parse(&lexed.tokens);
    let mut diagnostics = lexed.diagnostics;
    diagnostics.append(&mut output.diagnostics);
    output.diagnostics = diagnostics;
    output
}

fn parse_fragment<T>(
    source: &str,
    f: impl FnOnce(&mut Parser<'_>) -> PResult<T>,
) -> Result<T, Vec<Diagnostic>> {
    let lexed = kiln_lexer::lex(source);
    if lexed.has_errors() {
        return Err(lexed.diagnostics);
    }
    let mut parser = Parser::new(&lexed.tokens);
    let result = f(&mut parser);
    parser.finish_fragment(result)
}

/// Parse a single statement, e.g. `return a + b;`.
pub fn parse_statement(source: &str) -> Result<Stmt, Vec<Diagnostic>> {
    parse_fragment(source, |p| p.parse_stmt())
}

/// Parse a single expression, e.g. `a + b`.
pub fn parse_expression(source: &str) -> Result<Expr, Vec<Diagnostic>> {
    parse_fragment(source, |p| p.parse_expr())
}

/// Parse a type, e.g. `int` or `Playground.ICalculator`.
pub fn parse_type_name(source: &str) -> Result<TypeRef, Vec<Diagnostic>> {
    parse_fragment(source, |p| p.parse_type())
}

/// Parse a dotted name, e.g. `GeneratedCalculator`.
pub fn parse_name(source: &str) -> Result<QualifiedName, Vec<Diagnostic>> {
    parse_fragment(source, |p| p.parse_qualified_name("name"))
}

/// Parse a class member, e.g. `public int Add(int a, int b) => a + b;`.
pub fn parse_member(source: &str) -> Result<Member, Vec<Diagnostic>> {
    parse_fragment(source, |p| p.parse_member(kiln_ir::TypeDeclKind::Class))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
