//! Kiln IR - syntax-level data structures shared by every compiler phase.
//!
//! This crate contains:
//! - Spans for source locations
//! - Tokens and `TokenList` for lexer output
//! - The syntax tree (`CompilationUnit`, `TypeDecl`, `MethodDecl`, `Stmt`, `Expr`)
//! - Builder-style constructors for assembling trees programmatically
//!
//! Trees built with the constructors carry [`Span::DUMMY`]; trees produced by
//! the parser carry real spans. Equality on tree nodes ignores nothing, so
//! tests that compare a built tree against a parsed one should compare the
//! printed text instead.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod span;
mod token;

pub use ast::{
    AssignOp, BinaryOp, Block, CompilationUnit, Expr, ExprKind, FieldDecl, Ident, Member,
    MethodBody, MethodDecl, Modifiers, NamespaceDecl, NamespaceMember, Param, PredefinedType,
    QualifiedName, Stmt, StmtKind, TypeDecl, TypeDeclKind, TypeRef, UnaryOp, UsingDirective,
};
pub use span::{LineCol, Span, SpanError};
pub use token::{Token, TokenKind, TokenList};
