//! Statements and reachability.

use kiln_diagnostic::{type_mismatch, Diagnostic, ErrorCode};
use kiln_ir::{Expr, ExprKind, Stmt, StmtKind};
use kiln_stack::ensure_sufficient_stack;

use super::BodyChecker;
use crate::hir::{HExpr, HExprKind, HStmt};
use crate::ty::Ty;

impl BodyChecker<'_, '_> {
    /// Check a braced block in its own scope. Returns the statements and
    /// whether control can fall off the end.
    pub(super) fn check_block(&mut self, stmts: &[Stmt], reachable: bool) -> (Vec<HStmt>, bool) {
        self.push_scope();
        let result = self.check_stmts(stmts, reachable);
        self.pop_scope();
        result
    }

    fn check_stmts(&mut self, stmts: &[Stmt], reachable: bool) -> (Vec<HStmt>, bool) {
        let mut out = Vec::with_capacity(stmts.len());
        let mut completes = true;
        let mut warned = false;
        for stmt in stmts {
            if reachable && !completes && !warned && !matches!(stmt.kind, StmtKind::Empty) {
                self.sink.report(
                    Diagnostic::warning(ErrorCode::E2101)
                        .with_message("unreachable code detected")
                        .with_label(stmt.span, "this statement can never run"),
                );
                warned = true;
            }
            let (hir, stmt_completes) = self.check_stmt(stmt, reachable && completes);
            out.extend(hir);
            completes &= stmt_completes;
        }
        (out, completes)
    }

    fn check_stmt(&mut self, stmt: &Stmt, reachable: bool) -> (Option<HStmt>, bool) {
        ensure_sufficient_stack(|| self.check_stmt_inner(stmt, reachable))
    }

    fn check_stmt_inner(&mut self, stmt: &Stmt, reachable: bool) -> (Option<HStmt>, bool) {
        match &stmt.kind {
            StmtKind::Empty => (None, true),
            StmtKind::Block(block) => {
                let (stmts, completes) = self.check_block(&block.stmts, reachable);
                (Some(HStmt::Block(stmts)), completes)
            }
            StmtKind::Local { ty, name, init } => {
                let value = self.check_value(init);
                let local_ty = match ty {
                    Some(declared) => {
                        let declared_ty =
                            self.env
                                .resolve_type(self.sink, self.decl.ctx, declared);
                        if declared_ty.is_void() {
                            self.sink.report(
                                Diagnostic::error(ErrorCode::E2016)
                                    .with_message("a local variable cannot have type `void`")
                                    .with_label(declared.span(), "void is not a value type"),
                            );
                            Ty::Error
                        } else {
                            if !self.env.assignable(&value.ty, &declared_ty) {
                                self.sink.report(type_mismatch(
                                    value.span,
                                    &declared_ty.to_string(),
                                    &value.ty.to_string(),
                                    "initializer",
                                ));
                            }
                            declared_ty
                        }
                    }
                    None => value.ty.clone(),
                };
                let slot = self.declare(&name.name, local_ty, name.span, false);
                (Some(HStmt::Local { slot, init: value }), true)
            }
            StmtKind::Expr(expr) => (Some(HStmt::Expr(self.check_statement_expr(expr))), true),
            StmtKind::Return(value) => (Some(self.check_return(value.as_ref(), stmt)), false),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.check_condition(cond);
                let (then_branch, then_completes) = self.check_branch(then_branch, reachable);
                let (else_branch, else_completes) = match else_branch {
                    Some(branch) => self.check_branch(branch, reachable),
                    None => (Vec::new(), true),
                };
                let hir = HStmt::If {
                    cond,
                    then_branch,
                    else_branch,
                };
                (Some(hir), then_completes || else_completes)
            }
            StmtKind::While { cond, body } => {
                let cond = self.check_condition(cond);
                let endless = matches!(cond.kind, HExprKind::Bool(true));
                let (body, _) = self.check_branch(body, reachable);
                (Some(HStmt::While { cond, body }), !endless)
            }
        }
    }

    /// The body of an `if`, `else` or `while` gets its own scope.
    fn check_branch(&mut self, stmt: &Stmt, reachable: bool) -> (Vec<HStmt>, bool) {
        self.push_scope();
        let (hir, completes) = self.check_stmt(stmt, reachable);
        self.pop_scope();
        let stmts = match hir {
            Some(HStmt::Block(stmts)) => stmts,
            Some(other) => vec![other],
            None => Vec::new(),
        };
        (stmts, completes)
    }

    pub(super) fn check_condition(&mut self, cond: &Expr) -> HExpr {
        let value = self.check_value(cond);
        if !self.env.assignable(&value.ty, &Ty::Bool) {
            self.sink.report(type_mismatch(
                value.span,
                "bool",
                &value.ty.to_string(),
                "condition must be a boolean",
            ));
        }
        value
    }

    /// Only calls and assignments may stand alone as statements.
    fn check_statement_expr(&mut self, expr: &Expr) -> HExpr {
        if !matches!(expr.kind, ExprKind::Call { .. } | ExprKind::Assign { .. }) {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2021)
                    .with_message(
                        "only assignment and call expressions can be used as a statement",
                    )
                    .with_label(expr.span, "value is discarded"),
            );
        }
        self.check_expr(expr)
    }

    /// `=> expr;` method body.
    pub(super) fn check_expression_body(&mut self, expr: &Expr) -> HStmt {
        if self.ret.is_void() {
            return HStmt::Expr(self.check_statement_expr(expr));
        }
        let value = self.check_value(expr);
        self.check_returned(&value);
        HStmt::Return(Some(value))
    }

    fn check_return(&mut self, value: Option<&Expr>, stmt: &Stmt) -> HStmt {
        match value {
            None => {
                if !self.ret.is_void() && !self.ret.is_error() {
                    self.sink.report(
                        Diagnostic::error(ErrorCode::E2014)
                            .with_message(format!(
                                "an expression of type `{}` is expected after `return`",
                                self.ret
                            ))
                            .with_label(stmt.span, "missing return value"),
                    );
                }
                HStmt::Return(None)
            }
            Some(expr) if self.ret.is_void() => {
                let value = self.check_expr(expr);
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2014)
                        .with_message("a method returning `void` cannot return a value")
                        .with_label(value.span, "unexpected return value"),
                );
                HStmt::Return(None)
            }
            Some(expr) => {
                let value = self.check_value(expr);
                self.check_returned(&value);
                HStmt::Return(Some(value))
            }
        }
    }

    fn check_returned(&mut self, value: &HExpr) {
        if !self.env.assignable(&value.ty, &self.ret) {
            self.sink.report(type_mismatch(
                value.span,
                &self.ret.to_string(),
                &value.ty.to_string(),
                "returned value",
            ));
        }
    }
}
