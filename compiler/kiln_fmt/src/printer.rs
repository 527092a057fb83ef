//! Tree printer.
//!
//! Layout rules:
//! - braces on their own line, 4-space indentation
//! - one member per line, a blank line between members and between the
//!   using block and the declarations that follow it
//! - parentheses only where precedence requires them; `Paren` nodes from
//!   the source are dropped and re-derived

use kiln_ir::ast::{
    ASSIGN_PRECEDENCE, CONDITIONAL_PRECEDENCE, PRIMARY_PRECEDENCE, UNARY_PRECEDENCE,
};
use kiln_ir::{
    Block, CompilationUnit, Expr, ExprKind, FieldDecl, Member, MethodBody, MethodDecl, Modifiers,
    NamespaceDecl, NamespaceMember, Param, Stmt, StmtKind, TypeDecl, TypeRef, UsingDirective,
};
use kiln_stack::ensure_sufficient_stack;

use crate::emitter::Emitter;

/// Prints syntax trees into an [`Emitter`].
pub struct Printer<E: Emitter> {
    out: E,
    indent: usize,
}

impl<E: Emitter> Printer<E> {
    pub fn new(out: E) -> Self {
        Printer { out, indent: 0 }
    }

    pub fn finish(self) -> E {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.emit_indent(self.indent);
        self.out.emit(text);
        self.out.emit_newline();
    }

    fn open_brace(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close_brace(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    pub fn print_unit(&mut self, unit: &CompilationUnit) {
        self.print_scope(&unit.usings, &unit.members);
    }

    fn print_scope(&mut self, usings: &[UsingDirective], members: &[NamespaceMember]) {
        for using in usings {
            self.line(&format!("using {};", using.name));
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 || !usings.is_empty() {
                self.out.emit_newline();
            }
            match member {
                NamespaceMember::Namespace(ns) => self.print_namespace(ns),
                NamespaceMember::Type(ty) => self.print_type_decl(ty),
            }
        }
    }

    fn print_namespace(&mut self, ns: &NamespaceDecl) {
        self.line(&format!("namespace {}", ns.name));
        self.open_brace();
        self.print_scope(&ns.usings, &ns.members);
        self.close_brace();
    }

    pub fn print_type_decl(&mut self, decl: &TypeDecl) {
        let mut header = modifier_prefix(decl.modifiers);
        header.push_str(decl.kind.keyword());
        header.push(' ');
        header.push_str(decl.name.as_str());
        if !decl.bases.is_empty() {
            let bases: Vec<String> = decl.bases.iter().map(TypeRef::to_string).collect();
            header.push_str(" : ");
            header.push_str(&bases.join(", "));
        }
        self.line(&header);
        self.open_brace();
        for (i, member) in decl.members.iter().enumerate() {
            if i > 0 {
                self.out.emit_newline();
            }
            self.print_member(member);
        }
        self.close_brace();
    }

    pub fn print_member(&mut self, member: &Member) {
        match member {
            Member::Method(method) => self.print_method(method),
            Member::Field(field) => self.print_field(field),
        }
    }

    fn print_field(&mut self, field: &FieldDecl) {
        let mut text = modifier_prefix(field.modifiers);
        text.push_str(&format!("{} {}", field.ty, field.name));
        if let Some(init) = &field.init {
            text.push_str(" = ");
            text.push_str(&expr_to_string(init));
        }
        text.push(';');
        self.line(&text);
    }

    fn print_method(&mut self, method: &MethodDecl) {
        let params: Vec<String> = method.params.iter().map(param_to_string).collect();
        let mut signature = modifier_prefix(method.modifiers);
        signature.push_str(&format!(
            "{} {}({})",
            method.return_type,
            method.name,
            params.join(", ")
        ));
        match &method.body {
            None => self.line(&format!("{signature};")),
            Some(MethodBody::Expr(expr)) => {
                self.line(&format!("{signature} => {};", expr_to_string(expr)));
            }
            Some(MethodBody::Block(block)) => {
                self.line(&signature);
                self.print_block(block);
            }
        }
    }

    pub fn print_block(&mut self, block: &Block) {
        self.open_brace();
        for stmt in &block.stmts {
            self.print_stmt(stmt);
        }
        self.close_brace();
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.print_stmt_inner(stmt));
    }

    fn print_stmt_inner(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.print_block(block),
            StmtKind::Empty => self.line(";"),
            StmtKind::Expr(expr) => self.line(&format!("{};", expr_to_string(expr))),
            StmtKind::Return(None) => self.line("return;"),
            StmtKind::Return(Some(value)) => {
                self.line(&format!("return {};", expr_to_string(value)));
            }
            StmtKind::Local { ty, name, init } => {
                let ty = ty.as_ref().map_or_else(|| "var".to_string(), TypeRef::to_string);
                self.line(&format!("{ty} {name} = {};", expr_to_string(init)));
            }
            StmtKind::While { cond, body } => {
                self.line(&format!("while ({})", expr_to_string(cond)));
                self.print_branch(body);
            }
            StmtKind::If { .. } => self.print_if(stmt, ""),
        }
    }

    /// `if` chains print `else if` on one line.
    fn print_if(&mut self, stmt: &Stmt, prefix: &str) {
        let StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } = &stmt.kind
        else {
            return;
        };
        self.line(&format!("{prefix}if ({})", expr_to_string(cond)));
        match else_branch {
            None => self.print_branch(then_branch),
            Some(else_branch) => {
                // An open `if` in the then-branch would capture this `else`.
                if ends_with_open_if(then_branch) {
                    self.print_block(&Block::new(vec![then_branch.as_ref().clone()]));
                } else {
                    self.print_branch(then_branch);
                }
                if matches!(else_branch.kind, StmtKind::If { .. }) {
                    ensure_sufficient_stack(|| self.print_if(else_branch, "else "));
                } else {
                    self.line("else");
                    self.print_branch(else_branch);
                }
            }
        }
    }

    /// Body of `if`, `else` or `while`: blocks stay level, anything else
    /// is indented one step.
    fn print_branch(&mut self, stmt: &Stmt) {
        if matches!(stmt.kind, StmtKind::Block(_)) {
            self.print_stmt(stmt);
        } else {
            self.indent += 1;
            self.print_stmt(stmt);
            self.indent -= 1;
        }
    }
}

fn ends_with_open_if(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::If {
            else_branch: None, ..
        } => true,
        StmtKind::If {
            else_branch: Some(else_branch),
            ..
        } => ends_with_open_if(else_branch),
        StmtKind::While { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

fn modifier_prefix(modifiers: Modifiers) -> String {
    let mut text = String::new();
    for word in modifiers.keywords() {
        text.push_str(word);
        text.push(' ');
    }
    text
}

fn param_to_string(param: &Param) -> String {
    format!("{} {}", param.ty, param.name)
}

/// Print an expression on one line.
pub fn expr_to_string(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, ASSIGN_PRECEDENCE);
    out
}

/// Write `expr`, parenthesized if it binds looser than `min_prec`.
fn write_expr(out: &mut String, expr: &Expr, min_prec: u8) {
    ensure_sufficient_stack(|| {
        let expr = expr.unparenthesized();
        if expr.precedence() < min_prec {
            out.push('(');
            write_expr_kind(out, expr);
            out.push(')');
        } else {
            write_expr_kind(out, expr);
        }
    });
}

fn write_expr_kind(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Int(value) => out.push_str(&value.to_string()),
        ExprKind::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
        ExprKind::Str(value) => write_string_literal(out, value),
        ExprKind::Name(ident) => out.push_str(ident.as_str()),
        ExprKind::This => out.push_str("this"),
        ExprKind::Member { target, name } => {
            write_expr(out, target, PRIMARY_PRECEDENCE);
            out.push('.');
            out.push_str(name.as_str());
        }
        ExprKind::Call { callee, args } => {
            write_expr(out, callee, PRIMARY_PRECEDENCE);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg, ASSIGN_PRECEDENCE);
            }
            out.push(')');
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(op.symbol());
            write_expr(out, operand, UNARY_PRECEDENCE);
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let prec = op.precedence();
            write_expr(out, lhs, prec);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, rhs, prec + 1);
        }
        ExprKind::Assign { op, target, value } => {
            write_expr(out, target, CONDITIONAL_PRECEDENCE);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, value, ASSIGN_PRECEDENCE);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            write_expr(out, cond, CONDITIONAL_PRECEDENCE + 1);
            out.push_str(" ? ");
            write_expr(out, then_expr, ASSIGN_PRECEDENCE);
            out.push_str(" : ");
            write_expr(out, else_expr, CONDITIONAL_PRECEDENCE);
        }
        ExprKind::Paren(inner) => write_expr_kind(out, inner.unparenthesized()),
    }
}

fn write_string_literal(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
}
