//! Expressions: names, member access, calls and operators.

use kiln_diagnostic::{type_mismatch, unknown_identifier, Diagnostic, ErrorCode};
use kiln_ir::{AssignOp, BinaryOp, Expr, ExprKind, Ident, PredefinedType, Span, UnaryOp};
use kiln_stack::ensure_sufficient_stack;

use super::BodyChecker;
use crate::check::{ambiguous, FieldInfo, TypeLookup};
use crate::corelib::{Native, CORE_MODULE_NAME};
use crate::hir::{HBinOp, HExpr, HExprKind, HUnaryOp, Place};
use crate::metadata::{MethodSig, Visibility};
use crate::table::{qualify, Origin};
use crate::ty::Ty;

/// What a name or member access denotes.
enum Operand {
    Value(HExpr),
    Type(String),
    Namespace(String),
}

enum Callee {
    Static { type_name: String, sig: MethodSig },
    Virtual { receiver: HExpr, sig: MethodSig },
    Native { native: Native, sig: MethodSig },
}

impl Callee {
    fn sig(&self) -> &MethodSig {
        match self {
            Callee::Static { sig, .. } | Callee::Virtual { sig, .. } | Callee::Native { sig, .. } => sig,
        }
    }
}

fn no_member(span: Span, type_name: &str, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!("`{type_name}` does not contain a definition for `{name}`"))
        .with_label(span, "unknown member")
}

fn inaccessible(span: Span, owner: &str, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2010)
        .with_message(format!("`{owner}.{name}` is inaccessible due to its protection level"))
        .with_label(span, "not accessible here")
}

fn method_as_value(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!("method `{name}` cannot be used as a value"))
        .with_label(span, "method group")
        .with_suggestion("call the method with an argument list")
}

fn not_callable(span: Span, message: String) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2017)
        .with_message(message)
        .with_label(span, "not a method")
}

fn static_context(span: Span, what: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!("an object reference is required for the non-static {what}"))
        .with_label(span, "used from a static context")
}

fn through_instance(span: Span, what: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!("{what} cannot be accessed with an instance reference"))
        .with_label(span, "static member")
        .with_suggestion("qualify it with the type name instead")
}

fn lower_binary(op: BinaryOp) -> HBinOp {
    match op {
        BinaryOp::Or => HBinOp::Or,
        BinaryOp::And => HBinOp::And,
        BinaryOp::Eq => HBinOp::Eq,
        BinaryOp::NotEq => HBinOp::NotEq,
        BinaryOp::Lt => HBinOp::Lt,
        BinaryOp::LtEq => HBinOp::LtEq,
        BinaryOp::Gt => HBinOp::Gt,
        BinaryOp::GtEq => HBinOp::GtEq,
        BinaryOp::Add => HBinOp::Add,
        BinaryOp::Sub => HBinOp::Sub,
        BinaryOp::Mul => HBinOp::Mul,
        BinaryOp::Div => HBinOp::Div,
        BinaryOp::Rem => HBinOp::Rem,
    }
}

impl BodyChecker<'_, '_> {
    pub(super) fn check_expr(&mut self, expr: &Expr) -> HExpr {
        ensure_sufficient_stack(|| self.check_expr_inner(expr))
    }

    /// Check an expression whose value is used; `void` is rejected.
    pub(super) fn check_value(&mut self, expr: &Expr) -> HExpr {
        let value = self.check_expr(expr);
        if value.ty.is_void() {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2016)
                    .with_message("an expression of type `void` cannot be used as a value")
                    .with_label(value.span, "this returns nothing"),
            );
            return HExpr {
                ty: Ty::Error,
                ..value
            };
        }
        value
    }

    fn check_expr_inner(&mut self, expr: &Expr) -> HExpr {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Int(magnitude) => self.check_int(*magnitude, false, span),
            ExprKind::Bool(value) => {
                self.require_core(PredefinedType::Bool, span);
                HExpr::new(HExprKind::Bool(*value), Ty::Bool, span)
            }
            ExprKind::Str(value) => {
                self.require_core(PredefinedType::String, span);
                HExpr::new(HExprKind::Str(value.clone()), Ty::Str, span)
            }
            ExprKind::This => self.check_this(span),
            ExprKind::Name(_) | ExprKind::Member { .. } => {
                let operand = self.check_operand(expr);
                self.operand_value(operand, span)
            }
            ExprKind::Call { callee, args } => self.check_call(callee, args, span),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, span),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs, span),
            ExprKind::Assign { op, target, value } => self.check_assign(*op, target, value, span),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.check_conditional(cond, then_expr, else_expr, span),
            ExprKind::Paren(inner) => {
                let mut value = self.check_expr(inner);
                value.span = span;
                value
            }
        }
    }

    fn require_core(&mut self, ty: PredefinedType, span: Span) {
        self.sink.require_core(&self.env.table, ty, span);
    }

    fn check_int(&mut self, magnitude: u64, negated: bool, span: Span) -> HExpr {
        self.require_core(PredefinedType::Int, span);
        let value = i64::try_from(magnitude)
            .ok()
            .map(|m| if negated { -m } else { m })
            .and_then(|v| i32::try_from(v).ok());
        if let Some(value) = value {
            return HExpr::new(HExprKind::Int(value), Ty::Int, span);
        }
        let sign = if negated { "-" } else { "" };
        self.sink.report(
            Diagnostic::error(ErrorCode::E2020)
                .with_message(format!(
                    "integral constant `{sign}{magnitude}` is outside the range of type `int`"
                ))
                .with_label(span, "out of range")
                .with_note("`int` values range from -2147483648 to 2147483647"),
        );
        HExpr::error(span)
    }

    fn check_this(&mut self, span: Span) -> HExpr {
        if self.is_static {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2012)
                    .with_message("keyword `this` is not available in a static context")
                    .with_label(span, "no instance here"),
            );
            return HExpr::error(span);
        }
        HExpr::new(HExprKind::This, self.this_ty(), span)
    }

    fn operand_value(&mut self, operand: Operand, span: Span) -> HExpr {
        let (what, name) = match operand {
            Operand::Value(value) => return value,
            Operand::Type(name) => ("type", name),
            Operand::Namespace(name) => ("namespace", name),
        };
        self.sink.report(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("`{name}` is a {what}, which is not valid in this context"))
                .with_label(span, format!("expected a value, found a {what}")),
        );
        HExpr::error(span)
    }

    fn check_operand(&mut self, expr: &Expr) -> Operand {
        ensure_sufficient_stack(|| match &expr.kind {
            ExprKind::Name(ident) => self.check_name(ident),
            ExprKind::Member { target, name } => {
                let target = self.check_operand(target);
                self.check_member(target, name, expr.span)
            }
            _ => Operand::Value(self.check_expr(expr)),
        })
    }

    /// A simple name: local, field, type, then namespace.
    fn check_name(&mut self, ident: &Ident) -> Operand {
        let (name, span) = (ident.as_str(), ident.span);
        if let Some(slot) = self.find_local(name) {
            let local = self.local(slot);
            local.used = true;
            let ty = local.ty.clone();
            return Operand::Value(HExpr::new(HExprKind::Local(slot), ty, span));
        }
        let decl = self.decl;
        if let Some((index, field)) = decl.field(name) {
            return Operand::Value(self.field_of_this(index, field, span));
        }
        if decl.method(name).is_some() {
            self.sink.report(method_as_value(span, name));
            return Operand::Value(HExpr::error(span));
        }
        match self.env.lookup_type(self.sink, decl.ctx, name) {
            TypeLookup::Found(full) => return Operand::Type(full),
            TypeLookup::Ambiguous(candidates) => {
                self.sink.report(ambiguous(span, name, &candidates));
                return Operand::Value(HExpr::error(span));
            }
            TypeLookup::NotFound => {}
        }
        if let Some(namespace) = self.env.lookup_namespace(decl.ctx, name) {
            return Operand::Namespace(namespace);
        }
        self.sink.report(unknown_identifier(span, name));
        Operand::Value(HExpr::error(span))
    }

    /// A field of the current type named without a receiver.
    fn field_of_this(&mut self, index: u32, field: &FieldInfo<'_>, span: Span) -> HExpr {
        let ty = field.ty.clone();
        if field.is_static {
            let type_name = self.decl.full_name.clone();
            return HExpr::new(HExprKind::StaticField { type_name, index }, ty, span);
        }
        if self.is_static {
            let what = format!("field `{}.{}`", self.decl.decl.name, field.decl.name);
            self.sink.report(static_context(span, &what));
            return HExpr::error(span);
        }
        let receiver = HExpr::new(HExprKind::This, self.this_ty(), span);
        HExpr::new(
            HExprKind::Field {
                receiver: Box::new(receiver),
                index,
            },
            ty,
            span,
        )
    }

    fn accessible(&self, owner: &str, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Internal => self.env.table.get(owner).is_some_and(|e| e.is_local()),
            Visibility::Private => owner == self.decl.full_name,
        }
    }

    fn check_member(&mut self, target: Operand, name: &Ident, span: Span) -> Operand {
        match target {
            Operand::Namespace(namespace) => {
                let full = qualify(&namespace, name.as_str());
                if self.env.table.get(&full).is_some() {
                    Operand::Type(full)
                } else if self.env.table.is_namespace(&full) {
                    Operand::Namespace(full)
                } else {
                    self.sink.report(
                        Diagnostic::error(ErrorCode::E2002)
                            .with_message(format!(
                                "the type or namespace name `{name}` does not exist in the namespace `{namespace}`"
                            ))
                            .with_label(name.span, "not found")
                            .with_note("are you missing a reference?"),
                    );
                    Operand::Value(HExpr::error(span))
                }
            }
            Operand::Type(type_name) => {
                let env = self.env;
                if let Some((index, field)) = env.decl_by_name(&type_name).and_then(|d| d.field(name.as_str())) {
                    if !self.accessible(&type_name, field.visibility) {
                        self.sink.report(inaccessible(name.span, &type_name, name.as_str()));
                    } else if field.is_static {
                        let kind = HExprKind::StaticField { type_name, index };
                        return Operand::Value(HExpr::new(kind, field.ty.clone(), span));
                    } else {
                        let what = format!("field `{type_name}.{name}`");
                        self.sink.report(static_context(name.span, &what));
                    }
                } else if env.table.find_method(&type_name, name.as_str()).is_some() {
                    self.sink.report(method_as_value(name.span, name.as_str()));
                } else {
                    self.sink.report(no_member(name.span, &type_name, name.as_str()));
                }
                Operand::Value(HExpr::error(span))
            }
            Operand::Value(value) => Operand::Value(self.member_of_value(value, name, span)),
        }
    }

    fn member_of_value(&mut self, value: HExpr, name: &Ident, span: Span) -> HExpr {
        let type_name = match &value.ty {
            Ty::Error => return HExpr::error(span),
            Ty::Named(type_name) => type_name.clone(),
            other => {
                self.sink.report(no_member(name.span, &other.to_string(), name.as_str()));
                return HExpr::error(span);
            }
        };
        let env = self.env;
        if let Some((index, field)) = env.decl_by_name(&type_name).and_then(|d| d.field(name.as_str())) {
            if !self.accessible(&type_name, field.visibility) {
                self.sink.report(inaccessible(name.span, &type_name, name.as_str()));
            } else if field.is_static {
                let what = format!("static field `{type_name}.{name}`");
                self.sink.report(through_instance(name.span, &what));
            } else {
                let kind = HExprKind::Field {
                    receiver: Box::new(value),
                    index,
                };
                return HExpr::new(kind, field.ty.clone(), span);
            }
        } else if env.table.find_method(&type_name, name.as_str()).is_some() {
            self.sink.report(method_as_value(name.span, name.as_str()));
        } else {
            self.sink.report(no_member(name.span, &type_name, name.as_str()));
        }
        HExpr::error(span)
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> HExpr {
        let target = self.resolve_callee(callee);
        let args: Vec<HExpr> = args.iter().map(|arg| self.check_value(arg)).collect();
        let Some(target) = target else {
            return HExpr::error(span);
        };
        let sig = target.sig();
        let ret = sig.ret.clone();
        if args.len() != sig.params.len() {
            let expected = sig.params.len();
            let plural = if expected == 1 { "" } else { "s" };
            let were = if args.len() == 1 { "was" } else { "were" };
            self.sink.report(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "method `{}` takes {expected} argument{plural} but {} {were} supplied",
                        sig.name,
                        args.len()
                    ))
                    .with_label(span, "wrong number of arguments")
                    .with_note(format!("the method is declared as `{sig}`")),
            );
            return HExpr::new(HExprKind::Error, ret, span);
        }
        for (position, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            if !self.env.assignable(&arg.ty, param) {
                self.sink.report(type_mismatch(
                    arg.span,
                    &param.to_string(),
                    &arg.ty.to_string(),
                    &format!("argument {}", position + 1),
                ));
            }
        }
        let kind = match target {
            Callee::Static { type_name, sig } => HExprKind::CallStatic {
                type_name,
                method: sig.name,
                args,
            },
            Callee::Virtual { receiver, sig } => HExprKind::CallVirtual {
                receiver: Box::new(receiver),
                method: sig.name,
                args,
            },
            Callee::Native { native, .. } => HExprKind::CallNative { native, args },
        };
        HExpr::new(kind, ret, span)
    }

    fn resolve_callee(&mut self, callee: &Expr) -> Option<Callee> {
        match &callee.kind {
            ExprKind::Name(ident) => self.callee_by_name(ident),
            ExprKind::Member { target, name } => {
                let target = self.check_operand(target);
                self.callee_on(target, name)
            }
            _ => {
                let value = self.check_expr(callee);
                if !value.ty.is_error() {
                    self.sink.report(not_callable(
                        callee.span,
                        format!("an expression of type `{}` is not callable", value.ty),
                    ));
                }
                None
            }
        }
    }

    /// `Name(...)`: a method of the current type.
    fn callee_by_name(&mut self, ident: &Ident) -> Option<Callee> {
        let (name, span) = (ident.as_str(), ident.span);
        let decl = self.decl;
        if self.find_local(name).is_some() {
            self.sink.report(not_callable(span, format!("`{name}` is a variable, not a method")));
            return None;
        }
        if decl.field(name).is_some() {
            self.sink.report(not_callable(span, format!("`{name}` is a field, not a method")));
            return None;
        }
        if let Some(method) = decl.method(name) {
            let sig = method.sig.clone();
            if sig.is_static {
                let type_name = decl.full_name.clone();
                return Some(Callee::Static { type_name, sig });
            }
            if self.is_static {
                let what = format!("method `{}.{name}`", decl.decl.name);
                self.sink.report(static_context(span, &what));
                return None;
            }
            let receiver = HExpr::new(HExprKind::This, self.this_ty(), span);
            return Some(Callee::Virtual { receiver, sig });
        }
        match self.env.lookup_type(self.sink, decl.ctx, name) {
            TypeLookup::Found(full) => {
                self.sink.report(not_callable(span, format!("`{full}` is a type, not a method")));
            }
            TypeLookup::Ambiguous(candidates) => {
                self.sink.report(ambiguous(span, name, &candidates));
            }
            TypeLookup::NotFound => self.sink.report(unknown_identifier(span, name)),
        }
        None
    }

    /// `target.Name(...)`.
    fn callee_on(&mut self, target: Operand, name: &Ident) -> Option<Callee> {
        let span = name.span;
        match target {
            Operand::Namespace(namespace) => {
                let full = qualify(&namespace, name.as_str());
                if self.env.table.get(&full).is_some() || self.env.table.is_namespace(&full) {
                    self.sink.report(not_callable(span, format!("`{full}` is not a method")));
                } else {
                    self.sink.report(
                        Diagnostic::error(ErrorCode::E2002)
                            .with_message(format!(
                                "the type or namespace name `{name}` does not exist in the namespace `{namespace}`"
                            ))
                            .with_label(span, "not found"),
                    );
                }
                None
            }
            Operand::Type(type_name) => {
                let (owner, sig) = self.find_method(&type_name, name)?;
                if !sig.is_static {
                    let what = format!("method `{type_name}.{name}`");
                    self.sink.report(static_context(span, &what));
                    return None;
                }
                let from_core = self
                    .env
                    .table
                    .get(&owner)
                    .is_some_and(|e| e.origin == Origin::Reference(CORE_MODULE_NAME.to_string()));
                if from_core {
                    if let Some(native) = Native::lookup(&owner, &sig.name) {
                        return Some(Callee::Native { native, sig });
                    }
                }
                Some(Callee::Static {
                    type_name: owner,
                    sig,
                })
            }
            Operand::Value(receiver) => {
                let type_name = match &receiver.ty {
                    Ty::Error => return None,
                    Ty::Named(type_name) => type_name.clone(),
                    other => {
                        self.sink.report(no_member(span, &other.to_string(), name.as_str()));
                        return None;
                    }
                };
                let (_, sig) = self.find_method(&type_name, name)?;
                if sig.is_static {
                    let what = format!("static method `{type_name}.{name}`");
                    self.sink.report(through_instance(span, &what));
                    return None;
                }
                Some(Callee::Virtual { receiver, sig })
            }
        }
    }

    /// Look up an accessible method, reporting why when there is none.
    fn find_method(&mut self, type_name: &str, name: &Ident) -> Option<(String, MethodSig)> {
        let found = self
            .env
            .table
            .find_method(type_name, name.as_str())
            .map(|(owner, sig)| (owner, sig.clone()));
        let Some((owner, sig)) = found else {
            let is_field = self
                .env
                .decl_by_name(type_name)
                .is_some_and(|d| d.field(name.as_str()).is_some());
            if is_field {
                self.sink.report(not_callable(
                    name.span,
                    format!("`{type_name}.{name}` is a field, not a method"),
                ));
            } else {
                self.sink.report(no_member(name.span, type_name, name.as_str()));
            }
            return None;
        };
        if !self.accessible(&owner, sig.visibility) {
            self.sink.report(inaccessible(name.span, &owner, name.as_str()));
            return None;
        }
        Some((owner, sig))
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> HExpr {
        if let (UnaryOp::Neg, ExprKind::Int(magnitude)) = (op, &operand.kind) {
            return self.check_int(*magnitude, true, span);
        }
        let value = self.check_value(operand);
        let (hop, ty) = match op {
            UnaryOp::Neg => (HUnaryOp::Neg, Ty::Int),
            UnaryOp::Not => (HUnaryOp::Not, Ty::Bool),
        };
        if !self.env.assignable(&value.ty, &ty) {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "operator `{}` cannot be applied to an operand of type `{}`",
                        op.symbol(),
                        value.ty
                    ))
                    .with_label(value.span, format!("expected `{ty}`")),
            );
        }
        let kind = HExprKind::Unary {
            op: hop,
            operand: Box::new(value),
        };
        HExpr::new(kind, ty, span)
    }

    /// Operator and result type for `l op r`, or `None` if the operands do
    /// not fit.
    fn binary_result(&self, op: BinaryOp, l: &Ty, r: &Ty) -> Option<(HBinOp, Ty)> {
        let ints = matches!((l, r), (Ty::Int | Ty::Error, Ty::Int | Ty::Error));
        let bools = matches!((l, r), (Ty::Bool | Ty::Error, Ty::Bool | Ty::Error));
        let hop = lower_binary(op);
        match op {
            BinaryOp::Add => {
                let concat = matches!(
                    (l, r),
                    (Ty::Str, Ty::Int | Ty::Bool | Ty::Str | Ty::Error)
                        | (Ty::Int | Ty::Bool | Ty::Error, Ty::Str)
                );
                if concat {
                    Some((HBinOp::Concat, Ty::Str))
                } else {
                    ints.then_some((hop, Ty::Int))
                }
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                ints.then_some((hop, Ty::Int))
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                ints.then_some((hop, Ty::Bool))
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                let comparable = l.is_error()
                    || r.is_error()
                    || (l == r && l.is_primitive_value())
                    || (l.as_named().is_some()
                        && r.as_named().is_some()
                        && (self.env.assignable(l, r) || self.env.assignable(r, l)));
                comparable.then_some((hop, Ty::Bool))
            }
            BinaryOp::And | BinaryOp::Or => bools.then_some((hop, Ty::Bool)),
        }
    }

    fn check_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, span: Span) -> HExpr {
        let lhs = self.check_value(lhs);
        let rhs = self.check_value(rhs);
        let (hop, ty) = match self.binary_result(op, &lhs.ty, &rhs.ty) {
            Some(result) => result,
            None => {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(format!(
                            "operator `{}` cannot be applied to operands of type `{}` and `{}`",
                            op.symbol(),
                            lhs.ty,
                            rhs.ty
                        ))
                        .with_label(span, "invalid operands"),
                );
                let ty = match op {
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                        Ty::Error
                    }
                    _ => Ty::Bool,
                };
                (lower_binary(op), ty)
            }
        };
        let kind = HExprKind::Binary {
            op: hop,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
        HExpr::new(kind, ty, span)
    }

    fn check_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, span: Span) -> HExpr {
        let place = self.check_place(target);
        let value = self.check_value(value);
        let Some((place, ty)) = place else {
            return HExpr::error(span);
        };
        let compound = match op.binary_op() {
            None => {
                if !self.env.assignable(&value.ty, &ty) {
                    self.sink.report(type_mismatch(
                        value.span,
                        &ty.to_string(),
                        &value.ty.to_string(),
                        "assigned value",
                    ));
                }
                None
            }
            Some(bop) => match self.binary_result(bop, &ty, &value.ty) {
                Some((hop, result)) if self.env.assignable(&result, &ty) => Some(hop),
                _ => {
                    self.sink.report(
                        Diagnostic::error(ErrorCode::E2001)
                            .with_message(format!(
                                "operator `{}` cannot be applied to operands of type `{ty}` and `{}`",
                                op.symbol(),
                                value.ty
                            ))
                            .with_label(span, "invalid operands"),
                    );
                    None
                }
            },
        };
        let kind = HExprKind::Assign {
            place,
            op: compound,
            value: Box::new(value),
        };
        HExpr::new(kind, ty, span)
    }

    fn check_place(&mut self, target: &Expr) -> Option<(Place, Ty)> {
        let target = target.unparenthesized();
        let operand = match &target.kind {
            ExprKind::Name(ident) => {
                if let Some(slot) = self.find_local(ident.as_str()) {
                    let ty = self.local(slot).ty.clone();
                    return Some((Place::Local(slot), ty));
                }
                self.check_name(ident)
            }
            ExprKind::Member { target: inner, name } => {
                let inner = self.check_operand(inner);
                self.check_member(inner, name, target.span)
            }
            _ => Operand::Value(self.check_expr(target)),
        };
        match operand {
            Operand::Value(HExpr {
                kind: HExprKind::Field { receiver, index },
                ty,
                ..
            }) => Some((Place::Field { receiver, index }, ty)),
            Operand::Value(HExpr {
                kind: HExprKind::StaticField { type_name, index },
                ty,
                ..
            }) => Some((Place::StaticField { type_name, index }, ty)),
            Operand::Value(value) if value.ty.is_error() => None,
            _ => {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2011)
                        .with_message(
                            "the left-hand side of an assignment must be a variable or field",
                        )
                        .with_label(target.span, "cannot assign to this"),
                );
                None
            }
        }
    }

    fn check_conditional(&mut self, cond: &Expr, then_expr: &Expr, else_expr: &Expr, span: Span) -> HExpr {
        let cond = self.check_condition(cond);
        let then_value = self.check_value(then_expr);
        let else_value = self.check_value(else_expr);
        let ty = if !else_value.ty.is_error() && self.env.assignable(&then_value.ty, &else_value.ty) {
            else_value.ty.clone()
        } else if self.env.assignable(&else_value.ty, &then_value.ty) {
            then_value.ty.clone()
        } else {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "type of conditional expression cannot be determined because there is no conversion between `{}` and `{}`",
                        then_value.ty, else_value.ty
                    ))
                    .with_label(span, "branches have different types"),
            );
            Ty::Error
        };
        let kind = HExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_value),
            else_expr: Box::new(else_value),
        };
        HExpr::new(kind, ty, span)
    }
}
