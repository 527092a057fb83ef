//! Pass 3: field initializers and method bodies.

mod expr;
mod stmt;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{MethodBody, Span, TypeDeclKind};
use kiln_stack::ensure_sufficient_stack;
use tracing::debug;

use super::{DeclInfo, Env, FieldInfo, MethodInfo, ModuleChecker, Sink};
use crate::hir::{HField, HMethod, HStmt, HType};
use crate::metadata::{TypeKind, Visibility};
use crate::ty::Ty;

struct LocalInfo {
    name: String,
    ty: Ty,
    span: Span,
    used: bool,
    is_param: bool,
}

/// Checks the code of one method or field initializer.
pub(crate) struct BodyChecker<'a, 'u> {
    env: &'a Env<'u>,
    sink: &'a mut Sink,
    decl: &'a DeclInfo<'u>,
    is_static: bool,
    ret: Ty,
    locals: Vec<LocalInfo>,
    scopes: Vec<Vec<u32>>,
}

impl<'a, 'u> BodyChecker<'a, 'u> {
    fn new(env: &'a Env<'u>, sink: &'a mut Sink, decl: &'a DeclInfo<'u>, is_static: bool, ret: Ty) -> Self {
        BodyChecker {
            env,
            sink,
            decl,
            is_static,
            ret,
            locals: Vec::new(),
            scopes: vec![Vec::new()],
        }
    }

    fn this_ty(&self) -> Ty {
        Ty::Named(self.decl.full_name.clone())
    }

    fn push_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Close a scope, warning about locals that were never read.
    fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for slot in scope {
            let local = &self.locals[slot as usize];
            if !local.used && !local.is_param {
                let diag = Diagnostic::warning(ErrorCode::E2100)
                    .with_message(format!(
                        "the variable `{}` is assigned but its value is never used",
                        local.name
                    ))
                    .with_label(local.span, "unused variable");
                self.sink.report(diag);
            }
        }
    }

    fn find_local(&self, name: &str) -> Option<u32> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .copied()
            .find(|&slot| self.locals[slot as usize].name == name)
    }

    /// Allocate a slot. Names may not shadow any local or parameter in an
    /// enclosing scope.
    fn declare(&mut self, name: &str, ty: Ty, span: Span, is_param: bool) -> u32 {
        let duplicate = self.find_local(name).is_some();
        if duplicate && !is_param {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2005)
                    .with_message(format!(
                        "a local variable or parameter named `{name}` is already defined in this scope"
                    ))
                    .with_label(span, "redefined here"),
            );
        }
        let slot = u32::try_from(self.locals.len()).unwrap_or(u32::MAX);
        self.locals.push(LocalInfo {
            name: name.to_string(),
            ty,
            span,
            used: false,
            is_param,
        });
        if !duplicate {
            if let Some(scope) = self.scopes.last_mut() {
                scope.push(slot);
            }
        }
        slot
    }

    fn local(&mut self, slot: u32) -> &mut LocalInfo {
        &mut self.locals[slot as usize]
    }

    /// Close the outermost scope and return the slot types.
    fn finish(mut self) -> Vec<Ty> {
        while !self.scopes.is_empty() {
            self.pop_scope();
        }
        self.locals.into_iter().map(|l| l.ty).collect()
    }

    fn check_method_body(&mut self, method: &MethodInfo<'u>) -> Option<Vec<HStmt>> {
        let body = method.decl.body.as_ref()?;
        let (stmts, completes) = match body {
            MethodBody::Block(block) => self.check_block(&block.stmts, true),
            MethodBody::Expr(expr) => (vec![self.check_expression_body(expr)], false),
        };
        if completes && !self.ret.is_void() && !self.ret.is_error() {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2007)
                    .with_message(format!(
                        "`{}.{}`: not all code paths return a value",
                        self.decl.decl.name, method.sig.name
                    ))
                    .with_label(method.decl.name.span, "control can reach the end of this method"),
            );
        }
        Some(stmts)
    }
}

impl ModuleChecker<'_> {
    pub(super) fn check_bodies(&mut self) -> Vec<HType> {
        let env = &self.env;
        let sink = &mut self.sink;
        let mut types = Vec::new();
        for decl in env.decls.iter().filter(|d| !d.duplicate) {
            types.push(ensure_sufficient_stack(|| check_type(env, sink, decl)));
        }
        debug!(types = types.len(), "body checking complete");
        types
    }
}

fn check_type<'u>(env: &Env<'u>, sink: &mut Sink, decl: &DeclInfo<'u>) -> HType {
    let kind = match decl.decl.kind {
        TypeDeclKind::Class => TypeKind::Class,
        TypeDeclKind::Interface => TypeKind::Interface,
    };
    let fields = decl
        .fields
        .iter()
        .map(|field| check_field(env, sink, decl, field))
        .collect();
    let methods = decl
        .methods
        .iter()
        .map(|method| check_method(env, sink, decl, method, kind))
        .collect();
    HType {
        full_name: decl.full_name.clone(),
        kind,
        is_static: decl.is_static(),
        is_public: env
            .table
            .get(&decl.full_name)
            .is_some_and(|e| e.meta.visibility == Visibility::Public),
        interfaces: env.table.all_interfaces(&decl.full_name),
        fields,
        methods,
    }
}

fn check_field<'u>(env: &Env<'u>, sink: &mut Sink, decl: &DeclInfo<'u>, field: &FieldInfo<'u>) -> HField {
    let name = field.decl.name.name.clone();
    let init = match &field.decl.init {
        Some(expr) => {
            let mut checker = BodyChecker::new(env, sink, decl, field.is_static, Ty::Void);
            let value = checker.check_value(expr);
            if !env.assignable(&value.ty, &field.ty) {
                checker.sink.report(kiln_diagnostic::type_mismatch(
                    value.span,
                    &field.ty.to_string(),
                    &value.ty.to_string(),
                    "field initializer",
                ));
            }
            Some(value)
        }
        None => {
            if let Ty::Named(type_name) = &field.ty {
                sink.report(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(format!(
                            "field `{name}` of type `{type_name}` has no default value and must be initialized"
                        ))
                        .with_label(field.decl.name.span, "missing initializer"),
                );
            }
            None
        }
    };
    HField {
        name,
        ty: field.ty.clone(),
        is_static: field.is_static,
        init,
    }
}

fn check_method<'u>(
    env: &Env<'u>,
    sink: &mut Sink,
    decl: &DeclInfo<'u>,
    method: &MethodInfo<'u>,
    kind: TypeKind,
) -> HMethod {
    let sig = &method.sig;
    let mut checker = BodyChecker::new(env, sink, decl, sig.is_static, sig.ret.clone());
    for (param, ty) in method.decl.params.iter().zip(&sig.params) {
        checker.declare(&param.name.name, ty.clone(), param.name.span, true);
    }
    let body = if kind == TypeKind::Interface {
        None
    } else {
        checker.check_method_body(method)
    };
    HMethod {
        name: sig.name.clone(),
        params: sig.params.clone(),
        ret: sig.ret.clone(),
        is_static: sig.is_static,
        is_public: sig.visibility == Visibility::Public,
        locals: checker.finish(),
        body,
    }
}

