//! Name resolution and type checking.
//!
//! Checking runs in passes over one unit:
//!
//! 1. registration: collect namespaces, usings and type declarations
//! 2. signatures: resolve bases, fields and method signatures, then check
//!    declaration rules (modifiers, interface implementation)
//! 3. bodies: check field initializers and method bodies into HIR
//!
//! The environment ([`Env`]) is frozen after pass 2; body checking only
//! writes to the [`Sink`].

mod api;
mod bodies;
mod registration;
mod signatures;

pub use api::{check, CheckOptions, CheckOutput};

use rustc_hash::{FxHashMap, FxHashSet};

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{FieldDecl, MethodDecl, Modifiers, PredefinedType, Span, TypeDecl, TypeRef};

use crate::metadata::{MethodSig, Visibility};
use crate::table::{qualify, SymbolTable};
use crate::ty::Ty;

/// A `using` directive.
pub(crate) struct UsingInfo {
    pub namespace: String,
    pub span: Span,
    /// False for unknown namespaces and repeated directives.
    pub valid: bool,
}

/// Lexical position of a type declaration.
pub(crate) struct DeclContext {
    pub namespace: String,
    /// Indices into [`Env::usings`], innermost scope first.
    pub using_scopes: Vec<Vec<usize>>,
}

pub(crate) struct FieldInfo<'u> {
    pub decl: &'u FieldDecl,
    pub ty: Ty,
    pub is_static: bool,
    pub visibility: Visibility,
}

pub(crate) struct MethodInfo<'u> {
    pub decl: &'u MethodDecl,
    pub sig: MethodSig,
}

pub(crate) struct DeclInfo<'u> {
    pub decl: &'u TypeDecl,
    pub full_name: String,
    pub ctx: usize,
    /// Full name already taken; the declaration is otherwise ignored.
    pub duplicate: bool,
    /// Directly listed interfaces.
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldInfo<'u>>,
    pub methods: Vec<MethodInfo<'u>>,
}

impl<'u> DeclInfo<'u> {
    pub fn field(&self, name: &str) -> Option<(u32, &FieldInfo<'u>)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.decl.name.name == name)
            .and_then(|(i, f)| Some((u32::try_from(i).ok()?, f)))
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo<'u>> {
        self.methods.iter().find(|m| m.sig.name == name)
    }

    pub fn is_static(&self) -> bool {
        self.decl.modifiers.contains(Modifiers::STATIC)
    }
}

/// Everything known about the unit's declarations.
pub(crate) struct Env<'u> {
    pub table: SymbolTable,
    pub usings: Vec<UsingInfo>,
    pub contexts: Vec<DeclContext>,
    pub decls: Vec<DeclInfo<'u>>,
    pub by_name: FxHashMap<String, usize>,
}

/// Mutable state shared by all passes.
#[derive(Default)]
pub(crate) struct Sink {
    pub diagnostics: Vec<Diagnostic>,
    pub used_usings: FxHashSet<usize>,
    missing_core: FxHashSet<PredefinedType>,
}

impl Sink {
    pub fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// Report a predefined type used without the core library, once per type.
    pub fn require_core(&mut self, table: &SymbolTable, ty: PredefinedType, span: Span) {
        if table.has_core() || !self.missing_core.insert(ty) {
            return;
        }
        self.report(
            Diagnostic::error(ErrorCode::E2018)
                .with_message(format!(
                    "predefined type `{}` is not defined or imported",
                    ty.core_name()
                ))
                .with_label(span, format!("`{}` needs the core library", ty.keyword()))
                .with_suggestion("add the core library to the references"),
        );
    }
}

/// Result of looking a type name up from a declaration context.
pub(crate) enum TypeLookup {
    Found(String),
    Ambiguous(Vec<String>),
    NotFound,
}

/// `"A.B"` yields `"A.B"`, `"A"`, `""`.
fn namespace_chain(namespace: &str) -> Vec<&str> {
    let mut chain = Vec::new();
    let mut current = namespace;
    while !current.is_empty() {
        chain.push(current);
        current = current.rsplit_once('.').map_or("", |(parent, _)| parent);
    }
    chain.push("");
    chain
}

impl<'u> Env<'u> {
    /// Look up a type by (possibly dotted) name: enclosing namespaces first,
    /// innermost outward, then the `using` directives in scope (simple names
    /// only).
    pub fn lookup_type(&self, sink: &mut Sink, ctx: usize, dotted: &str) -> TypeLookup {
        let ctx = &self.contexts[ctx];
        for namespace in namespace_chain(&ctx.namespace) {
            let full = qualify(namespace, dotted);
            if self.table.get(&full).is_some() {
                return TypeLookup::Found(full);
            }
        }
        if dotted.contains('.') {
            return TypeLookup::NotFound;
        }
        for scope in &ctx.using_scopes {
            let mut found: Vec<String> = Vec::new();
            for &index in scope {
                let using = &self.usings[index];
                if !using.valid {
                    continue;
                }
                if let Some(full) = self.table.lookup_in(&using.namespace, dotted) {
                    sink.used_usings.insert(index);
                    if !found.contains(&full) {
                        found.push(full);
                    }
                }
            }
            match found.len() {
                0 => {}
                1 => return TypeLookup::Found(found.remove(0)),
                _ => return TypeLookup::Ambiguous(found),
            }
        }
        TypeLookup::NotFound
    }

    /// Resolve a namespace name relative to the enclosing namespaces.
    pub fn lookup_namespace(&self, ctx: usize, dotted: &str) -> Option<String> {
        namespace_chain(&self.contexts[ctx].namespace)
            .into_iter()
            .map(|namespace| qualify(namespace, dotted))
            .find(|full| self.table.is_namespace(full))
    }

    /// Resolve a type as written in a declaration or local.
    pub fn resolve_type(&self, sink: &mut Sink, ctx: usize, ty: &TypeRef) -> Ty {
        match ty {
            TypeRef::Predefined { ty, span } => {
                sink.require_core(&self.table, *ty, *span);
                Ty::from_predefined(*ty)
            }
            TypeRef::Named(name) => {
                let dotted = name.to_dotted();
                match self.lookup_type(sink, ctx, &dotted) {
                    TypeLookup::Found(full) => {
                        Ty::from_core_name(&full).unwrap_or(Ty::Named(full))
                    }
                    TypeLookup::Ambiguous(candidates) => {
                        sink.report(ambiguous(name.span, &dotted, &candidates));
                        Ty::Error
                    }
                    TypeLookup::NotFound => {
                        sink.report(
                            Diagnostic::error(ErrorCode::E2002)
                                .with_message(format!(
                                    "the type or namespace name `{dotted}` could not be found"
                                ))
                                .with_label(name.span, "unknown type")
                                .with_note("are you missing a using directive or a reference?"),
                        );
                        Ty::Error
                    }
                }
            }
        }
    }

    /// True if a value of type `from` can be stored where `to` is expected.
    pub fn assignable(&self, from: &Ty, to: &Ty) -> bool {
        if from == to || from.is_error() || to.is_error() {
            return true;
        }
        match (from, to) {
            (Ty::Named(from), Ty::Named(to)) => self.table.implements(from, to),
            _ => false,
        }
    }

    pub fn decl_by_name(&self, full_name: &str) -> Option<&DeclInfo<'u>> {
        self.by_name.get(full_name).map(|&index| &self.decls[index])
    }
}

pub(crate) fn ambiguous(span: Span, name: &str, candidates: &[String]) -> Diagnostic {
    let listed: Vec<String> = candidates.iter().map(|c| format!("`{c}`")).collect();
    Diagnostic::error(ErrorCode::E2024)
        .with_message(format!(
            "`{name}` is ambiguous between {}",
            listed.join(" and ")
        ))
        .with_label(span, "ambiguous reference")
        .with_suggestion("use the fully qualified name")
}

/// Member visibility from modifiers; `default` applies when none is given.
pub(crate) fn visibility_of(modifiers: Modifiers, default: Visibility) -> Visibility {
    if modifiers.contains(Modifiers::PUBLIC) {
        Visibility::Public
    } else if modifiers.contains(Modifiers::INTERNAL) {
        Visibility::Internal
    } else if modifiers.contains(Modifiers::PRIVATE) {
        Visibility::Private
    } else {
        default
    }
}

/// State threaded through all passes.
pub(crate) struct ModuleChecker<'u> {
    pub env: Env<'u>,
    pub sink: Sink,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
