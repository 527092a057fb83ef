//! Pass 1: namespaces, usings and type declarations.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{CompilationUnit, Modifiers, NamespaceMember, TypeDecl, TypeDeclKind, UsingDirective};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{visibility_of, DeclContext, DeclInfo, Env, ModuleChecker, Sink, UsingInfo};
use crate::metadata::{ModuleMetadata, TypeMetadata, Visibility};
use crate::table::{qualify, SymbolTable};

impl<'u> ModuleChecker<'u> {
    pub(super) fn new(references: &[ModuleMetadata]) -> Self {
        ModuleChecker {
            env: Env {
                table: SymbolTable::from_references(references),
                usings: Vec::new(),
                contexts: Vec::new(),
                decls: Vec::new(),
                by_name: FxHashMap::default(),
            },
            sink: Sink::default(),
        }
    }

    pub(super) fn register(&mut self, unit: &'u CompilationUnit) {
        let scope = self.register_usings(&unit.usings);
        self.register_members(&unit.members, "", &[scope]);
        self.validate_usings();
        debug!(
            types = self.env.decls.len(),
            usings = self.env.usings.len(),
            "registration complete"
        );
    }

    /// Record one scope's usings; repeats within the scope are warned about
    /// and ignored.
    fn register_usings(&mut self, usings: &[UsingDirective]) -> Vec<usize> {
        let mut scope: Vec<usize> = Vec::new();
        for using in usings {
            let namespace = using.name.to_dotted();
            let repeated = scope
                .iter()
                .any(|&i| self.env.usings[i].namespace == namespace);
            if repeated {
                self.sink.report(
                    Diagnostic::new(ErrorCode::E2102)
                        .with_message(format!(
                            "the using directive for `{namespace}` appeared previously in this namespace"
                        ))
                        .with_label(using.span, "duplicate using directive"),
                );
            }
            self.env.usings.push(UsingInfo {
                namespace,
                span: using.span,
                valid: !repeated,
            });
            scope.push(self.env.usings.len() - 1);
        }
        scope
    }

    fn register_members(
        &mut self,
        members: &'u [NamespaceMember],
        namespace: &str,
        scopes: &[Vec<usize>],
    ) {
        for member in members {
            match member {
                NamespaceMember::Namespace(ns) => {
                    let full = qualify(namespace, &ns.name.to_dotted());
                    self.env.table.add_namespace(&full);
                    let mut inner = vec![self.register_usings(&ns.usings)];
                    inner.extend(scopes.iter().cloned());
                    self.register_members(&ns.members, &full, &inner);
                }
                NamespaceMember::Type(decl) => self.register_type(decl, namespace, scopes),
            }
        }
    }

    fn register_type(&mut self, decl: &'u TypeDecl, namespace: &str, scopes: &[Vec<usize>]) {
        let full_name = qualify(namespace, &decl.name.name);
        let mut meta = match decl.kind {
            TypeDeclKind::Class => TypeMetadata::class(full_name.clone()),
            TypeDeclKind::Interface => TypeMetadata::interface(full_name.clone()),
        };
        meta.visibility = visibility_of(decl.modifiers, Visibility::Internal);
        meta.is_static = decl.modifiers.contains(Modifiers::STATIC);
        meta.is_sealed = meta.is_static || decl.modifiers.contains(Modifiers::SEALED);

        let duplicate = !self.env.table.add_local(meta);
        if duplicate {
            let place = if namespace.is_empty() {
                "the global namespace".to_string()
            } else {
                format!("the namespace `{namespace}`")
            };
            self.sink.report(
                Diagnostic::error(ErrorCode::E2005)
                    .with_message(format!(
                        "{place} already contains a definition for `{}`",
                        decl.name
                    ))
                    .with_label(decl.name.span, "duplicate definition"),
            );
        }

        self.env.contexts.push(DeclContext {
            namespace: namespace.to_string(),
            using_scopes: scopes.to_vec(),
        });
        if !duplicate {
            self.env
                .by_name
                .insert(full_name.clone(), self.env.decls.len());
        }
        self.env.decls.push(DeclInfo {
            decl,
            full_name,
            ctx: self.env.contexts.len() - 1,
            duplicate,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });
    }

    /// Every using must name a known namespace. Runs after all local
    /// namespaces are registered.
    fn validate_usings(&mut self) {
        for using in &mut self.env.usings {
            if !using.valid || self.env.table.is_namespace(&using.namespace) {
                continue;
            }
            using.valid = false;
            let message = if self.env.table.get(&using.namespace).is_some() {
                format!(
                    "`{}` is a type, not a namespace; a using directive can only name a namespace",
                    using.namespace
                )
            } else {
                format!(
                    "the type or namespace name `{}` could not be found",
                    using.namespace
                )
            };
            self.sink.report(
                Diagnostic::error(ErrorCode::E2008)
                    .with_message(message)
                    .with_label(using.span, "unknown namespace")
                    .with_note("are you missing a reference?"),
            );
        }
    }

    /// Info for every valid using that resolved nothing.
    pub(super) fn report_unused_usings(&mut self) {
        for (index, using) in self.env.usings.iter().enumerate() {
            if using.valid && !self.sink.used_usings.contains(&index) {
                let diag = Diagnostic::info(ErrorCode::E2200)
                    .with_message(format!("using directive for `{}` is unnecessary", using.namespace))
                    .with_label(using.span, "unused");
                self.sink.report(diag);
            }
        }
    }
}
