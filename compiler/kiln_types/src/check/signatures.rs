//! Pass 2: bases, member signatures and declaration rules.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Member, Modifiers, Span, TypeDeclKind};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::{visibility_of, FieldInfo, MethodInfo, ModuleChecker};
use crate::metadata::{MethodSig, TypeKind, Visibility};
use crate::ty::Ty;

fn invalid_modifier(span: Span, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2023)
        .with_message(message)
        .with_label(span, "invalid modifier")
}

impl ModuleChecker<'_> {
    pub(super) fn collect_signatures(&mut self) {
        for index in 0..self.env.decls.len() {
            if !self.env.decls[index].duplicate {
                self.resolve_bases(index);
            }
        }
        for index in 0..self.env.decls.len() {
            if !self.env.decls[index].duplicate {
                self.resolve_members(index);
            }
        }
        debug!("signature collection complete");
        for index in 0..self.env.decls.len() {
            if !self.env.decls[index].duplicate {
                self.check_declaration(index);
            }
        }
    }

    fn resolve_bases(&mut self, index: usize) {
        let info = &self.env.decls[index];
        let (decl, ctx, full_name) = (info.decl, info.ctx, info.full_name.clone());
        let mut interfaces: Vec<String> = Vec::new();
        for base in &decl.bases {
            let ty = self.env.resolve_type(&mut self.sink, ctx, base);
            let Ty::Named(name) = ty else {
                if !ty.is_error() {
                    self.sink.report(not_an_interface(base.span(), &ty.to_string()));
                }
                continue;
            };
            if !self.env.table.is_interface(&name) {
                self.sink.report(not_an_interface(base.span(), &name));
            } else if interfaces.contains(&name) {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!("`{name}` is already listed in the interface list"))
                        .with_label(base.span(), "repeated interface"),
                );
            } else {
                interfaces.push(name);
            }
        }
        if let Some(entry) = self.env.table.get_mut(&full_name) {
            entry.meta.interfaces.clone_from(&interfaces);
        }
        self.env.decls[index].interfaces = interfaces;
    }

    fn resolve_members(&mut self, index: usize) {
        let info = &self.env.decls[index];
        let (decl, ctx, full_name) = (info.decl, info.ctx, info.full_name.clone());
        let is_interface = decl.kind == TypeDeclKind::Interface;
        let mut names: FxHashSet<&str> = FxHashSet::default();
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        for member in &decl.members {
            let name = member.name();
            if !names.insert(name.as_str()) {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!(
                            "type `{}` already defines a member called `{name}`",
                            decl.name
                        ))
                        .with_label(name.span, "duplicate member"),
                );
                continue;
            }
            if member_modifiers(member).contains(Modifiers::SEALED) {
                self.sink.report(invalid_modifier(
                    name.span,
                    "the modifier `sealed` is not valid on members",
                ));
            }
            match member {
                Member::Field(field) => {
                    let ty = self.env.resolve_type(&mut self.sink, ctx, &field.ty);
                    if ty.is_void() {
                        self.sink.report(void_declaration(field.ty.span(), "a field"));
                    }
                    if is_interface {
                        self.sink.report(
                            Diagnostic::error(ErrorCode::E2022)
                                .with_message("interfaces cannot contain fields")
                                .with_label(field.span, "field in interface"),
                        );
                        continue;
                    }
                    fields.push(FieldInfo {
                        decl: field,
                        ty: if ty.is_void() { Ty::Error } else { ty },
                        is_static: field.modifiers.contains(Modifiers::STATIC),
                        visibility: visibility_of(field.modifiers, Visibility::Private),
                    });
                }
                Member::Method(method) => {
                    let ret = self.env.resolve_type(&mut self.sink, ctx, &method.return_type);
                    let mut params = Vec::with_capacity(method.params.len());
                    let mut param_names: FxHashSet<&str> = FxHashSet::default();
                    for param in &method.params {
                        let ty = self.env.resolve_type(&mut self.sink, ctx, &param.ty);
                        if ty.is_void() {
                            self.sink.report(void_declaration(param.ty.span(), "a parameter"));
                        }
                        if !param_names.insert(param.name.as_str()) {
                            self.sink.report(
                                Diagnostic::error(ErrorCode::E2005)
                                    .with_message(format!(
                                        "the parameter name `{}` is a duplicate",
                                        param.name
                                    ))
                                    .with_label(param.name.span, "duplicate parameter"),
                            );
                        }
                        params.push(if ty.is_void() { Ty::Error } else { ty });
                    }
                    if is_interface {
                        if !method.modifiers.is_empty() {
                            self.sink.report(invalid_modifier(
                                method.name.span,
                                "modifiers are not allowed on interface members",
                            ));
                        }
                        if method.body.is_some() {
                            self.sink.report(
                                Diagnostic::error(ErrorCode::E2022)
                                    .with_message(format!(
                                        "interface member `{}.{}` cannot have a body",
                                        decl.name, method.name
                                    ))
                                    .with_label(method.name.span, "body not allowed here"),
                            );
                        }
                    }
                    let sig = MethodSig {
                        name: method.name.name.clone(),
                        params,
                        ret,
                        is_static: !is_interface && method.modifiers.contains(Modifiers::STATIC),
                        visibility: if is_interface {
                            Visibility::Public
                        } else {
                            visibility_of(method.modifiers, Visibility::Private)
                        },
                    };
                    methods.push(MethodInfo { decl: method, sig });
                }
            }
        }

        if let Some(entry) = self.env.table.get_mut(&full_name) {
            entry.meta.methods = methods.iter().map(|m| m.sig.clone()).collect();
        }
        let info = &mut self.env.decls[index];
        info.fields = fields;
        info.methods = methods;
    }

    /// Modifier rules and interface implementation.
    fn check_declaration(&mut self, index: usize) {
        let info = &self.env.decls[index];
        let decl = info.decl;
        let name_span = decl.name.span;
        let mods = decl.modifiers;

        if mods.contains(Modifiers::PRIVATE) {
            self.sink.report(invalid_modifier(
                name_span,
                format!("type `{}` cannot be declared private", decl.name),
            ));
        }

        if self
            .env
            .table
            .all_interfaces(&info.full_name)
            .contains(&info.full_name)
        {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!(
                        "circular base interface dependency involving `{}`",
                        info.full_name
                    ))
                    .with_label(name_span, "interface inherits from itself"),
            );
            return;
        }

        match decl.kind {
            TypeDeclKind::Interface => {
                for word in [Modifiers::STATIC, Modifiers::SEALED] {
                    if mods.contains(word) {
                        let keyword = word.keywords().join(" ");
                        self.sink.report(invalid_modifier(
                            name_span,
                            format!("the modifier `{keyword}` is not valid on interfaces"),
                        ));
                    }
                }
            }
            TypeDeclKind::Class if info.is_static() => {
                if !info.interfaces.is_empty() {
                    self.sink.report(invalid_modifier(
                        name_span,
                        format!("static class `{}` cannot implement interfaces", decl.name),
                    ));
                }
                for field in info.fields.iter().filter(|f| !f.is_static) {
                    self.sink.report(instance_in_static(&decl.name.name, &field.decl.name.name, field.decl.name.span));
                }
                for method in info.methods.iter().filter(|m| !m.sig.is_static) {
                    self.sink.report(instance_in_static(&decl.name.name, &method.sig.name, method.decl.name.span));
                }
            }
            TypeDeclKind::Class => self.check_implementations(index),
        }
    }

    fn check_implementations(&mut self, index: usize) {
        let info = &self.env.decls[index];
        let class_name = &info.decl.name;
        let mut problems = Vec::new();
        for iface in self.env.table.all_interfaces(&info.full_name) {
            let Some(entry) = self.env.table.get(&iface) else {
                continue;
            };
            if entry.meta.kind != TypeKind::Interface {
                continue;
            }
            for required in &entry.meta.methods {
                let wanted = required.qualified(&iface);
                let Some(found) = info.method(&required.name) else {
                    problems.push(
                        Diagnostic::error(ErrorCode::E2006)
                            .with_message(format!(
                                "`{class_name}` does not implement interface member `{wanted}`"
                            ))
                            .with_label(class_name.span, format!("missing `{required}`")),
                    );
                    continue;
                };
                let reason = if !found.sig.same_shape(required) {
                    Some(format!("it does not have the signature `{required}`"))
                } else if found.sig.is_static {
                    Some("it is static".to_string())
                } else if found.sig.visibility != Visibility::Public {
                    Some("it is not public".to_string())
                } else {
                    None
                };
                if let Some(reason) = reason {
                    problems.push(
                        Diagnostic::error(ErrorCode::E2015)
                            .with_message(format!(
                                "`{class_name}.{}` cannot implement `{wanted}` because {reason}",
                                found.sig.name
                            ))
                            .with_label(found.decl.name.span, "wrong signature")
                            .with_note(format!("expected `public {required}`")),
                    );
                }
            }
        }
        for diag in problems {
            self.sink.report(diag);
        }
    }
}

fn member_modifiers(member: &Member) -> Modifiers {
    match member {
        Member::Method(m) => m.modifiers,
        Member::Field(f) => f.modifiers,
    }
}

fn not_an_interface(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2009)
        .with_message(format!(
            "`{name}` is not an interface; only interfaces can appear in a base list"
        ))
        .with_label(span, "not an interface")
}

fn void_declaration(span: Span, what: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2016)
        .with_message(format!("{what} cannot have type `void`"))
        .with_label(span, "void is not a value type")
}

fn instance_in_static(type_name: &str, member: &str, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2012)
        .with_message(format!(
            "`{type_name}.{member}`: cannot declare instance members in a static class"
        ))
        .with_label(span, "add `static`")
}
