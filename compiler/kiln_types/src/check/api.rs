//! Public entry point for checking a unit.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::CompilationUnit;
use tracing::debug;

use super::ModuleChecker;
use crate::hir::{CheckedModule, EntryPoint, HType, OutputKind};
use crate::metadata::{ModuleMetadata, TypeKind, TypeMetadata, Visibility};
use crate::ty::Ty;

/// Options that change what a unit must provide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    pub module_name: String,
    pub output_kind: OutputKind,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            module_name: "DynamicUnit".to_string(),
            output_kind: OutputKind::Library,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub module: CheckedModule,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Resolve and type check `unit` against the metadata of its references.
///
/// Always returns a module; it is only meaningful when
/// [`CheckOutput::has_errors`] is false.
#[tracing::instrument(level = "debug", skip_all, fields(module = %options.module_name))]
pub fn check(
    unit: &CompilationUnit,
    references: &[ModuleMetadata],
    options: &CheckOptions,
) -> CheckOutput {
    let mut checker = ModuleChecker::new(references);
    checker.register(unit);
    checker.collect_signatures();
    let types = checker.check_bodies();
    checker.report_unused_usings();

    let entry_point = match options.output_kind {
        OutputKind::Library => None,
        OutputKind::Executable => checker.find_entry_point(&types),
    };
    let metadata = export_metadata(&checker, &options.module_name);
    debug!(
        types = types.len(),
        diagnostics = checker.sink.diagnostics.len(),
        "check complete"
    );
    CheckOutput {
        module: CheckedModule {
            name: options.module_name.clone(),
            output_kind: options.output_kind,
            types,
            entry_point,
            metadata,
        },
        diagnostics: checker.sink.diagnostics,
    }
}

impl ModuleChecker<'_> {
    /// Exactly one `static int Main()` or `static void Main()`.
    fn find_entry_point(&mut self, types: &[HType]) -> Option<EntryPoint> {
        let mut candidates = Vec::new();
        for decl in self.env.decls.iter().filter(|d| !d.duplicate) {
            let is_class = types
                .iter()
                .any(|t| t.full_name == decl.full_name && t.kind == TypeKind::Class);
            for method in decl.methods.iter().filter(|m| is_class && m.sig.name == "Main") {
                let sig = &method.sig;
                if sig.is_static && sig.params.is_empty() && matches!(sig.ret, Ty::Int | Ty::Void) {
                    candidates.push((decl.full_name.clone(), method.decl.name.span, sig.ret == Ty::Int));
                }
            }
        }
        match candidates.as_slice() {
            [] => {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2013)
                        .with_message(
                            "program does not contain a static `Main` method suitable for an entry point",
                        )
                        .with_note("declare `static int Main()` or `static void Main()`")
                        .with_suggestion("compile as a library if the unit has no entry point"),
                );
                None
            }
            [(type_name, _, returns_int)] => Some(EntryPoint {
                type_name: type_name.clone(),
                method: "Main".to_string(),
                returns_int: *returns_int,
            }),
            [_, rest @ ..] => {
                for (type_name, span, _) in rest {
                    self.sink.report(
                        Diagnostic::error(ErrorCode::E2013)
                            .with_message("program has more than one entry point defined")
                            .with_label(*span, format!("`{type_name}.Main` is another entry point")),
                    );
                }
                None
            }
        }
    }
}

/// Public types and their public methods.
fn export_metadata(checker: &ModuleChecker<'_>, module_name: &str) -> ModuleMetadata {
    let mut module = ModuleMetadata::new(module_name);
    for decl in checker.env.decls.iter().filter(|d| !d.duplicate) {
        let Some(entry) = checker.env.table.get(&decl.full_name) else {
            continue;
        };
        if entry.meta.visibility != Visibility::Public {
            continue;
        }
        let mut meta: TypeMetadata = entry.meta.clone();
        meta.methods.retain(|m| m.visibility == Visibility::Public);
        module.types.push(meta);
    }
    module
}
