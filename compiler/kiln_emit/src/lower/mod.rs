//! Checked module → module image.
//!
//! Field storage is laid out first so that any body can address any
//! local type's fields. Bodies are then lowered one at a time by a
//! [`FunctionLowerer`], which owns the growing op vector and allocates
//! temporaries above the checker's local slots.

mod expr;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_types::hir::{CheckedModule, HField, HMethod, HStmt, HType};
use kiln_types::hir::HExprKind;
use kiln_types::{MethodSig, Ty, Visibility};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bytecode::{CallId, MethodCode, Op, StrId};
use crate::image::{CallTarget, Const, EntryImage, FieldImage, ModuleImage, TypeImage};

/// Name given to the synthesized instance field initializer.
pub const INIT_NAME: &str = "<init>";
/// Name given to the synthesized static field initializer.
pub const STATIC_INIT_NAME: &str = "<clinit>";

/// Where a field's value lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FieldSlot {
    Instance(u16),
    Global(u32),
}

pub(crate) fn limit_exceeded(message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(message)
        .with_note("split the unit into smaller types or methods")
}

fn to_u16(value: usize, what: impl FnOnce() -> String) -> Result<u16, Diagnostic> {
    u16::try_from(value).map_err(|_| limit_exceeded(what()))
}

fn to_u32(value: usize, what: impl FnOnce() -> String) -> Result<u32, Diagnostic> {
    u32::try_from(value).map_err(|_| limit_exceeded(what()))
}

/// Zero value of a slot of type `ty`.
fn default_value(ty: &Ty) -> Const {
    match ty {
        Ty::Int => Const::Int(0),
        Ty::Bool => Const::Bool(false),
        Ty::Str => Const::Str(String::new()),
        Ty::Void | Ty::Named(_) | Ty::Error => Const::Null,
    }
}

/// Lower a checked module. The module must be free of errors.
#[tracing::instrument(level = "debug", skip_all, fields(module = %module.name))]
pub fn lower_module(module: &CheckedModule) -> Result<ModuleImage, Diagnostic> {
    let mut lowerer = ModuleLowerer::default();
    lowerer.layout(&module.types)?;
    debug!(globals = lowerer.globals.len(), "field layout complete");

    let mut types = Vec::with_capacity(module.types.len());
    for ty in &module.types {
        types.push(lowerer.lower_type(ty)?);
    }

    let entry_point = match &module.entry_point {
        Some(entry) => {
            let (type_index, ty) = types
                .iter()
                .enumerate()
                .find(|(_, t)| t.full_name == entry.type_name)
                .ok_or_else(|| limit_exceeded(format!("entry point type `{}` was not emitted", entry.type_name)))?;
            let (method_index, _) = ty
                .method(&entry.method)
                .ok_or_else(|| limit_exceeded(format!("entry point `{}` was not emitted", entry.method)))?;
            Some(EntryImage {
                type_index: to_u32(type_index, || "too many types".to_string())?,
                method_index: to_u32(method_index, || "too many methods".to_string())?,
                returns_int: entry.returns_int,
            })
        }
        None => None,
    };

    debug!(
        types = types.len(),
        strings = lowerer.strings.len(),
        call_targets = lowerer.call_targets.len(),
        "lowering complete"
    );
    Ok(ModuleImage {
        name: module.name.clone(),
        output_kind: module.output_kind,
        types,
        strings: lowerer.strings,
        call_targets: lowerer.call_targets,
        globals: lowerer.globals,
        entry_point,
        metadata: module.metadata.clone(),
    })
}

#[derive(Default)]
struct ModuleLowerer {
    strings: Vec<String>,
    string_ids: FxHashMap<String, StrId>,
    call_targets: Vec<CallTarget>,
    call_ids: FxHashMap<CallTarget, CallId>,
    globals: Vec<Const>,
    /// Field slots per type, indexed like `HType::fields`.
    layouts: FxHashMap<String, Vec<FieldSlot>>,
}

impl ModuleLowerer {
    fn layout(&mut self, types: &[HType]) -> Result<(), Diagnostic> {
        for ty in types {
            let mut slots = Vec::with_capacity(ty.fields.len());
            let mut instance = 0usize;
            for field in &ty.fields {
                if field.is_static {
                    let index = to_u32(self.globals.len(), || "too many static fields".to_string())?;
                    self.globals.push(default_value(&field.ty));
                    slots.push(FieldSlot::Global(index));
                } else {
                    let index = to_u16(instance, || {
                        format!("type `{}` has more than {} instance fields", ty.full_name, u16::MAX)
                    })?;
                    instance += 1;
                    slots.push(FieldSlot::Instance(index));
                }
            }
            self.layouts.insert(ty.full_name.clone(), slots);
        }
        Ok(())
    }

    fn slot(&self, type_name: &str, index: u32) -> Result<FieldSlot, Diagnostic> {
        self.layouts
            .get(type_name)
            .and_then(|slots| slots.get(index as usize))
            .copied()
            .ok_or_else(|| limit_exceeded(format!("field {index} of `{type_name}` has no storage")))
    }

    fn intern_str(&mut self, text: &str) -> Result<StrId, Diagnostic> {
        if let Some(&id) = self.string_ids.get(text) {
            return Ok(id);
        }
        let id = to_u32(self.strings.len(), || "too many string literals".to_string())?;
        self.strings.push(text.to_string());
        self.string_ids.insert(text.to_string(), id);
        Ok(id)
    }

    fn intern_call(&mut self, target: CallTarget) -> Result<CallId, Diagnostic> {
        if let Some(&id) = self.call_ids.get(&target) {
            return Ok(id);
        }
        let id = to_u32(self.call_targets.len(), || "too many call targets".to_string())?;
        self.call_targets.push(target.clone());
        self.call_ids.insert(target, id);
        Ok(id)
    }

    fn lower_type(&mut self, ty: &HType) -> Result<TypeImage, Diagnostic> {
        let slots = self.layouts.get(&ty.full_name).cloned().unwrap_or_default();
        let fields = ty
            .fields
            .iter()
            .zip(&slots)
            .map(|(field, slot)| FieldImage {
                name: field.name.clone(),
                default: default_value(&field.ty),
                global: match slot {
                    FieldSlot::Global(index) => Some(*index),
                    FieldSlot::Instance(_) => None,
                },
            })
            .collect();

        let mut methods = Vec::with_capacity(ty.methods.len());
        for method in &ty.methods {
            methods.push(self.lower_method(ty, method)?);
        }

        let init = self.lower_initializers(ty, &slots, false)?;
        let static_init = self.lower_initializers(ty, &slots, true)?;
        Ok(TypeImage {
            full_name: ty.full_name.clone(),
            kind: ty.kind,
            is_static: ty.is_static,
            is_public: ty.is_public,
            interfaces: ty.interfaces.clone(),
            fields,
            methods,
            init,
            static_init,
        })
    }

    fn lower_method(&mut self, ty: &HType, method: &HMethod) -> Result<MethodCode, Diagnostic> {
        let sig = MethodSig {
            name: method.name.clone(),
            params: method.params.clone(),
            ret: method.ret.clone(),
            is_static: method.is_static,
            visibility: if method.is_public {
                Visibility::Public
            } else {
                Visibility::Private
            },
        };
        let Some(body) = &method.body else {
            return Ok(MethodCode {
                sig,
                locals: to_u16(method.params.len(), || too_many_locals(ty, &method.name))?,
                code: Vec::new(),
            });
        };

        let mut f = FunctionLowerer::new(self, &ty.full_name, method.locals.len());
        f.stmts(body)?;
        if method.ret.is_void() {
            f.emit(Op::Return);
        }
        let (locals, code) = f.finish();
        Ok(MethodCode {
            sig,
            locals: to_u16(locals, || too_many_locals(ty, &method.name))?,
            code,
        })
    }

    /// Initializer code for the instance or static fields that have one.
    fn lower_initializers(
        &mut self,
        ty: &HType,
        slots: &[FieldSlot],
        statics: bool,
    ) -> Result<Option<MethodCode>, Diagnostic> {
        let with_init: Vec<(&HField, FieldSlot)> = ty
            .fields
            .iter()
            .zip(slots.iter().copied())
            .filter(|(field, _)| field.is_static == statics && field.init.is_some())
            .collect();
        if with_init.is_empty() {
            return Ok(None);
        }

        let name = if statics { STATIC_INIT_NAME } else { INIT_NAME };
        let mut f = FunctionLowerer::new(self, &ty.full_name, 0);
        for (field, slot) in with_init {
            let Some(init) = &field.init else {
                continue;
            };
            match slot {
                FieldSlot::Instance(index) => {
                    f.emit(Op::LoadThis);
                    f.expr(init)?;
                    f.emit(Op::StoreField(index));
                }
                FieldSlot::Global(index) => {
                    f.expr(init)?;
                    f.emit(Op::StoreGlobal(index));
                }
            }
        }
        f.emit(Op::Return);
        let (locals, code) = f.finish();
        let mut sig = MethodSig::new(name, Vec::new(), Ty::Void);
        sig.is_static = statics;
        sig.visibility = Visibility::Private;
        Ok(Some(MethodCode {
            sig,
            locals: to_u16(locals, || too_many_locals(ty, name))?,
            code,
        }))
    }
}

fn too_many_locals(ty: &HType, method: &str) -> String {
    format!(
        "`{}.{method}` needs more than {} local slots",
        ty.full_name,
        u16::MAX
    )
}

/// Lowers one body into a flat op vector.
pub(crate) struct FunctionLowerer<'m> {
    module: &'m mut ModuleLowerer,
    type_name: &'m str,
    code: Vec<Op>,
    locals: usize,
}

impl<'m> FunctionLowerer<'m> {
    fn new(module: &'m mut ModuleLowerer, type_name: &'m str, locals: usize) -> Self {
        FunctionLowerer {
            module,
            type_name,
            code: Vec::new(),
            locals,
        }
    }

    fn finish(self) -> (usize, Vec<Op>) {
        (self.locals, self.code)
    }

    fn emit(&mut self, op: Op) {
        self.code.push(op);
    }

    fn here(&self) -> Result<u32, Diagnostic> {
        to_u32(self.code.len(), || {
            format!("a method of `{}` is too large", self.type_name)
        })
    }

    /// Emit a jump with a placeholder target; see [`Self::patch`].
    fn emit_jump(&mut self, op: fn(u32) -> Op) -> usize {
        self.code.push(op(u32::MAX));
        self.code.len() - 1
    }

    /// Point the jump at `at` to the current end of code.
    fn patch(&mut self, at: usize) -> Result<(), Diagnostic> {
        let target = self.here()?;
        self.code[at] = match self.code[at] {
            Op::Jump(_) => Op::Jump(target),
            Op::JumpIfFalse(_) => Op::JumpIfFalse(target),
            Op::JumpIfTrue(_) => Op::JumpIfTrue(target),
            other => other,
        };
        Ok(())
    }

    fn ends_in_terminator(&self) -> bool {
        self.code.last().is_some_and(|op| op.is_terminator())
    }

    fn temp(&mut self) -> Result<u16, Diagnostic> {
        let slot = to_u16(self.locals, || {
            format!("a method of `{}` needs too many temporaries", self.type_name)
        })?;
        self.locals += 1;
        Ok(slot)
    }

    fn local(&self, slot: u32) -> Result<u16, Diagnostic> {
        to_u16(slot as usize, || {
            format!("a method of `{}` has too many locals", self.type_name)
        })
    }

    fn stmts(&mut self, stmts: &[HStmt]) -> Result<(), Diagnostic> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &HStmt) -> Result<(), Diagnostic> {
        match stmt {
            HStmt::Local { slot, init } => {
                self.expr(init)?;
                let slot = self.local(*slot)?;
                self.emit(Op::StoreLocal(slot));
            }
            HStmt::Expr(expr) => self.effect(expr)?,
            HStmt::Return(None) => self.emit(Op::Return),
            HStmt::Return(Some(value)) => {
                self.expr(value)?;
                self.emit(Op::ReturnValue);
            }
            HStmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(cond)?;
                let to_else = self.emit_jump(Op::JumpIfFalse);
                self.stmts(then_branch)?;
                if else_branch.is_empty() {
                    self.patch(to_else)?;
                } else {
                    let to_end = (!self.ends_in_terminator()).then(|| self.emit_jump(Op::Jump));
                    self.patch(to_else)?;
                    self.stmts(else_branch)?;
                    if let Some(to_end) = to_end {
                        self.patch(to_end)?;
                    }
                }
            }
            HStmt::While { cond, body } => {
                let start = self.here()?;
                // `while (true)` has no exit edge.
                let exit = if cond.kind == HExprKind::Bool(true) {
                    None
                } else {
                    self.expr(cond)?;
                    Some(self.emit_jump(Op::JumpIfFalse))
                };
                self.stmts(body)?;
                self.emit(Op::Jump(start));
                if let Some(exit) = exit {
                    self.patch(exit)?;
                }
            }
            HStmt::Block(stmts) => self.stmts(stmts)?,
        }
        Ok(())
    }
}
