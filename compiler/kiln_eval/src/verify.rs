//! Bytecode verification.
//!
//! Every method is checked once at load: operands index real slots,
//! strings, globals and call targets; jumps land inside the method; the
//! operand stack has the same depth on every path into an op and never
//! underflows; and control never runs off the end of the code. The
//! interpreter relies on these properties and only re-checks what depends
//! on runtime types.

use kiln_emit::{MethodCode, ModuleImage, Op, TypeImage};
use kiln_types::{Native, TypeKind};

use crate::error::VerifyError;

pub(crate) fn verify(image: &ModuleImage) -> Result<(), VerifyError> {
    let max_fields = image
        .types
        .iter()
        .map(TypeImage::instance_slots)
        .max()
        .unwrap_or(0);
    for ty in &image.types {
        for method in &ty.methods {
            if method.code.is_empty() {
                if ty.kind == TypeKind::Class {
                    return Err(error(ty, method, None, "class method has no code"));
                }
                continue;
            }
            verify_method(image, ty, method, max_fields)?;
        }
        for init in ty.init.iter().chain(&ty.static_init) {
            verify_method(image, ty, init, max_fields)?;
        }
    }
    verify_entry_point(image)
}

fn error(ty: &TypeImage, method: &MethodCode, at: Option<usize>, message: impl Into<String>) -> VerifyError {
    VerifyError {
        type_name: ty.full_name.clone(),
        method: method.name().to_string(),
        at,
        message: message.into(),
    }
}

fn verify_entry_point(image: &ModuleImage) -> Result<(), VerifyError> {
    let Some(entry) = &image.entry_point else {
        return Ok(());
    };
    let method = image
        .types
        .get(entry.type_index as usize)
        .and_then(|ty| ty.methods.get(entry.method_index as usize).map(|m| (ty, m)));
    match method {
        Some((_, m)) if m.sig.is_static && m.arity() == 0 => Ok(()),
        Some((ty, m)) => Err(error(ty, m, None, "entry point must be static and take no arguments")),
        None => Err(VerifyError {
            type_name: image.name.clone(),
            method: "<entry>".to_string(),
            at: None,
            message: "entry point does not name a method".to_string(),
        }),
    }
}

/// Stack effect of an op: (pops, pushes).
fn effect(image: &ModuleImage, op: Op) -> Result<(usize, usize), String> {
    let call = |id: u32| {
        image
            .call_targets
            .get(id as usize)
            .ok_or_else(|| format!("call target ${id} does not exist"))
    };
    Ok(match op {
        Op::PushInt(_) | Op::PushBool(_) | Op::PushStr(_) | Op::LoadThis | Op::LoadLocal(_) | Op::LoadGlobal(_) => (0, 1),
        Op::StoreLocal(_) | Op::StoreGlobal(_) | Op::Pop | Op::JumpIfFalse(_) | Op::JumpIfTrue(_) | Op::ReturnValue => (1, 0),
        Op::LoadField(_) | Op::Neg | Op::Not => (1, 1),
        Op::StoreField(_) => (2, 0),
        Op::Dup => (1, 2),
        Op::Add
        | Op::Sub
        | Op::Mul
        | Op::Div
        | Op::Rem
        | Op::Lt
        | Op::LtEq
        | Op::Gt
        | Op::GtEq
        | Op::Eq
        | Op::NotEq
        | Op::Concat => (2, 1),
        Op::Jump(_) | Op::Return => (0, 0),
        Op::CallStatic(id) => {
            let target = call(id)?;
            (usize::from(target.argc), usize::from(target.returns_value))
        }
        Op::CallVirtual(id) => {
            let target = call(id)?;
            (usize::from(target.argc).saturating_add(1), usize::from(target.returns_value))
        }
        Op::CallNative(id) => {
            let native = Native::from_id(id).ok_or_else(|| format!("unknown native function {id}"))?;
            (native.arity(), usize::from(native.returns_value()))
        }
    })
}

/// Operand checks that do not depend on stack state.
fn check_operands(image: &ModuleImage, method: &MethodCode, op: Op, max_fields: usize) -> Result<(), String> {
    let len = method.code.len();
    match op {
        Op::LoadLocal(slot) | Op::StoreLocal(slot) if slot >= method.locals => {
            Err(format!("local slot {slot} is out of range ({} slots)", method.locals))
        }
        Op::PushStr(id) if id as usize >= image.strings.len() => {
            Err(format!("string #{id} does not exist"))
        }
        Op::LoadGlobal(index) | Op::StoreGlobal(index) if index as usize >= image.globals.len() => {
            Err(format!("global {index} does not exist"))
        }
        Op::LoadField(index) | Op::StoreField(index) if usize::from(index) >= max_fields => {
            Err(format!("no type has a field {index}"))
        }
        Op::LoadThis if method.sig.is_static => Err("`this` used in a static method".to_string()),
        Op::Return if method.returns_value() => Err("method must return a value".to_string()),
        Op::ReturnValue if !method.returns_value() => Err("void method returns a value".to_string()),
        Op::Jump(target) | Op::JumpIfFalse(target) | Op::JumpIfTrue(target) if target as usize >= len => {
            Err(format!("jump target @{target} is outside the method"))
        }
        _ => Ok(()),
    }
}

fn verify_method(
    image: &ModuleImage,
    ty: &TypeImage,
    method: &MethodCode,
    max_fields: usize,
) -> Result<(), VerifyError> {
    if usize::from(method.locals) < method.arity() {
        return Err(error(ty, method, None, "fewer local slots than parameters"));
    }
    let code = &method.code;
    let mut depth_at: Vec<Option<usize>> = vec![None; code.len()];
    let mut pending: Vec<(usize, usize)> = vec![(0, 0)];

    while let Some((pc, depth)) = pending.pop() {
        let Some(op) = code.get(pc).copied() else {
            return Err(error(ty, method, Some(pc), "control falls off the end of the method"));
        };
        match depth_at[pc] {
            Some(seen) if seen == depth => continue,
            Some(seen) => {
                return Err(error(
                    ty,
                    method,
                    Some(pc),
                    format!("stack depth {depth} disagrees with {seen} on another path"),
                ));
            }
            None => depth_at[pc] = Some(depth),
        }

        check_operands(image, method, op, max_fields).map_err(|m| error(ty, method, Some(pc), m))?;
        let (pops, pushes) = effect(image, op).map_err(|m| error(ty, method, Some(pc), m))?;
        let after = depth
            .checked_sub(pops)
            .ok_or_else(|| error(ty, method, Some(pc), "operand stack underflow"))?
            .saturating_add(pushes);

        if let Some(target) = op.jump_target() {
            pending.push((target as usize, after));
        }
        if !op.is_terminator() {
            pending.push((pc.saturating_add(1), after));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
