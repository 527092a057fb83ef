//! Stack bytecode.
//!
//! Every method body is a flat `Vec<Op>`. Operands are popped from and
//! pushed to a per-frame value stack; jump targets are absolute indices
//! into the method's code.

use std::fmt;

use kiln_types::MethodSig;
use serde::{Deserialize, Serialize};

/// Index into [`ModuleImage::strings`](crate::ModuleImage::strings).
pub type StrId = u32;

/// Index into [`ModuleImage::call_targets`](crate::ModuleImage::call_targets).
pub type CallId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    PushInt(i32),
    PushBool(bool),
    PushStr(StrId),
    /// The receiver of an instance method.
    LoadThis,
    LoadLocal(u16),
    StoreLocal(u16),
    /// Pop an object, push its instance field.
    LoadField(u16),
    /// Pop a value then an object, store the value into the field.
    StoreField(u16),
    /// Static fields live in module-wide global slots.
    LoadGlobal(u32),
    StoreGlobal(u32),
    Dup,
    Pop,

    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    /// Pop two values, push their concatenated text.
    Concat,

    Jump(u32),
    /// Pop a bool; jump when it is false.
    JumpIfFalse(u32),
    /// Pop a bool; jump when it is true.
    JumpIfTrue(u32),

    CallStatic(CallId),
    /// Arguments above the receiver; dispatch on the receiver's type.
    CallVirtual(CallId),
    /// A core library function, by [`Native::id`](kiln_types::Native::id).
    CallNative(u16),
    Return,
    ReturnValue,
}

impl Op {
    /// Jump target, for ops that have one.
    pub fn jump_target(self) -> Option<u32> {
        match self {
            Op::Jump(t) | Op::JumpIfFalse(t) | Op::JumpIfTrue(t) => Some(t),
            _ => None,
        }
    }

    /// Whether control never falls through to the next op.
    pub fn is_terminator(self) -> bool {
        matches!(self, Op::Jump(_) | Op::Return | Op::ReturnValue)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::PushInt(v) => write!(f, "push.i {v}"),
            Op::PushBool(v) => write!(f, "push.b {v}"),
            Op::PushStr(id) => write!(f, "push.s #{id}"),
            Op::LoadThis => f.write_str("ld.this"),
            Op::LoadLocal(slot) => write!(f, "ld.loc {slot}"),
            Op::StoreLocal(slot) => write!(f, "st.loc {slot}"),
            Op::LoadField(index) => write!(f, "ld.fld {index}"),
            Op::StoreField(index) => write!(f, "st.fld {index}"),
            Op::LoadGlobal(index) => write!(f, "ld.glb {index}"),
            Op::StoreGlobal(index) => write!(f, "st.glb {index}"),
            Op::Jump(target) => write!(f, "jmp @{target}"),
            Op::JumpIfFalse(target) => write!(f, "jmp.f @{target}"),
            Op::JumpIfTrue(target) => write!(f, "jmp.t @{target}"),
            Op::CallStatic(id) => write!(f, "call.s ${id}"),
            Op::CallVirtual(id) => write!(f, "call.v ${id}"),
            Op::CallNative(id) => write!(f, "call.n {id}"),
            other => {
                let name = match other {
                    Op::Dup => "dup",
                    Op::Pop => "pop",
                    Op::Neg => "neg",
                    Op::Not => "not",
                    Op::Add => "add",
                    Op::Sub => "sub",
                    Op::Mul => "mul",
                    Op::Div => "div",
                    Op::Rem => "rem",
                    Op::Lt => "lt",
                    Op::LtEq => "le",
                    Op::Gt => "gt",
                    Op::GtEq => "ge",
                    Op::Eq => "eq",
                    Op::NotEq => "ne",
                    Op::Concat => "concat",
                    Op::Return => "ret",
                    _ => "ret.v",
                };
                f.write_str(name)
            }
        }
    }
}

/// Compiled body of a method, or of a type's field initializers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCode {
    pub sig: MethodSig,
    /// Slot count including parameters and lowering temporaries.
    pub locals: u16,
    /// Empty for interface methods.
    pub code: Vec<Op>,
}

impl MethodCode {
    pub fn name(&self) -> &str {
        &self.sig.name
    }

    pub fn arity(&self) -> usize {
        self.sig.params.len()
    }

    pub fn returns_value(&self) -> bool {
        !self.sig.ret.is_void()
    }

    /// Render one op per line, prefixed by its index.
    pub fn disassemble(&self) -> String {
        use fmt::Write;
        let mut out = String::new();
        for (index, op) in self.code.iter().enumerate() {
            let _ = writeln!(out, "{index:4}  {op}");
        }
        out
    }
}

#[cfg(test)]
mod tests;
