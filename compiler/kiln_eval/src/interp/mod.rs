//! The bytecode interpreter.
//!
//! One [`Interpreter`] serves one host-level invocation: its step budget and
//! call depth span every nested guest call made on behalf of that
//! invocation. Frames recurse on the native stack through
//! [`ensure_sufficient_stack`], so deep guest recursion is bounded by
//! `max_call_depth` rather than by the host thread's stack size.

mod arith;

use kiln_emit::{MethodCode, Op};
use kiln_stack::ensure_sufficient_stack;
use kiln_types::Native;
use tracing::trace;

use crate::error::{invalid, RuntimeError};
use crate::module::{ModuleHandle, ResolvedCall};
use crate::natives::call_native;
use crate::options::ExecutionLimits;
use crate::value::{ObjectRef, Value};

pub(crate) struct Interpreter {
    limits: ExecutionLimits,
    steps: u64,
    depth: u32,
}

/// Locals and operand stack of one activation.
struct Frame<'a> {
    this: Option<&'a ObjectRef>,
    locals: Vec<Value>,
    stack: Vec<Value>,
}

impl Frame<'_> {
    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| invalid("operand stack underflow"))
    }

    fn pop_int(&mut self) -> Result<i32, RuntimeError> {
        match self.pop()? {
            Value::Int(v) => Ok(v),
            other => Err(invalid(format!("expected int, found {}", other.type_name()))),
        }
    }

    fn pop_bool(&mut self) -> Result<bool, RuntimeError> {
        match self.pop()? {
            Value::Bool(v) => Ok(v),
            other => Err(invalid(format!("expected bool, found {}", other.type_name()))),
        }
    }

    fn pop_object(&mut self) -> Result<ObjectRef, RuntimeError> {
        match self.pop()? {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(RuntimeError::NullReference),
            other => Err(invalid(format!("expected an object, found {}", other.type_name()))),
        }
    }

    /// Pop `count` values, returned in push order.
    fn pop_args(&mut self, count: usize) -> Result<Vec<Value>, RuntimeError> {
        let split = self
            .stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| invalid("operand stack underflow"))?;
        Ok(self.stack.split_off(split))
    }

    fn local(&mut self, slot: u16) -> Result<&mut Value, RuntimeError> {
        self.locals
            .get_mut(usize::from(slot))
            .ok_or_else(|| invalid(format!("local slot {slot} does not exist")))
    }

    fn push_result(&mut self, value: Value) {
        if !matches!(value, Value::Void) {
            self.stack.push(value);
        }
    }
}

impl Interpreter {
    pub(crate) fn new(limits: ExecutionLimits) -> Self {
        Interpreter {
            limits,
            steps: 0,
            depth: 0,
        }
    }

    /// Run `code` to completion with `args` in the first local slots.
    pub(crate) fn call(
        &mut self,
        module: &ModuleHandle,
        code: &MethodCode,
        this: Option<&ObjectRef>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if self.depth >= self.limits.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.limits.max_call_depth,
            });
        }
        trace!(method = code.name(), depth = self.depth, "call");
        self.depth = self.depth.saturating_add(1);
        let result = ensure_sufficient_stack(|| self.run(module, code, this, args));
        self.depth = self.depth.saturating_sub(1);
        result
    }

    fn tick(&mut self) -> Result<(), RuntimeError> {
        if self.steps >= self.limits.max_steps {
            return Err(RuntimeError::StepLimit {
                limit: self.limits.max_steps,
            });
        }
        self.steps = self.steps.saturating_add(1);
        Ok(())
    }

    fn run(
        &mut self,
        module: &ModuleHandle,
        code: &MethodCode,
        this: Option<&ObjectRef>,
        mut args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        args.resize(usize::from(code.locals), Value::Null);
        let mut frame = Frame {
            this,
            locals: args,
            stack: Vec::new(),
        };
        let mut pc = 0usize;

        loop {
            self.tick()?;
            let op = *code
                .code
                .get(pc)
                .ok_or_else(|| invalid(format!("`{}` ran past its last op", code.name())))?;
            pc = pc.saturating_add(1);

            match op {
                Op::PushInt(v) => frame.stack.push(Value::Int(v)),
                Op::PushBool(v) => frame.stack.push(Value::Bool(v)),
                Op::PushStr(id) => frame.stack.push(Value::string(module.string(id)?)),
                Op::LoadThis => {
                    let this = frame.this.ok_or_else(|| invalid("`this` in a static method"))?;
                    frame.stack.push(Value::Object(this.clone()));
                }
                Op::LoadLocal(slot) => {
                    let value = frame.local(slot)?.clone();
                    frame.stack.push(value);
                }
                Op::StoreLocal(slot) => {
                    let value = frame.pop()?;
                    *frame.local(slot)? = value;
                }
                Op::LoadField(index) => {
                    let object = frame.pop_object()?;
                    let value = object.load(index).ok_or_else(|| {
                        invalid(format!("`{}` has no field {index}", object.type_name()))
                    })?;
                    frame.stack.push(value);
                }
                Op::StoreField(index) => {
                    let value = frame.pop()?;
                    let object = frame.pop_object()?;
                    if !object.store(index, value) {
                        return Err(invalid(format!("`{}` has no field {index}", object.type_name())));
                    }
                }
                Op::LoadGlobal(index) => frame.stack.push(module.load_global(index)?),
                Op::StoreGlobal(index) => {
                    let value = frame.pop()?;
                    module.store_global(index, value)?;
                }
                Op::Dup => {
                    let top = frame.stack.last().cloned().ok_or_else(|| invalid("operand stack underflow"))?;
                    frame.stack.push(top);
                }
                Op::Pop => {
                    frame.pop()?;
                }

                Op::Neg => {
                    let v = frame.pop_int()?;
                    frame.stack.push(Value::Int(v.wrapping_neg()));
                }
                Op::Not => {
                    let v = frame.pop_bool()?;
                    frame.stack.push(Value::Bool(!v));
                }
                Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Rem | Op::Lt | Op::LtEq | Op::Gt | Op::GtEq => {
                    let rhs = frame.pop_int()?;
                    let lhs = frame.pop_int()?;
                    frame.stack.push(arith::int_binary(op, lhs, rhs)?);
                }
                Op::Eq | Op::NotEq => {
                    let rhs = frame.pop()?;
                    let lhs = frame.pop()?;
                    let equal = lhs.equals(&rhs);
                    frame.stack.push(Value::Bool(if op == Op::Eq { equal } else { !equal }));
                }
                Op::Concat => {
                    let rhs = frame.pop()?;
                    let lhs = frame.pop()?;
                    frame.stack.push(Value::string(&format!("{lhs}{rhs}")));
                }

                Op::Jump(target) => pc = target as usize,
                Op::JumpIfFalse(target) => {
                    if !frame.pop_bool()? {
                        pc = target as usize;
                    }
                }
                Op::JumpIfTrue(target) => {
                    if frame.pop_bool()? {
                        pc = target as usize;
                    }
                }

                Op::CallStatic(id) => {
                    let result = self.call_static(module, id, &mut frame)?;
                    frame.push_result(result);
                }
                Op::CallVirtual(id) => {
                    let result = self.call_virtual(module, id, &mut frame)?;
                    frame.push_result(result);
                }
                Op::CallNative(id) => {
                    let native = Native::from_id(id).ok_or_else(|| invalid(format!("unknown native function {id}")))?;
                    let args = frame.pop_args(native.arity())?;
                    let result = call_native(native, &args, module.console())?;
                    frame.push_result(result);
                }
                Op::Return => return Ok(Value::Void),
                Op::ReturnValue => return frame.pop(),
            }
        }
    }

    fn call_static(&mut self, module: &ModuleHandle, id: u32, frame: &mut Frame<'_>) -> Result<Value, RuntimeError> {
        match module.resolved_call(id)? {
            ResolvedCall::Local {
                type_index,
                method_index,
            } => {
                let code = module.method(*type_index, *method_index)?;
                let args = frame.pop_args(code.arity())?;
                self.call(module, code, None, args)
            }
            ResolvedCall::External {
                module: target,
                type_index,
                method_index,
            } => {
                let code = target.method(*type_index, *method_index)?;
                let args = frame.pop_args(code.arity())?;
                self.call(target, code, None, args)
            }
            ResolvedCall::Virtual => Err(invalid(format!("call target ${id} is not static"))),
        }
    }

    /// Dispatch by name on the receiver's runtime type.
    fn call_virtual(&mut self, module: &ModuleHandle, id: u32, frame: &mut Frame<'_>) -> Result<Value, RuntimeError> {
        let name = module.call_method_name(id)?;
        let argc = module.call_argc(id)?;
        let args = frame.pop_args(argc)?;
        let receiver = frame.pop_object()?;
        let owner = receiver.module.clone();
        let code = owner
            .method_index(receiver.type_index, name)
            .and_then(|index| owner.method(receiver.type_index, index).ok())
            .filter(|code| !code.sig.is_static && code.arity() == argc)
            .ok_or_else(|| RuntimeError::MissingMethod {
                type_name: receiver.type_name().to_string(),
                method: name.to_string(),
            })?;
        self.call(&owner, code, Some(&receiver), args)
    }
}
