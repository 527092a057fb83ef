use kiln_diagnostic::Diagnostic;
use kiln_stack::ensure_sufficient_stack;
use kiln_types::hir::{HBinOp, HExpr, HExprKind, HUnaryOp, Place};
use kiln_types::Ty;

use super::{limit_exceeded, FieldSlot, FunctionLowerer};
use crate::bytecode::Op;
use crate::image::CallTarget;

/// The op for a strict binary operator; `None` for the short-circuit ones.
fn binary_op(op: HBinOp) -> Option<Op> {
    Some(match op {
        HBinOp::Add => Op::Add,
        HBinOp::Sub => Op::Sub,
        HBinOp::Mul => Op::Mul,
        HBinOp::Div => Op::Div,
        HBinOp::Rem => Op::Rem,
        HBinOp::Lt => Op::Lt,
        HBinOp::LtEq => Op::LtEq,
        HBinOp::Gt => Op::Gt,
        HBinOp::GtEq => Op::GtEq,
        HBinOp::Eq => Op::Eq,
        HBinOp::NotEq => Op::NotEq,
        HBinOp::Concat => Op::Concat,
        HBinOp::And | HBinOp::Or => return None,
    })
}

impl FunctionLowerer<'_> {
    /// Lower an expression that leaves its value on the stack (nothing
    /// for `void` calls).
    pub(super) fn expr(&mut self, expr: &HExpr) -> Result<(), Diagnostic> {
        ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    /// Lower an expression statement, discarding any value.
    pub(super) fn effect(&mut self, expr: &HExpr) -> Result<(), Diagnostic> {
        if let HExprKind::Assign { place, op, value } = &expr.kind {
            return self.assign(place, *op, value, false);
        }
        self.expr(expr)?;
        if !expr.ty.is_void() {
            self.emit(Op::Pop);
        }
        Ok(())
    }

    fn expr_inner(&mut self, expr: &HExpr) -> Result<(), Diagnostic> {
        match &expr.kind {
            HExprKind::Int(value) => self.emit(Op::PushInt(*value)),
            HExprKind::Bool(value) => self.emit(Op::PushBool(*value)),
            HExprKind::Str(text) => {
                let id = self.module.intern_str(text)?;
                self.emit(Op::PushStr(id));
            }
            HExprKind::This => self.emit(Op::LoadThis),
            HExprKind::Local(slot) => {
                let slot = self.local(*slot)?;
                self.emit(Op::LoadLocal(slot));
            }
            HExprKind::Field { receiver, index } => {
                self.expr(receiver)?;
                let index = self.instance_slot(&receiver.ty, *index)?;
                self.emit(Op::LoadField(index));
            }
            HExprKind::StaticField { type_name, index } => {
                let global = self.global_slot(type_name, *index)?;
                self.emit(Op::LoadGlobal(global));
            }
            HExprKind::Unary { op, operand } => {
                self.expr(operand)?;
                self.emit(match op {
                    HUnaryOp::Neg => Op::Neg,
                    HUnaryOp::Not => Op::Not,
                });
            }
            HExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs)?,
            HExprKind::Assign { place, op, value } => self.assign(place, *op, value, true)?,
            HExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(cond)?;
                let to_else = self.emit_jump(Op::JumpIfFalse);
                self.expr(then_expr)?;
                let to_end = self.emit_jump(Op::Jump);
                self.patch(to_else)?;
                self.expr(else_expr)?;
                self.patch(to_end)?;
            }
            HExprKind::CallStatic {
                type_name,
                method,
                args,
            } => {
                self.args(args)?;
                let id = self.call_target(type_name, method, args.len(), &expr.ty)?;
                self.emit(Op::CallStatic(id));
            }
            HExprKind::CallVirtual {
                receiver,
                method,
                args,
            } => {
                self.expr(receiver)?;
                self.args(args)?;
                let id = self.call_target("", method, args.len(), &expr.ty)?;
                self.emit(Op::CallVirtual(id));
            }
            HExprKind::CallNative { native, args } => {
                self.args(args)?;
                self.emit(Op::CallNative(native.id()));
            }
            HExprKind::Error => {
                return Err(limit_exceeded("cannot emit a unit that failed to check"));
            }
        }
        Ok(())
    }

    fn args(&mut self, args: &[HExpr]) -> Result<(), Diagnostic> {
        for arg in args {
            self.expr(arg)?;
        }
        Ok(())
    }

    fn call_target(
        &mut self,
        type_name: &str,
        method: &str,
        argc: usize,
        ret: &Ty,
    ) -> Result<u32, Diagnostic> {
        let argc = u16::try_from(argc)
            .map_err(|_| limit_exceeded(format!("call to `{method}` has too many arguments")))?;
        self.module.intern_call(CallTarget {
            type_name: type_name.to_string(),
            method: method.to_string(),
            argc,
            returns_value: !ret.is_void(),
        })
    }

    fn binary(&mut self, op: HBinOp, lhs: &HExpr, rhs: &HExpr) -> Result<(), Diagnostic> {
        match binary_op(op) {
            Some(strict) => {
                self.expr(lhs)?;
                self.expr(rhs)?;
                self.emit(strict);
                Ok(())
            }
            None => {
                self.expr(lhs)?;
                self.emit(Op::Dup);
                let short = if op == HBinOp::And {
                    self.emit_jump(Op::JumpIfFalse)
                } else {
                    self.emit_jump(Op::JumpIfTrue)
                };
                self.emit(Op::Pop);
                self.expr(rhs)?;
                self.patch(short)
            }
        }
    }

    /// `keep` leaves the assigned value on the stack.
    fn assign(
        &mut self,
        place: &Place,
        op: Option<HBinOp>,
        value: &HExpr,
        keep: bool,
    ) -> Result<(), Diagnostic> {
        match place {
            Place::Local(slot) => {
                let slot = self.local(*slot)?;
                if op.is_some() {
                    self.emit(Op::LoadLocal(slot));
                }
                self.compute(op, value)?;
                if keep {
                    self.emit(Op::Dup);
                }
                self.emit(Op::StoreLocal(slot));
            }
            Place::StaticField { type_name, index } => {
                let global = self.global_slot(type_name, *index)?;
                if op.is_some() {
                    self.emit(Op::LoadGlobal(global));
                }
                self.compute(op, value)?;
                if keep {
                    self.emit(Op::Dup);
                }
                self.emit(Op::StoreGlobal(global));
            }
            Place::Field { receiver, index } => {
                let field = self.instance_slot(&receiver.ty, *index)?;
                self.expr(receiver)?;
                if op.is_some() {
                    self.emit(Op::Dup);
                    self.emit(Op::LoadField(field));
                }
                self.compute(op, value)?;
                if keep {
                    let temp = self.temp()?;
                    self.emit(Op::Dup);
                    self.emit(Op::StoreLocal(temp));
                    self.emit(Op::StoreField(field));
                    self.emit(Op::LoadLocal(temp));
                } else {
                    self.emit(Op::StoreField(field));
                }
            }
        }
        Ok(())
    }

    /// The new value of an assignment; the old value is already on the
    /// stack for compound forms.
    fn compute(&mut self, op: Option<HBinOp>, value: &HExpr) -> Result<(), Diagnostic> {
        self.expr(value)?;
        if let Some(op) = op.and_then(binary_op) {
            self.emit(op);
        }
        Ok(())
    }

    fn instance_slot(&self, owner: &Ty, index: u32) -> Result<u16, Diagnostic> {
        let type_name = owner.as_named().unwrap_or(self.type_name);
        match self.module.slot(type_name, index)? {
            FieldSlot::Instance(slot) => Ok(slot),
            FieldSlot::Global(_) => Err(limit_exceeded(format!(
                "field {index} of `{type_name}` is static"
            ))),
        }
    }

    fn global_slot(&self, type_name: &str, index: u32) -> Result<u32, Diagnostic> {
        match self.module.slot(type_name, index)? {
            FieldSlot::Global(slot) => Ok(slot),
            FieldSlot::Instance(_) => Err(limit_exceeded(format!(
                "field {index} of `{type_name}` is not static"
            ))),
        }
    }
}
