//! Integer operators with 32-bit two's-complement semantics.

use kiln_emit::Op;

use crate::error::{invalid, RuntimeError};
use crate::value::Value;

/// `+ - *` wrap; `/ %` fail on a zero divisor and on `int.MinValue / -1`.
pub(super) fn int_binary(op: Op, lhs: i32, rhs: i32) -> Result<Value, RuntimeError> {
    Ok(match op {
        Op::Add => Value::Int(lhs.wrapping_add(rhs)),
        Op::Sub => Value::Int(lhs.wrapping_sub(rhs)),
        Op::Mul => Value::Int(lhs.wrapping_mul(rhs)),
        Op::Div => Value::Int(divide(lhs, rhs, i32::checked_div, "int.MinValue / -1")?),
        Op::Rem => Value::Int(divide(lhs, rhs, i32::checked_rem, "int.MinValue % -1")?),
        Op::Lt => Value::Bool(lhs < rhs),
        Op::LtEq => Value::Bool(lhs <= rhs),
        Op::Gt => Value::Bool(lhs > rhs),
        Op::GtEq => Value::Bool(lhs >= rhs),
        other => return Err(invalid(format!("`{other}` is not an integer operator"))),
    })
}

fn divide(
    lhs: i32,
    rhs: i32,
    f: fn(i32, i32) -> Option<i32>,
    overflow: &'static str,
) -> Result<i32, RuntimeError> {
    if rhs == 0 {
        return Err(RuntimeError::DivideByZero);
    }
    f(lhs, rhs).ok_or(RuntimeError::Overflow { operation: overflow })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(int_binary(Op::Add, i32::MAX, 1).unwrap(), Value::Int(i32::MIN));
        assert_eq!(int_binary(Op::Sub, i32::MIN, 1).unwrap(), Value::Int(i32::MAX));
        assert_eq!(int_binary(Op::Mul, 65_536, 65_536).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_division() {
        assert_eq!(int_binary(Op::Div, -7, 2).unwrap(), Value::Int(-3));
        assert_eq!(int_binary(Op::Rem, -7, 2).unwrap(), Value::Int(-1));
        assert_eq!(int_binary(Op::Div, 1, 0), Err(RuntimeError::DivideByZero));
        assert_eq!(int_binary(Op::Rem, 1, 0), Err(RuntimeError::DivideByZero));
        assert_eq!(
            int_binary(Op::Div, i32::MIN, -1),
            Err(RuntimeError::Overflow {
                operation: "int.MinValue / -1"
            })
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(int_binary(Op::Lt, 1, 2).unwrap(), Value::Bool(true));
        assert_eq!(int_binary(Op::GtEq, 1, 2).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_non_integer_op_is_invalid() {
        assert!(matches!(
            int_binary(Op::Concat, 1, 2),
            Err(RuntimeError::InvalidProgram(_))
        ));
    }
}
