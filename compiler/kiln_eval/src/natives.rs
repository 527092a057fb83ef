//! Host implementations of the core library's `System.Math` and
//! `System.Console` methods.

use kiln_types::Native;

use crate::console::Console;
use crate::error::{invalid, RuntimeError};
use crate::value::Value;

pub(crate) fn call_native(native: Native, args: &[Value], console: &Console) -> Result<Value, RuntimeError> {
    let int = |position: usize| {
        args.get(position)
            .and_then(Value::as_int)
            .ok_or_else(|| invalid(format!("`{}` expects an int argument", native.method_name())))
    };
    Ok(match native {
        Native::MathAbs => Value::Int(int(0)?.checked_abs().ok_or(RuntimeError::Overflow {
            operation: "Math.Abs(int.MinValue)",
        })?),
        Native::MathMax => Value::Int(int(0)?.max(int(1)?)),
        Native::MathMin => Value::Int(int(0)?.min(int(1)?)),
        Native::MathSign => Value::Int(int(0)?.signum()),
        Native::MathClamp => {
            let (value, min, max) = (int(0)?, int(1)?, int(2)?);
            if min > max {
                return Err(RuntimeError::ClampRange { min, max });
            }
            Value::Int(value.clamp(min, max))
        }
        Native::ConsoleWriteLine => {
            let line = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("`WriteLine` expects a string argument"))?;
            console.write_line(line);
            Value::Void
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn math(native: Native, args: &[i32]) -> Result<Value, RuntimeError> {
        let args: Vec<Value> = args.iter().copied().map(Value::from).collect();
        call_native(native, &args, &Console::Silent)
    }

    #[test]
    fn test_math() {
        assert_eq!(math(Native::MathAbs, &[-4]).unwrap(), Value::Int(4));
        assert_eq!(math(Native::MathMax, &[3, 9]).unwrap(), Value::Int(9));
        assert_eq!(math(Native::MathMin, &[3, 9]).unwrap(), Value::Int(3));
        assert_eq!(math(Native::MathSign, &[-12]).unwrap(), Value::Int(-1));
        assert_eq!(math(Native::MathSign, &[0]).unwrap(), Value::Int(0));
        assert_eq!(math(Native::MathClamp, &[15, 0, 10]).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_abs_of_min_value_overflows() {
        assert_eq!(
            math(Native::MathAbs, &[i32::MIN]),
            Err(RuntimeError::Overflow {
                operation: "Math.Abs(int.MinValue)"
            })
        );
    }

    #[test]
    fn test_clamp_rejects_inverted_range() {
        assert_eq!(
            math(Native::MathClamp, &[5, 10, 0]),
            Err(RuntimeError::ClampRange { min: 10, max: 0 })
        );
    }

    #[test]
    fn test_write_line_goes_to_console() {
        let console = Console::Buffer(parking_lot::Mutex::new(String::new()));
        let result = call_native(Native::ConsoleWriteLine, &[Value::from("hi")], &console).unwrap();
        assert_eq!(result, Value::Void);
        assert_eq!(console.output(), "hi\n");
    }
}
