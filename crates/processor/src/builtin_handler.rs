use std::io::Write;

use lark_program::value::Value;

use crate::{
    builtin_num::{BuiltinNum, MAX_BUILTIN_NUMBER},
    ProcessErrorType,
};

/// The uniform signature of built-in functions: the host output sink and
/// the argument window (bottom-to-top), returning the value `call_c_func`
/// pushes back.
pub type BuiltinHandlerFunc =
    for<'a> fn(&mut dyn Write, &[Value<'a>]) -> Result<Value<'a>, ProcessErrorType>;

fn builtin_unreachable<'a>(
    _output: &mut dyn Write,
    _argv: &[Value<'a>],
) -> Result<Value<'a>, ProcessErrorType> {
    Err(ProcessErrorType::UnknownBuiltin)
}

pub fn generate_builtin_handlers() -> [BuiltinHandlerFunc; MAX_BUILTIN_NUMBER] {
    let mut handlers: [BuiltinHandlerFunc; MAX_BUILTIN_NUMBER] =
        [builtin_unreachable; MAX_BUILTIN_NUMBER];

    handlers[BuiltinNum::print as usize] = builtin_print;

    handlers
}

// formats every argument by its discriminant, with no separator in
// between, and terminates the line unconditionally (also for argc == 0).
fn builtin_print<'a>(
    output: &mut dyn Write,
    argv: &[Value<'a>],
) -> Result<Value<'a>, ProcessErrorType> {
    for value in argv {
        let result = match value {
            Value::Number(v) => write!(output, "{:.6}", v),
            Value::Integer(v) => write!(output, "{}", v),
            Value::Bool(v) => write!(output, "{}", if *v { "true" } else { "false" }),
            Value::StringLiteral(text) => write!(output, "{}", text),
            Value::None => write!(output, "none"),
            Value::Function(_) => write!(output, "unknown"),
        };
        result.map_err(|_| ProcessErrorType::OutputFailure)?;
    }
    writeln!(output).map_err(|_| ProcessErrorType::OutputFailure)?;

    Ok(Value::None)
}
