use lark_isa::Operator;
use lark_program::{program::Program, value::Value};

use crate::{vm::VirtualMachine, ProcessErrorType};

use super::{try_pop, HandleResult, Handler};

pub fn call_op<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param operator:u8) (operand left right)
    //
    // the right operand is on top. tags above the `unary` sentinel take a
    // single operand.
    let block = &program.blocks[vm.pc.block_index];
    let operator_num = vm.get_param_u8(block);

    let right = try_pop!(vm);

    let result = if Operator::is_unary_tag(operator_num) {
        let operator = match Operator::from_u8(operator_num) {
            Some(operator) => operator,
            None => return HandleResult::Fatal(ProcessErrorType::UnknownOperator(operator_num)),
        };
        apply_unary(operator, right)
    } else {
        let operator = match Operator::from_u8(operator_num) {
            Some(operator) => operator,
            None => return HandleResult::Fatal(ProcessErrorType::UnknownOperator(operator_num)),
        };
        let left = try_pop!(vm);
        apply_binary(operator, left, right)
    };

    vm.operand_stack.push(result);
    HandleResult::Move(2)
}

/// Applies a binary operator.
///
/// Operands are read through the channel the operator expects, the
/// discriminant is never inspected. The arithmetic group reads floats and
/// produces numbers; `rem` and the bitwise group read integers and produce
/// number-tagged integer-channel values; comparisons read floats and
/// produce bools; the logical group reads and produces bools.
pub fn apply_binary<'a>(operator: Operator, left: Value<'a>, right: Value<'a>) -> Value<'a> {
    match operator {
        Operator::add => Value::Number(left.as_f64() + right.as_f64()),
        Operator::sub => Value::Number(left.as_f64() - right.as_f64()),
        Operator::mul => Value::Number(left.as_f64() * right.as_f64()),
        Operator::pow => Value::Number(left.as_f64().powf(right.as_f64())),
        Operator::div => Value::Number(left.as_f64() / right.as_f64()),
        Operator::rem => Value::number_from_integer_channel(left.as_i64() % right.as_i64()),
        Operator::eq => Value::Bool(left.as_f64() == right.as_f64()),
        Operator::ne => Value::Bool(left.as_f64() != right.as_f64()),
        Operator::lt => Value::Bool(left.as_f64() < right.as_f64()),
        Operator::gt => Value::Bool(left.as_f64() > right.as_f64()),
        Operator::le => Value::Bool(left.as_f64() <= right.as_f64()),
        Operator::ge => Value::Bool(left.as_f64() >= right.as_f64()),
        Operator::and => Value::Bool(left.as_bool() && right.as_bool()),
        Operator::or => Value::Bool(left.as_bool() || right.as_bool()),
        Operator::bit_and => Value::number_from_integer_channel(left.as_i64() & right.as_i64()),
        Operator::bit_or => Value::number_from_integer_channel(left.as_i64() | right.as_i64()),
        Operator::bit_xor => Value::number_from_integer_channel(left.as_i64() ^ right.as_i64()),
        Operator::shift_left => {
            Value::number_from_integer_channel(left.as_i64() << right.as_i64())
        }
        Operator::shift_right => {
            Value::number_from_integer_channel(left.as_i64() >> right.as_i64())
        }
        // the sentinel and the unary tags are never dispatched here through
        // well-formed bytecode; they fall through to `none`
        Operator::unary | Operator::not | Operator::bit_not => Value::None,
    }
}

/// Applies a unary operator to the single (right) operand.
pub fn apply_unary<'a>(operator: Operator, right: Value<'a>) -> Value<'a> {
    match operator {
        Operator::not => Value::Bool(!right.as_bool()),
        Operator::bit_not => Value::number_from_integer_channel(!right.as_i64()),
        _ => Value::None,
    }
}
