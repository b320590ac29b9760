pub mod opcode;

// the value model
// ---------------
//
// the Lark Script VM is dynamically typed. every operand on the stack is a
// tagged value, one of:
//
// - number           (f64)
// - integer          (i64)
// - bool
// - string literal   (borrowed text, owned by a constant pool)
// - function         (the index of a block within the program)
// - none
//
// the scalar payloads share one 8-byte channel group. typed instructions
// (operators, `inc_local`/`dec_local`, `jump_false`) read the channel they
// were compiled for and do not check the discriminant; a read through the
// "wrong" channel reinterprets the raw payload bits. the VM trusts the
// bytecode producer to keep values and instructions consistent.

/// Operator tags for the `call_op` instruction.
///
/// The tag ordering is part of the encoding: every tag strictly below the
/// `unary` sentinel takes two operands, every tag above it takes one. The
/// interpreter dispatches on a numeric comparison against the sentinel, so
/// new binary operators must be inserted before it and new unary operators
/// after it.
#[repr(u8)]
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Operator {
    // arithmetic, both operands read through the float channel,
    // the result is a number.
    add = 0x0,
    sub,
    mul,
    pow,
    div,

    // remainder reads both operands through the integer channel and writes
    // the result back through the integer channel of a number-tagged value.
    rem,

    // comparison, operands read through the float channel, result is a bool.
    eq,
    ne,
    lt,
    gt,
    le,
    ge,

    // logical, operands read through the bool channel.
    and,
    or,

    // bitwise, operands read through the integer channel, results are
    // number-tagged integer-channel values like `rem`.
    bit_and,
    bit_or,
    bit_xor,
    shift_left,
    shift_right,

    // sentinel, not a real operator. `call_op` treats any tag above this
    // one as unary.
    unary,

    not,     // bool channel
    bit_not, // integer channel
}

impl Operator {
    pub fn from_u8(value: u8) -> Option<Operator> {
        let operator = match value {
            0x00 => Operator::add,
            0x01 => Operator::sub,
            0x02 => Operator::mul,
            0x03 => Operator::pow,
            0x04 => Operator::div,
            0x05 => Operator::rem,
            0x06 => Operator::eq,
            0x07 => Operator::ne,
            0x08 => Operator::lt,
            0x09 => Operator::gt,
            0x0a => Operator::le,
            0x0b => Operator::ge,
            0x0c => Operator::and,
            0x0d => Operator::or,
            0x0e => Operator::bit_and,
            0x0f => Operator::bit_or,
            0x10 => Operator::bit_xor,
            0x11 => Operator::shift_left,
            0x12 => Operator::shift_right,
            0x13 => Operator::unary,
            0x14 => Operator::not,
            0x15 => Operator::bit_not,
            _ => return None,
        };
        Some(operator)
    }

    /// `true` when the tag sits above the `unary` sentinel.
    pub fn is_unary_tag(value: u8) -> bool {
        value > Operator::unary as u8
    }
}

/// The addressing mode of the `call_func` instruction, i.e. where the
/// function value is resolved from.
#[repr(u8)]
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum FunctionLocation {
    /// the constant pool of the current block
    /// (param const_index:i32)
    constant = 0x0,

    /// a local slot of the current frame
    /// (param local_index:i32)
    local,

    /// a local slot of an arbitrary frame on the frame stack,
    /// addressed from the stack bottom
    /// (param frame_index:i32, local_index:i32)
    global,
}

impl FunctionLocation {
    pub fn from_u8(value: u8) -> Option<FunctionLocation> {
        match value {
            0x0 => Some(FunctionLocation::constant),
            0x1 => Some(FunctionLocation::local),
            0x2 => Some(FunctionLocation::global),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{FunctionLocation, Operator};

    #[test]
    fn test_operator_arity_partition() {
        // every binary tag sits strictly below the sentinel, every unary tag
        // strictly above it. the dispatch in `call_op` relies on this.
        let binary_operators = [
            Operator::add,
            Operator::sub,
            Operator::mul,
            Operator::pow,
            Operator::div,
            Operator::rem,
            Operator::eq,
            Operator::ne,
            Operator::lt,
            Operator::gt,
            Operator::le,
            Operator::ge,
            Operator::and,
            Operator::or,
            Operator::bit_and,
            Operator::bit_or,
            Operator::bit_xor,
            Operator::shift_left,
            Operator::shift_right,
        ];
        let unary_operators = [Operator::not, Operator::bit_not];

        for operator in binary_operators {
            assert!((operator as u8) < (Operator::unary as u8));
            assert!(!Operator::is_unary_tag(operator as u8));
        }

        for operator in unary_operators {
            assert!((operator as u8) > (Operator::unary as u8));
            assert!(Operator::is_unary_tag(operator as u8));
        }
    }

    #[test]
    fn test_operator_tag_round_trip() {
        for value in 0x00u8..=0x15 {
            let operator = Operator::from_u8(value).unwrap();
            assert_eq!(operator as u8, value);
        }

        assert_eq!(Operator::from_u8(0x16), None);
        assert_eq!(Operator::from_u8(0xff), None);
    }

    #[test]
    fn test_function_location_round_trip() {
        assert_eq!(FunctionLocation::from_u8(0x0), Some(FunctionLocation::constant));
        assert_eq!(FunctionLocation::from_u8(0x1), Some(FunctionLocation::local));
        assert_eq!(FunctionLocation::from_u8(0x2), Some(FunctionLocation::global));
        assert_eq!(FunctionLocation::from_u8(0x3), None);
    }
}
