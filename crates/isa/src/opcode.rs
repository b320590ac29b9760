// the instruction schemes
// -----------------------
//
// Lark Script VM instructions are NOT fixed-length code. an instruction is a
// single opcode byte followed by zero or more parameters. parameters are
// either a single byte (operator tags, the `call_func` addressing mode) or a
// little-endian two's-complement 32-bit integer (indices, counts and jump
// targets).
//
// the schemes:
//
// - [opcode u8]                                                    ;; 8-bit
// - [opcode u8] + [param u8]                                       ;; 16-bit
// - [opcode u8] + [param i32]                                      ;; 40-bit
// - [opcode u8] + [param i32] + [param i32]                        ;; 72-bit
// - [opcode u8] + [param u8] + [param i32] + [param i32]           ;; 80-bit
// - [opcode u8] + [param u8] + [param i32] * 3                     ;; 112-bit
//
// there is no alignment requirement, the decoder reads parameters byte by
// byte relative to the instruction address.
//
// jump targets (`jump`, `jump_false`) are absolute byte offsets within the
// instructions of the current block. the numeric opcode values are stable
// between a bytecode producer and the VM that consumes the program, but are
// not a serialization format across builds.

/// The number of entries in the instruction handler table. Opcode bytes are
/// used as indexes directly, so the table covers the whole byte range and
/// unassigned entries reject the instruction.
pub const MAX_OPCODE_NUMBER: usize = 0x100;

#[repr(u8)]
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Opcode {
    // stop execution and return from the interpreter.
    // () -> ()
    halt = 0x0,

    // push a value from the constant pool of the current block.
    // (param const_index:i32) -> value
    push_const,

    // push a local slot of the current frame.
    // (param local_index:i32) -> value
    push_local,

    // pop the top operand and write it into a local slot of the
    // current frame.
    // (param local_index:i32) (operand value) -> ()
    store_local,

    // push a local slot of an arbitrary frame, the frame is addressed
    // from the bottom of the frame stack.
    // (param frame_index:i32, local_index:i32) -> value
    push,

    // pop the top operand and write it into a local slot of an
    // arbitrary frame.
    // (param frame_index:i32, local_index:i32) (operand value) -> ()
    store,

    // discard the top operand.
    // (operand value) -> ()
    pop,

    // apply an operator. tags above the `unary` sentinel consume one
    // operand, all others consume two (left below right).
    // (param operator:u8) (operand left right) -> value
    call_op,

    // unconditional branch to an absolute offset within the current block.
    // (param target:i32) -> ()
    jump,

    // pop the top operand, branch when its bool channel reads false.
    // (param target:i32) (operand test) -> ()
    jump_false,

    // call a built-in function with the top `argc` operands as arguments
    // (bottom-to-top order). the arguments are popped and the result of the
    // built-in is pushed.
    // (param builtin_num:i32, argc:i32) (operand args...) -> value
    call_c_func,

    // call a function value. the addressing mode byte selects where the
    // value is resolved from (see `FunctionLocation`), then the mode
    // operands follow, then `argc`. the top `argc` operands become the
    // first locals of the callee.
    // (param location:u8, [mode operands], argc:i32) (operand args...) -> ()
    call_func,

    // pop the return value, discard the callee frame together with its
    // locals and temporaries, and push the return value for the caller.
    // (operand value) -> value
    return_,

    // add one to the float channel of a local slot in place. the slot
    // keeps its discriminant.
    // (param local_index:i32) -> ()
    inc_local,

    // subtract one from the float channel of a local slot in place.
    // (param local_index:i32) -> ()
    dec_local,

    // reserved for a future scheduling model, rejected by the decoder.
    start_worker,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Option<Opcode> {
        let opcode = match value {
            0x00 => Opcode::halt,
            0x01 => Opcode::push_const,
            0x02 => Opcode::push_local,
            0x03 => Opcode::store_local,
            0x04 => Opcode::push,
            0x05 => Opcode::store,
            0x06 => Opcode::pop,
            0x07 => Opcode::call_op,
            0x08 => Opcode::jump,
            0x09 => Opcode::jump_false,
            0x0a => Opcode::call_c_func,
            0x0b => Opcode::call_func,
            0x0c => Opcode::return_,
            0x0d => Opcode::inc_local,
            0x0e => Opcode::dec_local,
            0x0f => Opcode::start_worker,
            _ => return None,
        };
        Some(opcode)
    }
}
