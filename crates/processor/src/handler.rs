use lark_isa::opcode::{Opcode, MAX_OPCODE_NUMBER};
use lark_program::program::Program;

use crate::{
    builtin_handler::{generate_builtin_handlers, BuiltinHandlerFunc},
    builtin_num::MAX_BUILTIN_NUMBER,
    vm::{ProgramCounter, VirtualMachine},
    ProcessErrorType,
};

pub type HandleFunc =
    for<'a> fn(&Handler, &mut VirtualMachine<'a>, &Program<'a>) -> HandleResult;

mod calling;
mod control_flow;
mod fundamental;
mod local;
mod operator;

pub use operator::{apply_binary, apply_unary};

pub enum HandleResult {
    // move to another address within the current block
    // param (relate_offset_in_bytes:isize)
    Move(isize),

    // transfer to an absolute location: a branch within the current block,
    // a call into another block, or a return to the caller
    // param (program_counter:ProgramCounter)
    Jump(ProgramCounter),

    // the run has finished, either by `halt` or by decoding past the end
    // of the entry block
    End,

    // an unrecoverable condition; the run ends with this error
    // param (error_type:ProcessErrorType)
    Fatal(ProcessErrorType),
}

// pops the operand stack or aborts the current handler with an
// underflow error.
macro_rules! try_pop {
    ($vm:expr) => {
        match $vm.operand_stack.pop() {
            Ok(value) => value,
            Err(_) => {
                return $crate::handler::HandleResult::Fatal(
                    $crate::ProcessErrorType::StackUnderflow,
                )
            }
        }
    };
}
pub(crate) use try_pop;

fn unknown_opcode_handler<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    let block = &program.blocks[vm.pc.block_index];
    let opcode_num = block.instructions[vm.pc.instruction_address];
    HandleResult::Fatal(ProcessErrorType::UnknownOpcode(opcode_num))
}

// `start_worker` is reserved for a future scheduling model; until that
// exists the decoder rejects it explicitly rather than treating it as an
// unassigned byte.
fn start_worker<'a>(
    _handler: &Handler,
    _vm: &mut VirtualMachine<'a>,
    _program: &Program<'a>,
) -> HandleResult {
    HandleResult::Fatal(ProcessErrorType::ReservedOpcode(Opcode::start_worker as u8))
}

pub struct Handler {
    pub handlers: [HandleFunc; MAX_OPCODE_NUMBER],
    pub builtin_handlers: [BuiltinHandlerFunc; MAX_BUILTIN_NUMBER],
}

impl Handler {
    pub fn new() -> Self {
        let mut handlers: [HandleFunc; MAX_OPCODE_NUMBER] =
            [unknown_opcode_handler; MAX_OPCODE_NUMBER];

        // fundamental
        handlers[Opcode::push_const as usize] = fundamental::push_const;
        handlers[Opcode::pop as usize] = fundamental::pop;

        // local variables
        handlers[Opcode::push_local as usize] = local::push_local;
        handlers[Opcode::store_local as usize] = local::store_local;
        handlers[Opcode::push as usize] = local::push;
        handlers[Opcode::store as usize] = local::store;
        handlers[Opcode::inc_local as usize] = local::inc_local;
        handlers[Opcode::dec_local as usize] = local::dec_local;

        // operators
        handlers[Opcode::call_op as usize] = operator::call_op;

        // control flow
        handlers[Opcode::halt as usize] = control_flow::halt;
        handlers[Opcode::jump as usize] = control_flow::jump;
        handlers[Opcode::jump_false as usize] = control_flow::jump_false;

        // calling
        handlers[Opcode::call_func as usize] = calling::call_func;
        handlers[Opcode::return_ as usize] = calling::return_;
        handlers[Opcode::call_c_func as usize] = calling::call_c_func;

        // reserved
        handlers[Opcode::start_worker as usize] = start_worker;

        Handler {
            handlers,
            builtin_handlers: generate_builtin_handlers(),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
