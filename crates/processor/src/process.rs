use lark_program::{
    bytecode_reader::format_bytecode_as_text, program::Program, value::Value,
};
use tracing::debug;

use crate::{
    handler::{HandleResult, Handler},
    vm::{Frame, ProgramCounter, VirtualMachine},
    ProcessError, ProcessErrorType,
};

/// Runs `block_index` of `program` as the entry block and returns when the
/// run halts (or decodes past the end of the entry block).
///
/// The VM is reset first, so one VM instance can execute any number of
/// programs in sequence. The run is single-threaded and non-suspending:
/// this function only returns on termination, there are no yield points.
pub fn process_block<'a>(
    handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
    block_index: usize,
) -> Result<(), ProcessError> {
    vm.reset();

    let block = program
        .block(block_index)
        .ok_or(ProcessError::new(ProcessErrorType::BlockIndexOutOfBounds))?;

    debug!(block_index, "process block");

    // the entry frame owns the bottom of the operand stack: its locals are
    // seeded with `none` and its stack base is explicitly zero.
    vm.operand_stack.push_n(Value::None, block.local_count);
    vm.frame_stack.push(Frame {
        block_index,
        ip: 0,
        locals_base: 0,
        stack_base: 0,
    });
    vm.pc = ProgramCounter {
        instruction_address: 0,
        block_index,
    };

    process_continuous_instructions(handler, vm, program)
}

pub fn process_continuous_instructions<'a>(
    handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> Result<(), ProcessError> {
    loop {
        let result = process_instruction(handler, vm, program);
        match result {
            HandleResult::Move(relate_offset_in_bytes) => {
                let next_instruction_offset =
                    vm.pc.instruction_address as isize + relate_offset_in_bytes;
                vm.pc.instruction_address = next_instruction_offset as usize;
            }
            HandleResult::Jump(program_counter) => {
                vm.pc = program_counter;
            }
            HandleResult::End => break Ok(()),
            HandleResult::Fatal(error_type) => {
                // an unknown opcode gets the offending block disassembled
                // into the diagnostic
                break Err(match error_type {
                    ProcessErrorType::UnknownOpcode(_) => {
                        let block = &program.blocks[vm.pc.block_index];
                        ProcessError::with_bytecode_text(
                            error_type,
                            format_bytecode_as_text(&block.instructions),
                        )
                    }
                    _ => ProcessError::new(error_type),
                });
            }
        }
    }
}

#[inline]
fn process_instruction<'a>(
    handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    let block = &program.blocks[vm.pc.block_index];

    // decoding past the last instruction terminates the run like `halt`
    if vm.pc.instruction_address >= block.instructions.len() {
        return HandleResult::End;
    }

    let opcode_num = block.instructions[vm.pc.instruction_address];
    let function = handler.handlers[opcode_num as usize];
    function(handler, vm, program)
}
