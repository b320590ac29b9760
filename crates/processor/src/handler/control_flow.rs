use lark_program::program::Program;

use crate::{
    vm::{ProgramCounter, VirtualMachine},
    ProcessErrorType,
};

use super::{try_pop, HandleResult, Handler};

pub fn halt<'a>(
    _handler: &Handler,
    _vm: &mut VirtualMachine<'a>,
    _program: &Program<'a>,
) -> HandleResult {
    HandleResult::End
}

pub fn jump<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param target:i32)
    //
    // the target is an absolute byte offset within the current block.
    let block = &program.blocks[vm.pc.block_index];
    let target = vm.get_param_i32(block) as usize;

    if target >= block.instructions.len() {
        return HandleResult::Fatal(ProcessErrorType::JumpTargetOutOfBounds);
    }

    HandleResult::Jump(ProgramCounter {
        instruction_address: target,
        block_index: vm.pc.block_index,
    })
}

pub fn jump_false<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param target:i32) (operand test)
    //
    // pops the test operand and branches when its bool channel reads
    // false, otherwise falls through.
    let block = &program.blocks[vm.pc.block_index];
    let target = vm.get_param_i32(block) as usize;

    let test = try_pop!(vm);
    if test.as_bool() {
        HandleResult::Move(5)
    } else {
        if target >= block.instructions.len() {
            return HandleResult::Fatal(ProcessErrorType::JumpTargetOutOfBounds);
        }
        HandleResult::Jump(ProgramCounter {
            instruction_address: target,
            block_index: vm.pc.block_index,
        })
    }
}
