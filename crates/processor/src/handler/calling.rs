use lark_isa::FunctionLocation;
use lark_program::{program::Program, value::Value};
use tracing::trace;

use crate::{
    vm::{Frame, ProgramCounter, VirtualMachine},
    ProcessErrorType,
};

use super::{local, try_pop, HandleResult, Handler};

pub fn call_func<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param location:u8, [mode operands], argc:i32) (operand args...)
    let block = &program.blocks[vm.pc.block_index];
    let location_num = vm.get_param_u8(block);

    let (function_value, argc, instruction_length) = match FunctionLocation::from_u8(location_num)
    {
        Some(FunctionLocation::constant) => {
            let (_, const_index, argc) = vm.get_param_u8_i32_i32(block);
            let value = match block.constants.get(const_index as usize) {
                Some(value) => *value,
                None => return HandleResult::Fatal(ProcessErrorType::ConstantIndexOutOfBounds),
            };
            (value, argc as usize, 10)
        }
        Some(FunctionLocation::local) => {
            let (_, local_index, argc) = vm.get_param_u8_i32_i32(block);
            let frame = match vm.frame_stack.last() {
                Some(frame) => *frame,
                None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
            };
            let value =
                match local::read_local_slot(vm, &frame, block.local_count, local_index as usize)
                {
                    Ok(value) => value,
                    Err(error_type) => return HandleResult::Fatal(error_type),
                };
            (value, argc as usize, 10)
        }
        Some(FunctionLocation::global) => {
            let (_, frame_index, local_index, argc) = vm.get_param_u8_i32_i32_i32(block);
            let frame = match vm.frame_stack.get(frame_index as usize) {
                Some(frame) => *frame,
                None => return HandleResult::Fatal(ProcessErrorType::FrameIndexOutOfBounds),
            };
            let frame_local_count = program.blocks[frame.block_index].local_count;
            let value =
                match local::read_local_slot(vm, &frame, frame_local_count, local_index as usize)
                {
                    Ok(value) => value,
                    Err(error_type) => return HandleResult::Fatal(error_type),
                };
            (value, argc as usize, 14)
        }
        None => {
            return HandleResult::Fatal(ProcessErrorType::UnknownFunctionLocation(location_num))
        }
    };

    // the resolved value is trusted to be a function; the block index is
    // read straight off the payload channel and bounds-checked against
    // the program
    let callee_block_index = function_value.as_block_index();
    let callee = match program.block(callee_block_index) {
        Some(callee) => callee,
        None => return HandleResult::Fatal(ProcessErrorType::BlockIndexOutOfBounds),
    };

    if argc > vm.operand_stack.len() {
        return HandleResult::Fatal(ProcessErrorType::StackUnderflow);
    }
    if argc > callee.local_count {
        return HandleResult::Fatal(ProcessErrorType::ArgumentCountMismatch);
    }

    // the call sequence:
    //
    // 1. the `argc` operands on the stack top become the callee's first
    //    locals in place; the window base is recorded in the caller frame
    //    as the target of the return cleanup.
    let stack_base = vm.operand_stack.len() - argc;
    let return_address = vm.pc.instruction_address + instruction_length;
    match vm.frame_stack.last_mut() {
        Some(caller) => {
            caller.ip = return_address;
            caller.stack_base = stack_base;
        }
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    }

    // 2. the remaining local slots are seeded with `none`, giving the
    //    callee `local_count` contiguous slots at and above the base.
    vm.operand_stack
        .push_n(Value::None, callee.local_count - argc);

    // 3-4. enter the callee at its first instruction.
    vm.frame_stack.push(Frame {
        block_index: callee_block_index,
        ip: 0,
        locals_base: stack_base,
        stack_base,
    });

    trace!(block_index = callee_block_index, argc, "call function");

    HandleResult::Jump(ProgramCounter {
        instruction_address: 0,
        block_index: callee_block_index,
    })
}

pub fn return_<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    _program: &Program<'a>,
) -> HandleResult {
    // (operand value)
    //
    // the return sequence: drop the callee frame, save the return value,
    // truncate the operand stack to the caller's saved base (this discards
    // the callee locals and any leftover temporaries), then hand the
    // return value to the caller.
    if vm.frame_stack.pop().is_err() {
        return HandleResult::Fatal(ProcessErrorType::StackUnderflow);
    }

    // a return from the entry frame has no caller to resume
    let caller = match vm.frame_stack.last() {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    };

    let return_value = try_pop!(vm);
    vm.operand_stack.truncate(caller.stack_base);
    vm.operand_stack.push(return_value);

    trace!(
        block_index = caller.block_index,
        address = caller.ip,
        "return to caller"
    );

    HandleResult::Jump(ProgramCounter {
        instruction_address: caller.ip,
        block_index: caller.block_index,
    })
}

pub fn call_c_func<'a>(
    handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param builtin_num:i32, argc:i32) (operand args...)
    let block = &program.blocks[vm.pc.block_index];
    let (builtin_num, argc) = vm.get_param_i32_i32(block);
    let argc = argc as usize;

    if builtin_num as usize >= handler.builtin_handlers.len() {
        return HandleResult::Fatal(ProcessErrorType::UnknownBuiltin);
    }
    let builtin_function = handler.builtin_handlers[builtin_num as usize];

    // the argument window stays on the stack while the built-in runs,
    // it is popped afterwards and replaced by the result
    let VirtualMachine {
        operand_stack,
        output,
        ..
    } = vm;
    let argv = match operand_stack.top_slice(argc) {
        Some(argv) => argv,
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    };

    let result = match builtin_function(output.as_mut(), argv) {
        Ok(value) => value,
        Err(error_type) => return HandleResult::Fatal(error_type),
    };

    if vm.operand_stack.pop_n(argc).is_err() {
        return HandleResult::Fatal(ProcessErrorType::StackUnderflow);
    }
    vm.operand_stack.push(result);
    HandleResult::Move(9)
}
