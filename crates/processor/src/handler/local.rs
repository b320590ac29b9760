// local slots live in the operand stack at `frame.locals_base ..
// frame.locals_base + local_count`. the index arithmetic below is the whole
// story of local addressing; there are no pointers to invalidate.

use lark_program::{program::Program, value::Value};

use crate::{
    vm::{Frame, VirtualMachine},
    ProcessErrorType,
};

use super::{try_pop, HandleResult, Handler};

pub(crate) fn read_local_slot<'a>(
    vm: &VirtualMachine<'a>,
    frame: &Frame,
    local_count: usize,
    local_index: usize,
) -> Result<Value<'a>, ProcessErrorType> {
    if local_index >= local_count {
        return Err(ProcessErrorType::LocalIndexOutOfBounds);
    }
    vm.operand_stack
        .get(frame.locals_base + local_index)
        .copied()
        .ok_or(ProcessErrorType::LocalIndexOutOfBounds)
}

fn write_local_slot<'a>(
    vm: &mut VirtualMachine<'a>,
    frame: &Frame,
    local_count: usize,
    local_index: usize,
    value: Value<'a>,
) -> Result<(), ProcessErrorType> {
    if local_index >= local_count {
        return Err(ProcessErrorType::LocalIndexOutOfBounds);
    }
    match vm.operand_stack.get_mut(frame.locals_base + local_index) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(ProcessErrorType::LocalIndexOutOfBounds),
    }
}

pub fn push_local<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param local_index:i32)
    let block = &program.blocks[vm.pc.block_index];
    let local_index = vm.get_param_i32(block) as usize;

    let frame = match vm.frame_stack.last() {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    };

    match read_local_slot(vm, &frame, block.local_count, local_index) {
        Ok(value) => {
            vm.operand_stack.push(value);
            HandleResult::Move(5)
        }
        Err(error_type) => HandleResult::Fatal(error_type),
    }
}

pub fn store_local<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param local_index:i32)
    let block = &program.blocks[vm.pc.block_index];
    let local_index = vm.get_param_i32(block) as usize;

    let frame = match vm.frame_stack.last() {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    };

    let value = try_pop!(vm);
    match write_local_slot(vm, &frame, block.local_count, local_index, value) {
        Ok(()) => HandleResult::Move(5),
        Err(error_type) => HandleResult::Fatal(error_type),
    }
}

pub fn push<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param frame_index:i32, local_index:i32)
    //
    // reads a local slot of an arbitrary frame; the frame is addressed
    // from the bottom of the frame stack, so index 0 is the entry frame
    // and its locals act as the globals of the program.
    let block = &program.blocks[vm.pc.block_index];
    let (frame_index, local_index) = vm.get_param_i32_i32(block);

    let frame = match vm.frame_stack.get(frame_index as usize) {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::FrameIndexOutOfBounds),
    };

    let frame_local_count = program.blocks[frame.block_index].local_count;
    match read_local_slot(vm, &frame, frame_local_count, local_index as usize) {
        Ok(value) => {
            vm.operand_stack.push(value);
            HandleResult::Move(9)
        }
        Err(error_type) => HandleResult::Fatal(error_type),
    }
}

pub fn store<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param frame_index:i32, local_index:i32)
    let block = &program.blocks[vm.pc.block_index];
    let (frame_index, local_index) = vm.get_param_i32_i32(block);

    let frame = match vm.frame_stack.get(frame_index as usize) {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::FrameIndexOutOfBounds),
    };

    let frame_local_count = program.blocks[frame.block_index].local_count;
    let value = try_pop!(vm);
    match write_local_slot(vm, &frame, frame_local_count, local_index as usize, value) {
        Ok(()) => HandleResult::Move(9),
        Err(error_type) => HandleResult::Fatal(error_type),
    }
}

pub fn inc_local<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param local_index:i32)
    do_local_float_add(vm, program, 1.0)
}

pub fn dec_local<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param local_index:i32)
    do_local_float_add(vm, program, -1.0)
}

// the float channel of the slot is adjusted in place, the discriminant
// stays whatever it was.
fn do_local_float_add(vm: &mut VirtualMachine, program: &Program, delta: f64) -> HandleResult {
    let block = &program.blocks[vm.pc.block_index];
    let local_index = vm.get_param_i32(block) as usize;

    let frame = match vm.frame_stack.last() {
        Some(frame) => *frame,
        None => return HandleResult::Fatal(ProcessErrorType::StackUnderflow),
    };

    if local_index >= block.local_count {
        return HandleResult::Fatal(ProcessErrorType::LocalIndexOutOfBounds);
    }

    match vm.operand_stack.get_mut(frame.locals_base + local_index) {
        Some(slot) => {
            slot.float_channel_add(delta);
            HandleResult::Move(5)
        }
        None => HandleResult::Fatal(ProcessErrorType::LocalIndexOutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lark_isa::{opcode::Opcode, FunctionLocation, Operator};
    use lark_program::{
        bytecode_writer::BytecodeWriter,
        utils::{helper_build_program_with_blocks, helper_build_program_with_single_block},
        value::Value,
    };

    use crate::{
        handler::Handler, process::process_block, vm::VirtualMachine, ProcessErrorType,
    };

    #[test]
    fn test_handler_local_store_and_push() {
        // bytecode
        //
        // 0x0000  push_const        idx:0
        // 0x0005  store_local       idx:0
        // 0x000a  push_const        idx:1
        // 0x000f  store_local       idx:1
        // 0x0014  push_local        idx:0
        // 0x0019  push_local        idx:1
        // 0x001e  halt
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode_i32(Opcode::store_local, 0);
        writer.write_opcode_i32(Opcode::push_const, 1);
        writer.write_opcode_i32(Opcode::store_local, 1);
        writer.write_opcode_i32(Opcode::push_local, 0);
        writer.write_opcode_i32(Opcode::push_local, 1);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(
            writer.to_bytes(),
            vec![Value::Number(11.0), Value::Number(13.0)],
            2,
        );

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        process_block(&handler, &mut vm0, &program0, 0).unwrap();

        // slots 0 and 1 are the locals, 2 and 3 the pushed copies
        assert_eq!(vm0.operand_stack.len(), 4);
        assert_eq!(vm0.operand_stack.get(0), Some(&Value::Number(11.0)));
        assert_eq!(vm0.operand_stack.get(1), Some(&Value::Number(13.0)));
        assert_eq!(vm0.operand_stack.get(2), Some(&Value::Number(11.0)));
        assert_eq!(vm0.operand_stack.get(3), Some(&Value::Number(13.0)));
    }

    #[test]
    fn test_handler_local_inc_and_dec() {
        // local 0 = 5.0, then +1 +1 -1
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode_i32(Opcode::store_local, 0);
        writer.write_opcode_i32(Opcode::inc_local, 0);
        writer.write_opcode_i32(Opcode::inc_local, 0);
        writer.write_opcode_i32(Opcode::dec_local, 0);
        writer.write_opcode_i32(Opcode::push_local, 0);
        writer.write_opcode(Opcode::halt);

        let program0 =
            helper_build_program_with_single_block(writer.to_bytes(), vec![Value::Number(5.0)], 1);

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        process_block(&handler, &mut vm0, &program0, 0).unwrap();

        assert_eq!(vm0.operand_stack.last(), Some(&Value::Number(6.0)));
    }

    #[test]
    fn test_handler_local_inc_keeps_discriminant() {
        // incrementing an integer-tagged slot writes the float channel but
        // keeps the tag
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode_i32(Opcode::store_local, 0);
        writer.write_opcode_i32(Opcode::inc_local, 0);
        writer.write_opcode_i32(Opcode::push_local, 0);
        writer.write_opcode(Opcode::halt);

        let program0 =
            helper_build_program_with_single_block(writer.to_bytes(), vec![Value::Integer(0)], 1);

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        process_block(&handler, &mut vm0, &program0, 0).unwrap();

        let top = *vm0.operand_stack.last().unwrap();
        assert!(matches!(top, Value::Integer(_)));
        assert_eq!(top.as_f64(), 1.0);
    }

    #[test]
    fn test_handler_local_index_out_of_bounds() {
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_local, 3);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(writer.to_bytes(), vec![], 1);

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        let result0 = process_block(&handler, &mut vm0, &program0, 0);

        assert_eq!(
            result0.unwrap_err().error_type,
            ProcessErrorType::LocalIndexOutOfBounds
        );
    }

    #[test]
    fn test_handler_global_push_and_store_across_frames() {
        // the entry block parks 21.0 in its local 0, then calls a function
        // that doubles that slot through the frame-addressed `push`/`store`
        // and returns the factor it used.
        //
        // block 0 (entry, locals 1, constants [21.0, fn 1]):
        //     push_const 0
        //     store_local 0
        //     call_func constant idx:1 argc:0
        //     pop                       ;; the returned factor
        //     push_local 0
        //     halt
        //
        // block 1 (locals 1, constants [2.0]):
        //     push frame:0 idx:0
        //     push_const 0
        //     call_op mul
        //     store frame:0 idx:0
        //     push_const 0
        //     return
        let mut writer0 = BytecodeWriter::new();
        writer0.write_opcode_i32(Opcode::push_const, 0);
        writer0.write_opcode_i32(Opcode::store_local, 0);
        writer0.write_opcode_location_i32_i32(Opcode::call_func, FunctionLocation::constant, 1, 0);
        writer0.write_opcode(Opcode::pop);
        writer0.write_opcode_i32(Opcode::push_local, 0);
        writer0.write_opcode(Opcode::halt);

        let mut writer1 = BytecodeWriter::new();
        writer1.write_opcode_i32_i32(Opcode::push, 0, 0);
        writer1.write_opcode_i32(Opcode::push_const, 0);
        writer1.write_opcode_operator(Opcode::call_op, Operator::mul);
        writer1.write_opcode_i32_i32(Opcode::store, 0, 0);
        writer1.write_opcode_i32(Opcode::push_const, 0);
        writer1.write_opcode(Opcode::return_);

        let program0 = helper_build_program_with_blocks(vec![
            (
                writer0.to_bytes(),
                vec![Value::Number(21.0), Value::Function(1)],
                1,
            ),
            (writer1.to_bytes(), vec![Value::Number(2.0)], 1),
        ]);

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        process_block(&handler, &mut vm0, &program0, 0).unwrap();

        assert_eq!(vm0.operand_stack.last(), Some(&Value::Number(42.0)));
    }
}
