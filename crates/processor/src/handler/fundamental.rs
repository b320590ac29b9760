use lark_program::program::Program;

use crate::{vm::VirtualMachine, ProcessErrorType};

use super::{try_pop, HandleResult, Handler};

pub fn push_const<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    program: &Program<'a>,
) -> HandleResult {
    // (param const_index:i32)
    let block = &program.blocks[vm.pc.block_index];
    let const_index = vm.get_param_i32(block) as usize;

    let value = match block.constants.get(const_index) {
        Some(value) => *value,
        None => return HandleResult::Fatal(ProcessErrorType::ConstantIndexOutOfBounds),
    };

    vm.operand_stack.push(value);
    HandleResult::Move(5)
}

pub fn pop<'a>(
    _handler: &Handler,
    vm: &mut VirtualMachine<'a>,
    _program: &Program<'a>,
) -> HandleResult {
    let _ = try_pop!(vm);
    HandleResult::Move(1)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lark_isa::opcode::Opcode;
    use lark_program::{
        bytecode_writer::BytecodeWriter, utils::helper_build_program_with_single_block,
        value::Value,
    };

    use crate::{
        handler::Handler, process::process_block, test_helpers::SharedOutput,
        vm::VirtualMachine, ProcessErrorType,
    };

    #[test]
    fn test_handler_fundamental_push_const() {
        // bytecode
        //
        // 0x0000  push_const        idx:0
        // 0x0005  push_const        idx:1
        // 0x000a  halt
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode_i32(Opcode::push_const, 1);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(
            writer.to_bytes(),
            vec![Value::Number(0.618), Value::StringLiteral("phi")],
            0,
        );

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        process_block(&handler, &mut vm0, &program0, 0).unwrap();

        assert_eq!(vm0.operand_stack.len(), 2);
        assert_eq!(vm0.operand_stack.get(0), Some(&Value::Number(0.618)));
        assert_eq!(vm0.operand_stack.get(1), Some(&Value::StringLiteral("phi")));
    }

    #[test]
    fn test_handler_fundamental_push_const_then_pop_is_idempotent() {
        // bytecode
        //
        // 0x0000  push_const        idx:0
        // 0x0005  pop
        // 0x0006  halt
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 0);
        writer.write_opcode(Opcode::pop);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(
            writer.to_bytes(),
            vec![Value::Number(7.0)],
            0,
        );

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();

        // running the program repeatedly leaves the operand stack unchanged
        for _ in 0..3 {
            process_block(&handler, &mut vm0, &program0, 0).unwrap();
            assert_eq!(vm0.operand_stack.len(), 0);
        }
    }

    #[test]
    fn test_handler_fundamental_push_const_index_out_of_bounds() {
        let mut writer = BytecodeWriter::new();
        writer.write_opcode_i32(Opcode::push_const, 5);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(
            writer.to_bytes(),
            vec![Value::Number(1.0)],
            0,
        );

        let handler = Handler::new();
        let mut vm0 = VirtualMachine::new();
        let result0 = process_block(&handler, &mut vm0, &program0, 0);

        assert_eq!(
            result0.unwrap_err().error_type,
            ProcessErrorType::ConstantIndexOutOfBounds
        );
    }

    #[test]
    fn test_handler_fundamental_pop_underflow() {
        // a bare `pop` on the empty stack must fail without producing
        // any output
        let mut writer = BytecodeWriter::new();
        writer.write_opcode(Opcode::pop);
        writer.write_opcode(Opcode::halt);

        let program0 = helper_build_program_with_single_block(writer.to_bytes(), vec![], 0);

        let output = SharedOutput::new();
        let handler = Handler::new();
        let mut vm0 = VirtualMachine::with_output(Box::new(output.clone()));
        let result0 = process_block(&handler, &mut vm0, &program0, 0);

        assert_eq!(
            result0.unwrap_err().error_type,
            ProcessErrorType::StackUnderflow
        );
        assert_eq!(output.text(), "");
    }
}
