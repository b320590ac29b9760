use std::io;

use lark_program::{program::Block, value::Value};
use lark_stack::slot_stack::SlotStack;

/// The location of the next instruction to be executed.
///
/// Functions are individual blocks addressed by index, so the program
/// counter is not a single number but a pair of
/// `(block index, instruction address)`; the address is a byte offset
/// within the instructions of that block.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ProgramCounter {
    // byte offset of the next instruction within the current block.
    pub instruction_address: usize,

    // the index of the block being executed.
    pub block_index: usize,
}

/// An activation record.
///
/// The locals of a frame are not stored in the frame itself, they live in
/// the operand stack starting at `locals_base` (see the calling convention
/// in the stack crate). Representing the window by offset instead of by
/// pointer keeps it valid across stack reallocation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Frame {
    /// the block this frame executes.
    pub block_index: usize,

    /// the saved instruction address. While the frame is on top of the
    /// frame stack the live address is `vm.pc`; this field is written by
    /// `call_func` to point just past the call instruction and is read
    /// back by `return_`.
    pub ip: usize,

    /// where the locals window starts in the operand stack. Fixed for the
    /// lifetime of the frame.
    pub locals_base: usize,

    /// the operand-stack size the return cleanup truncates to. Equal to
    /// `locals_base` when the frame is entered, and rewritten to the base
    /// of the outgoing argument window each time this frame performs a
    /// call.
    pub stack_base: usize,
}

/// One virtual machine instance.
///
/// A VM owns its operand stack and frame stack and nothing else; blocks are
/// read-only data shared with the embedder. Multiple VMs may coexist, there
/// is no process-wide state.
pub struct VirtualMachine<'a> {
    pub operand_stack: SlotStack<Value<'a>>,
    pub frame_stack: SlotStack<Frame>,
    pub pc: ProgramCounter,

    /// the text sink the `print` built-in writes to, stdout unless the
    /// embedder provides something else.
    pub output: Box<dyn io::Write>,
}

impl<'a> VirtualMachine<'a> {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn io::Write>) -> Self {
        Self {
            operand_stack: SlotStack::new(),
            frame_stack: SlotStack::new(),
            pc: ProgramCounter {
                instruction_address: 0,
                block_index: 0,
            },
            output,
        }
    }

    /// Clears both stacks and rewinds the program counter so the VM can run
    /// another program. Capacity is kept.
    pub fn reset(&mut self) {
        self.operand_stack.reset();
        self.frame_stack.reset();
        self.pc = ProgramCounter {
            instruction_address: 0,
            block_index: 0,
        };
    }
}

impl Default for VirtualMachine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn read_i32(instructions: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(instructions[offset..(offset + 4)].try_into().unwrap())
}

/// Instruction parameter accessors, reading relative to the current
/// program counter. Note that 'i32' here means a 32-bit operand slot
/// (little-endian, two's-complement); the raw value is handed out as `u32`.
impl VirtualMachine<'_> {
    /// [opcode u8] + [param u8]
    pub fn get_param_u8(&self, block: &Block) -> u8 {
        block.instructions[self.pc.instruction_address + 1]
    }

    /// [opcode u8] + [param i32]
    pub fn get_param_i32(&self, block: &Block) -> u32 {
        read_i32(&block.instructions, self.pc.instruction_address + 1)
    }

    /// [opcode u8] + [param i32] + [param i32]
    pub fn get_param_i32_i32(&self, block: &Block) -> (u32, u32) {
        let addr = self.pc.instruction_address + 1;
        (
            read_i32(&block.instructions, addr),
            read_i32(&block.instructions, addr + 4),
        )
    }

    /// [opcode u8] + [param u8] + [param i32] + [param i32]
    pub fn get_param_u8_i32_i32(&self, block: &Block) -> (u8, u32, u32) {
        let addr = self.pc.instruction_address + 1;
        (
            block.instructions[addr],
            read_i32(&block.instructions, addr + 1),
            read_i32(&block.instructions, addr + 5),
        )
    }

    /// [opcode u8] + [param u8] + [param i32] * 3
    pub fn get_param_u8_i32_i32_i32(&self, block: &Block) -> (u8, u32, u32, u32) {
        let addr = self.pc.instruction_address + 1;
        (
            block.instructions[addr],
            read_i32(&block.instructions, addr + 1),
            read_i32(&block.instructions, addr + 5),
            read_i32(&block.instructions, addr + 9),
        )
    }
}
