use std::io::Write;

use lark_isa::{opcode::Opcode, FunctionLocation, Operator};

pub struct BytecodeWriter {
    buffer: Vec<u8>, // trait std::io::Write
}

/// Note that the word 'i32' in these function names indicates a 32-bit
/// integer operand slot; operands are encoded little-endian and signed
/// values are passed two's-complement through `u32`.
impl BytecodeWriter {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            buffer: Vec::<u8>::new(),
        }
    }

    fn put_u8(&mut self, value: u8) {
        self.buffer.write_all(&[value]).unwrap();
    }

    fn put_i32(&mut self, value: u32) {
        let data = value.to_le_bytes();
        self.buffer.write_all(&data).unwrap();
    }

    fn put_opcode(&mut self, opcode: Opcode) -> usize {
        let addr = self.get_addr();
        self.put_u8(opcode as u8);
        addr
    }

    /// 8-bit instruction
    ///
    /// return the address of instruction
    pub fn write_opcode(&mut self, opcode: Opcode) -> usize {
        self.put_opcode(opcode)
    }

    /// 40-bit instruction
    /// opcode 8 + param 32
    pub fn write_opcode_i32(&mut self, opcode: Opcode, value: u32) -> usize {
        let addr = self.put_opcode(opcode);
        self.put_i32(value);
        addr
    }

    /// 72-bit instruction
    /// opcode 8 + param0 32 + param1 32
    pub fn write_opcode_i32_i32(&mut self, opcode: Opcode, param0: u32, param1: u32) -> usize {
        let addr = self.put_opcode(opcode);
        self.put_i32(param0);
        self.put_i32(param1);
        addr
    }

    /// 16-bit instruction, the `call_op` scheme
    /// opcode 8 + operator tag 8
    pub fn write_opcode_operator(&mut self, opcode: Opcode, operator: Operator) -> usize {
        let addr = self.put_opcode(opcode);
        self.put_u8(operator as u8);
        addr
    }

    /// 80-bit instruction, the `call_func` scheme for the `constant` and
    /// `local` addressing modes
    /// opcode 8 + location 8 + index 32 + argc 32
    pub fn write_opcode_location_i32_i32(
        &mut self,
        opcode: Opcode,
        location: FunctionLocation,
        index: u32,
        argc: u32,
    ) -> usize {
        let addr = self.put_opcode(opcode);
        self.put_u8(location as u8);
        self.put_i32(index);
        self.put_i32(argc);
        addr
    }

    /// 112-bit instruction, the `call_func` scheme for the `global`
    /// addressing mode
    /// opcode 8 + location 8 + frame index 32 + local index 32 + argc 32
    pub fn write_opcode_location_i32_i32_i32(
        &mut self,
        opcode: Opcode,
        location: FunctionLocation,
        frame_index: u32,
        local_index: u32,
        argc: u32,
    ) -> usize {
        let addr = self.put_opcode(opcode);
        self.put_u8(location as u8);
        self.put_i32(frame_index);
        self.put_i32(local_index);
        self.put_i32(argc);
        addr
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> std::io::Result<()> {
        writer.write_all(&self.buffer)
    }
}

impl BytecodeWriter {
    fn rewrite_buffer(&mut self, addr: usize, value: u32) {
        self.buffer[addr..(addr + 4)].copy_from_slice(value.to_le_bytes().as_ref());
    }

    pub fn get_addr(&self) -> usize {
        self.buffer.len()
    }

    /// Patches the target of a `jump` or `jump_false` instruction emitted
    /// earlier with a placeholder. `addr` is the instruction address the
    /// write method returned.
    pub fn fill_jump_stub(&mut self, addr: usize, target: u32) {
        // (opcode:u8, target:i32)
        self.rewrite_buffer(addr + 1, target);
    }
}
