pub mod builtin_num;
pub mod handler;
pub mod process;
pub mod vm;

mod builtin_handler;

#[cfg(test)]
mod test_helpers;

use std::fmt::Display;

/// The unrecoverable failure of a run.
///
/// Everything in here is a bug of the bytecode producer or of the VM, not a
/// condition a user program can observe or handle; the bytecode has no
/// throw/catch surface. Type mismatches inside operators are deliberately
/// NOT part of this list: operators read the payload channel they were
/// compiled for without checking the discriminant.
#[derive(Debug)]
pub struct ProcessError {
    pub error_type: ProcessErrorType,

    /// disassembly of the offending block, attached when instruction
    /// decoding fails so the diagnostic shows what the VM was reading.
    pub bytecode_text: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ProcessErrorType {
    StackUnderflow,             // pop on an empty operand or frame stack
    UnknownOpcode(u8),          // the opcode byte is not assigned
    ReservedOpcode(u8),         // `start_worker`, reserved but unimplemented
    UnknownOperator(u8),        // `call_op` with an unassigned operator tag
    UnknownFunctionLocation(u8), // `call_func` with an unassigned addressing mode
    UnknownBuiltin,             // `call_c_func` with an unassigned function id
    ArgumentCountMismatch,      // argc exceeds the callee's local slots
    ConstantIndexOutOfBounds,
    LocalIndexOutOfBounds,
    FrameIndexOutOfBounds,
    BlockIndexOutOfBounds,
    JumpTargetOutOfBounds,
    OutputFailure,              // the host output sink rejected a write
}

impl ProcessError {
    pub fn new(error_type: ProcessErrorType) -> Self {
        Self {
            error_type,
            bytecode_text: None,
        }
    }

    pub fn with_bytecode_text(error_type: ProcessErrorType, bytecode_text: String) -> Self {
        Self {
            error_type,
            bytecode_text: Some(bytecode_text),
        }
    }
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (match self.error_type {
            ProcessErrorType::StackUnderflow => {
                write!(f, "Process error: {}", "Stack is empty")
            }
            ProcessErrorType::UnknownOpcode(opcode_num) => {
                write!(f, "Process error: Unknown opcode 0x{:02x}", opcode_num)
            }
            ProcessErrorType::ReservedOpcode(opcode_num) => {
                write!(f, "Process error: Reserved opcode 0x{:02x}", opcode_num)
            }
            ProcessErrorType::UnknownOperator(operator_num) => {
                write!(f, "Process error: Unknown operator 0x{:02x}", operator_num)
            }
            ProcessErrorType::UnknownFunctionLocation(location_num) => {
                write!(
                    f,
                    "Process error: Unknown function location {}",
                    location_num
                )
            }
            ProcessErrorType::UnknownBuiltin => {
                write!(f, "Process error: {}", "Built-in function not found")
            }
            ProcessErrorType::ArgumentCountMismatch => {
                write!(
                    f,
                    "Process error: {}",
                    "The number of arguments exceeds the local slots of the function"
                )
            }
            ProcessErrorType::ConstantIndexOutOfBounds => {
                write!(f, "Process error: {}", "Constant index out of bounds")
            }
            ProcessErrorType::LocalIndexOutOfBounds => {
                write!(f, "Process error: {}", "Local index out of bounds")
            }
            ProcessErrorType::FrameIndexOutOfBounds => {
                write!(f, "Process error: {}", "Frame index out of bounds")
            }
            ProcessErrorType::BlockIndexOutOfBounds => {
                write!(f, "Process error: {}", "Block index out of bounds")
            }
            ProcessErrorType::JumpTargetOutOfBounds => {
                write!(f, "Process error: {}", "Jump target out of bounds")
            }
            ProcessErrorType::OutputFailure => {
                write!(f, "Process error: {}", "Failed to write to the output sink")
            }
        })?;

        if let Some(bytecode_text) = &self.bytecode_text {
            write!(f, "\nBytecode:\n{}", bytecode_text)?;
        }

        Ok(())
    }
}

impl std::error::Error for ProcessError {}
