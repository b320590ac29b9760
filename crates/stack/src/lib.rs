// Lark Script Calling Convention
// ------------------------------
// The VM owns two stacks: the operand stack, which holds tagged values, and
// the frame stack, which holds one activation record per live call. The local
// variables of a frame are not stored separately, they live INSIDE the
// operand stack, overlaid on the arguments the caller pushed.
//
// 1. Function 1 is preparing to call Function 2 by pushing the arguments.
//
// ```diagram
// |         |
// |  arg 1  | <-- Operands of Function 1, used as arguments for Function 2.
// |  arg 0  |
// |   ###   | <-- Other operands of Function 1.
// |---------| <-- locals of Function 1 (local 0 .. local N).
// |   ...   |
// \---------/ <-- Stack start.
// ```
//
// 2. Function 2 is called with argc = 2 and local_count = 3.
//
// ```diagram
// |         |
// | local 2 | <-- Extra local slots are filled with `none`.
// |  arg 1  | <-- The arguments become local 1 and local 0 of Function 2
// |  arg 0  |     without being copied. This boundary is the `stack_base`
// |---------|     saved for the return cleanup, and the `locals_base`
// |   ###   |     of Function 2.
// |---------|
// |   ...   |
// \---------/
// ```
//
// 3. Function 2 returns. The top operand is the return value; everything
//    down to the saved `stack_base` (locals, leftover temporaries) is
//    discarded and the return value is pushed back for Function 1.
//
// ```diagram
// |         |
// | result  |
// |   ###   | <-- Remaining operands of Function 1.
// |---------|
// |   ...   |
// \---------/
// ```
//
// Because locals are plain offsets into the operand stack, the stack is free
// to reallocate while a frame is live; no pointers into the buffer exist.

pub mod slot_stack;

// the stack never shrinks below this capacity, and empty stacks start here.
pub const STACK_MIN_CAPACITY: usize = 8;

// capacity is doubled on overflow.
pub const STACK_GROWTH_FACTOR: usize = 2;

// a stack is considered sparse when the capacity reaches
// `size * STACK_SHRINK_THRESHOLD`; it is then reduced to
// `size * STACK_SHRINK_FACTOR`.
pub const STACK_SHRINK_FACTOR: usize = 2;
pub const STACK_SHRINK_THRESHOLD: usize = 8;

/// Popping an empty stack is an implementation bug of the bytecode producer
/// or of the VM itself, never a user-program condition. The error carries no
/// detail; callers are expected to abort the run.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    Underflow,
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackError::Underflow => f.write_str("Stack is empty."),
        }
    }
}

impl std::error::Error for StackError {}
