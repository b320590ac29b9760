use crate::{
    program::{Block, Program},
    value::Value,
};

/// Builds a program whose only block is the entry block. Most interpreter
/// tests need nothing more.
pub fn helper_build_program_with_single_block(
    instructions: Vec<u8>,
    constants: Vec<Value<'_>>,
    local_count: usize,
) -> Program<'_> {
    Program::new(vec![Block::new(instructions, constants, local_count)])
}

/// Builds a program from `(instructions, constants, local_count)` triples;
/// block indexes follow the list order, the entry block is index 0.
pub fn helper_build_program_with_blocks(
    entries: Vec<(Vec<u8>, Vec<Value<'_>>, usize)>,
) -> Program<'_> {
    Program::new(
        entries
            .into_iter()
            .map(|(instructions, constants, local_count)| {
                Block::new(instructions, constants, local_count)
            })
            .collect(),
    )
}
