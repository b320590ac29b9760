use crate::value::Value;

/// A compiled unit: bytecode, a constant pool, and the number of local
/// slots the unit reserves.
///
/// Blocks are immutable once built. The well-formedness contract the
/// interpreter relies on (and bounds-checks at run time):
///
/// - every constant index referenced by the instructions is below
///   `constants.len()`
/// - every local index is below `local_count`
/// - every jump target lies within `[0, instructions.len())`
///
/// The first `argc` local slots of a block that is called as a function are
/// its arguments; `local_count` must cover them.
#[derive(Debug)]
pub struct Block<'a> {
    pub instructions: Vec<u8>,
    pub constants: Vec<Value<'a>>,
    pub local_count: usize,
}

impl<'a> Block<'a> {
    pub fn new(instructions: Vec<u8>, constants: Vec<Value<'a>>, local_count: usize) -> Self {
        Self {
            instructions,
            constants,
            local_count,
        }
    }
}

/// The block table of a compiled program.
///
/// Function values do not point at blocks, they carry indexes into this
/// table. That keeps values plain `Copy` data and makes self-reference
/// trivial: a recursive function simply lists its own index in its own
/// constant pool.
#[derive(Debug, Default)]
pub struct Program<'a> {
    pub blocks: Vec<Block<'a>>,
}

impl<'a> Program<'a> {
    pub fn new(blocks: Vec<Block<'a>>) -> Self {
        Self { blocks }
    }

    pub fn block(&self, block_index: usize) -> Option<&Block<'a>> {
        self.blocks.get(block_index)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        program::{Block, Program},
        value::Value,
    };

    #[test]
    fn test_program_block_lookup() {
        let program = Program::new(vec![
            Block::new(vec![], vec![], 0),
            Block::new(vec![], vec![Value::Number(1.0)], 2),
        ]);

        assert_eq!(program.block(1).unwrap().local_count, 2);
        assert!(program.block(2).is_none());
    }

    #[test]
    fn test_program_self_referential_constant() {
        // a block may carry its own index as a function constant,
        // this is how recursion is compiled
        let block = Block::new(vec![], vec![Value::Function(0)], 1);
        let program = Program::new(vec![block]);

        let constant = program.block(0).unwrap().constants[0];
        assert_eq!(constant.as_block_index(), 0);
    }
}
