pub mod bytecode_reader;
pub mod bytecode_writer;
pub mod program;
pub mod utils;
pub mod value;
