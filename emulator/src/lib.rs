pub mod constants;
pub mod parser;
pub mod runtime;

pub use self::parser::parse_word;
pub use self::runtime::{Alu, AluOp, Lanes, Machine, MachineConfig, Memory, MemoryFunction, RegisterFile};
