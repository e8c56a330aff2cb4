pub mod block;
pub mod builder;
pub mod function;
pub mod instr;
pub mod module;
pub mod printer;
pub mod value;

pub use block::BasicBlock;
pub use builder::IrBuilder;
pub use function::Function;
pub use instr::{Instruction, OpCode};
pub use module::Module;
pub use printer::{print_block, print_function, print_instruction, print_module, print_value};
pub use value::Value;
