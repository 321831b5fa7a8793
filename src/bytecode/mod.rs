pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod emitter;
pub mod ir;
pub mod op;
pub mod registers;

pub use compile::{CodeGenerator, Compilation, CompilerConfig, compile};
pub use compile_error::CompileError;
pub use emitter::{CodeEmitter, Emit};
pub use ir::{Program, WireError};
pub use op::{Instruction, Opcode, Word};
