use crate::bytecode::compile_error::CompileError;
use crate::bytecode::ir::Program;
use crate::bytecode::op::{Instruction, Opcode, Word};

/// Default instruction buffer capacity.
pub const MAX_CODE_LENGTH: usize = 500;

/// Sink for generated instructions.
///
/// The code generator only talks to this trait, so grammar handling can be
/// exercised against any recorder.
pub trait Emit {
    /// Appends an instruction and returns its address.
    fn emit(&mut self, opcode: Opcode, r: Word, l: Word, m: Word) -> Result<usize, CompileError>;

    /// Overwrites the `m` field of an already emitted instruction.
    fn patch_target(&mut self, address: usize, m: Word);

    /// Address the next emitted instruction will get.
    fn next_address(&self) -> usize;
}

/// Append-only, bounded instruction buffer.
#[derive(Debug)]
pub struct CodeEmitter {
    code: Vec<Instruction>,
    capacity: usize,
}

impl CodeEmitter {
    pub fn new(capacity: usize) -> Self {
        Self {
            code: Vec::new(),
            capacity,
        }
    }

    pub fn into_program(self) -> Program {
        Program::new(self.code)
    }
}

impl Default for CodeEmitter {
    fn default() -> Self {
        Self::new(MAX_CODE_LENGTH)
    }
}

impl Emit for CodeEmitter {
    fn emit(&mut self, opcode: Opcode, r: Word, l: Word, m: Word) -> Result<usize, CompileError> {
        if self.code.len() >= self.capacity {
            log::error!(
                "code buffer capacity ({}) reached while emitting {}",
                self.capacity,
                opcode
            );
            return Err(CompileError::CodeBufferExhausted {
                capacity: self.capacity,
            });
        }

        let address = self.code.len();
        self.code.push(Instruction::new(opcode, r, l, m));
        Ok(address)
    }

    fn patch_target(&mut self, address: usize, m: Word) {
        if let Some(ins) = self.code.get_mut(address) {
            ins.m = m;
        }
    }

    fn next_address(&self) -> usize {
        self.code.len()
    }
}
