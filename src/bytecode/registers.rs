use crate::bytecode::compile_error::CompileError;
use crate::bytecode::op::Word;

/// Default register file size.
pub const REGISTER_COUNT: usize = 16;

/// Tracks which registers hold live values during generation.
///
/// Always hands out the lowest free register, so nested expressions use
/// registers in stack order.
#[derive(Debug)]
pub struct RegisterAllocator {
    live: Vec<bool>,
}

impl RegisterAllocator {
    pub fn new(count: usize) -> Self {
        Self {
            live: vec![false; count],
        }
    }

    pub fn allocate(&mut self) -> Result<Word, CompileError> {
        let index = self
            .live
            .iter()
            .position(|live| !live)
            .ok_or(CompileError::RegistersExhausted {
                count: self.live.len(),
            })?;
        self.live[index] = true;
        Ok(index as Word)
    }

    pub fn free(&mut self, register: Word) {
        if let Some(slot) = usize::try_from(register)
            .ok()
            .and_then(|i| self.live.get_mut(i))
        {
            *slot = false;
        }
    }
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new(REGISTER_COUNT)
    }
}
