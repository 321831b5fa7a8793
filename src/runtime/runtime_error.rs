use thiserror::Error;

use crate::bytecode::op::Word;

/// A fault that stops the machine.
///
/// Every variant carries `address`, the index of the instruction that was
/// executing when the fault happened.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{address}: unknown opcode {opcode}")]
    UnknownOpcode { address: usize, opcode: Word },

    #[error("{address}: program counter outside the program ({len} instructions)")]
    ProgramCounterOutOfRange { address: usize, len: usize },

    #[error("{address}: register {register} does not exist")]
    RegisterOutOfRange { address: usize, register: Word },

    #[error("{address}: stack address {slot} is out of range")]
    StackAddressOutOfRange { address: usize, slot: Word },

    #[error("{address}: return with no calling frame")]
    ReturnFromMain { address: usize },

    #[error("{address}: static link chain broken after {depth} hops")]
    InvalidStaticLink { address: usize, depth: Word },

    #[error("{address}: division by zero")]
    DivisionByZero { address: usize },

    #[error("{address}: input exhausted")]
    InputExhausted { address: usize },

    #[error("{address}: '{token}' is not an integer")]
    InvalidInput { address: usize, token: String },

    #[error("{address}: execution step limit exceeded ({limit})")]
    StepLimitExceeded { address: usize, limit: usize },

    #[error("{address}: stack overflow (limit {limit})")]
    StackOverflow { address: usize, limit: usize },

    #[error("{address}: i/o error: {source}")]
    Io {
        address: usize,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Address of the faulting instruction.
    pub fn address(&self) -> usize {
        match self {
            RuntimeError::UnknownOpcode { address, .. }
            | RuntimeError::ProgramCounterOutOfRange { address, .. }
            | RuntimeError::RegisterOutOfRange { address, .. }
            | RuntimeError::StackAddressOutOfRange { address, .. }
            | RuntimeError::ReturnFromMain { address }
            | RuntimeError::InvalidStaticLink { address, .. }
            | RuntimeError::DivisionByZero { address }
            | RuntimeError::InputExhausted { address }
            | RuntimeError::InvalidInput { address, .. }
            | RuntimeError::StepLimitExceeded { address, .. }
            | RuntimeError::StackOverflow { address, .. }
            | RuntimeError::Io { address, .. } => *address,
        }
    }
}
