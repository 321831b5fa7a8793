pub mod runtime_error;
pub mod trace;
pub mod vm;

pub use runtime_error::RuntimeError;
pub use vm::{VirtualMachine, VmConfig, VmState};
