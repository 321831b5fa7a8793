//! PL/0 toolchain: a single-pass code generator that turns PL/0 source into
//! P-code, and a register/stack virtual machine that runs it.
//!
//! ```no_run
//! use pl0::{bytecode::CompilerConfig, compile_source, runtime::VirtualMachine};
//!
//! let compiled = compile_source("var x; begin x := 6 * 7; write x end.", &CompilerConfig::default())?;
//! let mut vm = VirtualMachine::default();
//! vm.run(compiled.program, &mut std::io::stdin().lock(), &mut std::io::stdout())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bytecode;
pub mod config;
pub mod frontend;
pub mod lang;
pub mod runtime;

use thiserror::Error;

use crate::bytecode::{Compilation, CompileError, CompilerConfig};
use crate::frontend::LexerError;

/// Either stage of turning source text into a program can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("LEXER ERROR[{}]: line {0}", .0.code())]
    Lex(#[from] LexerError),

    #[error("{} ({0})", .0.report())]
    Compile(#[from] CompileError),
}

/// Tokenizes and compiles a source text.
pub fn compile_source(source: &str, config: &CompilerConfig) -> Result<Compilation, BuildError> {
    let tokens = frontend::tokenize(source)?;
    Ok(bytecode::compile(tokens, config)?)
}
