//! # Names and scopes
//!
//! Declared constants, variables and procedures, and the scoped table the
//! code generator resolves identifiers against.
//!
//! Scoping is lexical: a block sees its own names and those of every block
//! that encloses it. A name declared in an inner block shadows an outer
//! declaration with the same spelling.

pub mod symbol;
pub mod symbol_table;

pub use symbol::{FRAME_HEADER_SIZE, Symbol, SymbolId, SymbolKind};
pub use symbol_table::{Declaration, Resolution, SymbolError, SymbolTable};
