use serde::{Deserialize, Serialize};

use crate::bytecode::op::Word;

/// Number of slots the call protocol writes at the start of every activation
/// record: unused, static link, dynamic link, return address.
pub const FRAME_HEADER_SIZE: Word = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Constant,
    Variable,
    Procedure,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Constant => write!(f, "const"),
            SymbolKind::Variable => write!(f, "var"),
            SymbolKind::Procedure => write!(f, "proc"),
        }
    }
}

/// Stable handle to a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) usize);

/// A declared name.
///
/// `value` is meaningful for constants, `address` for variables (offset in
/// the activation record of `level`). Procedures get `entry_address` once
/// their block has been generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub level: usize,
    pub value: Word,
    pub address: Word,
    pub entry_address: Option<usize>,
}

impl Symbol {
    pub fn constant(name: &str, level: usize, value: Word) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Constant,
            level,
            value,
            address: 0,
            entry_address: None,
        }
    }

    pub fn variable(name: &str, level: usize, address: Word) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            level,
            value: 0,
            address,
            entry_address: None,
        }
    }

    pub fn procedure(name: &str, level: usize) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Procedure,
            level,
            value: 0,
            address: 0,
            entry_address: None,
        }
    }

    /// Lexical-level distance from a use site at `from_level`.
    pub fn level_difference(&self, from_level: usize) -> Word {
        from_level.saturating_sub(self.level) as Word
    }
}
