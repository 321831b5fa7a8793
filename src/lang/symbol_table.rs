use thiserror::Error;

use crate::bytecode::op::Word;
use crate::lang::symbol::{FRAME_HEADER_SIZE, Symbol, SymbolId, SymbolKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("'{name}' is already declared in this scope")]
    DuplicateName { name: String },

    #[error("'{name}' is not declared")]
    UndeclaredName { name: String },

    #[error("symbol table is full ({capacity} entries)")]
    TableFull { capacity: usize },

    #[error("no scope is open at level {level}")]
    NoScopeAtLevel { level: usize },
}

/// What is being declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Constant(Word),
    Variable,
    Procedure,
}

/// A successful lookup: the symbol and the lexical-level distance from the
/// use site to its declaration.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub id: SymbolId,
    pub symbol: &'a Symbol,
    pub level_difference: Word,
}

#[derive(Debug)]
struct Scope {
    level: usize,
    /// Index into `visible` where this scope's names start.
    start: usize,
    next_offset: Word,
}

/// Scoped symbol table.
///
/// Every declaration is kept in `symbols` for listings; `visible` holds the
/// names of the currently open scope chain, innermost last.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    visible: Vec<usize>,
    scopes: Vec<Scope>,
    capacity: usize,
}

impl SymbolTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            symbols: Vec::new(),
            visible: Vec::new(),
            scopes: Vec::new(),
            capacity,
        }
    }

    pub fn open_scope(&mut self, level: usize) {
        log::debug!("open scope at level {}", level);
        self.scopes.push(Scope {
            level,
            start: self.visible.len(),
            next_offset: FRAME_HEADER_SIZE,
        });
    }

    /// Closes the innermost scope; its names stop being visible.
    pub fn close_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            log::debug!(
                "close scope at level {} ({} names)",
                scope.level,
                self.visible.len() - scope.start
            );
            self.visible.truncate(scope.start);
        }
    }

    /// Number of variable slots declared so far in the innermost scope.
    pub fn local_variable_count(&self) -> Word {
        self.scopes
            .last()
            .map(|s| s.next_offset - FRAME_HEADER_SIZE)
            .unwrap_or(0)
    }

    pub fn declare(
        &mut self,
        name: &str,
        declaration: Declaration,
        level: usize,
    ) -> Result<SymbolId, SymbolError> {
        let scope = match self.scopes.last() {
            Some(scope) if scope.level == level => scope,
            _ => return Err(SymbolError::NoScopeAtLevel { level }),
        };

        let duplicate = self.visible[scope.start..]
            .iter()
            .any(|&i| self.symbols[i].name == name);
        if duplicate {
            return Err(SymbolError::DuplicateName {
                name: name.to_string(),
            });
        }

        if self.symbols.len() >= self.capacity {
            return Err(SymbolError::TableFull {
                capacity: self.capacity,
            });
        }

        let symbol = match declaration {
            Declaration::Constant(value) => Symbol::constant(name, level, value),
            Declaration::Procedure => Symbol::procedure(name, level),
            Declaration::Variable => {
                let scope = self
                    .scopes
                    .last_mut()
                    .ok_or(SymbolError::NoScopeAtLevel { level })?;
                let address = scope.next_offset;
                scope.next_offset += 1;
                Symbol::variable(name, level, address)
            }
        };

        log::debug!(
            "declare {} '{}' at level {} (address {})",
            symbol.kind,
            symbol.name,
            symbol.level,
            symbol.address
        );

        let index = self.symbols.len();
        self.symbols.push(symbol);
        self.visible.push(index);
        Ok(SymbolId(index))
    }

    /// Finds the nearest enclosing declaration of `name`.
    pub fn lookup(&self, name: &str, from_level: usize) -> Result<Resolution<'_>, SymbolError> {
        self.visible
            .iter()
            .rev()
            .map(|&i| (i, &self.symbols[i]))
            .find(|(_, s)| s.name == name)
            .map(|(i, symbol)| Resolution {
                id: SymbolId(i),
                symbol,
                level_difference: symbol.level_difference(from_level),
            })
            .ok_or_else(|| SymbolError::UndeclaredName {
                name: name.to_string(),
            })
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// Records where a procedure's code starts. Only procedures have an entry
    /// address, and it is set once.
    pub fn set_entry_address(&mut self, id: SymbolId, address: usize) {
        if let Some(symbol) = self.symbols.get_mut(id.0) {
            if symbol.kind == SymbolKind::Procedure && symbol.entry_address.is_none() {
                symbol.entry_address = Some(address);
            }
        }
    }

    /// Every declaration made so far, in declaration order.
    pub fn declarations(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn into_declarations(self) -> Vec<Symbol> {
        self.symbols
    }
}
