use serde::{Deserialize, Serialize};

use crate::{
    bytecode::{
        compile_error::CompileError,
        emitter::{CodeEmitter, Emit, MAX_CODE_LENGTH},
        ir::Program,
        op::{Opcode, SIO_HALT_M, SIO_READ_M, SIO_WRITE_M, Word},
        registers::{REGISTER_COUNT, RegisterAllocator},
    },
    frontend::{Token, TokenCursor, TokenKind},
    lang::{Declaration, FRAME_HEADER_SIZE, Symbol, SymbolId, SymbolKind, SymbolTable},
};

/// Default symbol table capacity.
pub const MAX_SYMBOLS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub max_code_length: usize,
    pub max_symbols: usize,
    pub register_count: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_code_length: MAX_CODE_LENGTH,
            max_symbols: MAX_SYMBOLS,
            register_count: REGISTER_COUNT,
        }
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub program: Program,
    /// Every declaration, in declaration order.
    pub symbols: Vec<Symbol>,
}

/// Compiles a token stream into a program.
pub fn compile(tokens: Vec<Token>, config: &CompilerConfig) -> Result<Compilation, CompileError> {
    let emitter = CodeEmitter::new(config.max_code_length);
    let (emitter, symbols) = CodeGenerator::new(tokens, emitter, config).generate()?;

    let program = emitter.into_program();
    log::debug!(
        "compiled {} instructions, {} symbols",
        program.len(),
        symbols.declarations().len()
    );

    Ok(Compilation {
        program,
        symbols: symbols.into_declarations(),
    })
}

/// Owned copy of what a lookup found, so the table can be borrowed again.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    id: SymbolId,
    kind: SymbolKind,
    level_difference: Word,
    value: Word,
    address: Word,
    entry_address: Option<usize>,
}

/// Single-pass generator: recognizes the grammar and emits code as it goes.
pub struct CodeGenerator<E: Emit> {
    tokens: TokenCursor,
    symbols: SymbolTable,
    emitter: E,
    registers: RegisterAllocator,
    level: usize,

    /// Calls emitted before the callee's entry address was known.
    pending_calls: Vec<(usize, SymbolId)>,
}

impl<E: Emit> CodeGenerator<E> {
    pub fn new(tokens: Vec<Token>, emitter: E, config: &CompilerConfig) -> Self {
        Self {
            tokens: TokenCursor::new(tokens),
            symbols: SymbolTable::new(config.max_symbols),
            emitter,
            registers: RegisterAllocator::new(config.register_count),
            level: 0,
            pending_calls: Vec::new(),
        }
    }

    /// Generates the whole program and hands back the emitter and the
    /// symbol table.
    pub fn generate(mut self) -> Result<(E, SymbolTable), CompileError> {
        self.program()?;
        Ok((self.emitter, self.symbols))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn program(&mut self) -> Result<(), CompileError> {
        self.symbols.open_scope(self.level);
        self.block(None)?;

        if !self.tokens.eat(TokenKind::Period) {
            return Err(CompileError::MissingPeriod { line: self.line() });
        }

        self.emit(Opcode::Halt, 0, 0, SIO_HALT_M)?;
        self.symbols.close_scope();
        Ok(())
    }

    fn block(&mut self, procedure: Option<SymbolId>) -> Result<(), CompileError> {
        if self.tokens.eat(TokenKind::Const) {
            self.const_declaration()?;
        }
        if self.tokens.eat(TokenKind::Var) {
            self.var_declaration()?;
        }

        // Nested bodies are emitted inline, so jump over them
        let skip = if self.tokens.at(TokenKind::Procedure) {
            Some(self.emit(Opcode::Jmp, 0, 0, 0)?)
        } else {
            None
        };

        while self.tokens.eat(TokenKind::Procedure) {
            self.procedure_declaration()?;
        }

        if let Some(skip) = skip {
            let target = self.emitter.next_address() as Word;
            self.emitter.patch_target(skip, target);
        }

        let frame_size = FRAME_HEADER_SIZE + self.symbols.local_variable_count();
        let entry = self.emit(Opcode::Inc, 0, 0, frame_size)?;
        if let Some(id) = procedure {
            self.set_entry(id, entry);
        }

        self.statement()
    }

    fn const_declaration(&mut self) -> Result<(), CompileError> {
        loop {
            let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;

            if !self.tokens.eat(TokenKind::Eq) {
                return Err(CompileError::ExpectedEquals { line: self.line() });
            }

            let value = self.number()?;
            self.declare(&name, Declaration::Constant(value), line)?;

            if !self.tokens.eat(TokenKind::Comma) {
                break;
            }
        }

        self.end_of_declaration_list()
    }

    fn var_declaration(&mut self) -> Result<(), CompileError> {
        loop {
            let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
            self.declare(&name, Declaration::Variable, line)?;

            if !self.tokens.eat(TokenKind::Comma) {
                break;
            }
        }

        self.end_of_declaration_list()
    }

    fn end_of_declaration_list(&mut self) -> Result<(), CompileError> {
        match self.tokens.kind() {
            TokenKind::Semicolon => {
                self.tokens.advance();
                Ok(())
            }
            // two names with no comma between them
            TokenKind::Ident => Err(CompileError::MalformedDeclaration { line: self.line() }),
            _ => Err(CompileError::ExpectedSemicolon { line: self.line() }),
        }
    }

    fn procedure_declaration(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
        let id = self.declare(&name, Declaration::Procedure, line)?;

        if !self.tokens.eat(TokenKind::Semicolon) {
            return Err(CompileError::MalformedDeclaration { line: self.line() });
        }

        self.level += 1;
        self.symbols.open_scope(self.level);
        self.block(Some(id))?;
        self.symbols.close_scope();
        self.level -= 1;

        self.emit(Opcode::Rtn, 0, 0, 0)?;

        if !self.tokens.eat(TokenKind::Semicolon) {
            return Err(CompileError::MalformedDeclaration { line: self.line() });
        }
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self) -> Result<(), CompileError> {
        match self.tokens.kind() {
            TokenKind::Ident => self.assignment(),
            TokenKind::Call => self.call(),
            TokenKind::Begin => self.compound(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Read => self.read(),
            TokenKind::Write => self.write(),
            // empty statement
            _ => Ok(()),
        }
    }

    fn assignment(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
        let target = self.resolve(&name, line)?;
        if target.kind != SymbolKind::Variable {
            return Err(CompileError::NotAVariable { name, line });
        }

        if !self.tokens.eat(TokenKind::Becomes) {
            return Err(CompileError::ExpectedBecomes { line: self.line() });
        }

        let r = self.expression()?;
        self.emit(Opcode::Sto, r, target.level_difference, target.address)?;
        self.registers.free(r);
        Ok(())
    }

    fn call(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        let (name, line) = self.expect_ident(|line| CompileError::CallWithoutIdentifier { line })?;
        let callee = self.resolve(&name, line)?;
        if callee.kind != SymbolKind::Procedure {
            return Err(CompileError::NotAProcedure { name, line });
        }

        match callee.entry_address {
            Some(entry) => {
                self.emit(Opcode::Cal, 0, callee.level_difference, entry as Word)?;
            }
            None => {
                // Calling an enclosing procedure from inside its nested body
                let address = self.emit(Opcode::Cal, 0, callee.level_difference, 0)?;
                self.pending_calls.push((address, callee.id));
            }
        }
        Ok(())
    }

    fn compound(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        self.statement()?;

        while self.tokens.eat(TokenKind::Semicolon) {
            self.statement()?;
        }

        if !self.tokens.eat(TokenKind::End) {
            return Err(CompileError::MissingEnd { line: self.line() });
        }
        Ok(())
    }

    fn if_statement(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        let r = self.condition()?;

        if !self.tokens.eat(TokenKind::Then) {
            return Err(CompileError::MissingThen { line: self.line() });
        }

        let jpc = self.emit(Opcode::Jpc, r, 0, 0)?;
        self.registers.free(r);
        self.statement()?;

        if self.tokens.eat(TokenKind::Else) {
            let jmp = self.emit(Opcode::Jmp, 0, 0, 0)?;
            self.patch_here(jpc);
            self.statement()?;
            self.patch_here(jmp);
        } else {
            self.patch_here(jpc);
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        let top = self.emitter.next_address() as Word;
        let r = self.condition()?;
        let jpc = self.emit(Opcode::Jpc, r, 0, 0)?;
        self.registers.free(r);

        if !self.tokens.eat(TokenKind::Do) {
            return Err(CompileError::MissingDo { line: self.line() });
        }

        self.statement()?;
        self.emit(Opcode::Jmp, 0, 0, top)?;
        self.patch_here(jpc);
        Ok(())
    }

    fn read(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
        let target = self.resolve(&name, line)?;
        if target.kind != SymbolKind::Variable {
            return Err(CompileError::NotAVariable { name, line });
        }

        let r = self.registers.allocate()?;
        self.emit(Opcode::Read, r, 0, SIO_READ_M)?;
        self.emit(Opcode::Sto, r, target.level_difference, target.address)?;
        self.registers.free(r);
        Ok(())
    }

    fn write(&mut self) -> Result<(), CompileError> {
        self.tokens.advance();
        let (name, line) = self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
        let r = self.load_name(&name, line)?;
        self.emit(Opcode::Write, r, 0, SIO_WRITE_M)?;
        self.registers.free(r);
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Returns the register holding the 0/1 outcome.
    fn condition(&mut self) -> Result<Word, CompileError> {
        if self.tokens.eat(TokenKind::Odd) {
            let r = self.expression()?;
            self.emit(Opcode::Odd, r, r, 0)?;
            return Ok(r);
        }

        let lhs = self.expression()?;
        let op = match self.tokens.kind() {
            TokenKind::Eq => Opcode::Eql,
            TokenKind::Neq => Opcode::Neq,
            TokenKind::Less => Opcode::Lss,
            TokenKind::Leq => Opcode::Leq,
            TokenKind::Gtr => Opcode::Gtr,
            TokenKind::Geq => Opcode::Geq,
            _ => return Err(CompileError::ExpectedRelation { line: self.line() }),
        };
        self.tokens.advance();

        let rhs = self.expression()?;
        self.emit(op, lhs, lhs, rhs)?;
        self.registers.free(rhs);
        Ok(lhs)
    }

    fn expression(&mut self) -> Result<Word, CompileError> {
        let negate = match self.tokens.kind() {
            TokenKind::Plus => {
                self.tokens.advance();
                false
            }
            TokenKind::Minus => {
                self.tokens.advance();
                true
            }
            _ => false,
        };

        let r = self.term()?;
        if negate {
            self.emit(Opcode::Neg, r, r, 0)?;
        }

        loop {
            let op = match self.tokens.kind() {
                TokenKind::Plus => Opcode::Add,
                TokenKind::Minus => Opcode::Sub,
                _ => break,
            };
            self.tokens.advance();

            let rhs = self.term()?;
            self.emit(op, r, r, rhs)?;
            self.registers.free(rhs);
        }

        Ok(r)
    }

    fn term(&mut self) -> Result<Word, CompileError> {
        let r = self.factor()?;

        loop {
            let op = match self.tokens.kind() {
                TokenKind::Mult => Opcode::Mul,
                TokenKind::Slash => Opcode::Div,
                _ => break,
            };
            self.tokens.advance();

            let rhs = self.factor()?;
            self.emit(op, r, r, rhs)?;
            self.registers.free(rhs);
        }

        Ok(r)
    }

    fn factor(&mut self) -> Result<Word, CompileError> {
        match self.tokens.kind() {
            TokenKind::Ident => {
                let (name, line) =
                    self.expect_ident(|line| CompileError::ExpectedIdentifier { line })?;
                self.load_name(&name, line)
            }
            TokenKind::Number => {
                let value = self.number()?;
                let r = self.registers.allocate()?;
                self.emit(Opcode::Lit, r, 0, value)?;
                Ok(r)
            }
            TokenKind::LParen => {
                self.tokens.advance();
                let r = self.expression()?;
                if !self.tokens.eat(TokenKind::RParen) {
                    return Err(CompileError::MissingRightParen { line: self.line() });
                }
                Ok(r)
            }
            _ => Err(CompileError::InvalidFactor {
                found: self.tokens.current().to_string(),
                line: self.line(),
            }),
        }
    }

    /// Puts the value of a constant or variable into a fresh register.
    fn load_name(&mut self, name: &str, line: usize) -> Result<Word, CompileError> {
        let symbol = self.resolve(name, line)?;

        match symbol.kind {
            SymbolKind::Constant => {
                let r = self.registers.allocate()?;
                self.emit(Opcode::Lit, r, 0, symbol.value)?;
                Ok(r)
            }
            SymbolKind::Variable => {
                let r = self.registers.allocate()?;
                self.emit(Opcode::Lod, r, symbol.level_difference, symbol.address)?;
                Ok(r)
            }
            SymbolKind::Procedure => Err(CompileError::ProcedureAsValue {
                name: name.to_string(),
                line,
            }),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn line(&self) -> usize {
        self.tokens.current().line
    }

    fn emit(&mut self, opcode: Opcode, r: Word, l: Word, m: Word) -> Result<usize, CompileError> {
        self.emitter.emit(opcode, r, l, m)
    }

    fn patch_here(&mut self, address: usize) {
        let target = self.emitter.next_address() as Word;
        self.emitter.patch_target(address, target);
    }

    fn set_entry(&mut self, id: SymbolId, entry: usize) {
        self.symbols.set_entry_address(id, entry);

        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .pending_calls
            .drain(..)
            .partition(|(_, callee)| *callee == id);
        self.pending_calls = waiting;

        for (address, _) in ready {
            self.emitter.patch_target(address, entry as Word);
        }
    }

    fn expect_ident(
        &mut self,
        missing: impl FnOnce(usize) -> CompileError,
    ) -> Result<(String, usize), CompileError> {
        let token = self.tokens.current();
        if token.kind != TokenKind::Ident {
            return Err(missing(token.line));
        }

        let found = (token.lexeme.clone(), token.line);
        self.tokens.advance();
        Ok(found)
    }

    fn number(&mut self) -> Result<Word, CompileError> {
        let token = self.tokens.current();
        let line = token.line;
        if token.kind != TokenKind::Number {
            return Err(CompileError::ExpectedNumber { line });
        }

        let value = token
            .lexeme
            .parse::<Word>()
            .map_err(|_| CompileError::ExpectedNumber { line })?;
        self.tokens.advance();
        Ok(value)
    }

    fn declare(
        &mut self,
        name: &str,
        declaration: Declaration,
        line: usize,
    ) -> Result<SymbolId, CompileError> {
        self.symbols
            .declare(name, declaration, self.level)
            .map_err(|e| CompileError::from_symbol(e, line))
    }

    fn resolve(&self, name: &str, line: usize) -> Result<Resolved, CompileError> {
        let found = self
            .symbols
            .lookup(name, self.level)
            .map_err(|e| CompileError::from_symbol(e, line))?;

        Ok(Resolved {
            id: found.id,
            kind: found.symbol.kind,
            level_difference: found.level_difference,
            value: found.symbol.value,
            address: found.symbol.address,
            entry_address: found.symbol.entry_address,
        })
    }
}
