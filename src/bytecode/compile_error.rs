use thiserror::Error;

use crate::lang::SymbolError;

/// Why code generation stopped.
///
/// Generation is first-error-wins: the first variant produced aborts the
/// whole compilation. Every variant has a stable numeric code (see
/// [`CompileError::code`]) so reports stay comparable across tools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: expected a number")]
    ExpectedNumber { line: usize },

    #[error("line {line}: expected '='")]
    ExpectedEquals { line: usize },

    #[error("line {line}: expected an identifier")]
    ExpectedIdentifier { line: usize },

    #[error("line {line}: expected ';'")]
    ExpectedSemicolon { line: usize },

    #[error("line {line}: malformed declaration list")]
    MalformedDeclaration { line: usize },

    #[error("line {line}: missing terminating '.'")]
    MissingPeriod { line: usize },

    #[error("line {line}: expected ':='")]
    ExpectedBecomes { line: usize },

    #[error("line {line}: 'call' must be followed by an identifier")]
    CallWithoutIdentifier { line: usize },

    #[error("line {line}: 'if' condition must be followed by 'then'")]
    MissingThen { line: usize },

    #[error("line {line}: 'begin' without matching 'end'")]
    MissingEnd { line: usize },

    #[error("line {line}: 'while' condition must be followed by 'do'")]
    MissingDo { line: usize },

    #[error("line {line}: condition needs a relational operator")]
    ExpectedRelation { line: usize },

    #[error("line {line}: missing ')'")]
    MissingRightParen { line: usize },

    #[error("line {line}: a factor cannot start with {found}")]
    InvalidFactor { found: String, line: usize },

    #[error("line {line}: '{name}' is not declared")]
    UndeclaredName { name: String, line: usize },

    #[error("line {line}: '{name}' is not a variable")]
    NotAVariable { name: String, line: usize },

    #[error("line {line}: '{name}' is not a procedure")]
    NotAProcedure { name: String, line: usize },

    #[error("line {line}: procedure '{name}' used as a value")]
    ProcedureAsValue { name: String, line: usize },

    #[error("line {line}: '{name}' is already declared in this scope")]
    DuplicateName { name: String, line: usize },

    #[error("expression needs more than {count} registers")]
    RegistersExhausted { count: usize },

    #[error("symbol table is full ({capacity} entries)")]
    SymbolTableFull { capacity: usize },

    #[error("code buffer is full ({capacity} instructions)")]
    CodeBufferExhausted { capacity: usize },

    #[error("no open scope at level {level}")]
    ScopeMismatch { level: usize },
}

impl CompileError {
    /// Numeric error code. 0 is reserved for success.
    pub fn code(&self) -> u32 {
        match self {
            CompileError::ExpectedNumber { .. } => 1,
            CompileError::ExpectedEquals { .. } => 2,
            CompileError::ExpectedIdentifier { .. } => 3,
            CompileError::ExpectedSemicolon { .. } => 4,
            CompileError::MalformedDeclaration { .. } => 5,
            CompileError::MissingPeriod { .. } => 6,
            CompileError::ExpectedBecomes { .. } => 7,
            CompileError::CallWithoutIdentifier { .. } => 8,
            CompileError::MissingThen { .. } => 9,
            CompileError::MissingEnd { .. } => 10,
            CompileError::MissingDo { .. } => 11,
            CompileError::ExpectedRelation { .. } => 12,
            CompileError::MissingRightParen { .. } => 13,
            CompileError::InvalidFactor { .. } => 14,
            CompileError::UndeclaredName { .. } => 15,
            CompileError::NotAVariable { .. } => 16,
            CompileError::NotAProcedure { .. } => 17,
            CompileError::ProcedureAsValue { .. } => 18,
            CompileError::DuplicateName { .. } => 19,
            CompileError::RegistersExhausted { .. } => 20,
            CompileError::SymbolTableFull { .. } => 21,
            CompileError::CodeBufferExhausted { .. } => 22,
            CompileError::ScopeMismatch { .. } => 23,
        }
    }

    /// Fixed message keyed by the error code.
    pub fn message(&self) -> &'static str {
        match self.code() {
            1 => "Expected a number",
            2 => "Expected '='",
            3 => "Expected an identifier",
            4 => "Expected ';'",
            5 => "Malformed declaration list",
            6 => "Period expected",
            7 => "Expected ':='",
            8 => "'call' must be followed by an identifier",
            9 => "'then' expected",
            10 => "'end' expected",
            11 => "'do' expected",
            12 => "Relational operator expected",
            13 => "Right parenthesis missing",
            14 => "The preceding factor cannot begin with this symbol",
            15 => "Undeclared identifier",
            16 => "Assignment or read target must be a variable",
            17 => "Call of a constant or variable is meaningless",
            18 => "Procedure identifier used as a value",
            19 => "Name declared twice in the same scope",
            20 => "Out of registers",
            21 => "Symbol table full",
            22 => "Code buffer exhausted",
            _ => "Internal scope error",
        }
    }

    /// Fatal errors terminate the whole toolchain rather than just the
    /// current compilation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::CodeBufferExhausted { .. })
    }

    /// One-line report: `CODE GENERATOR ERROR[<code>]: <message>.`
    pub fn report(&self) -> String {
        format!("CODE GENERATOR ERROR[{}]: {}.", self.code(), self.message())
    }

    /// Attaches the offending line to a symbol table failure.
    pub fn from_symbol(err: SymbolError, line: usize) -> Self {
        match err {
            SymbolError::DuplicateName { name } => CompileError::DuplicateName { name, line },
            SymbolError::UndeclaredName { name } => CompileError::UndeclaredName { name, line },
            SymbolError::TableFull { capacity } => CompileError::SymbolTableFull { capacity },
            SymbolError::NoScopeAtLevel { level } => CompileError::ScopeMismatch { level },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_table() {
        assert_eq!(CompileError::ExpectedNumber { line: 1 }.code(), 1);
        assert_eq!(CompileError::MissingPeriod { line: 1 }.code(), 6);
        assert_eq!(
            CompileError::InvalidFactor {
                found: "';'".into(),
                line: 1
            }
            .code(),
            14
        );
        assert_eq!(
            CompileError::DuplicateName {
                name: "x".into(),
                line: 1
            }
            .code(),
            19
        );
        assert_eq!(CompileError::CodeBufferExhausted { capacity: 1 }.code(), 22);
    }

    #[test]
    fn test_report_format() {
        let err = CompileError::MissingPeriod { line: 3 };
        assert_eq!(err.report(), "CODE GENERATOR ERROR[6]: Period expected.");
    }

    #[test]
    fn test_display_carries_details() {
        let err = CompileError::UndeclaredName {
            name: "y".into(),
            line: 7,
        };
        assert_eq!(err.to_string(), "line 7: 'y' is not declared");
    }

    #[test]
    fn test_duplicate_and_undeclared_are_distinct() {
        let dup = CompileError::from_symbol(SymbolError::DuplicateName { name: "a".into() }, 2);
        let undecl =
            CompileError::from_symbol(SymbolError::UndeclaredName { name: "a".into() }, 2);
        assert_ne!(dup.code(), undecl.code());
        assert_eq!(dup.code(), 19);
        assert_eq!(undecl.code(), 15);
    }

    #[test]
    fn test_only_buffer_exhaustion_is_fatal() {
        assert!(CompileError::CodeBufferExhausted { capacity: 500 }.is_fatal());
        assert!(!CompileError::RegistersExhausted { count: 16 }.is_fatal());
        assert!(!CompileError::MissingEnd { line: 1 }.is_fatal());
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::MissingDo { line: 1 };
        let _: &dyn std::error::Error = &err;
    }
}
