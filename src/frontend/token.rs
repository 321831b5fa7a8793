use serde::{Deserialize, Serialize};

/// Lexical categories of PL/0.
///
/// The discriminants are the numeric token ids used by token listings, so
/// they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenKind {
    // End of input
    Nul = 1,

    // Literals and names
    Ident = 2,
    Number = 3,

    // Arithmetic
    Plus = 4,
    Minus = 5,
    Mult = 6,
    Slash = 7,
    Odd = 8,

    // Relational
    Eq = 9,
    Neq = 10,
    Less = 11,
    Leq = 12,
    Gtr = 13,
    Geq = 14,

    // Punctuation
    LParen = 15,
    RParen = 16,
    Comma = 17,
    Semicolon = 18,
    Period = 19,
    Becomes = 20,

    // Keywords
    Begin = 21,
    End = 22,
    If = 23,
    Then = 24,
    While = 25,
    Do = 26,
    Call = 27,
    Const = 28,
    Var = 29,
    Procedure = 30,
    Write = 31,
    Read = 32,
    Else = 33,
}

impl TokenKind {
    /// Numeric id of this kind.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Maps a reserved word to its kind. Returns `None` for ordinary identifiers.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "odd" => TokenKind::Odd,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "call" => TokenKind::Call,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "procedure" => TokenKind::Procedure,
            "write" => TokenKind::Write,
            "read" => TokenKind::Read,
            "else" => TokenKind::Else,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for reserved words (including `odd`).
    pub fn is_keyword(self) -> bool {
        self == TokenKind::Odd || self.id() >= TokenKind::Begin.id()
    }

    /// Conventional symbolic name, as printed in token listings.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Nul => "nulsym",
            TokenKind::Ident => "identsym",
            TokenKind::Number => "numbersym",
            TokenKind::Plus => "plussym",
            TokenKind::Minus => "minussym",
            TokenKind::Mult => "multsym",
            TokenKind::Slash => "slashsym",
            TokenKind::Odd => "oddsym",
            TokenKind::Eq => "eqsym",
            TokenKind::Neq => "neqsym",
            TokenKind::Less => "lessym",
            TokenKind::Leq => "leqsym",
            TokenKind::Gtr => "gtrsym",
            TokenKind::Geq => "geqsym",
            TokenKind::LParen => "lparentsym",
            TokenKind::RParen => "rparentsym",
            TokenKind::Comma => "commasym",
            TokenKind::Semicolon => "semicolonsym",
            TokenKind::Period => "periodsym",
            TokenKind::Becomes => "becomessym",
            TokenKind::Begin => "beginsym",
            TokenKind::End => "endsym",
            TokenKind::If => "ifsym",
            TokenKind::Then => "thensym",
            TokenKind::While => "whilesym",
            TokenKind::Do => "dosym",
            TokenKind::Call => "callsym",
            TokenKind::Const => "constsym",
            TokenKind::Var => "varsym",
            TokenKind::Procedure => "procsym",
            TokenKind::Write => "writesym",
            TokenKind::Read => "readsym",
            TokenKind::Else => "elsesym",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A classified lexeme with the line it was found on (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// The distinguished end-of-input token.
    pub fn nul(line: usize) -> Self {
        Self::new(TokenKind::Nul, "", line)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Nul => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}
