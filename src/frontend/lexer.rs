use thiserror::Error;

use crate::frontend::token::{Token, TokenKind};

/// Identifiers longer than this are rejected.
pub const MAX_IDENT_LENGTH: usize = 11;

/// Numbers with more digits than this are rejected.
pub const MAX_NUMBER_DIGITS: usize = 5;

/// A lexical error. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("{line}: variable does not start with a letter")]
    NonLetterVarInitial { line: usize },

    #[error("{line}: name too long (more than {} characters)", MAX_IDENT_LENGTH)]
    NameTooLong { line: usize },

    #[error("{line}: number too long (more than {} digits)", MAX_NUMBER_DIGITS)]
    NumberTooLong { line: usize },

    #[error("{line}: invalid symbol '{symbol}'")]
    InvalidSymbol { symbol: char, line: usize },

    #[error("{line}: unterminated comment")]
    UnterminatedComment { line: usize },
}

impl LexerError {
    /// Numeric error code used in reports.
    pub fn code(&self) -> u32 {
        match self {
            LexerError::NonLetterVarInitial { .. } => 1,
            LexerError::NameTooLong { .. } => 2,
            LexerError::NumberTooLong { .. } => 3,
            LexerError::InvalidSymbol { .. } => 4,
            LexerError::UnterminatedComment { .. } => 5,
        }
    }

    /// Line the offending lexeme started on.
    pub fn line(&self) -> usize {
        match self {
            LexerError::NonLetterVarInitial { line }
            | LexerError::NameTooLong { line }
            | LexerError::NumberTooLong { line }
            | LexerError::InvalidSymbol { line, .. }
            | LexerError::UnterminatedComment { line } => *line,
        }
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
        }
        self.pos += 1;
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        self.advance(); // '/'
        self.advance(); // '*'

        loop {
            match (self.current(), self.peek()) {
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                (Some(_), _) => {
                    self.advance();
                }
                (None, _) => return Err(LexerError::UnterminatedComment { line: start_line }),
            }
        }
    }

    fn read_word(&mut self) -> Result<Token, LexerError> {
        let line = self.line;
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if word.chars().count() > MAX_IDENT_LENGTH {
            return Err(LexerError::NameTooLong { line });
        }

        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Ident);
        Ok(Token::new(kind, word, line))
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let line = self.line;
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(LexerError::NonLetterVarInitial { line });
        }

        if digits.len() > MAX_NUMBER_DIGITS {
            return Err(LexerError::NumberTooLong { line });
        }

        Ok(Token::new(TokenKind::Number, digits, line))
    }

    fn read_special(&mut self, ch: char) -> Result<Token, LexerError> {
        let line = self.line;
        let next = self.peek();

        let (kind, width) = match (ch, next) {
            (':', Some('=')) => (TokenKind::Becomes, 2),
            ('<', Some('>')) => (TokenKind::Neq, 2),
            ('<', Some('=')) => (TokenKind::Leq, 2),
            ('>', Some('=')) => (TokenKind::Geq, 2),
            ('<', _) => (TokenKind::Less, 1),
            ('>', _) => (TokenKind::Gtr, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Mult, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('=', _) => (TokenKind::Eq, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('.', _) => (TokenKind::Period, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            _ => return Err(LexerError::InvalidSymbol { symbol: ch, line }),
        };

        let mut lexeme = String::new();
        for _ in 0..width {
            if let Some(c) = self.advance() {
                lexeme.push(c);
            }
        }

        Ok(Token::new(kind, lexeme, line))
    }

    /// Splits the whole source into tokens. The result always ends with a
    /// single `nul` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            match self.current() {
                None => {
                    tokens.push(Token::nul(self.line));
                    break;
                }
                Some('/') if self.peek() == Some('*') => self.skip_comment()?,
                Some(ch) if ch.is_ascii_alphabetic() => tokens.push(self.read_word()?),
                Some(ch) if ch.is_ascii_digit() => tokens.push(self.read_number()?),
                Some(ch) => tokens.push(self.read_special(ch)?),
            }
        }

        log::debug!("lexer produced {} tokens", tokens.len());
        Ok(tokens)
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(source).tokenize()
}
