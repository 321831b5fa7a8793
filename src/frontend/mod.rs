//! Source text to tokens.

pub mod cursor;
pub mod lexer;
pub mod token;
pub mod token_dumper;

pub use cursor::TokenCursor;
pub use lexer::{Lexer, LexerError, tokenize};
pub use token::{Token, TokenKind};
