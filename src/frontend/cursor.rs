use crate::frontend::token::{Token, TokenKind};

/// Read position over a token list.
///
/// Past the last token the cursor keeps returning a `nul` token, so callers
/// never have to handle running off the end separately.
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
    nul: Token,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        let last_line = tokens.last().map(|t| t.line).unwrap_or(1);
        Self {
            tokens,
            pos: 0,
            nul: Token::nul(last_line),
        }
    }

    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.nul)
    }

    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_nul_past_the_end() {
        let mut cursor = TokenCursor::new(vec![Token::new(TokenKind::Ident, "x", 4)]);
        assert!(cursor.at(TokenKind::Ident));
        cursor.advance();
        assert!(cursor.at(TokenKind::Nul));
        assert_eq!(cursor.current().line, 4);
        cursor.advance();
        assert!(cursor.at(TokenKind::Nul));
        assert_eq!(cursor.current().line, 4);
    }

    #[test]
    fn test_empty_list() {
        let cursor = TokenCursor::new(Vec::new());
        assert_eq!(cursor.kind(), TokenKind::Nul);
    }

    #[test]
    fn test_eat_only_consumes_matching_kind() {
        let mut cursor = TokenCursor::new(vec![
            Token::new(TokenKind::Semicolon, ";", 1),
            Token::new(TokenKind::End, "end", 1),
        ]);
        assert!(!cursor.eat(TokenKind::End));
        assert!(cursor.eat(TokenKind::Semicolon));
        assert!(cursor.eat(TokenKind::End));
    }
}
