use std::io::{self, Write};

use crate::frontend::token::{Token, TokenKind};

/// Prints a token list, one token per line.
pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";
    const BLU: &'static str = "\x1b[34m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_to(&mut out, tokens)
    }

    pub fn write_to(&self, out: &mut impl Write, tokens: &[Token]) -> io::Result<()> {
        writeln!(out, "Tokens:")?;
        for t in tokens {
            self.write_one(out, t)?;
        }
        Ok(())
    }

    fn write_one(&self, out: &mut impl Write, t: &Token) -> io::Result<()> {
        let colr = if self.color { self.color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        writeln!(
            out,
            "[{:03}] {}{:>2} {:<12} {}{}",
            t.line,
            colr,
            t.kind.id(),
            t.kind.name(),
            t.lexeme,
            reset
        )
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Nul => Self::DIM,
            Ident => Self::YEL,
            Number => Self::CYN,
            Plus | Minus | Mult | Slash | Eq | Neq | Less | Leq | Gtr | Geq | Becomes => Self::MAG,
            k if k.is_keyword() => Self::BLU,
            _ => Self::RESET,
        }
    }
}
