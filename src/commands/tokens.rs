use anyhow::{Context, Result};
use pl0::frontend::{Lexer, token_dumper::TokenDumper};

use super::read_source;

pub fn dump_tokens(path: &str, no_color: bool) -> Result<()> {
    let source = read_source(path)?;
    let tokens = Lexer::new(&source)
        .tokenize()
        .with_context(|| format!("Failed to tokenize '{}'", path))?;

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    dumper.dump(&tokens)?;
    Ok(())
}
