use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pl0::bytecode::disasm::{print_listing, write_symbols};
use pl0::config::Config;

use super::build;

pub fn compile_file(
    path: &str,
    output: Option<&str>,
    binary: bool,
    listing: bool,
    symbols: bool,
    config: &Config,
) -> Result<()> {
    let compiled = build(path, config)?;

    if listing {
        print_listing(&compiled.program);
    }
    if symbols {
        write_symbols(&mut io::stdout().lock(), &compiled.symbols)?;
    }

    let out_path = match output {
        Some(out) => PathBuf::from(out),
        None => Path::new(path).with_extension(if binary { "pcb" } else { "pcode" }),
    };
    let binary = binary || out_path.extension().is_some_and(|e| e == "pcb");

    let written = if binary {
        fs::write(&out_path, compiled.program.to_bytes()?)
    } else {
        fs::write(&out_path, compiled.program.to_text())
    };
    written.with_context(|| format!("Failed to write '{}'", out_path.display()))?;

    println!(
        "Compiled {} instructions to {}",
        compiled.program.len(),
        out_path.display()
    );
    Ok(())
}
