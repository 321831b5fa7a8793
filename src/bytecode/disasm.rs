use std::io::{self, Write};

use crate::bytecode::ir::Program;
use crate::lang::{Symbol, SymbolKind};

/// Writes the code listing: one row per instruction with its mnemonic.
///
/// Rows that some `jmp`/`jpc`/`cal` lands on are marked with `►`, and branch
/// rows show where they go.
pub fn write_listing(out: &mut impl Write, program: &Program) -> io::Result<()> {
    let targets = collect_jump_targets(program);

    writeln!(out, "***Code Memory***")?;
    writeln!(out, "#     OP   R   L   M")?;

    for (ip, ins) in program.code.iter().enumerate() {
        let marker = if targets.contains(&ip) { '►' } else { ' ' };
        write!(
            out,
            "{:<4}{} {:<4}{:>3} {:>3} {:>3}",
            ip,
            marker,
            ins.mnemonic(),
            ins.r,
            ins.l,
            ins.m
        )?;

        match ins.opcode() {
            Some(op) if op.is_branch() => writeln!(out, "   (→ {:04})", ins.m)?,
            _ => writeln!(out)?,
        }
    }

    Ok(())
}

pub fn listing(program: &Program) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_listing(&mut buf, program);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Print the code listing to stdout.
pub fn print_listing(program: &Program) {
    print!("{}", listing(program));
}

fn collect_jump_targets(program: &Program) -> Vec<usize> {
    let mut targets = Vec::new();

    for ins in &program.code {
        let is_branch = ins.opcode().is_some_and(|op| op.is_branch());
        if !is_branch {
            continue;
        }

        if let Ok(target) = usize::try_from(ins.m) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

/// Writes the symbol listing in declaration order.
pub fn write_symbols(out: &mut impl Write, symbols: &[Symbol]) -> io::Result<()> {
    writeln!(out, "Symbol Table:")?;
    writeln!(out, "{:<12} {:<6} {:>5} {:>6}", "Name", "Kind", "Level", "Value")?;

    for symbol in symbols {
        let value = match symbol.kind {
            SymbolKind::Constant => symbol.value.to_string(),
            SymbolKind::Variable => format!("@{}", symbol.address),
            SymbolKind::Procedure => match symbol.entry_address {
                Some(entry) => format!("->{}", entry),
                None => "-".to_string(),
            },
        };

        writeln!(
            out,
            "{:<12} {:<6} {:>5} {:>6}",
            symbol.name,
            symbol.kind.to_string(),
            symbol.level,
            value
        )?;
    }

    Ok(())
}
