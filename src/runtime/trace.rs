use std::io::{self, Write};

use crate::bytecode::op::{Instruction, Word};

/// Writes the execution trace header.
pub fn write_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "***Execution***")?;
    writeln!(
        out,
        "{:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}",
        "#", "OP", "R", "L", "M", "PC", "BP", "SP", "STK"
    )
}

/// One row per executed instruction: what ran at `address`, and the
/// registers and stack as they are afterwards.
pub fn write_row(
    out: &mut impl Write,
    address: usize,
    ins: &Instruction,
    pc: usize,
    bp: Word,
    sp: Word,
    stack: &[Word],
) -> io::Result<()> {
    writeln!(
        out,
        "{:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {}",
        address,
        ins.mnemonic(),
        ins.r,
        ins.l,
        ins.m,
        pc,
        bp,
        sp,
        render_stack(stack, bp, sp)
    )
}

pub fn write_halt(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "HLT")
}

/// Renders `stack[0..=sp]`, separating activation records with `|`.
///
/// Frame boundaries are found by following dynamic links outward from `bp`
/// down to the main frame at 1. Slot 0 is the sentinel.
pub fn render_stack(stack: &[Word], bp: Word, sp: Word) -> String {
    let mut bases = Vec::new();
    let mut base = bp;
    while base > 1 && bases.len() < stack.len() {
        bases.push(base);
        let link = slot(stack, base + 2);
        // dynamic links always point further down
        if link >= base {
            break;
        }
        base = link;
    }

    let mut out = format!("{:>3}", slot(stack, 0));
    for i in 1..=sp.max(0) {
        if bases.contains(&i) {
            out.push_str(" |");
        }
        out.push_str(&format!(" {:>3}", slot(stack, i)));
    }

    // a frame that has been entered but not yet sized
    if bp > sp && bp > 1 {
        out.push_str(" |");
    }

    out
}

fn slot(stack: &[Word], index: Word) -> Word {
    usize::try_from(index)
        .ok()
        .and_then(|i| stack.get(i).copied())
        .unwrap_or(0)
}
