use serde::{Deserialize, Serialize};

/// Machine word: register, stack slot and instruction field width.
pub type Word = i64;

// =============================================================================
// OPCODE - P-code instruction set
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // literals & frames
    Lit = 1,
    Rtn = 2,
    Lod = 3,
    Sto = 4,
    Cal = 5,
    Inc = 6,

    // control flow
    Jmp = 7,
    Jpc = 8,

    // I/O
    Write = 9,
    Read = 10,
    Halt = 11,

    // arithmetic
    Neg = 12,
    Add = 13,
    Sub = 14,
    Mul = 15,
    Div = 16,
    Odd = 17,
    Mod = 18,

    // comparison
    Eql = 19,
    Neq = 20,
    Lss = 21,
    Leq = 22,
    Gtr = 23,
    Geq = 24,
}

/// `m` operand conventionally carried by the three SIO instructions.
pub const SIO_WRITE_M: Word = 1;
pub const SIO_READ_M: Word = 2;
pub const SIO_HALT_M: Word = 3;

impl Opcode {
    pub const ALL: [Opcode; 24] = [
        Opcode::Lit,
        Opcode::Rtn,
        Opcode::Lod,
        Opcode::Sto,
        Opcode::Cal,
        Opcode::Inc,
        Opcode::Jmp,
        Opcode::Jpc,
        Opcode::Write,
        Opcode::Read,
        Opcode::Halt,
        Opcode::Neg,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Odd,
        Opcode::Mod,
        Opcode::Eql,
        Opcode::Neq,
        Opcode::Lss,
        Opcode::Leq,
        Opcode::Gtr,
        Opcode::Geq,
    ];

    pub fn code(self) -> Word {
        self as u8 as Word
    }

    /// Decodes a numeric opcode. Returns `None` outside 1..=24.
    pub fn from_code(code: Word) -> Option<Opcode> {
        if (1..=24).contains(&code) {
            Some(Self::ALL[(code - 1) as usize])
        } else {
            None
        }
    }

    /// Lower-case mnemonic. The three I/O instructions all print as `sio`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lit => "lit",
            Opcode::Rtn => "rtn",
            Opcode::Lod => "lod",
            Opcode::Sto => "sto",
            Opcode::Cal => "cal",
            Opcode::Inc => "inc",
            Opcode::Jmp => "jmp",
            Opcode::Jpc => "jpc",
            Opcode::Write | Opcode::Read | Opcode::Halt => "sio",
            Opcode::Neg => "neg",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Odd => "odd",
            Opcode::Mod => "mod",
            Opcode::Eql => "eql",
            Opcode::Neq => "neq",
            Opcode::Lss => "lss",
            Opcode::Leq => "leq",
            Opcode::Gtr => "gtr",
            Opcode::Geq => "geq",
        }
    }

    /// True for instructions whose `m` is an instruction address.
    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Jmp | Opcode::Jpc | Opcode::Cal)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// One P-code instruction.
///
/// Fields are kept raw so that any four integers can be loaded; the opcode is
/// decoded when the instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Word,
    pub r: Word,
    pub l: Word,
    pub m: Word,
}

impl Instruction {
    pub fn new(opcode: Opcode, r: Word, l: Word, m: Word) -> Self {
        Self {
            op: opcode.code(),
            r,
            l,
            m,
        }
    }

    pub fn raw(op: Word, r: Word, l: Word, m: Word) -> Self {
        Self { op, r, l, m }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_code(self.op)
    }

    /// Mnemonic, or `???` for an undecodable opcode.
    pub fn mnemonic(&self) -> &'static str {
        self.opcode().map(Opcode::mnemonic).unwrap_or("???")
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.op, self.r, self.l, self.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_code(op.code()), Some(op));
        }
    }

    #[test]
    fn test_out_of_range_codes() {
        assert_eq!(Opcode::from_code(0), None);
        assert_eq!(Opcode::from_code(25), None);
        assert_eq!(Opcode::from_code(-3), None);
    }

    #[test]
    fn test_table_matches_numbering() {
        assert_eq!(Opcode::Lit.code(), 1);
        assert_eq!(Opcode::Cal.code(), 5);
        assert_eq!(Opcode::Halt.code(), 11);
        assert_eq!(Opcode::Odd.code(), 17);
        assert_eq!(Opcode::Geq.code(), 24);
    }

    #[test]
    fn test_sio_mnemonics() {
        assert_eq!(Opcode::Write.mnemonic(), "sio");
        assert_eq!(Opcode::Read.mnemonic(), "sio");
        assert_eq!(Opcode::Halt.mnemonic(), "sio");
    }

    #[test]
    fn test_raw_instruction_with_bad_opcode() {
        let ins = Instruction::raw(99, 0, 0, 0);
        assert_eq!(ins.opcode(), None);
        assert_eq!(ins.mnemonic(), "???");
        assert_eq!(ins.to_string(), "99 0 0 0");
    }

    #[test]
    fn test_branch_classification() {
        assert!(Opcode::Jpc.is_branch());
        assert!(Opcode::Cal.is_branch());
        assert!(!Opcode::Lit.is_branch());
    }
}
