use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bytecode::op::{Instruction, Word};

/// Errors reading or writing a serialized program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("line {line}: '{token}' is not an integer")]
    InvalidInteger { token: String, line: usize },

    #[error("trailing instruction has {fields} of 4 fields")]
    TruncatedInstruction { fields: usize },

    #[error("binary program: {0}")]
    Binary(String),
}

/// A compiled program: the instruction sequence, addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: Vec<Instruction>,
}

impl Program {
    pub fn new(code: Vec<Instruction>) -> Self {
        Self { code }
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Instruction> {
        self.code.get(address)
    }

    /// Renders the text wire format: one `op r l m` line per instruction.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for ins in &self.code {
            out.push_str(&ins.to_string());
            out.push('\n');
        }
        out
    }

    /// Parses the text wire format. Any whitespace separates fields; every
    /// four integers form one instruction.
    pub fn from_text(text: &str) -> Result<Self, WireError> {
        let mut fields: Vec<Word> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            for token in line.split_whitespace() {
                let value = token.parse::<Word>().map_err(|_| WireError::InvalidInteger {
                    token: token.to_string(),
                    line: idx + 1,
                })?;
                fields.push(value);
            }
        }

        let chunks = fields.chunks_exact(4);
        let rest = chunks.remainder().len();
        if rest != 0 {
            return Err(WireError::TruncatedInstruction { fields: rest });
        }

        let code = chunks
            .map(|f| Instruction::raw(f[0], f[1], f[2], f[3]))
            .collect();
        Ok(Self { code })
    }

    /// Compact binary encoding (postcard).
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        postcard::to_allocvec(self).map_err(|e| WireError::Binary(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        postcard::from_bytes(bytes).map_err(|e| WireError::Binary(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::op::Opcode;
    use proptest::prelude::*;

    fn sample() -> Program {
        Program::new(vec![
            Instruction::new(Opcode::Inc, 0, 0, 5),
            Instruction::new(Opcode::Lit, 0, 0, -42),
            Instruction::new(Opcode::Sto, 0, 2, 4),
            Instruction::new(Opcode::Halt, 0, 0, 3),
        ])
    }

    #[test]
    fn test_text_layout() {
        assert_eq!(sample().to_text(), "6 0 0 5\n1 0 0 -42\n4 0 2 4\n11 0 0 3\n");
    }

    #[test]
    fn test_text_accepts_any_whitespace() {
        let p = Program::from_text("6 0\n0 5   1\t0 0 -42\n\n4 0 2 4 11 0 0 3").unwrap();
        assert_eq!(p, sample());
    }

    #[test]
    fn test_empty_text_is_empty_program() {
        assert!(Program::from_text("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_integer_reports_line() {
        let err = Program::from_text("1 0 0 1\n7 0 x 0\n").unwrap_err();
        assert_eq!(
            err,
            WireError::InvalidInteger {
                token: "x".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_truncated_instruction() {
        let err = Program::from_text("1 0 0 1 9 0").unwrap_err();
        assert_eq!(err, WireError::TruncatedInstruction { fields: 2 });
    }

    #[test]
    fn test_unknown_opcodes_still_load() {
        let p = Program::from_text("99 0 0 0").unwrap();
        assert_eq!(p.code[0].opcode(), None);
    }

    #[test]
    fn test_binary_round_trip() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(Program::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_binary_rejects_garbage() {
        assert!(matches!(
            Program::from_bytes(&[0xff, 0xff, 0xff]),
            Err(WireError::Binary(_))
        ));
    }

    fn arb_instruction() -> impl Strategy<Value = Instruction> {
        (1..=24i64, 0..16i64, -8..8i64, any::<i64>())
            .prop_map(|(op, r, l, m)| Instruction::raw(op, r, l, m))
    }

    proptest! {
        #[test]
        fn prop_text_round_trip(code in prop::collection::vec(arb_instruction(), 0..64)) {
            let program = Program::new(code);
            let parsed = Program::from_text(&program.to_text()).unwrap();
            prop_assert_eq!(parsed, program);
        }

        #[test]
        fn prop_binary_round_trip(code in prop::collection::vec(arb_instruction(), 0..64)) {
            let program = Program::new(code);
            let parsed = Program::from_bytes(&program.to_bytes().unwrap()).unwrap();
            prop_assert_eq!(parsed, program);
        }
    }
}
