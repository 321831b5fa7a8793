use std::collections::VecDeque;
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::bytecode::ir::Program;
use crate::bytecode::op::{Instruction, Opcode, Word};
use crate::bytecode::registers::REGISTER_COUNT;
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::trace;

/// Default bound on the number of stack slots.
pub const MAX_STACK_HEIGHT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub register_count: usize,
    pub max_stack_height: usize,
    pub max_steps: Option<usize>,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            register_count: REGISTER_COUNT,
            max_stack_height: MAX_STACK_HEIGHT,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Running,
    Halted,
    Faulted,
}

/// Register/stack machine for P-code.
///
/// `stack[0]` is a sentinel; the main activation record starts at 1. Every
/// `cal` writes a 4-slot header at the new frame base: unused, static link,
/// dynamic link, return address.
pub struct VirtualMachine {
    config: VmConfig,
    program: Program,
    registers: Vec<Word>,
    stack: Vec<Word>,
    pc: usize,
    bp: Word,
    sp: Word,
    state: VmState,
    steps: usize,

    /// Address of the instruction currently executing.
    current: usize,

    /// Input tokens already read from the stream but not consumed yet.
    pending_input: VecDeque<String>,
}

impl VirtualMachine {
    pub fn new(config: VmConfig) -> Self {
        let registers = vec![0; config.register_count];
        Self {
            config,
            program: Program::default(),
            registers,
            stack: vec![0],
            pc: 0,
            bp: 1,
            sp: 0,
            state: VmState::Running,
            steps: 0,
            current: 0,
            pending_input: VecDeque::new(),
        }
    }

    /// Loads a program and resets the machine to its initial state.
    pub fn load(&mut self, program: Program) {
        log::debug!("loading {} instructions", program.len());
        self.program = program;
        self.registers = vec![0; self.config.register_count];
        self.stack = vec![0];
        self.pc = 0;
        self.bp = 1;
        self.sp = 0;
        self.state = VmState::Running;
        self.steps = 0;
        self.current = 0;
        self.pending_input.clear();
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn bp(&self) -> Word {
        self.bp
    }

    pub fn sp(&self) -> Word {
        self.sp
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn registers(&self) -> &[Word] {
        &self.registers
    }

    /// Live stack slots, `0..=sp`.
    pub fn stack(&self) -> &[Word] {
        let end = usize::try_from(self.sp + 1)
            .unwrap_or(0)
            .min(self.stack.len());
        &self.stack[..end]
    }

    /// Runs a program from the start until it halts.
    pub fn run(
        &mut self,
        program: Program,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), RuntimeError> {
        self.load(program);
        while self.step(input, output)? == VmState::Running {}
        Ok(())
    }

    /// Like [`run`](Self::run), also writing one trace row per instruction.
    pub fn run_traced(
        &mut self,
        program: Program,
        input: &mut impl BufRead,
        output: &mut impl Write,
        trace_out: &mut impl Write,
    ) -> Result<(), RuntimeError> {
        self.load(program);
        trace::write_header(trace_out).map_err(|source| self.io_error(source))?;

        loop {
            let address = self.pc;
            let ins = self.program.get(address).copied();
            let state = self.step(input, output)?;

            if let Some(ins) = ins {
                trace::write_row(
                    trace_out,
                    address,
                    &ins,
                    self.pc,
                    self.bp,
                    self.sp,
                    self.stack(),
                )
                .map_err(|source| self.io_error(source))?;
            }

            if state == VmState::Halted {
                trace::write_halt(trace_out).map_err(|source| self.io_error(source))?;
                return Ok(());
            }
        }
    }

    /// Fetches and executes one instruction.
    pub fn step(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<VmState, RuntimeError> {
        if self.state != VmState::Running {
            return Ok(self.state);
        }

        self.current = self.pc;
        match self.fetch_and_execute(input, output) {
            Ok(()) => Ok(self.state),
            Err(err) => {
                log::debug!("vm fault: {}", err);
                self.state = VmState::Faulted;
                Err(err)
            }
        }
    }

    fn fetch_and_execute(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), RuntimeError> {
        let address = self.current;

        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { address, limit });
            }
        }

        let ins = *self
            .program
            .get(address)
            .ok_or(RuntimeError::ProgramCounterOutOfRange {
                address,
                len: self.program.len(),
            })?;
        self.pc += 1;
        self.steps += 1;

        let op = ins.opcode().ok_or(RuntimeError::UnknownOpcode {
            address,
            opcode: ins.op,
        })?;

        log::trace!("{:04} {} {}", address, op, ins);
        self.execute(op, &ins, input, output)
    }

    fn execute(
        &mut self,
        op: Opcode,
        ins: &Instruction,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), RuntimeError> {
        let Instruction { r, l, m, .. } = *ins;

        match op {
            Opcode::Lit => self.set_register(r, m)?,

            Opcode::Rtn => {
                let frame = self.bp;
                if frame <= 1 {
                    return Err(RuntimeError::ReturnFromMain {
                        address: self.current,
                    });
                }
                let dynamic_link = self.load_slot(self.offset(frame, 2)?)?;
                let return_address = self.load_slot(self.offset(frame, 3)?)?;
                if dynamic_link < 1 || dynamic_link > frame {
                    return Err(RuntimeError::StackAddressOutOfRange {
                        address: self.current,
                        slot: dynamic_link,
                    });
                }

                self.sp = frame - 1;
                self.bp = dynamic_link;
                self.pc = self.jump_target(return_address)?;

                let keep = usize::try_from(self.sp + 1).unwrap_or(1).max(1);
                self.stack.truncate(keep);
            }

            Opcode::Lod => {
                let slot = self.offset(self.base(l)?, m)?;
                let value = self.load_slot(slot)?;
                self.set_register(r, value)?;
            }

            Opcode::Sto => {
                let value = self.register(r)?;
                let slot = self.offset(self.base(l)?, m)?;
                self.store(slot, value)?;
            }

            Opcode::Cal => {
                let static_link = self.base(l)?;
                let frame = self.offset(self.sp, 1)?;
                let return_address = self.pc as Word;

                self.store(frame, 0)?;
                self.store(self.offset(frame, 1)?, static_link)?;
                self.store(self.offset(frame, 2)?, self.bp)?;
                self.store(self.offset(frame, 3)?, return_address)?;

                self.bp = frame;
                self.pc = self.jump_target(m)?;
            }

            Opcode::Inc => {
                let sp = self.offset(self.sp, m)?;
                if sp < 0 {
                    return Err(RuntimeError::StackAddressOutOfRange {
                        address: self.current,
                        slot: sp,
                    });
                }
                self.reserve(sp)?;
                self.sp = sp;
            }

            Opcode::Jmp => self.pc = self.jump_target(m)?,

            Opcode::Jpc => {
                if self.register(r)? == 0 {
                    self.pc = self.jump_target(m)?;
                }
            }

            Opcode::Write => {
                let value = self.register(r)?;
                writeln!(output, "{}", value).map_err(|source| self.io_error(source))?;
            }

            Opcode::Read => {
                let value = self.read_integer(input)?;
                self.set_register(r, value)?;
            }

            Opcode::Halt => {
                log::debug!("halt at {} after {} steps", self.current, self.steps);
                self.state = VmState::Halted;
            }

            Opcode::Neg => {
                let value = self.register(l)?;
                self.set_register(r, value.wrapping_neg())?;
            }

            Opcode::Odd => {
                let value = self.register(l)?;
                self.set_register(r, (value % 2 != 0) as Word)?;
            }

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Eql
            | Opcode::Neq
            | Opcode::Lss
            | Opcode::Leq
            | Opcode::Gtr
            | Opcode::Geq => {
                let a = self.register(l)?;
                let b = self.register(m)?;
                let value = self.binary(op, a, b)?;
                self.set_register(r, value)?;
            }
        }

        Ok(())
    }

    fn binary(&self, op: Opcode, a: Word, b: Word) -> Result<Word, RuntimeError> {
        let value = match op {
            Opcode::Add => a.wrapping_add(b),
            Opcode::Sub => a.wrapping_sub(b),
            Opcode::Mul => a.wrapping_mul(b),
            Opcode::Div | Opcode::Mod if b == 0 => {
                return Err(RuntimeError::DivisionByZero {
                    address: self.current,
                });
            }
            Opcode::Div => a.wrapping_div(b),
            Opcode::Mod => a.wrapping_rem(b),
            Opcode::Eql => (a == b) as Word,
            Opcode::Neq => (a != b) as Word,
            Opcode::Lss => (a < b) as Word,
            Opcode::Leq => (a <= b) as Word,
            Opcode::Gtr => (a > b) as Word,
            Opcode::Geq => (a >= b) as Word,
            _ => {
                return Err(RuntimeError::UnknownOpcode {
                    address: self.current,
                    opcode: op.code(),
                });
            }
        };
        Ok(value)
    }

    /// Frame base reached by following `l` static links outward from `bp`.
    pub fn base(&self, l: Word) -> Result<Word, RuntimeError> {
        if l < 0 {
            return Err(RuntimeError::InvalidStaticLink {
                address: self.current,
                depth: l,
            });
        }

        let mut base = self.bp;
        for depth in 0..l {
            base = self
                .offset(base, 1)
                .and_then(|slot| self.load_slot(slot))
                .map_err(|_| RuntimeError::InvalidStaticLink {
                    address: self.current,
                    depth,
                })?;
        }
        Ok(base)
    }

    // =========================================================================
    // Registers, stack and I/O
    // =========================================================================

    fn register(&self, index: Word) -> Result<Word, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.registers.get(i).copied())
            .ok_or(RuntimeError::RegisterOutOfRange {
                address: self.current,
                register: index,
            })
    }

    fn set_register(&mut self, index: Word, value: Word) -> Result<(), RuntimeError> {
        let address = self.current;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| self.registers.get_mut(i))
            .ok_or(RuntimeError::RegisterOutOfRange {
                address,
                register: index,
            })?;
        *slot = value;
        Ok(())
    }

    /// `base + m` as a stack address; overflow is a fault.
    fn offset(&self, base: Word, m: Word) -> Result<Word, RuntimeError> {
        base.checked_add(m).ok_or(RuntimeError::StackAddressOutOfRange {
            address: self.current,
            slot: base.saturating_add(m),
        })
    }

    fn load_slot(&self, slot: Word) -> Result<Word, RuntimeError> {
        usize::try_from(slot)
            .ok()
            .and_then(|i| self.stack.get(i).copied())
            .ok_or(RuntimeError::StackAddressOutOfRange {
                address: self.current,
                slot,
            })
    }

    fn store(&mut self, slot: Word, value: Word) -> Result<(), RuntimeError> {
        self.reserve(slot)?;
        let index = self.stack_index(slot)?;
        self.stack[index] = value;
        Ok(())
    }

    /// Grows the stack so that `slot` exists.
    fn reserve(&mut self, slot: Word) -> Result<(), RuntimeError> {
        let index = self.stack_index(slot)?;
        if index >= self.config.max_stack_height {
            return Err(RuntimeError::StackOverflow {
                address: self.current,
                limit: self.config.max_stack_height,
            });
        }
        if index >= self.stack.len() {
            self.stack.resize(index + 1, 0);
        }
        Ok(())
    }

    fn stack_index(&self, slot: Word) -> Result<usize, RuntimeError> {
        usize::try_from(slot).map_err(|_| RuntimeError::StackAddressOutOfRange {
            address: self.current,
            slot,
        })
    }

    fn jump_target(&self, target: Word) -> Result<usize, RuntimeError> {
        usize::try_from(target).map_err(|_| RuntimeError::ProgramCounterOutOfRange {
            address: self.current,
            len: self.program.len(),
        })
    }

    fn read_integer(&mut self, input: &mut impl BufRead) -> Result<Word, RuntimeError> {
        loop {
            if let Some(token) = self.pending_input.pop_front() {
                return token
                    .parse::<Word>()
                    .map_err(|_| RuntimeError::InvalidInput {
                        address: self.current,
                        token,
                    });
            }

            let mut line = String::new();
            let read = input
                .read_line(&mut line)
                .map_err(|source| self.io_error(source))?;
            if read == 0 {
                return Err(RuntimeError::InputExhausted {
                    address: self.current,
                });
            }

            self.pending_input
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn io_error(&self, source: std::io::Error) -> RuntimeError {
        RuntimeError::Io {
            address: self.current,
            source,
        }
    }
}

impl Default for VirtualMachine {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::op::{SIO_HALT_M, SIO_READ_M, SIO_WRITE_M};

    fn ins(op: Opcode, r: Word, l: Word, m: Word) -> Instruction {
        Instruction::new(op, r, l, m)
    }

    fn run_with_input(code: Vec<Instruction>, input: &str) -> Result<String, RuntimeError> {
        let mut vm = VirtualMachine::default();
        let mut out = Vec::new();
        vm.run(Program::new(code), &mut input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn run(code: Vec<Instruction>) -> Result<String, RuntimeError> {
        run_with_input(code, "")
    }

    #[test]
    fn test_literal_write_halt() {
        let out = run(vec![
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Lit, 0, 0, 5),
            ins(Opcode::Write, 0, 0, SIO_WRITE_M),
            ins(Opcode::Halt, 0, 0, SIO_HALT_M),
        ])
        .unwrap();
        assert_eq!(out, "5\n");
    }

    #[test]
    fn test_initial_state() {
        let vm = VirtualMachine::default();
        assert_eq!(vm.pc(), 0);
        assert_eq!(vm.bp(), 1);
        assert_eq!(vm.sp(), 0);
        assert_eq!(vm.stack(), &[0]);
        assert_eq!(vm.registers().len(), 16);
    }

    #[test]
    fn test_step_by_step() {
        let mut vm = VirtualMachine::default();
        vm.load(Program::new(vec![
            ins(Opcode::Inc, 0, 0, 5),
            ins(Opcode::Lit, 2, 0, 9),
            ins(Opcode::Sto, 2, 0, 4),
            ins(Opcode::Halt, 0, 0, 3),
        ]));
        let mut input = "".as_bytes();
        let mut out = Vec::new();

        assert_eq!(vm.step(&mut input, &mut out).unwrap(), VmState::Running);
        assert_eq!(vm.sp(), 5);
        vm.step(&mut input, &mut out).unwrap();
        assert_eq!(vm.registers()[2], 9);
        vm.step(&mut input, &mut out).unwrap();
        assert_eq!(vm.stack()[5], 9);
        assert_eq!(vm.step(&mut input, &mut out).unwrap(), VmState::Halted);
        // halted machines stay halted
        assert_eq!(vm.step(&mut input, &mut out).unwrap(), VmState::Halted);
        assert_eq!(vm.pc(), 4);
    }

    #[test]
    fn test_call_writes_frame_header_and_returns() {
        let mut vm = VirtualMachine::default();
        vm.load(Program::new(vec![
            ins(Opcode::Jmp, 0, 0, 3),
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Rtn, 0, 0, 0),
            ins(Opcode::Inc, 0, 0, 5),
            ins(Opcode::Cal, 0, 0, 1),
            ins(Opcode::Halt, 0, 0, 3),
        ]));
        let mut input = "".as_bytes();
        let mut out = Vec::new();

        for _ in 0..3 {
            vm.step(&mut input, &mut out).unwrap();
        }
        // after cal: new frame at sp + 1, sp unchanged
        assert_eq!(vm.bp(), 6);
        assert_eq!(vm.sp(), 5);
        assert_eq!(vm.pc(), 1);

        vm.step(&mut input, &mut out).unwrap();
        assert_eq!(vm.stack()[6..], [0, 1, 1, 5]);

        vm.step(&mut input, &mut out).unwrap();
        assert_eq!(vm.bp(), 1);
        assert_eq!(vm.sp(), 5);
        assert_eq!(vm.pc(), 5);
        assert_eq!(vm.step(&mut input, &mut out).unwrap(), VmState::Halted);
    }

    #[test]
    fn test_base_follows_static_links() {
        let mut vm = VirtualMachine::default();
        // main frame at 1, a level-1 frame at 6, a level-2 frame at 10
        vm.load(Program::new(vec![
            ins(Opcode::Inc, 0, 0, 5),
            ins(Opcode::Cal, 0, 0, 2),
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Cal, 0, 0, 4),
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Halt, 0, 0, 3),
        ]));
        let mut input = "".as_bytes();
        let mut out = Vec::new();
        while vm.step(&mut input, &mut out).unwrap() == VmState::Running {}

        assert_eq!(vm.bp(), 10);
        assert_eq!(vm.base(0).unwrap(), 10);
        assert_eq!(vm.base(1).unwrap(), 6);
        assert_eq!(vm.base(2).unwrap(), 1);
    }

    #[test]
    fn test_read_whitespace_separated_integers() {
        let out = run_with_input(
            vec![
                ins(Opcode::Read, 0, 0, SIO_READ_M),
                ins(Opcode::Read, 1, 0, SIO_READ_M),
                ins(Opcode::Add, 0, 0, 1),
                ins(Opcode::Write, 0, 0, SIO_WRITE_M),
                ins(Opcode::Halt, 0, 0, SIO_HALT_M),
            ],
            "  40\n\n 2 ",
        )
        .unwrap();
        assert_eq!(out, "42\n");
    }

    #[test]
    fn test_arithmetic_semantics() {
        let cases = [
            (Opcode::Div, -7, 2, -3),
            (Opcode::Mod, -7, 2, -1),
            (Opcode::Mod, 7, -2, 1),
            (Opcode::Sub, 3, 5, -2),
            (Opcode::Mul, Word::MAX, 2, -2),
            (Opcode::Div, Word::MIN, -1, Word::MIN),
            (Opcode::Leq, 3, 3, 1),
            (Opcode::Gtr, 3, 3, 0),
        ];

        for (op, a, b, expected) in cases {
            let vm = VirtualMachine::default();
            assert_eq!(vm.binary(op, a, b).unwrap(), expected, "{op:?} {a} {b}");
        }
    }

    #[test]
    fn test_odd_and_neg() {
        let out = run(vec![
            ins(Opcode::Lit, 0, 0, -3),
            ins(Opcode::Odd, 1, 0, 0),
            ins(Opcode::Write, 1, 0, 1),
            ins(Opcode::Neg, 2, 0, 0),
            ins(Opcode::Write, 2, 0, 1),
            ins(Opcode::Halt, 0, 0, 3),
        ])
        .unwrap();
        assert_eq!(out, "1\n3\n");
    }

    #[test]
    fn test_jpc_branches_on_zero() {
        let out = run(vec![
            ins(Opcode::Lit, 0, 0, 0),
            ins(Opcode::Jpc, 0, 0, 3),
            ins(Opcode::Write, 0, 0, 1),
            ins(Opcode::Halt, 0, 0, 3),
        ])
        .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_unknown_opcode_faults_with_address() {
        let mut vm = VirtualMachine::default();
        let mut out = Vec::new();
        let err = vm
            .run(
                Program::new(vec![ins(Opcode::Inc, 0, 0, 4), Instruction::raw(77, 0, 0, 0)]),
                &mut "".as_bytes(),
                &mut out,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::UnknownOpcode {
                address: 1,
                opcode: 77
            }
        ));
        assert_eq!(vm.state(), VmState::Faulted);
    }

    #[test]
    fn test_running_off_the_end_faults() {
        let err = run(vec![ins(Opcode::Jmp, 0, 0, 9)]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ProgramCounterOutOfRange { address: 9, len: 1 }
        ));
    }

    #[test]
    fn test_division_by_zero_faults() {
        let err = run(vec![
            ins(Opcode::Lit, 0, 0, 1),
            ins(Opcode::Lit, 1, 0, 0),
            ins(Opcode::Div, 0, 0, 1),
        ])
        .unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { address: 2 }));
    }

    #[test]
    fn test_input_faults() {
        let read = vec![ins(Opcode::Read, 0, 0, 2), ins(Opcode::Halt, 0, 0, 3)];
        assert!(matches!(
            run_with_input(read.clone(), "").unwrap_err(),
            RuntimeError::InputExhausted { address: 0 }
        ));
        assert!(matches!(
            run_with_input(read, "abc").unwrap_err(),
            RuntimeError::InvalidInput { address: 0, .. }
        ));
    }

    #[test]
    fn test_register_out_of_range() {
        let err = run(vec![ins(Opcode::Lit, 16, 0, 1)]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::RegisterOutOfRange {
                address: 0,
                register: 16
            }
        ));
    }

    #[test]
    fn test_stack_overflow() {
        let mut vm = VirtualMachine::new(VmConfig {
            max_stack_height: 10,
            ..Default::default()
        });
        let err = vm
            .run(
                Program::new(vec![ins(Opcode::Inc, 0, 0, 10)]),
                &mut "".as_bytes(),
                &mut Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StackOverflow { limit: 10, .. }));
    }

    #[test]
    fn test_step_limit() {
        let mut vm = VirtualMachine::new(VmConfig {
            max_steps: Some(50),
            ..Default::default()
        });
        let err = vm
            .run(
                Program::new(vec![ins(Opcode::Jmp, 0, 0, 0)]),
                &mut "".as_bytes(),
                &mut Vec::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::StepLimitExceeded { limit: 50, .. }
        ));
    }

    #[test]
    fn test_return_from_main_faults() {
        let err = run(vec![
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Rtn, 0, 0, 0),
            ins(Opcode::Halt, 0, 0, 3),
        ])
        .unwrap_err();
        assert!(matches!(err, RuntimeError::ReturnFromMain { address: 1 }));
    }

    #[test]
    fn test_huge_offsets_fault_instead_of_overflowing() {
        let cases = [
            vec![ins(Opcode::Lod, 0, 0, Word::MAX)],
            vec![ins(Opcode::Inc, 0, 0, 4), ins(Opcode::Sto, 0, 0, Word::MAX)],
            vec![ins(Opcode::Inc, 0, 0, 4), ins(Opcode::Inc, 0, 0, Word::MAX)],
        ];

        for code in cases {
            let err = run(code.clone()).unwrap_err();
            assert!(
                matches!(err, RuntimeError::StackAddressOutOfRange { .. }),
                "{code:?}: {err}"
            );
        }
    }

    #[test]
    fn test_corrupt_dynamic_link_faults() {
        // callee overwrites its own dynamic link, then returns
        let err = run(vec![
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Cal, 0, 0, 3),
            ins(Opcode::Halt, 0, 0, 3),
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Lit, 0, 0, Word::MAX),
            ins(Opcode::Sto, 0, 0, 2),
            ins(Opcode::Rtn, 0, 0, 0),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::StackAddressOutOfRange {
                address: 6,
                slot: Word::MAX
            }
        ));
    }

    #[test]
    fn test_corrupt_static_link_faults() {
        let err = run(vec![
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Cal, 0, 0, 3),
            ins(Opcode::Halt, 0, 0, 3),
            ins(Opcode::Inc, 0, 0, 4),
            ins(Opcode::Lit, 0, 0, Word::MAX),
            ins(Opcode::Sto, 0, 0, 1),
            ins(Opcode::Lod, 1, 2, 4),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidStaticLink {
                address: 6,
                depth: 1
            }
        ));
    }

    #[test]
    fn test_trace_rows() {
        let mut vm = VirtualMachine::default();
        let mut out = Vec::new();
        let mut trace_out = Vec::new();
        vm.run_traced(
            Program::new(vec![
                ins(Opcode::Inc, 0, 0, 5),
                ins(Opcode::Lit, 0, 0, 3),
                ins(Opcode::Sto, 0, 0, 4),
                ins(Opcode::Halt, 0, 0, 3),
            ]),
            &mut "".as_bytes(),
            &mut out,
            &mut trace_out,
        )
        .unwrap();

        let text = String::from_utf8(trace_out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "***Execution***");
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[4],
            "  2 sto   0   0   4   3   1   5   0   0   0   0   0   3"
        );
        assert_eq!(lines[6], "HLT");
    }
}
