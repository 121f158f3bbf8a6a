//! VM execution engine
//!
//! Emulates the Synacor architecture: a fetch/decode/execute loop over a
//! 32768-word address space, eight registers and an unbounded stack, with
//! arithmetic reduced mod 32768. The debugger shares the machine state and
//! is entered from the run loop (breakpoints, stepping) or from inside the
//! `in` instruction via escape lines.

pub mod data;
pub mod fault;
pub mod snapshot;

pub use self::data::{Data, RAM_SIZE};
pub use self::fault::Fault;
pub use self::snapshot::Snapshot;

use debugger;
use instruction::Instruction;
use operand::Operand;
use terminal::Terminal;

use std::collections::{HashSet, VecDeque};
use std::mem;

/// The leading character that routes an input line to the debugger.
pub const ESCAPE: char = '.';

/// An emulator for the Synacor architecture with an attached debugger plane.
pub struct SynVm {
    /// The programme counter
    pub pc: u16,
    /// Set to true once execution has halted
    pub halted: bool,
    /// Registers, RAM and stack
    pub data: Data,
    /// Invocation counts per opcode
    pub stats: [u64; 22],
    /// Addresses at which the run loop yields to the debugger
    pub breakpoints: HashSet<u16>,
    /// When true, the run loop prompts before every instruction
    pub paused: bool,
    /// Remaining instructions before the next pause, if counting down
    pub steps: Option<u64>,
    /// When true, each executed instruction is traced to the output sink
    pub trace: bool,
    /// The address a snapshot taken now should resume at
    pub resume_pc: u16,
    /// Completed input lines and debugger escape lines, in order
    pub history: Vec<String>,
    /// The byte sink and line source
    pub term: Terminal,
    input_buf: VecDeque<u8>,
    canned: VecDeque<String>,
    pending: String,
    bp_resume: Option<u16>,
}

impl SynVm {
    /// Constructs a VM over the given program image and terminal.
    pub fn new(image: &[u16], term: Terminal) -> SynVm {
        SynVm {
            pc: 0,
            halted: false,
            data: Data::from_words(image),
            stats: [0; 22],
            breakpoints: HashSet::new(),
            paused: false,
            steps: None,
            trace: false,
            resume_pc: 0,
            history: Vec::new(),
            term: term,
            input_buf: VecDeque::new(),
            canned: VecDeque::new(),
            pending: String::new(),
            bp_resume: None,
        }
    }

    /// Replaces the queue of canned input lines.
    pub fn set_canned(&mut self, lines: Vec<String>) {
        self.canned = lines.into_iter().collect();
    }

    /// Runs the fetch/decode/execute loop until the machine halts, a fault
    /// is raised, or the program counter leaves the address space.
    pub fn run(&mut self) -> Result<(), Fault> {
        while !self.halted && (self.pc as usize) < RAM_SIZE {
            let at_breakpoint = self.breakpoints.contains(&self.pc)
                && self.bp_resume != Some(self.pc);
            self.bp_resume = None;
            if at_breakpoint || self.steps == Some(0) {
                self.paused = true;
            }
            if self.paused {
                self.resume_pc = self.pc;
                debugger::prompt(self)?;
                // Do not re-trigger this breakpoint until the pc leaves it.
                self.bp_resume = Some(self.pc);
                if self.steps == Some(0) {
                    self.steps = None;
                }
            }
            if let Err(fault) = self.step() {
                self.halted = true;
                return Err(fault);
            }
            if let Some(ref mut n) = self.steps {
                *n = n.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Decodes and executes a single instruction.
    pub fn step(&mut self) -> Result<(), Fault> {
        let at = self.pc;
        let instr = self.decode_next()?;
        self.stats[instr.opcode() as usize] += 1;
        if self.trace {
            let line = format!("[{:0>5}] {}\n", at, instr);
            self.term.put_str(&line)?;
        }

        use instruction::Instruction::*;
        match instr {
            Halt => {
                self.halted = true;
            }
            Set { dst, a } => {
                let val = self.data.val(a);
                self.store(dst, val, at)?;
            }
            Push { src } => {
                let val = self.data.val(src);
                self.data.push(val);
            }
            Pop { dst } => match self.data.pop() {
                Some(val) => self.store(dst, val, at)?,
                None => return Err(Fault::StackUnderflow { pc: at }),
            },
            Eq { dst, a, b } => {
                let val = if self.data.val(a) == self.data.val(b) { 1 } else { 0 };
                self.store(dst, val, at)?;
            }
            Gt { dst, a, b } => {
                let val = if self.data.val(a) > self.data.val(b) { 1 } else { 0 };
                self.store(dst, val, at)?;
            }
            Jmp { dst } => {
                self.pc = self.data.val(dst);
            }
            Jt { src, dst } => {
                if self.data.val(src) != 0 {
                    self.pc = self.data.val(dst);
                }
            }
            Jf { src, dst } => {
                if self.data.val(src) == 0 {
                    self.pc = self.data.val(dst);
                }
            }
            Add { dst, a, b } => {
                let sum = (self.data.val(a) as u32 + self.data.val(b) as u32)
                    % RAM_SIZE as u32;
                self.store(dst, sum as u16, at)?;
            }
            Mult { dst, a, b } => {
                let product = (self.data.val(a) as u32 * self.data.val(b) as u32)
                    % RAM_SIZE as u32;
                self.store(dst, product as u16, at)?;
            }
            Mod { dst, a, b } => {
                let divisor = self.data.val(b);
                if divisor == 0 {
                    return Err(Fault::DivByZero { pc: at });
                }
                let val = self.data.val(a) % divisor;
                self.store(dst, val, at)?;
            }
            And { dst, a, b } => {
                let val = self.data.val(a) & self.data.val(b);
                self.store(dst, val, at)?;
            }
            Or { dst, a, b } => {
                let val = self.data.val(a) | self.data.val(b);
                self.store(dst, val, at)?;
            }
            Not { dst, a } => {
                let val = !self.data.val(a) & 0x7fff;
                self.store(dst, val, at)?;
            }
            ReadMem { dst, src } => {
                let addr = self.data.val(src);
                let val = self.data[addr];
                self.store(dst, val, at)?;
            }
            WriteMem { dst, src } => {
                let addr = self.data.val(dst);
                let val = self.data.val(src);
                self.data[addr] = val;
            }
            Call { dst } => {
                let target = self.data.val(dst);
                self.data.push(self.pc);
                self.pc = target;
            }
            Ret => match self.data.pop() {
                Some(addr) => self.pc = addr,
                None => self.halted = true,
            },
            Out { value } => {
                let byte = (self.data.val(value) & 0xff) as u8;
                self.term.put_byte(byte)?;
            }
            In { dst } => {
                let byte = self.input_byte()?;
                self.store(dst, byte as u16, at)?;
            }
            Noop => {}
        }

        Ok(())
    }

    /// Fetches the word at the pc and advances it.
    fn fetch(&mut self) -> u16 {
        let word = self.data[self.pc];
        self.pc = self.pc.wrapping_add(1);
        word
    }

    /// Fetches an operand word, rejecting values past the register file.
    fn operand(&mut self, at: u16) -> Result<Operand, Fault> {
        let word = self.fetch();
        Operand::decode(word).ok_or(Fault::InvalidOperand { pc: at, word: word })
    }

    /// Reads the instruction at the pc, advancing past its operands.
    fn decode_next(&mut self) -> Result<Instruction, Fault> {
        use instruction::Instruction::*;
        let at = self.pc;
        let op = self.fetch();
        let instr = match op {
            0 => Halt,
            1 => Set { dst: self.operand(at)?, a: self.operand(at)? },
            2 => Push { src: self.operand(at)? },
            3 => Pop { dst: self.operand(at)? },
            4 => Eq { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            5 => Gt { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            6 => Jmp { dst: self.operand(at)? },
            7 => Jt { src: self.operand(at)?, dst: self.operand(at)? },
            8 => Jf { src: self.operand(at)?, dst: self.operand(at)? },
            9 => Add { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            10 => Mult { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            11 => Mod { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            12 => And { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            13 => Or { dst: self.operand(at)?, a: self.operand(at)?, b: self.operand(at)? },
            14 => Not { dst: self.operand(at)?, a: self.operand(at)? },
            15 => ReadMem { dst: self.operand(at)?, src: self.operand(at)? },
            16 => WriteMem { dst: self.operand(at)?, src: self.operand(at)? },
            17 => Call { dst: self.operand(at)? },
            18 => Ret,
            19 => Out { value: self.operand(at)? },
            20 => In { dst: self.operand(at)? },
            21 => Noop,
            word => return Err(Fault::UnknownOpcode { pc: at, word: word }),
        };
        Ok(instr)
    }

    /// Writes a value through a register-reference operand.
    fn store(&mut self, dst: Operand, val: u16, at: u16) -> Result<(), Fault> {
        match dst {
            Operand::Register(r) => {
                self.data.registers[r] = val;
                Ok(())
            }
            Operand::Literal(word) => {
                Err(Fault::InvalidWriteTarget { pc: at, word: word })
            }
        }
    }

    /// Produces the next input byte for the `in` instruction.
    ///
    /// While the buffer is empty, a line is acquired from the canned queue
    /// (echoed to the output sink) or read interactively. Lines starting
    /// with the escape character are handed to the debugger instead of the
    /// guest; everything else lands in the buffer with a trailing newline
    /// and is then consumed one byte per call.
    fn input_byte(&mut self) -> Result<u8, Fault> {
        while self.input_buf.is_empty() {
            let line = match self.canned.pop_front() {
                Some(line) => {
                    let echo = format!("Canned command: {}\n", line);
                    self.term.put_str(&echo)?;
                    line
                }
                None => {
                    self.term.put_str("? ")?;
                    match self.term.read_line()? {
                        Some(line) => line,
                        None => return Err(Fault::StdinClosed),
                    }
                }
            };

            if line.starts_with(ESCAPE) {
                self.history.push(line.clone());
                // A snapshot taken by this command must resume at the `in`
                // instruction itself: one opcode and one operand back.
                self.resume_pc = self.pc.wrapping_sub(2);
                debugger::dispatch(self, &line[1..])?;
                continue;
            }

            self.input_buf.extend(line.bytes());
            self.input_buf.push_back(b'\n');
        }

        let byte = self.input_buf.pop_front().unwrap();
        if byte == b'\n' {
            let line = mem::replace(&mut self.pending, String::new());
            self.history.push(line);
        } else {
            self.pending.push(byte as char);
        }
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::{SynVm, Fault};
    use terminal::Terminal;

    use std::io::Cursor;

    fn quiet_vm(image: &[u16]) -> SynVm {
        let term = Terminal::new(
            Box::new(Cursor::new(Vec::new())),
            Box::new(Vec::new()),
        );
        SynVm::new(image, term)
    }

    #[test]
    fn set_passes_decoded_values_through() {
        // set r0 <- 123, halt
        let mut vm = quiet_vm(&[1, 32768, 123, 0]);
        vm.run().unwrap();
        assert_eq!(vm.data.registers[0], 123);
        assert!(vm.halted);
    }

    #[test]
    fn addition_wraps_at_the_modulus() {
        // set r0 <- 32767, add r0 <- r0 + 1
        let mut vm = quiet_vm(&[1, 32768, 32767, 9, 32768, 32768, 1, 0]);
        vm.run().unwrap();
        assert_eq!(vm.data.registers[0], 0);
    }

    #[test]
    fn literal_write_targets_are_rejected() {
        let mut vm = quiet_vm(&[1, 123, 5]);
        match vm.run() {
            Err(Fault::InvalidWriteTarget { pc, word }) => {
                assert_eq!(pc, 0);
                assert_eq!(word, 123);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(vm.halted);
    }

    #[test]
    fn operand_words_past_the_register_file_fault() {
        let mut vm = quiet_vm(&[1, 32768, 32776]);
        match vm.run() {
            Err(Fault::InvalidOperand { word, .. }) => assert_eq!(word, 32776),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
