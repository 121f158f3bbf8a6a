//! Architecture instructions
//!
//! The decoded form of the 22 instructions supported by the machine.
//! Three-operand arithmetic and logic instructions take a register
//! write target followed by two operands; the `Display` impl renders
//! the trace form used by `debugmode`.

use operand::Operand;

use std::fmt;

/// Mnemonics for the 22 opcodes, indexed by opcode number.
pub const OPCODE_NAMES: [&'static str; 22] = [
    "halt", "set", "push", "pop", "eq", "gt", "jmp", "jt", "jf", "add",
    "mul", "mod", "and", "or", "not", "rmem", "wmem", "call", "ret",
    "out", "in", "noop",
];

/// Enum representation of all the supported instructions.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Instruction {
    /// Stop execution and terminate the program
    Halt,
    /// Set register `dst` to the value of `a`
    Set {
        /// Write target
        dst: Operand,
        /// Source operand
        a: Operand,
    },
    /// Push `src` onto the stack
    Push {
        /// Source operand
        src: Operand,
    },
    /// Remove the top element from the stack and write it into `dst`
    Pop {
        /// Write target
        dst: Operand,
    },
    /// Set `dst` to 1 if `a` equals `b`, otherwise 0
    Eq {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Set `dst` to 1 if `a` is greater than `b`, otherwise 0
    Gt {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Jump unconditionally to `dst`
    Jmp {
        /// Jump target
        dst: Operand,
    },
    /// If `src` is non-zero, jump to `dst`
    Jt {
        /// Condition operand
        src: Operand,
        /// Jump target
        dst: Operand,
    },
    /// If `src` is zero, jump to `dst`
    Jf {
        /// Condition operand
        src: Operand,
        /// Jump target
        dst: Operand,
    },
    /// Assign into `dst` the sum of `a` and `b`, modulo 32768
    Add {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Assign into `dst` the product of `a` and `b`, modulo 32768
    Mult {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Assign into `dst` the remainder of `a` divided by `b`
    Mod {
        /// Write target
        dst: Operand,
        /// Dividend operand
        a: Operand,
        /// Divisor operand
        b: Operand,
    },
    /// Store into `dst` the bitwise AND of `a` and `b`
    And {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Store into `dst` the bitwise OR of `a` and `b`
    Or {
        /// Write target
        dst: Operand,
        /// Left operand
        a: Operand,
        /// Right operand
        b: Operand,
    },
    /// Store the 15-bit inverse of `a` into `dst`
    Not {
        /// Write target
        dst: Operand,
        /// Source operand
        a: Operand,
    },
    /// Read memory at address `src` and write it to `dst`
    ReadMem {
        /// Write target
        dst: Operand,
        /// Address operand
        src: Operand,
    },
    /// Write the value of `src` into memory at address `dst`
    WriteMem {
        /// Address operand
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Push the address of the next instruction and jump to `dst`
    Call {
        /// Jump target
        dst: Operand,
    },
    /// Pop the stack and jump to the popped address, halt on empty stack
    Ret,
    /// Emit the low byte of `value` to the output sink
    Out {
        /// Byte operand
        value: Operand,
    },
    /// Read one byte from the input source and write it to `dst`
    In {
        /// Write target
        dst: Operand,
    },
    /// No operation
    Noop,
}

impl Instruction {
    /// The opcode number of this instruction.
    pub fn opcode(&self) -> u16 {
        use self::Instruction::*;
        match *self {
            Halt => 0,
            Set { .. } => 1,
            Push { .. } => 2,
            Pop { .. } => 3,
            Eq { .. } => 4,
            Gt { .. } => 5,
            Jmp { .. } => 6,
            Jt { .. } => 7,
            Jf { .. } => 8,
            Add { .. } => 9,
            Mult { .. } => 10,
            Mod { .. } => 11,
            And { .. } => 12,
            Or { .. } => 13,
            Not { .. } => 14,
            ReadMem { .. } => 15,
            WriteMem { .. } => 16,
            Call { .. } => 17,
            Ret => 18,
            Out { .. } => 19,
            In { .. } => 20,
            Noop => 21,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Instruction::*;
        match *self {
            Halt => write!(f, "halt"),
            Set { dst, a } => write!(f, "set  {} {}", dst, a),
            Push { src } => write!(f, "push {}", src),
            Pop { dst } => write!(f, "pop  {}", dst),
            Eq { dst, a, b } => write!(f, "eq   {} {} {}", dst, a, b),
            Gt { dst, a, b } => write!(f, "gt   {} {} {}", dst, a, b),
            Jmp { dst } => write!(f, "jmp  {:x}", dst),
            Jt { src, dst } => write!(f, "jt   {} {:x}", src, dst),
            Jf { src, dst } => write!(f, "jf   {} {:x}", src, dst),
            Add { dst, a, b } => write!(f, "add  {} {} {}", dst, a, b),
            Mult { dst, a, b } => write!(f, "mul  {} {} {}", dst, a, b),
            Mod { dst, a, b } => write!(f, "mod  {} {} {}", dst, a, b),
            And { dst, a, b } => write!(f, "and  {} {} {}", dst, a, b),
            Or { dst, a, b } => write!(f, "or   {} {} {}", dst, a, b),
            Not { dst, a } => write!(f, "not  {} {}", dst, a),
            ReadMem { dst, src } => write!(f, "rmem {} {:x}", dst, src),
            WriteMem { dst, src } => write!(f, "wmem {:x} {}", dst, src),
            Call { dst } => write!(f, "call {:x}", dst),
            Ret => write!(f, "ret"),
            Out { value } => write!(f, "out  {}", value),
            In { dst } => write!(f, "in   {}", dst),
            Noop => write!(f, "noop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction;
    use operand::Operand;

    #[test]
    fn trace_form() {
        let instr = Instruction::Add {
            dst: Operand::Register(0),
            a: Operand::Register(1),
            b: Operand::Literal(40),
        };
        assert_eq!(format!("{}", instr), "add  r0 r1 40");

        let jump = Instruction::Jmp { dst: Operand::Literal(0x1234) };
        assert_eq!(format!("{}", jump), "jmp  0x1234");
    }

    #[test]
    fn opcode_numbers_match_the_name_table() {
        use super::OPCODE_NAMES;
        assert_eq!(OPCODE_NAMES[Instruction::Halt.opcode() as usize], "halt");
        assert_eq!(OPCODE_NAMES[Instruction::Ret.opcode() as usize], "ret");
        assert_eq!(OPCODE_NAMES[Instruction::Noop.opcode() as usize], "noop");
    }
}
