//! Runtime fault taxonomy
//!
//! All faults are fatal to the guest: they indicate a corrupt image or a
//! bug in the guest program, so execution halts and the fault surfaces to
//! the driver. Each decode or execute fault carries the address of the
//! instruction that raised it.

use std::error;
use std::fmt;
use std::io;

/// A fatal condition raised while decoding or executing guest instructions.
#[derive(Debug)]
pub enum Fault {
    /// The word at the fetch address is not a known opcode.
    UnknownOpcode {
        /// Address of the instruction
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// An operand word above 32775 was fetched.
    InvalidOperand {
        /// Address of the instruction
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// A write-target operand that is not a register reference.
    InvalidWriteTarget {
        /// Address of the instruction
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// `mod` was asked to divide by zero.
    DivByZero {
        /// Address of the instruction
        pc: u16,
    },
    /// `pop` found nothing on the stack.
    StackUnderflow {
        /// Address of the instruction
        pc: u16,
    },
    /// The interactive input source reached end of file.
    StdinClosed,
    /// The terminal could not be read or written.
    Io(io::Error),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Fault::*;
        match *self {
            UnknownOpcode { pc, word } => {
                write!(f, "unknown opcode {} at 0x{:0>4x}", word, pc)
            }
            InvalidOperand { pc, word } => {
                write!(f, "invalid operand word {} at 0x{:0>4x}", word, pc)
            }
            InvalidWriteTarget { pc, word } => {
                write!(f, "write target {} at 0x{:0>4x} is not a register", word, pc)
            }
            DivByZero { pc } => write!(f, "modulo by zero at 0x{:0>4x}", pc),
            StackUnderflow { pc } => write!(f, "pop on an empty stack at 0x{:0>4x}", pc),
            StdinClosed => write!(f, "input source closed"),
            Io(ref err) => write!(f, "terminal i/o error: {}", err),
        }
    }
}

impl error::Error for Fault {}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Fault {
        Fault::Io(err)
    }
}
