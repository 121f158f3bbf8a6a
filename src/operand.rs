//! The operand encoding used in machine words.

use std::fmt;

/// The lowest word value that denotes a register reference.
pub const REG_BASE: u16 = 32768;

/// The number of registers on the machine.
pub const NUM_REGS: usize = 8;

/// A decoded operand word: either a literal 15-bit value or a reference
/// to one of the eight registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operand {
    /// A literal 15-bit value
    Literal(u16),
    /// A register index in 0..8
    Register(usize),
}

impl Operand {
    /// Decodes a raw word. Words below 32768 are literals, words in
    /// [32768, 32776) name registers r0..r7, anything higher is invalid.
    pub fn decode(word: u16) -> Option<Operand> {
        if word < REG_BASE {
            Some(Operand::Literal(word))
        } else if (word as usize) < REG_BASE as usize + NUM_REGS {
            Some(Operand::Register((word - REG_BASE) as usize))
        } else {
            None
        }
    }
}

impl From<Operand> for u16 {
    fn from(val: Operand) -> u16 {
        match val {
            Operand::Literal(x) => x,
            Operand::Register(r) => r as u16 + REG_BASE,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Literal(val) => write!(f, "{}", val),
            Operand::Register(r) => write!(f, "r{}", r),
        }
    }
}

impl fmt::LowerHex for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Literal(val) => write!(f, "0x{:0>4x}", val),
            Operand::Register(r) => write!(f, "r{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Operand;

    #[test]
    fn literals_decode_to_themselves() {
        assert_eq!(Operand::decode(0), Some(Operand::Literal(0)));
        assert_eq!(Operand::decode(1234), Some(Operand::Literal(1234)));
        assert_eq!(Operand::decode(32767), Some(Operand::Literal(32767)));
    }

    #[test]
    fn register_references_decode_by_offset() {
        assert_eq!(Operand::decode(32768), Some(Operand::Register(0)));
        assert_eq!(Operand::decode(32775), Some(Operand::Register(7)));
    }

    #[test]
    fn words_past_the_register_file_are_invalid() {
        assert_eq!(Operand::decode(32776), None);
        assert_eq!(Operand::decode(65535), None);
    }

    #[test]
    fn encoding_round_trips() {
        for word in &[0u16, 99, 32767, 32768, 32775] {
            let op = Operand::decode(*word).unwrap();
            assert_eq!(u16::from(op), *word);
        }
    }

    #[test]
    fn display_forms() {
        assert_eq!(format!("{}", Operand::Literal(42)), "42");
        assert_eq!(format!("{}", Operand::Register(3)), "r3");
        assert_eq!(format!("{:x}", Operand::Literal(42)), "0x002a");
        assert_eq!(format!("{:x}", Operand::Register(3)), "r3");
    }
}
