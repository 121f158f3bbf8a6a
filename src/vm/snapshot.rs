//! Snapshot save and restore
//!
//! The on-disk form is a JSON document with four fields: `pc`, `regs`
//! (string register index to value), `stack` (bottom of stack first) and
//! `memory` (one `[lo, hi]` byte pair per cell). The pair form matches
//! saves produced by earlier tooling, so existing save files keep working.

use operand::NUM_REGS;
use vm::SynVm;
use vm::data::RAM_SIZE;

use serde_json;

use std::collections::BTreeMap;
use std::error;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::{Read, Write};

/// Errors raised while reading or writing snapshots.
#[derive(Debug)]
pub enum SnapshotError {
    /// The underlying file operation failed.
    Io(io::Error),
    /// The document is not valid JSON of the expected shape.
    Format(serde_json::Error),
    /// A register key does not parse as an index in 0..8.
    BadRegister(String),
    /// The memory sequence holds more cells than RAM.
    MemoryTooLarge(usize),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SnapshotError::*;
        match *self {
            Io(ref err) => write!(f, "snapshot i/o error: {}", err),
            Format(ref err) => write!(f, "malformed snapshot: {}", err),
            BadRegister(ref key) => write!(f, "bad register key {:?}", key),
            MemoryTooLarge(len) => {
                write!(f, "snapshot memory holds {} cells, ram holds {}", len, RAM_SIZE)
            }
        }
    }
}

impl error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> SnapshotError {
        SnapshotError::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> SnapshotError {
        SnapshotError::Format(err)
    }
}

/// A serialized copy of the machine state sufficient to resume execution.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// The address to resume at
    pub pc: u16,
    /// Register values keyed by the string form of the register index
    pub regs: BTreeMap<String, u16>,
    /// Stack contents, bottom of stack first
    pub stack: Vec<u16>,
    /// One `[lo, hi]` byte pair per memory cell
    pub memory: Vec<(u8, u8)>,
}

impl Snapshot {
    /// Captures the resumable state of the given VM.
    pub fn capture(vm: &SynVm) -> Snapshot {
        let mut regs = BTreeMap::new();
        for (i, val) in vm.data.registers.iter().enumerate() {
            regs.insert(i.to_string(), *val);
        }
        let memory = vm.data.ram
            .iter()
            .map(|word| ((word & 0xff) as u8, (word >> 8) as u8))
            .collect();

        Snapshot {
            pc: vm.resume_pc,
            regs: regs,
            stack: vm.data.stack.clone(),
            memory: memory,
        }
    }

    /// Restores this snapshot into the given VM, replacing its pc,
    /// registers, stack and memory.
    pub fn apply(&self, vm: &mut SynVm) -> Result<(), SnapshotError> {
        if self.memory.len() > RAM_SIZE {
            return Err(SnapshotError::MemoryTooLarge(self.memory.len()));
        }

        let mut registers = [0u16; NUM_REGS];
        for (key, val) in &self.regs {
            let idx = key.parse::<usize>()
                .map_err(|_| SnapshotError::BadRegister(key.clone()))?;
            if idx >= NUM_REGS {
                return Err(SnapshotError::BadRegister(key.clone()));
            }
            registers[idx] = *val;
        }

        vm.data.registers = registers;
        vm.data.stack = self.stack.clone();
        for cell in vm.data.ram.iter_mut() {
            *cell = 0;
        }
        for (i, &(lo, hi)) in self.memory.iter().enumerate() {
            vm.data.ram[i] = lo as u16 | (hi as u16) << 8;
        }
        vm.pc = self.pc;
        vm.resume_pc = self.pc;
        Ok(())
    }

    /// Writes the snapshot as JSON to the given path.
    pub fn write_file(&self, path: &str) -> Result<(), SnapshotError> {
        let text = serde_json::to_string(self)?;
        let mut file = File::create(path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Reads a snapshot back from a JSON file.
    pub fn read_file(path: &str) -> Result<Snapshot, SnapshotError> {
        let mut text = String::new();
        File::open(path)?.read_to_string(&mut text)?;
        Ok(serde_json::from_str(&text)?)
    }
}
