//! # SynVm
//!
//! A virtual machine for the Synacor 16-bit architecture: a binary image
//! loader, a fetch/decode/execute engine with 15-bit modular arithmetic,
//! an interactive debugger that can interpose on the guest's input
//! instruction, and a JSON snapshot format for suspending and resuming
//! a session.
#![warn(missing_docs)]

#[macro_use] extern crate serde_derive;
extern crate serde_json;

extern crate byteorder;

pub mod operand;
pub mod instruction;
pub mod image;
pub mod coins;
pub mod terminal;
pub mod vm;
pub mod debugger;

pub use operand::Operand;
pub use instruction::Instruction;
pub use terminal::Terminal;
pub use vm::{Data, Fault, Snapshot, SynVm};
