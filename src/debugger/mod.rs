//! Debugger control plane
//!
//! The debugger owns no state of its own: it is a command dispatcher over
//! a mutable VM. It is entered two ways. The run loop calls [`prompt`]
//! when it pauses at a breakpoint, on a step countdown or in step mode,
//! and blocks there until a command resumes execution. The `in`
//! instruction calls [`dispatch`] with the body of any input line that
//! starts with the escape character, then goes back to waiting for guest
//! input.
//!
//! [`prompt`]: fn.prompt.html
//! [`dispatch`]: fn.dispatch.html

pub mod command;

pub use self::command::Command;

use vm::{Fault, SynVm};

/// Blocks at an interactive prompt until a command resumes execution.
///
/// A blank line advances one instruction and keeps the machine paused,
/// so repeated newlines single-step.
pub fn prompt(vm: &mut SynVm) -> Result<(), Fault> {
    while vm.paused {
        let banner = format!("(dbg 0x{:0>4x}) > ", vm.pc);
        vm.term.put_str(&banner)?;

        let line = match vm.term.read_line()? {
            Some(line) => line,
            None => return Err(Fault::StdinClosed),
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            break;
        }
        Command::from(words[0]).execute(vm, &words[1..])?;
    }
    Ok(())
}

/// Executes a single escape-line command arriving through the input path.
pub fn dispatch(vm: &mut SynVm, line: &str) -> Result<(), Fault> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(());
    }
    Command::from(words[0]).execute(vm, &words[1..])
}
