//! Debugger commands

use coins;
use instruction::OPCODE_NAMES;
use operand::NUM_REGS;
use vm::data::RAM_SIZE;
use vm::{Fault, Snapshot, SynVm};

use std::char;
use std::fs::File;
use std::io::Read;
use std::process;

/// The commands runnable at the debugger prompt or via escape lines.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    /// Print the register file
    Registers,
    /// Set a register to a value
    SetRegister,
    /// Toggle pause-before-every-instruction
    Step,
    /// Execute a bounded number of instructions, then pause
    Run,
    /// Resume until the next breakpoint or input
    Continue,
    /// Write a snapshot of the machine to a file
    Save,
    /// Queue canned input lines from a file
    LoadCmd,
    /// Print the characters emitted by literal `out` instructions
    Strings,
    /// Order five coin values to satisfy the monument equation
    SolveCoins,
    /// Print the input history
    PrintCommands,
    /// Toggle per-instruction tracing
    DebugMode,
    /// Set, clear or list breakpoints
    Breakpoint,
    /// Print the stack
    Stack,
    /// Hex dump of memory
    Memory,
    /// Set the program counter
    Jump,
    /// Print per-opcode execution counts
    Stats,
    /// Print the command listing
    Help,
    /// Terminate the process
    Quit,
    /// Anything unrecognised; prints the command listing
    Unknown,
}

impl<'a> From<&'a str> for Command {
    fn from(s: &'a str) -> Command {
        match s {
            "regs" | "r" => Command::Registers,
            "setreg" => Command::SetRegister,
            "step" => Command::Step,
            "run" => Command::Run,
            "continue" | "c" => Command::Continue,
            "save" => Command::Save,
            "loadcmd" => Command::LoadCmd,
            "strings" => Command::Strings,
            "solve_coins" => Command::SolveCoins,
            "printcommands" => Command::PrintCommands,
            "debugmode" => Command::DebugMode,
            "break" | "bp" => Command::Breakpoint,
            "stack" | "ps" => Command::Stack,
            "mem" | "m" => Command::Memory,
            "jump" => Command::Jump,
            "stats" => Command::Stats,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => Command::Unknown,
        }
    }
}

/// Parses a numeric argument, decimal or `0x`-prefixed hexadecimal.
pub fn parse_num(word: &str) -> Option<u16> {
    if word.starts_with("0x") {
        u16::from_str_radix(&word[2..], 16).ok()
    } else {
        word.parse::<u16>().ok()
    }
}

fn print_regs(vm: &mut SynVm) -> Result<(), Fault> {
    let text = format!(
        "r0 = 0x{:0>4x}, r1 = 0x{:0>4x}, r2 = 0x{:0>4x}, r3 = 0x{:0>4x}\n\
         r4 = 0x{:0>4x}, r5 = 0x{:0>4x}, r6 = 0x{:0>4x}, r7 = 0x{:0>4x}\n",
        vm.data.registers[0],
        vm.data.registers[1],
        vm.data.registers[2],
        vm.data.registers[3],
        vm.data.registers[4],
        vm.data.registers[5],
        vm.data.registers[6],
        vm.data.registers[7],
    );
    vm.term.put_str(&text)?;
    Ok(())
}

fn print_help(vm: &mut SynVm) -> Result<(), Fault> {
    let text = "The following commands are available. Short forms are \
                listed in brackets after the long form.\n\
                \tregs (r)                 - Print the register file\n\
                \tsetreg [n] [v]           - Set register n to v\n\
                \tstep [on|off]            - Pause before every instruction (default on)\n\
                \trun [n]                  - Execute n instructions, then pause (default 1)\n\
                \tcontinue (c)             - Resume until the next breakpoint or input\n\
                \tsave [path]              - Write a snapshot of the machine to path\n\
                \tloadcmd [path]           - Queue canned input lines from path\n\
                \tstrings                  - Print the characters emitted by literal out instructions\n\
                \tsolve_coins [v1..v5]     - Order five coin values to satisfy the monument equation\n\
                \tprintcommands            - Print the input history\n\
                \tdebugmode [on|off]       - Trace each executed instruction\n\
                \tbreak (bp) set|unset|list [addr..] - Manage breakpoints\n\
                \tstack (ps)               - Print the stack\n\
                \tmem (m) [addr] [lines]   - Hex dump of memory, starting at addr (default pc)\n\
                \tjump [addr]              - Set the program counter to addr\n\
                \tstats                    - Print per-opcode execution counts\n\
                \tquit (q)                 - Terminate the process\n";
    vm.term.put_str(text)?;
    Ok(())
}

fn switch_arg(args: &[&str]) -> bool {
    match args.get(0) {
        None => true,
        Some(word) => {
            word.eq_ignore_ascii_case("on")
                || word.eq_ignore_ascii_case("true")
                || word.eq_ignore_ascii_case("yes")
        }
    }
}

impl Command {
    /// Runs the command against the VM. Argument errors print a usage
    /// line and leave the machine untouched.
    pub fn execute(&self, vm: &mut SynVm, args: &[&str]) -> Result<(), Fault> {
        use self::Command::*;
        match *self {
            Registers => {
                print_regs(vm)?;
            }
            SetRegister => {
                let reg = args.get(0).and_then(|w| parse_num(w)).map(|v| v as usize);
                let val = args.get(1).and_then(|w| parse_num(w));
                match (reg, val) {
                    (Some(r), Some(v)) if r < NUM_REGS => {
                        vm.data.registers[r] = v;
                        print_regs(vm)?;
                    }
                    _ => {
                        vm.term.put_str(
                            "Usage: setreg [n] [v] - n in 0..8, v a 16-bit value\n",
                        )?;
                    }
                }
            }
            Step => {
                let on = switch_arg(args);
                vm.paused = on;
                let msg = format!("Step mode {}\n", if on { "on" } else { "off" });
                vm.term.put_str(&msg)?;
            }
            Run => {
                let count = match args.get(0) {
                    None => 1,
                    Some(word) => match word.parse::<u64>() {
                        Ok(n) => n,
                        Err(_) => {
                            vm.term.put_str(
                                "Usage: run [n] - n is the number of instructions to execute\n",
                            )?;
                            return Ok(());
                        }
                    },
                };
                vm.steps = Some(count);
                vm.paused = false;
            }
            Continue => {
                vm.steps = None;
                vm.paused = false;
            }
            Save => {
                let path = match args.get(0) {
                    Some(path) => *path,
                    None => {
                        vm.term.put_str("Usage: save [path]\n")?;
                        return Ok(());
                    }
                };
                let snap = Snapshot::capture(vm);
                let msg = match snap.write_file(path) {
                    Ok(()) => {
                        format!("State saved to {} (pc = 0x{:0>4x})\n", path, snap.pc)
                    }
                    Err(err) => format!("Save failed: {}\n", err),
                };
                vm.term.put_str(&msg)?;
            }
            LoadCmd => {
                let path = match args.get(0) {
                    Some(path) => *path,
                    None => {
                        vm.term.put_str("Usage: loadcmd [path]\n")?;
                        return Ok(());
                    }
                };
                let mut text = String::new();
                let msg = match File::open(path).and_then(|mut f| f.read_to_string(&mut text)) {
                    Ok(_) => {
                        let lines: Vec<String> =
                            text.lines().map(|l| l.to_string()).collect();
                        let count = lines.len();
                        vm.set_canned(lines);
                        format!("Loaded {} canned lines from {}\n", count, path)
                    }
                    Err(err) => format!("Failed to read {}: {}\n", path, err),
                };
                vm.term.put_str(&msg)?;
            }
            Strings => {
                let mut text = String::new();
                for i in 0..RAM_SIZE - 1 {
                    if vm.data.ram[i] == 19 {
                        text.push((vm.data.ram[i + 1] & 0xff) as u8 as char);
                    }
                }
                text.push('\n');
                vm.term.put_str(&text)?;
            }
            SolveCoins => {
                if args.len() != 5 {
                    vm.term.put_str("You need five coins!\n")?;
                    return Ok(());
                }
                let mut coins = [0u16; 5];
                for (slot, word) in coins.iter_mut().zip(args) {
                    match parse_num(word) {
                        Some(v) => *slot = v,
                        None => {
                            let msg = format!("Bad coin value {:?}\n", word);
                            vm.term.put_str(&msg)?;
                            return Ok(());
                        }
                    }
                }
                let msg = match coins::solve(coins) {
                    Some(order) => format!(
                        "The correct order is: {} {} {} {} {}\n",
                        order[0], order[1], order[2], order[3], order[4],
                    ),
                    None => "No ordering satisfies the equation.\n".to_string(),
                };
                vm.term.put_str(&msg)?;
            }
            PrintCommands => {
                let mut text = String::from("Commands so far:\n");
                for line in &vm.history {
                    text.push_str("\t");
                    text.push_str(line);
                    text.push('\n');
                }
                vm.term.put_str(&text)?;
            }
            DebugMode => {
                let on = args
                    .get(0)
                    .map(|w| w.eq_ignore_ascii_case("on"))
                    .unwrap_or(false);
                vm.trace = on;
                let msg = format!("Debug output is now {}\n", if on { "on" } else { "off" });
                vm.term.put_str(&msg)?;
            }
            Breakpoint => {
                let usage = "break list           - List breakpoints\n\
                             break set [addr..]   - Set breakpoints\n\
                             break unset [addr..] - Clear breakpoints\n";
                match args.get(0).map(|w| *w) {
                    Some("list") => {
                        let mut addrs: Vec<u16> =
                            vm.breakpoints.iter().cloned().collect();
                        addrs.sort();
                        let mut text = String::from("Set breakpoints:\n");
                        for addr in addrs {
                            text.push_str(&format!("\t0x{:0>4x}\n", addr));
                        }
                        vm.term.put_str(&text)?;
                    }
                    Some("set") => {
                        for word in &args[1..] {
                            let msg = match parse_num(word) {
                                Some(addr) if (addr as usize) < RAM_SIZE => {
                                    vm.breakpoints.insert(addr);
                                    format!("Added breakpoint at 0x{:0>4x}\n", addr)
                                }
                                _ => format!("Bad breakpoint address {:?}\n", word),
                            };
                            vm.term.put_str(&msg)?;
                        }
                    }
                    Some("unset") => {
                        for word in &args[1..] {
                            let msg = match parse_num(word) {
                                Some(addr) if vm.breakpoints.remove(&addr) => {
                                    format!("Breakpoint 0x{:0>4x} removed\n", addr)
                                }
                                _ => format!("No breakpoint at {:?}\n", word),
                            };
                            vm.term.put_str(&msg)?;
                        }
                    }
                    _ => {
                        vm.term.put_str(usage)?;
                    }
                }
            }
            Stack => {
                let mut text = String::from("Stack contents:\n");
                for (i, val) in vm.data.stack.iter().enumerate() {
                    text.push_str(&format!("\t[{}]: 0x{:0>4x}\n", i, val));
                }
                vm.term.put_str(&text)?;
            }
            Memory => {
                let start = args
                    .get(0)
                    .and_then(|w| parse_num(w))
                    .map(|a| a as usize)
                    .unwrap_or(vm.pc as usize);
                let lines = args
                    .get(1)
                    .and_then(|w| w.parse::<usize>().ok())
                    .unwrap_or(10);

                let mut text = String::new();
                text.push_str("addr  0000 1111 2222 3333 4444 5555 6666 7777  01234567\n");
                text.push_str("-----|----|----|----|----|----|----|----|----||--------|\n");
                for j in 0..lines {
                    let base = start + 8 * j;
                    if base >= RAM_SIZE {
                        break;
                    }
                    let mut hexs = String::new();
                    let mut printable = String::new();
                    for i in 0..8 {
                        let offset = base + i;
                        if offset >= RAM_SIZE {
                            break;
                        }
                        let val = vm.data.ram[offset];
                        hexs.push_str(&format!("{:0>4x} ", val));
                        match char::from_u32(val as u32) {
                            Some(c) if c.is_alphanumeric() => printable.push(c),
                            _ => printable.push('.'),
                        }
                    }
                    text.push_str(&format!("{:0>4x}: {:40} {}\n", base, hexs, printable));
                }
                vm.term.put_str(&text)?;
            }
            Jump => {
                match args.get(0).and_then(|w| parse_num(w)) {
                    Some(addr) if (addr as usize) < RAM_SIZE => {
                        vm.pc = addr;
                        // A snapshot taken after a jump resumes at the new pc.
                        vm.resume_pc = addr;
                        let msg = format!("pc = 0x{:0>4x}\n", addr);
                        vm.term.put_str(&msg)?;
                    }
                    _ => {
                        vm.term.put_str("Usage: jump [addr] - a 15-bit address\n")?;
                    }
                }
            }
            Stats => {
                let mut text = String::from("Instruction counts:\n");
                for (i, name) in OPCODE_NAMES.iter().enumerate() {
                    if vm.stats[i] > 0 {
                        text.push_str(&format!("\t{: <5} {}\n", name, vm.stats[i]));
                    }
                }
                vm.term.put_str(&text)?;
            }
            Help | Unknown => {
                print_help(vm)?;
            }
            Quit => {
                vm.term.put_str("Quitting.\n")?;
                vm.term.flush()?;
                process::exit(0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_num, Command};

    #[test]
    fn names_and_short_forms_resolve() {
        assert_eq!(Command::from("regs"), Command::Registers);
        assert_eq!(Command::from("r"), Command::Registers);
        assert_eq!(Command::from("solve_coins"), Command::SolveCoins);
        assert_eq!(Command::from("bp"), Command::Breakpoint);
        assert_eq!(Command::from("frobnicate"), Command::Unknown);
    }

    #[test]
    fn numeric_arguments_accept_decimal_and_hex() {
        assert_eq!(parse_num("399"), Some(399));
        assert_eq!(parse_num("0x17a0"), Some(0x17a0));
        assert_eq!(parse_num("six"), None);
        assert_eq!(parse_num("99999"), None);
    }
}
