//! End-to-end scenarios driven through scripted terminals.

extern crate synvm;

use std::cell::RefCell;
use std::env;
use std::fs;
use std::io;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::rc::Rc;

use synvm::{debugger, image, Fault, Snapshot, SynVm, Terminal};

/// A byte sink the test keeps a handle on after the VM takes ownership.
#[derive(Clone)]
struct Sink(Rc<RefCell<Vec<u8>>>);

impl Sink {
    fn new() -> Sink {
        Sink(Rc::new(RefCell::new(Vec::new())))
    }

    fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn scripted_vm(words: &[u16], input: &str) -> (SynVm, Sink) {
    let sink = Sink::new();
    let term = Terminal::new(
        Box::new(Cursor::new(input.as_bytes().to_vec())),
        Box::new(sink.clone()),
    );
    (SynVm::new(words, term), sink)
}

fn scratch_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("synvm-test-{}", name))
}

#[test]
fn noops_then_halt() {
    let words = image::assemble("21,21,21,0").unwrap();
    let (mut vm, _sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert!(vm.halted);
    assert_eq!(vm.pc, 4);
    assert_eq!(vm.stats[21], 3);
    assert_eq!(vm.stats[0], 1);
}

#[test]
fn register_echo() {
    // set r0 <- 'A', out r0, halt
    let (mut vm, sink) = scripted_vm(&[1, 32768, 65, 19, 32768, 0], "");
    vm.run().unwrap();
    assert_eq!(sink.text(), "A");
}

#[test]
fn arithmetic_wraps_through_out() {
    // r0 <- 32767; r0 <- (r0 + 1) mod 32768; out r0 emits byte 0
    let words = [1, 32768, 32767, 9, 32768, 32768, 1, 19, 32768, 0];
    let (mut vm, sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert_eq!(sink.bytes(), vec![0]);
    assert_eq!(vm.data.registers[0], 0);
}

// Two noops, then a call to the routine at address 6 which sets r0 = 'X',
// emits it and returns to the halt at address 4.
const CALL_RET: [u16; 12] = [21, 21, 17, 6, 0, 0, 1, 32768, 88, 19, 32768, 18];

#[test]
fn call_and_ret() {
    let (mut vm, sink) = scripted_vm(&CALL_RET, "");
    vm.run().unwrap();
    assert!(vm.halted);
    assert_eq!(sink.text(), "X");
}

#[test]
fn breakpoint_pauses_and_continue_resumes() {
    let (mut vm, sink) = scripted_vm(&CALL_RET, "continue\n");
    vm.breakpoints.insert(6);
    vm.run().unwrap();
    let out = sink.text();
    assert!(out.contains("(dbg 0x0006) > "), "missing prompt: {:?}", out);
    assert!(out.ends_with("X"), "missing guest output: {:?}", out);
}

#[test]
fn snapshot_taken_at_a_breakpoint_resumes_there() {
    let path = scratch_path("breakpoint-save.json");
    let script = format!("save {}\ncontinue\n", path.display());

    let (mut vm, sink) = scripted_vm(&CALL_RET, &script);
    vm.breakpoints.insert(6);
    vm.run().unwrap();
    assert!(sink.text().ends_with("X"));

    let (mut fresh, fresh_sink) = scripted_vm(&CALL_RET, "");
    Snapshot::read_file(path.to_str().unwrap())
        .unwrap()
        .apply(&mut fresh)
        .unwrap();
    assert_eq!(fresh.pc, 6);
    fresh.run().unwrap();
    assert_eq!(fresh_sink.text(), "X");

    fs::remove_file(&path).unwrap();
}

#[test]
fn step_countdown_pauses_after_the_requested_count() {
    let (mut vm, sink) = scripted_vm(&[21, 21, 21, 0], "run 2\ncontinue\n");
    vm.breakpoints.insert(0);
    vm.run().unwrap();
    let out = sink.text();
    assert!(out.contains("(dbg 0x0000) > "));
    assert!(out.contains("(dbg 0x0002) > "), "countdown prompt missing: {:?}", out);
    assert!(vm.halted);
}

#[test]
fn input_is_consumed_one_byte_per_in() {
    // in r0, out r0, halt
    let (mut vm, sink) = scripted_vm(&[20, 32768, 19, 32768, 0], "A\n");
    vm.run().unwrap();
    assert!(sink.text().ends_with("A"));
    assert_eq!(vm.data.registers[0], 'A' as u16);
}

#[test]
fn canned_lines_are_echoed_and_consumed_first() {
    // Three in instructions drain "hi" plus the synthesized newline.
    let words = [20, 32768, 20, 32768, 20, 32768, 0];
    let (mut vm, sink) = scripted_vm(&words, "");
    vm.set_canned(vec!["hi".to_string()]);
    vm.run().unwrap();
    assert!(sink.text().contains("Canned command: hi"));
    assert_eq!(vm.data.registers[0], '\n' as u16);
    assert_eq!(vm.history, vec!["hi".to_string()]);
}

#[test]
fn escape_lines_reach_the_debugger_not_the_guest() {
    let (mut vm, sink) = scripted_vm(&[20, 32768, 19, 32768, 0], ".regs\nZ\n");
    vm.run().unwrap();
    let out = sink.text();
    assert!(out.contains("r0 = 0x0000"), "regs not printed: {:?}", out);
    assert!(out.ends_with("Z"));
    assert_eq!(vm.history[0], ".regs");
}

#[test]
fn escape_save_records_the_in_instruction_address() {
    let path = scratch_path("escape-save.json");
    let script = format!(".save {}\nx\n", path.display());

    let (mut vm, _sink) = scripted_vm(&[20, 32768, 0], &script);
    vm.run().unwrap();

    let snap = Snapshot::read_file(path.to_str().unwrap()).unwrap();
    assert_eq!(snap.pc, 0, "snapshot must re-invoke the in instruction");
    fs::remove_file(&path).unwrap();
}

#[test]
fn loadcmd_feeds_the_canned_queue() {
    let path = scratch_path("canned.txt");
    fs::File::create(&path)
        .and_then(|mut f| f.write_all(b"abc\n"))
        .unwrap();
    let script = format!(".loadcmd {}\n", path.display());

    let (mut vm, sink) = scripted_vm(&[20, 32768, 0], &script);
    vm.run().unwrap();
    assert!(sink.text().contains("Canned command: abc"));
    assert_eq!(vm.data.registers[0], 'a' as u16);

    fs::remove_file(&path).unwrap();
}

#[test]
fn jump_then_save_resumes_at_the_new_pc() {
    let path = scratch_path("jump-save.json");
    let script = format!("jump 0x2\nsave {}\ncontinue\n", path.display());

    let (mut vm, _sink) = scripted_vm(&[21, 21, 21, 0], &script);
    vm.breakpoints.insert(0);
    vm.run().unwrap();
    assert!(vm.halted);

    let snap = Snapshot::read_file(path.to_str().unwrap()).unwrap();
    assert_eq!(snap.pc, 2, "snapshot must record the jumped-to address");
    fs::remove_file(&path).unwrap();
}

#[test]
fn setreg_accepts_hex_like_other_numeric_arguments() {
    let (mut vm, _sink) = scripted_vm(&[0], "");
    debugger::dispatch(&mut vm, "setreg 0x3 0x10").unwrap();
    assert_eq!(vm.data.registers[3], 16);
    debugger::dispatch(&mut vm, "setreg 7 399").unwrap();
    assert_eq!(vm.data.registers[7], 399);
}

#[test]
fn debugmode_traces_instructions() {
    let (mut vm, sink) = scripted_vm(&[20, 32768, 19, 32768, 0], ".debugmode on\nQ\n");
    vm.run().unwrap();
    let out = sink.text();
    assert!(out.contains("out  r0"), "trace missing: {:?}", out);
    assert!(out.contains("halt"), "trace missing: {:?}", out);
}

#[test]
fn strings_scans_for_literal_out_text() {
    let (mut vm, sink) = scripted_vm(&[19, 72, 19, 73, 0], "");
    debugger::dispatch(&mut vm, "strings").unwrap();
    assert!(sink.text().contains("HI"));
}

#[test]
fn printcommands_replays_the_history() {
    let words = [20, 32768, 20, 32768, 20, 32768, 0];
    let (mut vm, sink) = scripted_vm(&words, "ab\n");
    vm.run().unwrap();
    debugger::dispatch(&mut vm, "printcommands").unwrap();
    assert!(sink.text().contains("\tab\n"));
}

#[test]
fn jumps_branch_on_their_condition() {
    // jt 1 4 skips over the halt into set r0 <- 'B', out, halt
    let (mut vm, sink) = scripted_vm(&[7, 1, 4, 0, 1, 32768, 66, 19, 32768, 0], "");
    vm.run().unwrap();
    assert_eq!(sink.text(), "B");

    // jf 0 4 likewise
    let (mut vm, sink) = scripted_vm(&[8, 0, 4, 0, 1, 32768, 67, 19, 32768, 0], "");
    vm.run().unwrap();
    assert_eq!(sink.text(), "C");
}

#[test]
fn comparisons_write_one_or_zero() {
    // eq r0 <- (3 == 3); gt r1 <- (5 > 3); gt r2 <- (2 > 3)
    let words = [4, 32768, 3, 3, 5, 32769, 5, 3, 5, 32770, 2, 3, 0];
    let (mut vm, _sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert_eq!(vm.data.registers[0], 1);
    assert_eq!(vm.data.registers[1], 1);
    assert_eq!(vm.data.registers[2], 0);
}

#[test]
fn memory_reads_and_writes_round_trip() {
    // wmem 100 <- 42, rmem r0 <- mem[100], halt
    let (mut vm, _sink) = scripted_vm(&[16, 100, 42, 15, 32768, 100, 0], "");
    vm.run().unwrap();
    assert_eq!(vm.data.ram[100], 42);
    assert_eq!(vm.data.registers[0], 42);
}

#[test]
fn not_is_a_15_bit_involution() {
    // r0 <- 12345; r1 <- not r0; r2 <- not r1
    let words = [1, 32768, 12345, 14, 32769, 32768, 14, 32770, 32769, 0];
    let (mut vm, _sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert_eq!(vm.data.registers[1], !12345u16 & 0x7fff);
    assert_eq!(vm.data.registers[2], 12345);

    // not 0 == 32767 and not 32767 == 0
    let words = [14, 32768, 0, 14, 32769, 32767, 0];
    let (mut vm, _sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert_eq!(vm.data.registers[0], 32767);
    assert_eq!(vm.data.registers[1], 0);
}

#[test]
fn multiplication_reduces_mod_32768() {
    // r0 <- 32767; r1 <- r0 * 2
    let words = [1, 32768, 32767, 10, 32769, 32768, 2, 0];
    let (mut vm, _sink) = scripted_vm(&words, "");
    vm.run().unwrap();
    assert_eq!(vm.data.registers[1], 32766);
}

#[test]
fn the_top_register_reference_is_accepted() {
    let (mut vm, _sink) = scripted_vm(&[1, 32775, 7, 0], "");
    vm.run().unwrap();
    assert_eq!(vm.data.registers[7], 7);
}

#[test]
fn modulo_by_zero_faults() {
    let (mut vm, _sink) = scripted_vm(&[11, 32768, 5, 0], "");
    match vm.run() {
        Err(Fault::DivByZero { pc }) => assert_eq!(pc, 0),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(vm.halted);
}

#[test]
fn pop_on_an_empty_stack_faults() {
    let (mut vm, _sink) = scripted_vm(&[3, 32768], "");
    match vm.run() {
        Err(Fault::StackUnderflow { pc }) => assert_eq!(pc, 0),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn ret_on_an_empty_stack_halts_cleanly() {
    let (mut vm, _sink) = scripted_vm(&[18], "");
    vm.run().unwrap();
    assert!(vm.halted);
}

#[test]
fn unknown_opcodes_fault() {
    let (mut vm, _sink) = scripted_vm(&[99], "");
    match vm.run() {
        Err(Fault::UnknownOpcode { pc, word }) => {
            assert_eq!(pc, 0);
            assert_eq!(word, 99);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn exhausted_input_faults_instead_of_spinning() {
    let (mut vm, _sink) = scripted_vm(&[20, 32768, 0], "");
    match vm.run() {
        Err(Fault::StdinClosed) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
