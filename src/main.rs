//! # SynVm
//!
//! Command line driver: loads a binary image, optionally restores a
//! snapshot and installs initial breakpoints, then runs the machine with
//! the interactive debugger attached to stdin and stdout.

extern crate libc;
extern crate termion;

extern crate synvm;

use std::env::args;
use std::process;

use termion::style;

use synvm::debugger::command::parse_num;
use synvm::{image, Snapshot, SynVm, Terminal};

/// An interactive interrupt is a quit; only async-signal-safe calls here.
extern "C" fn quit_on_interrupt(_: libc::c_int) {
    unsafe {
        libc::_exit(0);
    }
}

fn main() {
    let image_path = if let Some(path) = args().nth(1) {
        path
    } else {
        println!("Usage: synvm <image> [snapshot] [breakpoints]");
        return;
    };

    let words = match image::load_file(&image_path) {
        Ok(words) => words,
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image_path, err);
            process::exit(1);
        }
    };

    let mut vm = SynVm::new(&words, Terminal::stdio());

    if let Some(path) = args().nth(2) {
        let snap = match Snapshot::read_file(&path) {
            Ok(snap) => snap,
            Err(err) => {
                eprintln!("Failed to load snapshot {}: {}", path, err);
                process::exit(1);
            }
        };
        if let Err(err) = snap.apply(&mut vm) {
            eprintln!("Failed to restore snapshot {}: {}", path, err);
            process::exit(1);
        }
        println!("State restored from {} (pc = 0x{:0>4x})", path, vm.pc);
    }

    if let Some(list) = args().nth(3) {
        for word in list.split(',') {
            match parse_num(word) {
                Some(addr) => {
                    vm.breakpoints.insert(addr);
                }
                None => {
                    eprintln!("Bad breakpoint address: {}", word);
                    process::exit(1);
                }
            }
        }
    }

    unsafe {
        libc::signal(
            libc::SIGINT,
            quit_on_interrupt as extern "C" fn(libc::c_int) as *mut libc::c_void
                as libc::sighandler_t,
        );
    }

    println!(
        "{bold}SynVm virtual machine 0.1.0{reset}",
        bold = style::Bold,
        reset = style::Reset
    );

    if let Err(fault) = vm.run() {
        eprintln!("VM fault: {}", fault);
        process::exit(1);
    }
}
