//! Terminal seam
//!
//! The VM sees the outside world as a byte sink and a line source. The
//! driver wires these to the process's stdin and stdout; tests substitute
//! scripted buffers.

use std::io;
use std::io::{BufRead, BufReader, Write};

/// A byte sink and line source shared by the VM and the debugger.
pub struct Terminal {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Terminal {
    /// Wraps the given line source and byte sink.
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Terminal {
        Terminal {
            input: input,
            output: output,
        }
    }

    /// A terminal over the process's stdin and stdout.
    pub fn stdio() -> Terminal {
        Terminal::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Emits a single byte to the sink.
    pub fn put_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])?;
        if byte == b'\n' {
            self.output.flush()?;
        }
        Ok(())
    }

    /// Writes a string to the sink and flushes it.
    pub fn put_str(&mut self, s: &str) -> io::Result<()> {
        self.output.write_all(s.as_bytes())?;
        self.output.flush()
    }

    /// Reads one line from the source, stripping the trailing newline.
    /// Returns `None` at end of file. Pending output is flushed first so
    /// a prompt written without a newline is visible before blocking.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Flushes the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
