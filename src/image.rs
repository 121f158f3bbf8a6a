//! Binary image loading and the textual image form.
//!
//! Images on disk are sequences of little-endian 16-bit words, loaded into
//! memory starting at address 0. The textual form is a comma-separated
//! list of decimal words, handy for writing small programs by hand.

use vm::data::RAM_SIZE;

use byteorder::{LittleEndian, ReadBytesExt};

use std::error;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::{Cursor, Read};

/// Errors raised while loading a program image.
#[derive(Debug)]
pub enum ImageError {
    /// The image's byte length is not a multiple of two.
    OddLength(usize),
    /// The image holds more words than RAM.
    TooLarge(usize),
    /// The underlying read failed.
    Io(io::Error),
    /// The textual form contains a word that does not parse.
    BadWord(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ImageError::*;
        match *self {
            OddLength(len) => write!(f, "image is {} bytes, expected an even length", len),
            TooLarge(words) => write!(f, "image holds {} words, ram holds {}", words, RAM_SIZE),
            Io(ref err) => write!(f, "image read error: {}", err),
            BadWord(ref word) => write!(f, "bad image word {:?}", word),
        }
    }
}

impl error::Error for ImageError {}

impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> ImageError {
        ImageError::Io(err)
    }
}

/// Decodes little-endian words from raw image bytes.
pub fn decode(bytes: &[u8]) -> Result<Vec<u16>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength(bytes.len()));
    }
    if bytes.len() / 2 > RAM_SIZE {
        return Err(ImageError::TooLarge(bytes.len() / 2));
    }

    let mut words = Vec::with_capacity(bytes.len() / 2);
    let mut rdr = Cursor::new(bytes);
    while (rdr.position() as usize) < bytes.len() {
        words.push(rdr.read_u16::<LittleEndian>()?);
    }
    Ok(words)
}

/// Reads and decodes an image file.
pub fn load_file(path: &str) -> Result<Vec<u16>, ImageError> {
    let mut buffer = Vec::new();
    File::open(path)?.read_to_end(&mut buffer)?;
    decode(&buffer)
}

/// Parses the textual image form, a comma-separated list of decimal words.
pub fn assemble(text: &str) -> Result<Vec<u16>, ImageError> {
    text.split(',')
        .map(|word| {
            let word = word.trim();
            word.parse::<u16>()
                .map_err(|_| ImageError::BadWord(word.to_string()))
        })
        .collect()
}

/// Renders words back into the textual image form.
pub fn disassemble(words: &[u16]) -> String {
    let decimals: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    decimals.join(",")
}
