//! Custom `Read` trait
//!
//! Grounded in the teacher's `read` module shape (peek/next/read_exact
//! with a sealed trait over `SliceReader`/`IoReader`), extended with a
//! one-UTF8-codepoint read for chunked string decoding (spec §4.1,
//! §4.5, §6: "one UTF-8 code-point read").

use crate::error::Error;

mod ioread;
pub use ioread::IoReader;

mod sliceread;
pub use sliceread::SliceReader;

mod private {
    pub trait Sealed {}
}

/// A byte source supporting one-byte lookahead and one-codepoint reads.
///
/// `None` from [`Read::peek`]/[`Read::next`] means end-of-stream at a
/// value boundary (spec §5, §6) — a normal termination, not an error.
/// Any short read in the middle of a value (`read_exact`,
/// `read_char`) is an [`Error`] (underflow).
pub trait Read: private::Sealed {
    /// Peek the next byte without consuming it.
    fn peek(&mut self) -> Result<Option<u8>, Error>;

    /// Read and consume the next byte. `None` at a value boundary.
    fn next(&mut self) -> Result<Option<u8>, Error>;

    /// Read exactly `N` bytes into a stack-allocated array.
    fn read_const_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `n` bytes into a freshly allocated buffer.
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` completely or return an underflow error.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;

    /// Read exactly one UTF-8 code point (spec §4.5: string length is
    /// measured in code points, not bytes; chunk boundaries must not
    /// split a surrogate pair, but Hessian strings are UTF-8 proper so
    /// no codepoint straddles more than 4 bytes).
    fn read_char(&mut self) -> Result<char, Error> {
        let first = self
            .next()?
            .ok_or_else(|| Error::unexpected_eof("utf-8 code point"))?;
        let extra = utf8_extra_bytes(first)?;
        let mut buf = [0u8; 4];
        buf[0] = first;
        for slot in buf.iter_mut().skip(1).take(extra) {
            *slot = self
                .next()?
                .ok_or_else(|| Error::unexpected_eof("utf-8 continuation byte"))?;
        }
        std::str::from_utf8(&buf[..=extra])?
            .chars()
            .next()
            .ok_or_else(|| Error::new(crate::error::ErrorKind::InvalidUtf8))
    }
}

fn utf8_extra_bytes(first: u8) -> Result<usize, Error> {
    match first {
        0x00..=0x7f => Ok(0),
        0xc0..=0xdf => Ok(1),
        0xe0..=0xef => Ok(2),
        0xf0..=0xf7 => Ok(3),
        _ => Err(Error::new(crate::error::ErrorKind::InvalidUtf8)),
    }
}
