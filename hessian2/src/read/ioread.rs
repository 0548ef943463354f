use std::io::{ErrorKind as IoErrorKind, Read as StdRead};

use crate::error::Error;

use super::{private, Read};

/// A reader over an arbitrary [`std::io::Read`] stream, with one-byte
/// lookahead buffered internally.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
    peeked: Option<u8>,
}

impl<R: StdRead> IoReader<R> {
    /// Creates a new reader wrapping `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }

    fn fill_peek(&mut self) -> Result<Option<u8>, Error> {
        if self.peeked.is_none() {
            let mut buf = [0u8; 1];
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => self.peeked = Some(buf[0]),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.peeked)
    }
}

impl<R> private::Sealed for IoReader<R> {}

impl<R: StdRead> Read for IoReader<R> {
    fn peek(&mut self) -> Result<Option<u8>, Error> {
        self.fill_peek()
    }

    fn next(&mut self) -> Result<Option<u8>, Error> {
        if let Some(b) = self.peeked.take() {
            return Ok(Some(b));
        }
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(e.into()),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut offset = 0;
        if let Some(b) = self.peeked.take() {
            buf[0] = b;
            offset = 1;
        }
        if offset < buf.len() {
            self.inner.read_exact(&mut buf[offset..]).map_err(|e| {
                if e.kind() == IoErrorKind::UnexpectedEof {
                    Error::unexpected_eof("io stream")
                } else {
                    Error::from(e)
                }
            })?;
        }
        Ok(())
    }
}
