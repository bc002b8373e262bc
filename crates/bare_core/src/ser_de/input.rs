//! Inputs the [Deserializer](super::Deserializer) can read from.

use std::io::{self, Read};

use crate::error::{DecodeError, ErrorKind};
use crate::viewer::{ByteSource, ByteViewer};

/// A byte string read from an [Input].
#[derive(Debug)]
pub enum Reference<'de, 's> {
    /// Borrowed from the input for its whole lifetime.
    Borrowed(&'de [u8]),
    /// Copied into a scratch buffer, valid until the next read.
    Copied(&'s [u8]),
}

/// A byte source that can also hand out runs of bytes.
pub trait Input<'de>: ByteSource {
    /// Reads exactly `len` bytes.
    fn next_slice<'s>(&'s mut self, len: usize) -> Result<Reference<'de, 's>, DecodeError>;

    /// Bytes left before the end of input, if the end is known up front.
    fn remaining(&self) -> Option<usize>;
}

impl<'de> Input<'de> for ByteViewer<'de> {
    fn next_slice<'s>(&'s mut self, len: usize) -> Result<Reference<'de, 's>, DecodeError> {
        self.next_bytes(len).map(Reference::Borrowed)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.distance_to_end())
    }
}

/// Reads from an [io::Read], never pulling more bytes than the value
/// being decoded needs.
///
/// Every primitive is a separate read, so unbuffered sources are best
/// wrapped in an [io::BufReader].
pub struct IoInput<R> {
    reader: R,
    offset: usize,
    scratch: Vec<u8>,
    io_error: Option<io::Error>,
}

impl<R: io::Read> IoInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            scratch: Vec::new(),
            io_error: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// The I/O failure behind the last truncated read, if there was one.
    ///
    /// A clean end of stream leaves nothing here.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    fn truncated(&mut self, start: usize, e: io::Error) -> DecodeError {
        if e.kind() != io::ErrorKind::UnexpectedEof {
            self.io_error = Some(e);
        }

        DecodeError::new(ErrorKind::TruncatedInput, start)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        let start = self.offset;

        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len();
                Ok(())
            }
            Err(e) => Err(self.truncated(start, e)),
        }
    }
}

impl<R: io::Read> ByteSource for IoInput<R> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn next_byte(&mut self) -> Result<u8, DecodeError> {
        let mut byte = [0u8; 1];
        self.fill(&mut byte)?;

        Ok(byte[0])
    }

    fn next_bytes_fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut arr = [0u8; N];
        self.fill(&mut arr)?;

        Ok(arr)
    }
}

impl<'de, R: io::Read> Input<'de> for IoInput<R> {
    fn next_slice<'s>(&'s mut self, len: usize) -> Result<Reference<'de, 's>, DecodeError> {
        let start = self.offset;
        self.scratch.clear();

        // grows with what actually arrives, not with the claimed length
        let res = self.reader.by_ref().take(len as u64).read_to_end(&mut self.scratch);

        match res {
            Ok(n) if n == len => {
                self.offset += len;
                Ok(Reference::Copied(&self.scratch))
            }
            Ok(_) => Err(DecodeError::new(ErrorKind::TruncatedInput, start)),
            Err(e) => Err(self.truncated(start, e)),
        }
    }

    fn remaining(&self) -> Option<usize> {
        None
    }
}
