//! Module for [ByteViewer] and the [ByteSource] trait it implements

use crate::error::{DecodeError, ErrorKind};

/// A read-only view into an existing slice of bytes.
///
/// The view only ever moves forward. Every read is bounds checked; a read
/// past the end fails with [ErrorKind::TruncatedInput] at the offset the
/// read started from and leaves the view where it was.
#[derive(Debug, Clone)]
pub struct ByteViewer<'arr> {
    slice: &'arr [u8],
    offset: usize,
}

impl<'arr> ByteViewer<'arr> {
    /// Create a new viewer on a byte slice
    pub fn from_slice(s: &'arr [u8]) -> Self {
        Self { slice: s, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn distance_to_end(&self) -> usize {
        self.slice.len() - self.offset
    }

    pub fn is_end(&self) -> bool {
        self.offset == self.slice.len()
    }

    /// Peek at the next byte in the slice
    pub fn peek(&self) -> Option<u8> {
        self.slice.get(self.offset).copied()
    }

    /// Return the next byte and advance the view
    pub fn next_byte(&mut self) -> Result<u8, DecodeError> {
        match self.slice.get(self.offset) {
            Some(b) => {
                self.offset += 1;
                Ok(*b)
            }
            None => Err(self.error(ErrorKind::TruncatedInput)),
        }
    }

    /// Returns the next `size` bytes and advances the view.
    pub fn next_bytes(&mut self, size: usize) -> Result<&'arr [u8], DecodeError> {
        if size > self.distance_to_end() {
            return Err(self.error(ErrorKind::TruncatedInput));
        }

        let view = &self.slice[self.offset..self.offset + size];
        self.offset += size;

        Ok(view)
    }

    /// Returns a copy of the next slice of bytes as a fixed-size array.
    pub fn next_bytes_fixed<const ARR_SIZE: usize>(&mut self) -> Result<[u8; ARR_SIZE], DecodeError> {
        let mut arr = [0u8; ARR_SIZE];
        arr.copy_from_slice(self.next_bytes(ARR_SIZE)?);

        Ok(arr)
    }

    /// An error of `kind` located at the current offset.
    pub fn error(&self, kind: ErrorKind) -> DecodeError {
        DecodeError::new(kind, self.offset)
    }
}

/// A forward-only source of bytes.
///
/// The primitive readers pull from any source; a failed read reports
/// [ErrorKind::TruncatedInput] at the offset it started from.
pub trait ByteSource {
    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Return the next byte and advance
    fn next_byte(&mut self) -> Result<u8, DecodeError>;

    /// Returns the next `N` bytes as a fixed-size array.
    fn next_bytes_fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError>;
}

impl<'arr> ByteSource for ByteViewer<'arr> {
    fn offset(&self) -> usize {
        ByteViewer::offset(self)
    }

    fn next_byte(&mut self) -> Result<u8, DecodeError> {
        ByteViewer::next_byte(self)
    }

    fn next_bytes_fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        ByteViewer::next_bytes_fixed::<N>(self)
    }
}
