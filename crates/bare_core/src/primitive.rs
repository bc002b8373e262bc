//! Primitive codec: fixed-width integers, varints, booleans, floats and raw
//! byte runs.
//!
//! Writers append to a `Vec<u8>` and never seek backwards. Readers pull from a
//! [ByteSource] and only move it forward.
//!
//! Fixed-width integers and floats are little-endian. Varints are LEB128:
//! 7 payload bits per byte, least significant group first, continuation bit
//! set on every byte but the last.

use std::fmt::{self, Display};

use crate::config::Config;
use crate::consts;
use crate::error::{DecodeError, EncodeError, ErrorKind};
use crate::viewer::{ByteSource, ByteViewer};

/// Width of an integer type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
    /// LEB128 varint, zig-zag encoded for signed integers.
    Variable,
}

impl Width {
    /// Encoded size in bytes, `None` for [Width::Variable].
    pub fn bytes(self) -> Option<usize> {
        match self {
            Width::W8 => Some(1),
            Width::W16 => Some(2),
            Width::W32 => Some(4),
            Width::W64 => Some(8),
            Width::Variable => None,
        }
    }

    fn max_unsigned(self) -> u64 {
        match self {
            Width::W8 => u8::MAX as u64,
            Width::W16 => u16::MAX as u64,
            Width::W32 => u32::MAX as u64,
            Width::W64 | Width::Variable => u64::MAX,
        }
    }

    fn signed_range(self) -> (i64, i64) {
        match self {
            Width::W8 => (i8::MIN as i64, i8::MAX as i64),
            Width::W16 => (i16::MIN as i64, i16::MAX as i64),
            Width::W32 => (i32::MIN as i64, i32::MAX as i64),
            Width::W64 | Width::Variable => (i64::MIN, i64::MAX),
        }
    }

    /// BARE type name of the unsigned integer of this width.
    pub fn uint_name(self) -> &'static str {
        match self {
            Width::W8 => "u8",
            Width::W16 => "u16",
            Width::W32 => "u32",
            Width::W64 => "u64",
            Width::Variable => "uint",
        }
    }

    /// BARE type name of the signed integer of this width.
    pub fn int_name(self) -> &'static str {
        match self {
            Width::W8 => "i8",
            Width::W16 => "i16",
            Width::W32 => "i32",
            Width::W64 => "i64",
            Width::Variable => "int",
        }
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes() {
            Some(n) => write!(f, "{} bits", n * 8),
            None => f.write_str("variable"),
        }
    }
}

/// Maps signed integers onto unsigned ones so that small magnitudes stay small.
pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

pub fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Number of bytes the canonical varint of `v` occupies.
pub fn varint_len(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    std::cmp::max(1, (bits + 6) / 7)
}

/// Writes the canonical (minimal) varint of `v`.
pub fn write_varint(buffer: &mut Vec<u8>, mut v: u64) {
    while v >= consts::VARINT_CONTINUATION as u64 {
        buffer.push((v as u8) | consts::VARINT_CONTINUATION);
        v >>= 7;
    }
    buffer.push(v as u8);
}

/// Writes a length or element count.
pub fn write_len(buffer: &mut Vec<u8>, len: usize) {
    write_varint(buffer, len as u64);
}

/// Writes an unsigned integer.
///
/// Fails if `v` does not fit into a fixed `width`.
pub fn write_uint(buffer: &mut Vec<u8>, v: u64, width: Width) -> Result<(), EncodeError> {
    if v > width.max_unsigned() {
        return Err(EncodeError::mismatch(
            width.uint_name(),
            format!("uint {}", v),
        ));
    }

    match width {
        Width::W8 => buffer.push(v as u8),
        Width::W16 => buffer.extend((v as u16).to_le_bytes()),
        Width::W32 => buffer.extend((v as u32).to_le_bytes()),
        Width::W64 => buffer.extend(v.to_le_bytes()),
        Width::Variable => write_varint(buffer, v),
    }

    Ok(())
}

/// Writes a signed integer.
///
/// Fails if `v` does not fit into a fixed `width`.
pub fn write_int(buffer: &mut Vec<u8>, v: i64, width: Width) -> Result<(), EncodeError> {
    let (min, max) = width.signed_range();
    if v < min || v > max {
        return Err(EncodeError::mismatch(width.int_name(), format!("int {}", v)));
    }

    match width {
        Width::W8 => buffer.extend((v as i8).to_le_bytes()),
        Width::W16 => buffer.extend((v as i16).to_le_bytes()),
        Width::W32 => buffer.extend((v as i32).to_le_bytes()),
        Width::W64 => buffer.extend(v.to_le_bytes()),
        Width::Variable => write_varint(buffer, zigzag_encode(v)),
    }

    Ok(())
}

pub fn write_bool(buffer: &mut Vec<u8>, v: bool) {
    match v {
        true => buffer.push(consts::BOOL_TRUE),
        false => buffer.push(consts::BOOL_FALSE),
    }
}

pub fn write_f32(buffer: &mut Vec<u8>, v: f32) {
    buffer.extend(v.to_bits().to_le_bytes());
}

pub fn write_f64(buffer: &mut Vec<u8>, v: f64) {
    buffer.extend(v.to_bits().to_le_bytes());
}

/// Writes raw bytes, no length prefix.
pub fn write_bytes(buffer: &mut Vec<u8>, bytes: &[u8]) {
    buffer.extend_from_slice(bytes);
}

/// Reads a varint.
///
/// Errors are reported at the offset of the first varint byte.
pub fn read_varint<S: ByteSource>(viewer: &mut S, strict: bool) -> Result<u64, DecodeError> {
    let start = viewer.offset();
    let mut value = 0u64;

    for i in 0..consts::VARINT_MAX_BYTES {
        let b = viewer
            .next_byte()
            .map_err(|_| DecodeError::new(ErrorKind::TruncatedInput, start))?;

        if i == consts::VARINT_MAX_BYTES - 1 && b > consts::VARINT_LAST_BYTE_MAX {
            return Err(DecodeError::new(ErrorKind::VarintOverflow, start));
        }

        value |= ((b & consts::VARINT_PAYLOAD) as u64) << (7 * i);

        if b & consts::VARINT_CONTINUATION == 0 {
            // a zero final group means the previous byte could have ended the varint
            if strict && i > 0 && b == 0 {
                return Err(DecodeError::new(ErrorKind::NonCanonicalVarint, start));
            }
            return Ok(value);
        }
    }

    Err(DecodeError::new(ErrorKind::VarintOverflow, start))
}

/// Impl fixed-width little-endian readers
macro_rules! read_fixed {
    ($viewer: expr, $num_type: ty) => {{
        const NUM_BYTES: usize = std::mem::size_of::<$num_type>();
        <$num_type>::from_le_bytes($viewer.next_bytes_fixed::<NUM_BYTES>()?)
    }};
}

/// Reads an unsigned integer, widened to `u64`.
pub fn read_uint<S: ByteSource>(viewer: &mut S, width: Width, strict: bool) -> Result<u64, DecodeError> {
    let v = match width {
        Width::W8 => read_fixed!(viewer, u8) as u64,
        Width::W16 => read_fixed!(viewer, u16) as u64,
        Width::W32 => read_fixed!(viewer, u32) as u64,
        Width::W64 => read_fixed!(viewer, u64),
        Width::Variable => read_varint(viewer, strict)?,
    };

    Ok(v)
}

/// Reads a signed integer, widened to `i64`.
pub fn read_int<S: ByteSource>(viewer: &mut S, width: Width, strict: bool) -> Result<i64, DecodeError> {
    let v = match width {
        Width::W8 => read_fixed!(viewer, i8) as i64,
        Width::W16 => read_fixed!(viewer, i16) as i64,
        Width::W32 => read_fixed!(viewer, i32) as i64,
        Width::W64 => read_fixed!(viewer, i64),
        Width::Variable => zigzag_decode(read_varint(viewer, strict)?),
    };

    Ok(v)
}

pub fn read_bool<S: ByteSource>(viewer: &mut S) -> Result<bool, DecodeError> {
    let start = viewer.offset();

    match viewer.next_byte()? {
        consts::BOOL_FALSE => Ok(false),
        consts::BOOL_TRUE => Ok(true),
        _ => Err(DecodeError::new(ErrorKind::InvalidBoolean, start)),
    }
}

pub fn read_f32<S: ByteSource>(viewer: &mut S) -> Result<f32, DecodeError> {
    Ok(f32::from_bits(read_fixed!(viewer, u32)))
}

pub fn read_f64<S: ByteSource>(viewer: &mut S) -> Result<f64, DecodeError> {
    Ok(f64::from_bits(read_fixed!(viewer, u64)))
}

/// Reads exactly `n` raw bytes.
pub fn read_bytes<'a>(viewer: &mut ByteViewer<'a>, n: usize) -> Result<&'a [u8], DecodeError> {
    viewer.next_bytes(n)
}

/// Reads a length or element count.
///
/// The count must fit into `usize` and must not exceed [Config::max_length].
pub fn read_len<S: ByteSource>(viewer: &mut S, config: &Config) -> Result<usize, DecodeError> {
    let start = viewer.offset();
    let len = read_varint(viewer, config.strict_varints)?;

    match usize::try_from(len) {
        Ok(len) if len <= config.max_length => Ok(len),
        _ => Err(DecodeError::new(ErrorKind::LengthOverflow, start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint_bytes(v: u64) -> Vec<u8> {
        let mut buf = vec![];
        write_uint(&mut buf, v, Width::Variable).unwrap();
        buf
    }

    fn int_bytes(v: i64) -> Vec<u8> {
        let mut buf = vec![];
        write_int(&mut buf, v, Width::Variable).unwrap();
        buf
    }

    #[test]
    fn test_uint() {
        const CASES: &[(u64, &[u8])] = &[
            (0, &[0]),
            (1, &[1]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (275, &[147, 2]),
            (42424242, &[0xb2, 0xaf, 0x9d, 0x14]),
            (u64::MAX, &[255, 255, 255, 255, 255, 255, 255, 255, 255, 1]),
        ];
        for &(n, bytes) in CASES {
            let got = uint_bytes(n);
            assert_eq!(got, bytes, "encoding {}", n);
            assert_eq!(got.len(), varint_len(n));

            let mut view = ByteViewer::from_slice(&got);
            assert_eq!(read_uint(&mut view, Width::Variable, true).unwrap(), n);
            assert!(view.is_end());
        }
    }

    #[test]
    fn test_int() {
        const CASES: &[(i64, &[u8])] = &[
            (0, &[0]),
            (1, &[2]),
            (-1, &[1]),
            (-64, &[0x7f]),
            (64, &[0x80, 0x01]),
            (i64::MIN, &[255, 255, 255, 255, 255, 255, 255, 255, 255, 1]),
            (i64::MAX, &[254, 255, 255, 255, 255, 255, 255, 255, 255, 1]),
        ];
        for &(n, bytes) in CASES {
            let got = int_bytes(n);
            assert_eq!(got, bytes, "encoding {}", n);

            let mut view = ByteViewer::from_slice(&got);
            assert_eq!(read_int(&mut view, Width::Variable, true).unwrap(), n);
        }
    }

    #[test]
    fn test_varint_minimal_for_every_bit_length() {
        for shift in 0..64 {
            let n = 1u64 << shift;
            let expected = shift / 7 + 1;
            assert_eq!(uint_bytes(n).len(), expected, "1 << {}", shift);
            assert_eq!(uint_bytes(n - 1).len(), varint_len(n - 1));
        }
    }

    #[test]
    fn test_uint_too_long() {
        // too many bytes
        let bytes: &[u8] = &[255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 1];
        let err = read_varint(&mut ByteViewer::from_slice(bytes), true).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::VarintOverflow, 0));

        // too many bits of precision (u64::MAX + 1)
        let bytes: &[u8] = &[255, 255, 255, 255, 255, 255, 255, 255, 255, 2];
        let err = read_varint(&mut ByteViewer::from_slice(bytes), true).unwrap_err();
        assert_eq!(err.kind, ErrorKind::VarintOverflow);
    }

    #[test]
    fn test_uint_too_short() {
        let bytes: &[u8] = &[7, 255, 255, 255];
        let mut view = ByteViewer::from_slice(bytes);
        view.next_byte().unwrap();

        let err = read_varint(&mut view, true).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::TruncatedInput, 1));
    }

    #[test]
    fn test_non_canonical_varint() {
        // 1 encoded in two bytes
        let bytes: &[u8] = &[0x81, 0x00];

        let err = read_varint(&mut ByteViewer::from_slice(bytes), true).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::NonCanonicalVarint, 0));

        let lenient = read_varint(&mut ByteViewer::from_slice(bytes), false).unwrap();
        assert_eq!(lenient, 1);

        // zero padded to ten bytes is still within 64 bits
        let bytes: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert_eq!(read_varint(&mut ByteViewer::from_slice(bytes), false).unwrap(), 0);
        assert_eq!(
            read_varint(&mut ByteViewer::from_slice(bytes), true).unwrap_err().kind,
            ErrorKind::NonCanonicalVarint
        );
    }

    #[test]
    fn test_fixed_width_little_endian() {
        let mut buf = vec![];
        write_uint(&mut buf, 0x0102, Width::W16).unwrap();
        write_uint(&mut buf, 0x01020304, Width::W32).unwrap();
        write_int(&mut buf, -2, Width::W8).unwrap();
        write_int(&mut buf, -2, Width::W64).unwrap();
        assert_eq!(
            buf,
            [2, 1, 4, 3, 2, 1, 0xfe, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );

        let mut view = ByteViewer::from_slice(&buf);
        assert_eq!(read_uint(&mut view, Width::W16, true).unwrap(), 0x0102);
        assert_eq!(read_uint(&mut view, Width::W32, true).unwrap(), 0x01020304);
        assert_eq!(read_int(&mut view, Width::W8, true).unwrap(), -2);
        assert_eq!(read_int(&mut view, Width::W64, true).unwrap(), -2);
        assert!(view.is_end());
    }

    #[test]
    fn test_fixed_width_out_of_range() {
        let mut buf = vec![];
        let err = write_uint(&mut buf, 300, Width::W8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

        let err = write_int(&mut buf, i16::MIN as i64 - 1, Width::W16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_bool() {
        let mut buf = vec![];
        write_bool(&mut buf, true);
        write_bool(&mut buf, false);
        buf.push(2);

        let mut view = ByteViewer::from_slice(&buf);
        assert!(read_bool(&mut view).unwrap());
        assert!(!read_bool(&mut view).unwrap());
        assert_eq!(
            read_bool(&mut view).unwrap_err(),
            DecodeError::new(ErrorKind::InvalidBoolean, 2)
        );
    }

    #[test]
    fn test_floats_keep_nan_payload() {
        let nan = f32::from_bits(0x7fc0_1234);
        let mut buf = vec![];
        write_f32(&mut buf, nan);
        write_f64(&mut buf, -0.5);
        assert_eq!(&buf[..4], &0x7fc0_1234u32.to_le_bytes());

        let mut view = ByteViewer::from_slice(&buf);
        assert_eq!(read_f32(&mut view).unwrap().to_bits(), 0x7fc0_1234);
        assert_eq!(read_f64(&mut view).unwrap(), -0.5);
    }

    #[test]
    fn test_bytes_and_len() {
        let mut buf = vec![];
        write_len(&mut buf, 3);
        write_bytes(&mut buf, b"abc");

        let config = Config::default();
        let mut view = ByteViewer::from_slice(&buf);
        let len = read_len(&mut view, &config).unwrap();
        assert_eq!(read_bytes(&mut view, len).unwrap(), b"abc");

        let mut view = ByteViewer::from_slice(&buf);
        let err = read_len(&mut view, &config.with_max_length(2)).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::LengthOverflow, 0));

        let mut view = ByteViewer::from_slice(&buf[..3]);
        read_len(&mut view, &config).unwrap();
        assert_eq!(
            read_bytes(&mut view, 3).unwrap_err(),
            DecodeError::new(ErrorKind::TruncatedInput, 1)
        );
    }

    #[test]
    fn test_random_varints() {
        for _ in 0..1000 {
            // spread values over every bit length
            let n = rand::random::<u64>() >> (rand::random::<u32>() % 64);
            let bytes = uint_bytes(n);
            assert_eq!(bytes.len(), varint_len(n));
            assert_eq!(read_varint(&mut ByteViewer::from_slice(&bytes), true).unwrap(), n);

            let i = rand::random::<i64>() >> (rand::random::<u32>() % 64);
            let bytes = int_bytes(i);
            assert_eq!(read_int(&mut ByteViewer::from_slice(&bytes), Width::Variable, true).unwrap(), i);
        }
    }

    #[test]
    fn test_zigzag() {
        for v in [0i64, 1, -1, 2, -2, 1000, -1000, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
    }
}
