//! Shared constants between encoding and decoding logic.

/// Presence byte of an absent `optional<T>`.
pub const OPTION_NONE: u8 = 0;
/// Presence byte of a present `optional<T>`, followed by the value.
pub const OPTION_SOME: u8 = 1;

pub const BOOL_FALSE: u8 = 0;
pub const BOOL_TRUE: u8 = 1;

/// Set on every varint byte except the last one.
pub const VARINT_CONTINUATION: u8 = 0x80;
/// The 7 payload bits carried by each varint byte.
pub const VARINT_PAYLOAD: u8 = 0x7f;

/// A 64-bit value never needs more than 10 varint bytes.
pub const VARINT_MAX_BYTES: usize = 10;

/// The 10th varint byte may only carry the 64th bit.
pub const VARINT_LAST_BYTE_MAX: u8 = 0x01;

/// Default nesting limit for the serde deserializer.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Width in bytes of `u128`/`i128`, serialized as `data<16>`.
pub const WIDE_INT_BYTES: usize = 16;

/// Newtype struct names recognized by the serde path.
///
/// A value serialized through these names is written as a BARE varint
/// instead of the fixed-width form of the inner integer.
pub(crate) const UINT_TOKEN: &str = "$bare::Uint";
pub(crate) const INT_TOKEN: &str = "$bare::Int";
