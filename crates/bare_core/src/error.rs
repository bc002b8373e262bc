//! Error implementations

use std::fmt::{self, Display};
use std::io;

use serde::{de, ser};

use crate::schema::SchemaError;

/// Result type of the serde and record paths.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of every failure the codec can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input ended in the middle of a field.
    TruncatedInput,

    /// A varint does not fit into 64 bits.
    VarintOverflow,

    /// A varint was encoded with redundant continuation bytes.
    NonCanonicalVarint,

    /// A `bool` byte was neither 0 nor 1.
    InvalidBoolean,

    /// An `optional<T>` presence byte was neither 0 nor 1.
    InvalidOptionalTag,

    /// An enum tag is not a member of the declared value set.
    UnknownEnumTag,

    /// A union tag does not name a declared alternative.
    UnknownUnionTag,

    /// A declared length or count cannot be represented or exceeds the configured limit.
    LengthOverflow,

    /// A string payload is not well-formed UTF-8.
    InvalidText,

    /// A map contains the same key twice.
    DuplicateMapKey,

    /// Bytes remain after the root value.
    TrailingBytes,

    /// The value handed to the encoder does not have the shape of its schema.
    SchemaMismatch,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::TruncatedInput => "input ended before the field was complete",
            ErrorKind::VarintOverflow => "variable-length integer overflows 64 bits",
            ErrorKind::NonCanonicalVarint => "variable-length integer is not minimally encoded",
            ErrorKind::InvalidBoolean => "invalid boolean byte",
            ErrorKind::InvalidOptionalTag => "invalid optional presence byte",
            ErrorKind::UnknownEnumTag => "unknown enum tag",
            ErrorKind::UnknownUnionTag => "unknown union tag",
            ErrorKind::LengthOverflow => "declared length exceeds the representable limit",
            ErrorKind::InvalidText => "invalid utf-8 in string",
            ErrorKind::DuplicateMapKey => "duplicate map key",
            ErrorKind::TrailingBytes => "trailing bytes after value",
            ErrorKind::SchemaMismatch => "value does not match schema",
        };
        f.write_str(msg)
    }
}

/// A decode failure and the byte offset at which it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl DecodeError {
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for DecodeError {}

/// The caller-supplied value disagrees with the schema it is encoded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub expected: String,
    pub found: String,
}

impl SchemaMismatch {
    pub fn new(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for SchemaMismatch {}

/// Encoding errors. These only come from caller misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    SchemaMismatch(SchemaMismatch),

    /// The enum value is not declared by the schema.
    UnknownEnumTag(u64),

    /// The union tag is not declared by the schema.
    UnknownUnionTag(u64),
}

impl EncodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            EncodeError::UnknownEnumTag(_) => ErrorKind::UnknownEnumTag,
            EncodeError::UnknownUnionTag(_) => ErrorKind::UnknownUnionTag,
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        EncodeError::SchemaMismatch(SchemaMismatch::new(expected, found))
    }
}

impl From<SchemaMismatch> for EncodeError {
    fn from(value: SchemaMismatch) -> Self {
        EncodeError::SchemaMismatch(value)
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::SchemaMismatch(m) => write!(f, "{}: {}", self.kind(), m),
            EncodeError::UnknownEnumTag(tag) | EncodeError::UnknownUnionTag(tag) => {
                write!(f, "{} {}", self.kind(), tag)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Error object of the serde and record paths
#[derive(Debug)]
pub enum Error {
    Message(String),
    Io(io::Error),

    Encode(EncodeError),
    Decode(DecodeError),
    Mismatch(SchemaMismatch),
    Schema(SchemaError),

    AnyUnsupported,
    IdentifierUnsupported,

    SequenceLengthRequired,
    MapLengthRequired,

    /// Nesting went deeper than [crate::Config::max_depth].
    RecursionLimitExceeded { offset: usize },
}

impl Error {
    /// The wire error kind, if this error came from the codec itself.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Encode(e) => Some(e.kind()),
            Error::Decode(e) => Some(e.kind),
            Error::Mismatch(_) => Some(ErrorKind::SchemaMismatch),
            _ => None,
        }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message(msg) => f.write_str(msg),
            Error::Io(e) => Display::fmt(e, f),
            Error::Encode(e) => Display::fmt(e, f),
            Error::Decode(e) => Display::fmt(e, f),
            Error::Mismatch(e) => Display::fmt(e, f),
            Error::Schema(e) => Display::fmt(e, f),
            Error::AnyUnsupported => f.write_str("BARE does not support any"),
            Error::IdentifierUnsupported => f.write_str("BARE does not encode identifiers"),
            Error::SequenceLengthRequired => f.write_str("sequence length required"),
            Error::MapLengthRequired => f.write_str("map length required"),
            Error::RecursionLimitExceeded { offset } => {
                write!(f, "recursion limit exceeded at byte offset {}", offset)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Encode(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::Mismatch(e) => Some(e),
            Error::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Error::Decode(value)
    }
}

impl From<EncodeError> for Error {
    fn from(value: EncodeError) -> Self {
        Error::Encode(value)
    }
}

impl From<SchemaMismatch> for Error {
    fn from(value: SchemaMismatch) -> Self {
        Error::Mismatch(value)
    }
}

impl From<SchemaError> for Error {
    fn from(value: SchemaError) -> Self {
        Error::Schema(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}
