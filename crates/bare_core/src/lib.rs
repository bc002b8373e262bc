//! Core of the BARE (Binary Application Record Encoding) codec.
//!
//! BARE messages carry no type information. Both ends agree on a [Schema]
//! up front, and the bytes are just the values laid out in schema order:
//!
//! - `uint`/`int` are LEB128 varints (zig-zag for `int`), always in their
//!   shortest form. Other integers and floats are fixed-width little-endian.
//! - `str` and `data` are a varint length followed by the bytes.
//! - optionals are a presence byte (`0` or `1`) and then the value if present.
//! - slices and maps are a varint count followed by the elements or entries.
//! - enums and unions are a varint tag; unions follow it with the payload.
//! - structs are their fields in declaration order, with no names.
//!
//! There are three ways in:
//!
//! - the dynamic path: [encode]/[decode] a [Value] against a [Schema], or
//!   register the schema once with a [Codec].
//! - the record path: types implementing [BareRecord], usually derived.
//! - the serde path: [to_vec]/[from_slice] for any serde type, or
//!   [to_writer]/[from_reader] to stream values one after another.

mod codec;
mod composite;
mod config;
mod consts;
mod error;
mod primitive;
mod record;
mod schema;
mod ser_de;
mod types;
mod value;
mod viewer;

pub use codec::{decode, decode_with, encode, encode_into, Codec};
pub use config::Config;
pub use error::{DecodeError, EncodeError, Error, ErrorKind, Result, SchemaMismatch};
pub use primitive::Width;
pub use record::{from_bytes, mismatch, to_bytes, BareRecord};
pub use schema::{
    EnumMember, EnumSchema, Field, Schema, SchemaError, StructSchema, UnionSchema, UnionVariant,
};
pub use ser_de::{
    from_reader, from_reader_with, from_slice, from_slice_with, to_vec, to_writer, Deserializer,
    Input, IoInput, Reference, Serializer,
};
pub use types::{Data, Int, Uint};
pub use value::Value;
pub use viewer::{ByteSource, ByteViewer};

/// Low-level primitive readers and writers.
pub mod wire {
    pub use crate::primitive::{
        read_bool, read_bytes, read_f32, read_f64, read_int, read_len, read_uint, read_varint,
        varint_len, write_bool, write_bytes, write_f32, write_f64, write_int, write_len,
        write_uint, write_varint, zigzag_decode, zigzag_encode,
    };
}
