//! Serde support.
//!
//! Any type deriving [serde::Serialize]/[serde::Deserialize] can be written
//! in BARE form without a hand-built [crate::Schema]. The Rust type acts as
//! the schema: fixed-width integers keep their width, [crate::Uint] and
//! [crate::Int] select the varint forms, structs and tuples are written field
//! by field, and enum variants are tagged with their index.

use std::io;

use crate::config::Config;
use crate::error::Result;

mod de;
mod input;
mod ser;

pub use de::Deserializer;
pub use input::{Input, IoInput, Reference};
pub use ser::Serializer;

/// Serialize a data structure to a vector of bytes
pub fn to_vec<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut serializer = Serializer::new();

    if let Err(e) = value.serialize(&mut serializer) {
        log::debug!("serialization failed: {}", e);
        return Err(e);
    }

    log::trace!("serialized {} bytes", serializer.output.len());
    Ok(serializer.into_inner())
}

/// Serialize a data structure into a writer
pub fn to_writer<W: io::Write, T: serde::Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    let bytes = to_vec(value)?;
    writer.write_all(&bytes)?;

    Ok(())
}

/// Deserialize a data structure from a slice of bytes
pub fn from_slice<'a, T>(bytes: &'a [u8]) -> Result<T>
where
    T: serde::Deserialize<'a>,
{
    from_slice_with(bytes, Config::default())
}

/// Deserialize a data structure from a slice of bytes with a custom [Config]
pub fn from_slice_with<'a, T>(bytes: &'a [u8], config: Config) -> Result<T>
where
    T: serde::Deserialize<'a>,
{
    let mut deserializer = Deserializer::with_config(bytes, config);

    let res = T::deserialize(&mut deserializer).and_then(|value| {
        deserializer.end()?;
        Ok(value)
    });

    match &res {
        Ok(_) => log::trace!("deserialized {} bytes", deserializer.offset()),
        Err(e) => log::debug!("deserialization failed: {}", e),
    }

    res
}

/// Deserialize one data structure from a reader.
///
/// Only the bytes of that value are consumed; whatever follows stays in the
/// reader for the next call, so a stream of messages can be read one by one.
pub fn from_reader<R: io::Read, T: serde::de::DeserializeOwned>(reader: R) -> Result<T> {
    from_reader_with(reader, Config::default())
}

/// Deserialize one data structure from a reader with a custom [Config].
///
/// [Config::allow_trailing_bytes] has no effect here: the end of the value
/// is where reading stops.
pub fn from_reader_with<R, T>(reader: R, config: Config) -> Result<T>
where
    R: io::Read,
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = Deserializer::from_reader_with(reader, config);

    let res = T::deserialize(&mut deserializer).map_err(|e| deserializer.io_error_or(e));

    match &res {
        Ok(_) => log::trace!("deserialized {} bytes from reader", deserializer.offset()),
        Err(e) => log::debug!("deserialization from reader failed: {}", e),
    }

    res
}
