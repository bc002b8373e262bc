//! Schema-driven entry points.

use crate::composite::{decode_value, encode_value};
use crate::config::Config;
use crate::error::{DecodeError, EncodeError, ErrorKind};
use crate::schema::{Schema, SchemaError};
use crate::value::Value;
use crate::viewer::ByteViewer;

/// Encode `value` against `schema` into a fresh buffer.
pub fn encode(value: &Value, schema: &Schema) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    encode_into(&mut buffer, value, schema)?;

    Ok(buffer)
}

/// Append the encoding of `value` to `buffer`.
///
/// `buffer` is left untouched if encoding fails.
pub fn encode_into(buffer: &mut Vec<u8>, value: &Value, schema: &Schema) -> Result<(), EncodeError> {
    let start = buffer.len();

    match encode_value(buffer, value, schema) {
        Ok(()) => {
            log::trace!("encoded {} into {} bytes", schema.type_name(), buffer.len() - start);
            Ok(())
        }
        Err(e) => {
            buffer.truncate(start);
            log::debug!("encode failed: {}", e);
            Err(e)
        }
    }
}

/// Decode one value of `schema` from `bytes` with the default [Config].
pub fn decode(bytes: &[u8], schema: &Schema) -> Result<Value, DecodeError> {
    decode_with(bytes, schema, &Config::default())
}

/// Decode one value of `schema` from `bytes`.
///
/// Unless [Config::allow_trailing_bytes] is set, `bytes` must hold exactly
/// one value.
pub fn decode_with(bytes: &[u8], schema: &Schema, config: &Config) -> Result<Value, DecodeError> {
    let mut viewer = ByteViewer::from_slice(bytes);

    let res = decode_value(&mut viewer, schema, config).and_then(|value| {
        match config.allow_trailing_bytes || viewer.is_end() {
            true => Ok(value),
            false => Err(viewer.error(ErrorKind::TrailingBytes)),
        }
    });

    match &res {
        Ok(_) => log::trace!("decoded {} from {} bytes", schema.type_name(), viewer.offset()),
        Err(e) => log::debug!("decode of {} failed: {}", schema.type_name(), e),
    }

    res
}

/// A validated schema paired with a decoding configuration.
///
/// The schema is checked once, when the codec is built. A codec is
/// read-only afterwards and can be shared between threads.
///
/// ```
/// use bare_core::{Codec, Schema, Value};
///
/// let codec = Codec::new(Schema::structure([
///     ("id", Schema::uint()),
///     ("name", Schema::Str),
/// ]))
/// .unwrap();
///
/// let value = Value::Struct(vec![Value::Uint(42), Value::from("Jane Doe")]);
/// let bytes = codec.encode(&value).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), value);
/// ```
#[derive(Debug, Clone)]
pub struct Codec {
    schema: Schema,
    config: Config,
}

impl Codec {
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        Self::with_config(schema, Config::default())
    }

    pub fn with_config(schema: Schema, config: Config) -> Result<Self, SchemaError> {
        if let Err(e) = schema.validate() {
            log::debug!("rejected {} schema: {}", schema.type_name(), e);
            return Err(e);
        }

        log::debug!("registered {} schema", schema.type_name());

        Ok(Self { schema, config })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        encode(value, &self.schema)
    }

    pub fn encode_into(&self, buffer: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        encode_into(buffer, value, &self.schema)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        decode_with(bytes, &self.schema, &self.config)
    }
}
