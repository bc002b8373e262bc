//! Statically typed records.
//!
//! [BareRecord] ties a Rust type to its [Schema] and converts it to and from
//! a [Value]. It is implemented here for the primitive and container types,
//! and derived for user structs and enums with `#[derive(BareRecord)]`.

use std::collections::BTreeMap;

use crate::codec;
use crate::error::{EncodeError, Result, SchemaMismatch};
use crate::primitive::Width;
use crate::schema::Schema;
use crate::types::{Data, Int, Uint};
use crate::value::Value;

/// A Rust type with a static BARE schema.
pub trait BareRecord: Sized {
    /// The schema every value of this type conforms to.
    fn schema() -> Schema;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch>;
}

/// Encode a record against its own schema.
pub fn to_bytes<T: BareRecord>(record: &T) -> std::result::Result<Vec<u8>, EncodeError> {
    codec::encode(&record.to_value(), &T::schema())
}

/// Decode a record of type `T` from `bytes`.
pub fn from_bytes<T: BareRecord>(bytes: &[u8]) -> Result<T> {
    let value = codec::decode(bytes, &T::schema())?;

    Ok(T::from_value(value)?)
}

/// Builds the mismatch error for a value of the wrong shape.
pub fn mismatch(expected: &str, found: &Value) -> SchemaMismatch {
    SchemaMismatch::new(expected, found.kind_name())
}

/// Impl [BareRecord] for fixed-width unsigned integers
macro_rules! record_uint {
    ($num_type: ty => $width: expr) => {
        impl BareRecord for $num_type {
            fn schema() -> Schema {
                Schema::Uint($width)
            }

            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
                match value {
                    Value::Uint(v) => <$num_type>::try_from(v)
                        .map_err(|_| SchemaMismatch::new($width.uint_name(), format!("uint {}", v))),
                    other => Err(mismatch($width.uint_name(), &other)),
                }
            }
        }
    };
}

/// Impl [BareRecord] for fixed-width signed integers
macro_rules! record_int {
    ($num_type: ty => $width: expr) => {
        impl BareRecord for $num_type {
            fn schema() -> Schema {
                Schema::Int($width)
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
                match value {
                    Value::Int(v) => <$num_type>::try_from(v)
                        .map_err(|_| SchemaMismatch::new($width.int_name(), format!("int {}", v))),
                    other => Err(mismatch($width.int_name(), &other)),
                }
            }
        }
    };
}

/// Impl [BareRecord] for types held by a single [Value] variant
macro_rules! record_simple {
    ($ty: ty, $schema: expr, $variant: ident, $name: literal) => {
        impl BareRecord for $ty {
            fn schema() -> Schema {
                $schema
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }
    };
}

record_uint! {u8 => Width::W8}
record_uint! {u16 => Width::W16}
record_uint! {u32 => Width::W32}
record_uint! {u64 => Width::W64}

record_int! {i8 => Width::W8}
record_int! {i16 => Width::W16}
record_int! {i32 => Width::W32}
record_int! {i64 => Width::W64}

record_simple! {bool, Schema::Bool, Bool, "bool"}
record_simple! {f32, Schema::F32, F32, "f32"}
record_simple! {f64, Schema::F64, F64, "f64"}
record_simple! {String, Schema::Str, Str, "str"}

impl BareRecord for Uint {
    fn schema() -> Schema {
        Schema::uint()
    }

    fn to_value(&self) -> Value {
        Value::Uint(self.0)
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Uint(v) => Ok(Uint(v)),
            other => Err(mismatch("uint", &other)),
        }
    }
}

impl BareRecord for Int {
    fn schema() -> Schema {
        Schema::int()
    }

    fn to_value(&self) -> Value {
        Value::Int(self.0)
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Int(v) => Ok(Int(v)),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl BareRecord for Data {
    fn schema() -> Schema {
        Schema::Data
    }

    fn to_value(&self) -> Value {
        Value::Data(self.0.clone())
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Data(v) => Ok(Data(v)),
            other => Err(mismatch("data", &other)),
        }
    }
}

/// `void`, for payload-less union alternatives.
impl BareRecord for () {
    fn schema() -> Schema {
        Schema::Void
    }

    fn to_value(&self) -> Value {
        Value::Void
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Void => Ok(()),
            other => Err(mismatch("void", &other)),
        }
    }
}

impl<T: BareRecord> BareRecord for Option<T> {
    fn schema() -> Schema {
        Schema::optional(T::schema())
    }

    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|v| Box::new(v.to_value())))
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Optional(opt) => opt.map(|v| T::from_value(*v)).transpose(),
            other => Err(mismatch("optional", &other)),
        }
    }
}

impl<T: BareRecord> BareRecord for Box<T> {
    fn schema() -> Schema {
        T::schema()
    }

    fn to_value(&self) -> Value {
        self.as_ref().to_value()
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: BareRecord> BareRecord for Vec<T> {
    fn schema() -> Schema {
        Schema::slice(T::schema())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(BareRecord::to_value).collect())
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("slice", &other)),
        }
    }
}

impl<T: BareRecord, const N: usize> BareRecord for [T; N] {
    fn schema() -> Schema {
        Schema::array(T::schema(), N)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(BareRecord::to_value).collect())
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        let items = match value {
            Value::Array(items) => items
                .into_iter()
                .map(T::from_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            other => return Err(mismatch("array", &other)),
        };

        items.try_into().map_err(|items: Vec<T>| {
            SchemaMismatch::new(format!("array of {}", N), format!("array of {}", items.len()))
        })
    }
}

impl<K: BareRecord + Ord, V: BareRecord> BareRecord for BTreeMap<K, V> {
    fn schema() -> Schema {
        Schema::map(K::schema(), V::schema())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> std::result::Result<Self, SchemaMismatch> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}
