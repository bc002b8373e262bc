//! Static shape descriptions shared by the encoder and the decoder.
//!
//! A [Schema] is a tree built once, either by hand or by
//! `#[derive(BareRecord)]`, and then only read. Field order in a
//! [StructSchema] is the wire contract; names only serve diagnostics.

use std::collections::HashSet;
use std::fmt::{self, Display};

use crate::primitive::Width;

/// The shape of a BARE value.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Uint(Width),
    Int(Width),
    Bool,
    F32,
    F64,
    /// UTF-8 text, length prefixed.
    Str,
    /// Byte blob, length prefixed.
    Data,
    /// Byte blob of a fixed length, no prefix.
    FixedData(usize),
    /// Zero bytes. Only valid as a union alternative.
    Void,
    Optional(Box<Schema>),
    /// Exactly `N` elements, no prefix.
    Array(Box<Schema>, usize),
    /// Length-prefixed sequence.
    Slice(Box<Schema>),
    Map(Box<Schema>, Box<Schema>),
    Enum(EnumSchema),
    Union(UnionSchema),
    Struct(StructSchema),
}

/// A named member of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: u64,
}

/// A closed set of named integer tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub members: Vec<EnumMember>,
}

impl EnumSchema {
    pub fn contains(&self, value: u64) -> bool {
        self.members.iter().any(|m| m.value == value)
    }

    pub fn member(&self, value: u64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }
}

/// One alternative of a union.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionVariant {
    pub name: String,
    pub tag: u64,
    pub schema: Schema,
}

/// A tagged choice among alternative schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub variants: Vec<UnionVariant>,
}

impl UnionSchema {
    /// Look up the alternative declared for `tag`.
    pub fn variant(&self, tag: u64) -> Option<&UnionVariant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// An ordered, fixed sequence of heterogeneous fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    pub fields: Vec<Field>,
}

/// Defects found when a schema is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    EmptyEnum,
    DuplicateEnumName(String),
    DuplicateEnumValue(u64),

    EmptyUnion,
    DuplicateUnionTag(u64),

    EmptyStruct,
    DuplicateFieldName(String),

    /// A fixed array or fixed data of length 0.
    ZeroLength,

    /// `void` outside of a union alternative.
    MisplacedVoid,

    /// Map keys must be primitive, and not float, data or void.
    InvalidMapKey(&'static str),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::EmptyEnum => f.write_str("enum declares no members"),
            SchemaError::DuplicateEnumName(name) => write!(f, "duplicate enum member {}", name),
            SchemaError::DuplicateEnumValue(v) => write!(f, "duplicate enum value {}", v),
            SchemaError::EmptyUnion => f.write_str("union declares no alternatives"),
            SchemaError::DuplicateUnionTag(t) => write!(f, "duplicate union tag {}", t),
            SchemaError::EmptyStruct => f.write_str("struct declares no fields"),
            SchemaError::DuplicateFieldName(name) => write!(f, "duplicate struct field {}", name),
            SchemaError::ZeroLength => f.write_str("fixed length must be at least 1"),
            SchemaError::MisplacedVoid => f.write_str("void is only allowed as a union alternative"),
            SchemaError::InvalidMapKey(ty) => write!(f, "{} cannot be used as a map key", ty),
        }
    }
}

impl std::error::Error for SchemaError {}

impl Schema {
    /// `uint`: variable-width unsigned integer.
    pub fn uint() -> Self {
        Schema::Uint(Width::Variable)
    }

    /// `int`: variable-width zig-zag signed integer.
    pub fn int() -> Self {
        Schema::Int(Width::Variable)
    }

    pub fn optional(inner: Schema) -> Self {
        Schema::Optional(Box::new(inner))
    }

    pub fn array(element: Schema, len: usize) -> Self {
        Schema::Array(Box::new(element), len)
    }

    pub fn slice(element: Schema) -> Self {
        Schema::Slice(Box::new(element))
    }

    pub fn map(key: Schema, value: Schema) -> Self {
        Schema::Map(Box::new(key), Box::new(value))
    }

    /// Build an enum from `(name, value)` pairs.
    pub fn enumeration<N: Into<String>>(members: impl IntoIterator<Item = (N, u64)>) -> Self {
        Schema::Enum(EnumSchema {
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.into(),
                    value,
                })
                .collect(),
        })
    }

    /// Build a union from `(name, tag, schema)` triples.
    pub fn union<N: Into<String>>(variants: impl IntoIterator<Item = (N, u64, Schema)>) -> Self {
        Schema::Union(UnionSchema {
            variants: variants
                .into_iter()
                .map(|(name, tag, schema)| UnionVariant {
                    name: name.into(),
                    tag,
                    schema,
                })
                .collect(),
        })
    }

    /// Build a struct from `(name, schema)` pairs, in wire order.
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Schema)>) -> Self {
        Schema::Struct(StructSchema {
            fields: fields
                .into_iter()
                .map(|(name, schema)| Field::new(name, schema))
                .collect(),
        })
    }

    /// BARE type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Uint(w) => w.uint_name(),
            Schema::Int(w) => w.int_name(),
            Schema::Bool => "bool",
            Schema::F32 => "f32",
            Schema::F64 => "f64",
            Schema::Str => "str",
            Schema::Data => "data",
            Schema::FixedData(_) => "data<len>",
            Schema::Void => "void",
            Schema::Optional(_) => "optional",
            Schema::Array(_, _) => "array",
            Schema::Slice(_) => "slice",
            Schema::Map(_, _) => "map",
            Schema::Enum(_) => "enum",
            Schema::Union(_) => "union",
            Schema::Struct(_) => "struct",
        }
    }

    /// The fewest bytes any value of this schema can encode to.
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Schema::Uint(w) | Schema::Int(w) => w.bytes().unwrap_or(1),
            Schema::Bool => 1,
            Schema::F32 => 4,
            Schema::F64 => 8,
            Schema::Str | Schema::Data | Schema::Slice(_) | Schema::Map(_, _) => 1,
            Schema::FixedData(len) => *len,
            Schema::Void => 0,
            Schema::Optional(_) | Schema::Enum(_) => 1,
            Schema::Array(element, len) => element.min_encoded_len().saturating_mul(*len),
            Schema::Union(u) => {
                let payload = u
                    .variants
                    .iter()
                    .map(|v| v.schema.min_encoded_len())
                    .min()
                    .unwrap_or(0);
                payload.saturating_add(1)
            }
            Schema::Struct(s) => s
                .fields
                .iter()
                .fold(0usize, |acc, f| acc.saturating_add(f.schema.min_encoded_len())),
        }
    }

    /// Check the schema for defects that make it unusable on the wire.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_node(false)
    }

    fn validate_node(&self, union_alternative: bool) -> Result<(), SchemaError> {
        match self {
            Schema::Void => match union_alternative {
                true => Ok(()),
                false => Err(SchemaError::MisplacedVoid),
            },
            Schema::FixedData(0) | Schema::Array(_, 0) => Err(SchemaError::ZeroLength),
            Schema::Optional(inner) | Schema::Slice(inner) | Schema::Array(inner, _) => {
                inner.validate_node(false)
            }
            Schema::Map(key, value) => {
                match key.as_ref() {
                    Schema::Uint(_)
                    | Schema::Int(_)
                    | Schema::Bool
                    | Schema::Str
                    | Schema::Enum(_) => (),
                    other => return Err(SchemaError::InvalidMapKey(other.type_name())),
                }
                key.validate_node(false)?;
                value.validate_node(false)
            }
            Schema::Enum(e) => {
                if e.members.is_empty() {
                    return Err(SchemaError::EmptyEnum);
                }

                let mut names = HashSet::new();
                let mut values = HashSet::new();
                for m in e.members.iter() {
                    if !names.insert(m.name.as_str()) {
                        return Err(SchemaError::DuplicateEnumName(m.name.clone()));
                    }
                    if !values.insert(m.value) {
                        return Err(SchemaError::DuplicateEnumValue(m.value));
                    }
                }
                Ok(())
            }
            Schema::Union(u) => {
                if u.variants.is_empty() {
                    return Err(SchemaError::EmptyUnion);
                }

                let mut tags = HashSet::new();
                for v in u.variants.iter() {
                    if !tags.insert(v.tag) {
                        return Err(SchemaError::DuplicateUnionTag(v.tag));
                    }
                    v.schema.validate_node(true)?;
                }
                Ok(())
            }
            Schema::Struct(s) => {
                if s.fields.is_empty() {
                    return Err(SchemaError::EmptyStruct);
                }

                let mut names = HashSet::new();
                for f in s.fields.iter() {
                    if !names.insert(f.name.as_str()) {
                        return Err(SchemaError::DuplicateFieldName(f.name.clone()));
                    }
                    f.schema.validate_node(false)?;
                }
                Ok(())
            }
            Schema::Uint(_)
            | Schema::Int(_)
            | Schema::Bool
            | Schema::F32
            | Schema::F64
            | Schema::Str
            | Schema::Data
            | Schema::FixedData(_) => Ok(()),
        }
    }
}
