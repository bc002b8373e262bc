//! Runtime values conforming to a [crate::Schema].

/// A BARE value. Composite values own their children; there is no sharing.
///
/// Integers are widened to 64 bits whatever their wire width. Both fixed
/// arrays and slices are held in [Value::Array]; fixed and variable byte
/// blobs both use [Value::Data].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint(u64),
    Int(i64),
    Bool(bool),
    F32(f32),
    F64(f64),
    Str(String),
    Data(Vec<u8>),
    Void,
    /// `None` is absent, `Some` is present.
    Optional(Option<Box<Value>>),
    Array(Vec<Value>),
    /// Entries in wire order.
    Map(Vec<(Value, Value)>),
    /// The enum member's value.
    Enum(u64),
    Union { tag: u64, value: Box<Value> },
    /// Field values in declaration order.
    Struct(Vec<Value>),
}

impl Value {
    /// An absent optional.
    pub fn absent() -> Self {
        Value::Optional(None)
    }

    /// A present optional.
    pub fn present(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn union(tag: u64, value: Value) -> Self {
        Value::Union {
            tag,
            value: Box::new(value),
        }
    }

    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "str",
            Value::Data(_) => "data",
            Value::Void => "void",
            Value::Optional(_) => "optional",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Union { .. } => "union",
            Value::Struct(_) => "struct",
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Value::Optional(value.map(|v| Box::new(v.into())))
    }
}
