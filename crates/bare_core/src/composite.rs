//! Composite codec: optionals, arrays, slices, strings, data, maps, enums,
//! unions and structs, driven by a [Schema].
//!
//! Both directions walk the schema tree and the value tree in lockstep and
//! stop at the first error. Nothing is written for struct field names or
//! counts; the schema is the whole contract.

use std::collections::HashSet;

use crate::config::Config;
use crate::consts;
use crate::error::{DecodeError, EncodeError, ErrorKind};
use crate::primitive;
use crate::schema::Schema;
use crate::value::Value;
use crate::viewer::ByteViewer;

/// Appends the encoding of `value` to `buffer`.
///
/// On error `buffer` may hold a partial encoding.
pub fn encode_value(buffer: &mut Vec<u8>, value: &Value, schema: &Schema) -> Result<(), EncodeError> {
    match (schema, value) {
        (Schema::Uint(width), Value::Uint(v)) => primitive::write_uint(buffer, *v, *width)?,
        (Schema::Int(width), Value::Int(v)) => primitive::write_int(buffer, *v, *width)?,
        (Schema::Bool, Value::Bool(v)) => primitive::write_bool(buffer, *v),
        (Schema::F32, Value::F32(v)) => primitive::write_f32(buffer, *v),
        (Schema::F64, Value::F64(v)) => primitive::write_f64(buffer, *v),

        (Schema::Str, Value::Str(s)) => {
            primitive::write_len(buffer, s.len());
            primitive::write_bytes(buffer, s.as_bytes());
        }
        (Schema::Data, Value::Data(bytes)) => {
            primitive::write_len(buffer, bytes.len());
            primitive::write_bytes(buffer, bytes);
        }
        (Schema::FixedData(len), Value::Data(bytes)) => {
            if bytes.len() != *len {
                return Err(EncodeError::mismatch(
                    format!("data<{}>", len),
                    format!("data of length {}", bytes.len()),
                ));
            }
            primitive::write_bytes(buffer, bytes);
        }
        (Schema::Void, Value::Void) => (),

        (Schema::Optional(inner), Value::Optional(opt)) => match opt {
            None => buffer.push(consts::OPTION_NONE),
            Some(v) => {
                buffer.push(consts::OPTION_SOME);
                encode_value(buffer, v, inner)?;
            }
        },

        (Schema::Array(element, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(EncodeError::mismatch(
                    format!("array of {}", len),
                    format!("array of {}", items.len()),
                ));
            }
            for item in items.iter() {
                encode_value(buffer, item, element)?;
            }
        }
        (Schema::Slice(element), Value::Array(items)) => {
            primitive::write_len(buffer, items.len());
            for item in items.iter() {
                encode_value(buffer, item, element)?;
            }
        }

        (Schema::Map(key_schema, value_schema), Value::Map(entries)) => {
            primitive::write_len(buffer, entries.len());

            let mut key_spans = Vec::with_capacity(entries.len());
            for (k, v) in entries.iter() {
                let start = buffer.len();
                encode_value(buffer, k, key_schema)?;
                key_spans.push((start, buffer.len()));
                encode_value(buffer, v, value_schema)?;
            }

            // keys are canonical, so equal keys have equal encodings
            let mut seen = HashSet::with_capacity(key_spans.len());
            for (start, end) in key_spans {
                if !seen.insert(&buffer[start..end]) {
                    return Err(EncodeError::mismatch("map with unique keys", "duplicate key"));
                }
            }
        }

        (Schema::Enum(e), Value::Enum(tag)) => {
            if !e.contains(*tag) {
                return Err(EncodeError::UnknownEnumTag(*tag));
            }
            primitive::write_varint(buffer, *tag);
        }

        (Schema::Union(u), Value::Union { tag, value }) => {
            let variant = u.variant(*tag).ok_or(EncodeError::UnknownUnionTag(*tag))?;
            primitive::write_varint(buffer, *tag);
            encode_value(buffer, value, &variant.schema)?;
        }

        (Schema::Struct(s), Value::Struct(fields)) => {
            if fields.len() != s.fields.len() {
                return Err(EncodeError::mismatch(
                    format!("struct of {} fields", s.fields.len()),
                    format!("struct of {} fields", fields.len()),
                ));
            }
            for (field, v) in s.fields.iter().zip(fields.iter()) {
                encode_value(buffer, v, &field.schema)?;
            }
        }

        (schema, value) => {
            return Err(EncodeError::mismatch(schema.type_name(), value.kind_name()));
        }
    }

    Ok(())
}

/// Decodes one value of `schema` from the viewer.
pub fn decode_value<'a>(
    viewer: &mut ByteViewer<'a>,
    schema: &Schema,
    config: &Config,
) -> Result<Value, DecodeError> {
    let strict = config.strict_varints;

    let value = match schema {
        Schema::Uint(width) => Value::Uint(primitive::read_uint(viewer, *width, strict)?),
        Schema::Int(width) => Value::Int(primitive::read_int(viewer, *width, strict)?),
        Schema::Bool => Value::Bool(primitive::read_bool(viewer)?),
        Schema::F32 => Value::F32(primitive::read_f32(viewer)?),
        Schema::F64 => Value::F64(primitive::read_f64(viewer)?),

        Schema::Str => {
            let start = viewer.offset();
            let bytes = read_prefixed_bytes(viewer, config, start)?;
            match std::str::from_utf8(bytes) {
                Ok(s) => Value::Str(s.to_owned()),
                Err(e) => {
                    let at = viewer.offset() - bytes.len() + e.valid_up_to();
                    return Err(DecodeError::new(ErrorKind::InvalidText, at));
                }
            }
        }
        Schema::Data => {
            let start = viewer.offset();
            Value::Data(read_prefixed_bytes(viewer, config, start)?.to_vec())
        }
        Schema::FixedData(len) => Value::Data(primitive::read_bytes(viewer, *len)?.to_vec()),
        Schema::Void => Value::Void,

        Schema::Optional(inner) => {
            let start = viewer.offset();
            match viewer.next_byte()? {
                consts::OPTION_NONE => Value::Optional(None),
                consts::OPTION_SOME => Value::present(decode_value(viewer, inner, config)?),
                _ => return Err(DecodeError::new(ErrorKind::InvalidOptionalTag, start)),
            }
        }

        Schema::Array(element, len) => {
            let start = viewer.offset();
            check_count(viewer, *len, element.min_encoded_len(), start)?;

            let mut items = Vec::with_capacity(*len);
            for _ in 0..*len {
                items.push(decode_value(viewer, element, config)?);
            }
            Value::Array(items)
        }
        Schema::Slice(element) => {
            let start = viewer.offset();
            let count = primitive::read_len(viewer, config)?;
            check_count(viewer, count, element.min_encoded_len(), start)?;

            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode_value(viewer, element, config)?);
            }
            Value::Array(items)
        }

        Schema::Map(key_schema, value_schema) => {
            let start = viewer.offset();
            let count = primitive::read_len(viewer, config)?;
            let entry_len = key_schema
                .min_encoded_len()
                .saturating_add(value_schema.min_encoded_len());
            check_count(viewer, count, entry_len, start)?;

            // keys are compared in canonical form: lenient varints admit
            // several byte spellings of the same key
            let mut seen: HashSet<Vec<u8>> = HashSet::with_capacity(count);
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key_start = viewer.offset();
                let k = decode_value(viewer, key_schema, config)?;

                let mut canonical = Vec::new();
                encode_value(&mut canonical, &k, key_schema)
                    .map_err(|_| DecodeError::new(ErrorKind::SchemaMismatch, key_start))?;
                if !seen.insert(canonical) {
                    return Err(DecodeError::new(ErrorKind::DuplicateMapKey, key_start));
                }
                let v = decode_value(viewer, value_schema, config)?;
                entries.push((k, v));
            }
            Value::Map(entries)
        }

        Schema::Enum(e) => {
            let start = viewer.offset();
            let tag = primitive::read_varint(viewer, strict)?;
            if !e.contains(tag) {
                return Err(DecodeError::new(ErrorKind::UnknownEnumTag, start));
            }
            Value::Enum(tag)
        }

        Schema::Union(u) => {
            let start = viewer.offset();
            let tag = primitive::read_varint(viewer, strict)?;
            let variant = u
                .variant(tag)
                .ok_or(DecodeError::new(ErrorKind::UnknownUnionTag, start))?;
            Value::union(tag, decode_value(viewer, &variant.schema, config)?)
        }

        Schema::Struct(s) => {
            let mut fields = Vec::with_capacity(s.fields.len());
            for field in s.fields.iter() {
                fields.push(decode_value(viewer, &field.schema, config)?);
            }
            Value::Struct(fields)
        }
    };

    Ok(value)
}

/// Reads a length prefix and that many raw bytes.
///
/// A short read is reported at `start`, the offset of the prefix.
fn read_prefixed_bytes<'a>(
    viewer: &mut ByteViewer<'a>,
    config: &Config,
    start: usize,
) -> Result<&'a [u8], DecodeError> {
    let len = primitive::read_len(viewer, config)?;
    primitive::read_bytes(viewer, len)
        .map_err(|_| DecodeError::new(ErrorKind::TruncatedInput, start))
}

/// Rejects element counts the remaining input cannot possibly hold, before
/// anything is allocated for them.
fn check_count(
    viewer: &ByteViewer,
    count: usize,
    element_len: usize,
    start: usize,
) -> Result<(), DecodeError> {
    let remaining = viewer.distance_to_end();

    match element_len {
        0 if count > remaining => Err(DecodeError::new(ErrorKind::LengthOverflow, start)),
        0 => Ok(()),
        _ => match count.checked_mul(element_len) {
            Some(needed) if needed <= remaining => Ok(()),
            _ => Err(DecodeError::new(ErrorKind::TruncatedInput, start)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Width;

    fn encode(value: &Value, schema: &Schema) -> Vec<u8> {
        let mut buf = vec![];
        encode_value(&mut buf, value, schema).unwrap();
        buf
    }

    fn decode(bytes: &[u8], schema: &Schema) -> Result<Value, DecodeError> {
        decode_value(&mut ByteViewer::from_slice(bytes), schema, &Config::default())
    }

    /// Performs an encode-decode loop and returns the bytes
    fn round_trip(value: Value, schema: &Schema) -> Vec<u8> {
        let bytes = encode(&value, schema);
        let mut view = ByteViewer::from_slice(&bytes);
        let decoded = decode_value(&mut view, schema, &Config::default()).unwrap();

        assert_eq!(decoded, value);
        assert!(view.is_end());
        bytes
    }

    #[test]
    fn test_optional() {
        let schema = Schema::optional(Schema::Uint(Width::W16));

        assert_eq!(round_trip(Value::absent(), &schema), [0]);
        assert_eq!(round_trip(Value::present(Value::Uint(0x0201)), &schema), [1, 1, 2]);

        // absent consumes only the presence byte
        let mut view = ByteViewer::from_slice(&[0, 0xff]);
        let v = decode_value(&mut view, &schema, &Config::default()).unwrap();
        assert_eq!(v, Value::absent());
        assert_eq!(view.offset(), 1);

        assert_eq!(
            decode(&[2, 1, 2], &schema).unwrap_err(),
            DecodeError::new(ErrorKind::InvalidOptionalTag, 0)
        );
    }

    #[test]
    fn test_string() {
        let bytes = round_trip(Value::from("Jane Doe"), &Schema::Str);
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[1..], b"Jane Doe");

        round_trip(Value::from("how about that 👏👏👏"), &Schema::Str);
        round_trip(Value::from(""), &Schema::Str);
    }

    #[test]
    fn test_string_invalid_utf8() {
        let bytes = [4, b'a', b'b', 0xff, b'c'];
        assert_eq!(
            decode(&bytes, &Schema::Str).unwrap_err(),
            DecodeError::new(ErrorKind::InvalidText, 3)
        );
    }

    #[test]
    fn test_string_truncated_reports_field_start() {
        let bytes = [0, 5, b'a', b'b'];
        let schema = Schema::structure([("a", Schema::Bool), ("b", Schema::Str)]);

        assert_eq!(
            decode(&bytes, &schema).unwrap_err(),
            DecodeError::new(ErrorKind::TruncatedInput, 1)
        );
    }

    #[test]
    fn test_data() {
        assert_eq!(round_trip(Value::Data(vec![1, 2, 3]), &Schema::Data), [3, 1, 2, 3]);
        assert_eq!(round_trip(Value::Data(vec![1, 2, 3]), &Schema::FixedData(3)), [1, 2, 3]);

        let err = encode_value(&mut vec![], &Value::Data(vec![1]), &Schema::FixedData(3));
        assert_eq!(err.unwrap_err().kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_array_and_slice() {
        let items = Value::Array(vec![Value::Int(-1), Value::Int(1)]);

        assert_eq!(round_trip(items.clone(), &Schema::array(Schema::int(), 2)), [1, 2]);
        assert_eq!(round_trip(items.clone(), &Schema::slice(Schema::int())), [2, 1, 2]);

        let err = encode_value(&mut vec![], &items, &Schema::array(Schema::int(), 3));
        assert_eq!(err.unwrap_err().kind(), ErrorKind::SchemaMismatch);

        round_trip(Value::Array(vec![]), &Schema::slice(Schema::Str));
    }

    #[test]
    fn test_slice_fails_on_first_bad_element() {
        let schema = Schema::slice(Schema::Bool);
        assert_eq!(
            decode(&[3, 1, 7, 0], &schema).unwrap_err(),
            DecodeError::new(ErrorKind::InvalidBoolean, 2)
        );
    }

    #[test]
    fn test_slice_count_larger_than_input() {
        // a count of 2^62 elements with 2 bytes of input
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x40, 1, 1];
        let schema = Schema::slice(Schema::Bool);
        assert_eq!(
            decode(&bytes, &schema).unwrap_err(),
            DecodeError::new(ErrorKind::TruncatedInput, 0)
        );

        let config = Config::default().with_max_length(16);
        let err = decode_value(&mut ByteViewer::from_slice(&bytes), &schema, &config).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::LengthOverflow, 0));
    }

    #[test]
    fn test_void_slice_is_bounded() {
        // unvalidated schema; void elements take no input
        let schema = Schema::slice(Schema::Void);
        assert_eq!(
            decode(&[0xff, 0x7f], &schema).unwrap_err(),
            DecodeError::new(ErrorKind::LengthOverflow, 0)
        );
    }

    #[test]
    fn test_map() {
        let schema = Schema::map(Schema::Str, Schema::Uint(Width::W32));
        let value = Value::Map(vec![
            (Value::from("asd"), Value::Uint(10_000)),
            (Value::from("how about that 👏👏👏"), Value::Uint(69)),
        ]);
        round_trip(value, &schema);

        let dup = Value::Map(vec![
            (Value::from("a"), Value::Uint(1)),
            (Value::from("a"), Value::Uint(2)),
        ]);
        let err = encode_value(&mut vec![], &dup, &schema).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

        let bytes = [2, 1, b'a', 1, 0, 0, 0, 1, b'a', 2, 0, 0, 0];
        assert_eq!(
            decode(&bytes, &schema).unwrap_err(),
            DecodeError::new(ErrorKind::DuplicateMapKey, 7)
        );
    }

    #[test]
    fn test_map_duplicate_key_in_lenient_form() {
        let schema = Schema::map(Schema::uint(), Schema::Bool);
        let lenient = Config::default().with_strict_varints(false);

        // key 1, then key 1 again padded with a zero continuation byte
        let bytes = [2, 0x01, 1, 0x81, 0x00, 0];
        let err = decode_value(&mut ByteViewer::from_slice(&bytes), &schema, &lenient).unwrap_err();
        assert_eq!(err, DecodeError::new(ErrorKind::DuplicateMapKey, 3));

        // distinct keys still decode leniently
        let bytes = [2, 0x01, 1, 0x82, 0x00, 0];
        let value = decode_value(&mut ByteViewer::from_slice(&bytes), &schema, &lenient).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::Uint(1), Value::Bool(true)),
                (Value::Uint(2), Value::Bool(false)),
            ])
        );
    }

    #[test]
    fn test_enum() {
        let schema = Schema::enumeration([("ADMIN", 0), ("USER", 1), ("GUEST", 2), ("ROOT", 300)]);

        assert_eq!(round_trip(Value::Enum(2), &schema), [2]);
        assert_eq!(round_trip(Value::Enum(300), &schema), [0xac, 0x02]);

        assert_eq!(
            decode(&[3], &schema).unwrap_err(),
            DecodeError::new(ErrorKind::UnknownEnumTag, 0)
        );
        assert_eq!(
            encode_value(&mut vec![], &Value::Enum(3), &schema).unwrap_err(),
            EncodeError::UnknownEnumTag(3)
        );
    }

    #[test]
    fn test_union() {
        let schema = Schema::union([
            ("nothing", 0, Schema::Void),
            ("number", 1, Schema::int()),
            ("text", 5, Schema::Str),
        ]);

        assert_eq!(round_trip(Value::union(0, Value::Void), &schema), [0]);
        assert_eq!(round_trip(Value::union(1, Value::Int(-3)), &schema), [1, 5]);
        assert_eq!(round_trip(Value::union(5, Value::from("hi")), &schema), [5, 2, b'h', b'i']);

        assert_eq!(
            decode(&[6, 0], &schema).unwrap_err(),
            DecodeError::new(ErrorKind::UnknownUnionTag, 0)
        );
        assert_eq!(
            encode_value(&mut vec![], &Value::union(2, Value::Void), &schema).unwrap_err(),
            EncodeError::UnknownUnionTag(2)
        );

        // payload must match the alternative's schema
        let err = encode_value(&mut vec![], &Value::union(1, Value::Void), &schema).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_struct_nested_optional() {
        let session = Schema::structure([("token", Schema::Data), ("expires", Schema::uint())]);
        let schema = Schema::structure([
            ("id", Schema::uint()),
            ("session", Schema::optional(session)),
        ]);

        let value = Value::Struct(vec![
            Value::Uint(7),
            Value::present(Value::Struct(vec![Value::Data(vec![9, 9]), Value::Uint(1)])),
        ]);
        assert_eq!(round_trip(value, &schema), [7, 1, 2, 9, 9, 1]);

        let value = Value::Struct(vec![Value::Uint(7), Value::absent()]);
        assert_eq!(round_trip(value, &schema), [7, 0]);

        let short = Value::Struct(vec![Value::Uint(7)]);
        let err = encode_value(&mut vec![], &short, &schema).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_kind_mismatch() {
        let err = encode_value(&mut vec![], &Value::Bool(true), &Schema::Str).unwrap_err();
        assert_eq!(
            err,
            EncodeError::SchemaMismatch(crate::SchemaMismatch::new("str", "bool"))
        );
    }
}
