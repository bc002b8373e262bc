//! Implementation of [serde::ser::Serializer] for [Serializer]

use serde::{ser, Serialize};

use crate::consts::{self, INT_TOKEN, UINT_TOKEN};
use crate::error::Error;
use crate::primitive;

/// Which varint form the next integer takes, if any.
#[derive(Debug, Clone, Copy)]
enum Varint {
    Unsigned,
    Signed,
}

/// This data structure contains the serialized bytes of any arbitrary data structure.
///
/// Structs/enums to be serialized need to derive [serde::Serialize].
/// Field names and variant names are never written, only their order.
#[derive(Debug, Default)]
pub struct Serializer {
    pub(crate) output: Vec<u8>,
    varint: Option<Varint>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the serializer, returning the bytes written so far.
    pub fn into_inner(self) -> Vec<u8> {
        self.output
    }
}

/// Impl serialize for fixed-width primitives
macro_rules! serialize_numeric_primitive {
    ($fn_name: ident, $num_type: ty) => {
        fn $fn_name(self, v: $num_type) -> Result<Self::Ok, Self::Error> {
            self.output.extend(v.to_le_bytes());
            Ok(())
        }
    };
}

/// Writes the length of the byte slice and then the slice.
fn write_prefixed(buffer: &mut Vec<u8>, bytes: &[u8]) {
    primitive::write_len(buffer, bytes.len());
    primitive::write_bytes(buffer, bytes);
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    type SerializeSeq = Self;

    type SerializeTuple = Self;

    type SerializeTupleStruct = Self;

    type SerializeTupleVariant = Self;

    type SerializeMap = Self;

    type SerializeStruct = Self;

    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        primitive::write_bool(&mut self.output, v);
        Ok(())
    }

    serialize_numeric_primitive! {serialize_i8, i8}
    serialize_numeric_primitive! {serialize_i16, i16}
    serialize_numeric_primitive! {serialize_i32, i32}
    serialize_numeric_primitive! {serialize_i128, i128}

    serialize_numeric_primitive! {serialize_u8, u8}
    serialize_numeric_primitive! {serialize_u16, u16}
    serialize_numeric_primitive! {serialize_u32, u32}
    serialize_numeric_primitive! {serialize_u128, u128}

    // `Int` arrives here with the varint flag set
    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        match self.varint.take() {
            Some(Varint::Signed) => primitive::write_varint(&mut self.output, primitive::zigzag_encode(v)),
            _ => self.output.extend(v.to_le_bytes()),
        }
        Ok(())
    }

    // `Uint` arrives here with the varint flag set
    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        match self.varint.take() {
            Some(Varint::Unsigned) => primitive::write_varint(&mut self.output, v),
            _ => self.output.extend(v.to_le_bytes()),
        }
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        primitive::write_f32(&mut self.output, v);
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        primitive::write_f64(&mut self.output, v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        self.output.extend((v as u32).to_le_bytes());
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        write_prefixed(&mut self.output, v.as_bytes());
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        write_prefixed(&mut self.output, v);
        Ok(())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.output.push(consts::OPTION_NONE);
        Ok(())
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.output.push(consts::OPTION_SOME);
        value.serialize(self)
    }

    // void takes no space on the wire
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    // serialize the index of a unit variant
    fn serialize_unit_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        primitive::write_varint(&mut self.output, variant_index as u64);
        Ok(())
    }

    // serialize the inner value, as a varint for the integer wrappers
    fn serialize_newtype_struct<T: ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        self.varint = match name {
            UINT_TOKEN => Some(Varint::Unsigned),
            INT_TOKEN => Some(Varint::Signed),
            _ => None,
        };

        let res = value.serialize(&mut *self);
        self.varint = None;
        res
    }

    // serialize the index, then the inner variant
    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        primitive::write_varint(&mut self.output, variant_index as u64);
        value.serialize(&mut *self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or(Error::SequenceLengthRequired)?;
        primitive::write_len(&mut self.output, len);
        Ok(self)
    }

    // tuples are fixed-length, so no count is written
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        primitive::write_varint(&mut self.output, variant_index as u64);
        self.serialize_tuple(len)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let len = len.ok_or(Error::MapLengthRequired)?;
        primitive::write_len(&mut self.output, len);
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        primitive::write_varint(&mut self.output, variant_index as u64);
        Ok(self)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

impl<'a> ser::SerializeSeq for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    // field names are not encoded
    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut Serializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}
