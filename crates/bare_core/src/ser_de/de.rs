//! Implementation of [serde::de::Deserializer] for [Deserializer]

use std::io;

use serde::de::{
    self, value::U32Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess,
};

use super::input::{Input, IoInput, Reference};
use crate::config::Config;
use crate::consts::{self, INT_TOKEN, UINT_TOKEN, WIDE_INT_BYTES};
use crate::error::{DecodeError, Error, ErrorKind};
use crate::primitive::{self, Width};
use crate::viewer::ByteViewer;

/// Reads BARE encoded bytes back into any data structure.
///
/// Structs/enums to be deserialized need to derive [serde::Deserialize].
/// BARE is not self-describing, so the target type drives every read.
///
/// Reading from a slice borrows strings and bytes straight out of it;
/// reading from an [io::Read] copies them.
pub struct Deserializer<R> {
    input: R,
    config: Config,
    depth: usize,
}

impl<'de> Deserializer<ByteViewer<'de>> {
    pub fn from_slice(s: &'de [u8]) -> Self {
        Self::with_config(s, Config::default())
    }

    pub fn with_config(s: &'de [u8], config: Config) -> Self {
        Self {
            input: ByteViewer::from_slice(s),
            config,
            depth: 0,
        }
    }

    /// Checks that the whole input was consumed, unless trailing bytes are allowed.
    pub fn end(&self) -> Result<(), Error> {
        match self.config.allow_trailing_bytes || self.input.is_end() {
            true => Ok(()),
            false => Err(self.input.error(ErrorKind::TrailingBytes).into()),
        }
    }
}

impl<R: io::Read> Deserializer<IoInput<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with(reader, Config::default())
    }

    pub fn from_reader_with(reader: R, config: Config) -> Self {
        Self {
            input: IoInput::new(reader),
            config,
            depth: 0,
        }
    }

    /// Gives back the reader, positioned right after the bytes read so far.
    pub fn into_reader(self) -> R {
        self.input.into_inner()
    }

    /// Swaps a truncation caused by a failing reader for the I/O error itself.
    pub(crate) fn io_error_or(&mut self, e: Error) -> Error {
        match self.input.take_io_error() {
            Some(io_err) => Error::Io(io_err),
            None => e,
        }
    }
}

impl<'de, R: Input<'de>> Deserializer<R> {
    /// Byte offset of the next read.
    pub fn offset(&self) -> usize {
        self.input.offset()
    }

    /// Descend one nesting level.
    fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= self.config.max_depth {
            return Err(Error::RecursionLimitExceeded {
                offset: self.input.offset(),
            });
        }

        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Reads an element count and bounds it by the remaining input, when
    /// the input knows its end.
    fn read_count(&mut self) -> Result<usize, Error> {
        let start = self.input.offset();
        let count = primitive::read_len(&mut self.input, &self.config)?;

        // zero-sized elements are held to the same bound
        match self.input.remaining() {
            Some(remaining) if count > remaining => {
                Err(DecodeError::new(ErrorKind::TruncatedInput, start).into())
            }
            _ => Ok(count),
        }
    }

    /// Reads a length-prefixed byte string, along with the offset of its body.
    fn read_prefixed(&mut self) -> Result<(usize, Reference<'de, '_>), Error> {
        let start = self.input.offset();
        let len = primitive::read_len(&mut self.input, &self.config)?;
        let body = self.input.offset();

        self.input
            .next_slice(len)
            .map(|bytes| (body, bytes))
            .map_err(|_| DecodeError::new(ErrorKind::TruncatedInput, start).into())
    }

    /// Visits `count` elements as a sequence, one nesting level down.
    fn visit_counted<V>(&mut self, count: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: de::Visitor<'de>,
    {
        self.enter()?;
        let val = visitor.visit_seq(CollectionsAccessor::new(self, count));
        self.leave();
        val
    }
}

/// Checks a string body, reporting bad UTF-8 at the first offending byte.
fn text(bytes: &[u8], body: usize) -> Result<&str, Error> {
    std::str::from_utf8(bytes)
        .map_err(|e| DecodeError::new(ErrorKind::InvalidText, body + e.valid_up_to()).into())
}

/// Impl deserialize for fixed-width unsigned primitives
macro_rules! deserialize_unsigned {
    ($fn_name: ident: $data_type: ty, $width: expr => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            let v = primitive::read_uint(&mut self.input, $width, self.config.strict_varints)?;
            visitor.$visitor_fn(v as $data_type)
        }
    };
}

/// Impl deserialize for fixed-width signed primitives
macro_rules! deserialize_signed {
    ($fn_name: ident: $data_type: ty, $width: expr => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            let v = primitive::read_int(&mut self.input, $width, self.config.strict_varints)?;
            visitor.$visitor_fn(v as $data_type)
        }
    };
}

impl<'de, 'a, R: Input<'de>> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    // the wire carries no type information
    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::AnyUnsupported)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(primitive::read_bool(&mut self.input)?)
    }

    deserialize_signed! {deserialize_i64: i64, Width::W64 => visit_i64}
    deserialize_signed! {deserialize_i32: i32, Width::W32 => visit_i32}
    deserialize_signed! {deserialize_i16: i16, Width::W16 => visit_i16}
    deserialize_signed! {deserialize_i8: i8, Width::W8 => visit_i8}

    deserialize_unsigned! {deserialize_u64: u64, Width::W64 => visit_u64}
    deserialize_unsigned! {deserialize_u32: u32, Width::W32 => visit_u32}
    deserialize_unsigned! {deserialize_u16: u16, Width::W16 => visit_u16}
    deserialize_unsigned! {deserialize_u8: u8, Width::W8 => visit_u8}

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let bytes = self.input.next_bytes_fixed::<WIDE_INT_BYTES>()?;
        visitor.visit_i128(i128::from_le_bytes(bytes))
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let bytes = self.input.next_bytes_fixed::<WIDE_INT_BYTES>()?;
        visitor.visit_u128(u128::from_le_bytes(bytes))
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(primitive::read_f32(&mut self.input)?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(primitive::read_f64(&mut self.input)?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let char_num = primitive::read_uint(&mut self.input, Width::W32, true)? as u32;

        match char::from_u32(char_num) {
            Some(c) => visitor.visit_char(c),
            None => Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(char_num as u64),
                &"a unicode scalar value",
            )),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.read_prefixed()? {
            (body, Reference::Borrowed(bytes)) => visitor.visit_borrowed_str(text(bytes, body)?),
            (body, Reference::Copied(bytes)) => visitor.visit_str(text(bytes, body)?),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.read_prefixed()? {
            (_, Reference::Borrowed(bytes)) => visitor.visit_borrowed_bytes(bytes),
            (_, Reference::Copied(bytes)) => visitor.visit_bytes(bytes),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let start = self.input.offset();

        match self.input.next_byte()? {
            consts::OPTION_NONE => visitor.visit_none(),
            consts::OPTION_SOME => {
                self.enter()?;
                let val = visitor.visit_some(&mut *self);
                self.leave();
                val
            }
            _ => Err(DecodeError::new(ErrorKind::InvalidOptionalTag, start).into()),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    // the integer wrappers are read as varints, everything else is transparent
    fn deserialize_newtype_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match name {
            UINT_TOKEN => {
                visitor.visit_u64(primitive::read_uint(&mut self.input, Width::Variable, self.config.strict_varints)?)
            }
            INT_TOKEN => {
                visitor.visit_i64(primitive::read_int(&mut self.input, Width::Variable, self.config.strict_varints)?)
            }
            _ => {
                self.enter()?;
                let val = visitor.visit_newtype_struct(&mut *self);
                self.leave();
                val
            }
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let count = self.read_count()?;
        self.visit_counted(count, visitor)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.visit_counted(len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let count = self.read_count()?;

        self.enter()?;
        let val = visitor.visit_map(CollectionsAccessor::new(&mut *self, count));
        self.leave();
        val
    }

    // structs are tuples of their fields, in declaration order
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(fields.len(), visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.enter()?;
        let val = visitor.visit_enum(CollectionsAccessor::new(&mut *self, variants.len()));
        self.leave();
        val
    }

    fn deserialize_identifier<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::IdentifierUnsupported)
    }

    fn deserialize_ignored_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::AnyUnsupported)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// This wrapper contains implementations for accessing collections.
///
/// `remaining` counts the elements left in a sequence or map, or the number
/// of variants when used for an enum.
struct CollectionsAccessor<'a, R> {
    des: &'a mut Deserializer<R>,
    remaining: usize,
}

impl<'a, R> CollectionsAccessor<'a, R> {
    fn new(des: &'a mut Deserializer<R>, remaining: usize) -> Self {
        Self { des, remaining }
    }
}

impl<'de, 'a, R: Input<'de>> SeqAccess<'de> for CollectionsAccessor<'a, R> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;
        seed.deserialize(&mut *self.des).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

impl<'de, 'a, R: Input<'de>> MapAccess<'de> for CollectionsAccessor<'a, R> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;
        seed.deserialize(&mut *self.des).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.des)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

impl<'de, 'a, R: Input<'de>> EnumAccess<'de> for CollectionsAccessor<'a, R> {
    type Error = Error;

    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let start = self.des.input.offset();
        let index = primitive::read_varint(&mut self.des.input, self.des.config.strict_varints)?;

        let index = match u32::try_from(index) {
            Ok(i) if (i as usize) < self.remaining => i,
            _ => return Err(DecodeError::new(ErrorKind::UnknownEnumTag, start).into()),
        };

        let index_des: U32Deserializer<Error> = index.into_deserializer();
        let val = seed.deserialize(index_des)?;

        Ok((val, self))
    }
}

impl<'de, 'a, R: Input<'de>> VariantAccess<'de> for CollectionsAccessor<'a, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.des)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.des, len, visitor)
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.des, fields.len(), visitor)
    }
}
