//! Implementation of [serde::de::Deserializer] for [GenericDeserializer]

use serde::de::{self, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess};

use super::consts::{self, ByteSizePrefix};
use crate::err::WireError;

/// Deserializes the bytes produced by
/// [GenericSerializer][super::GenericSerializer].
///
/// Structs/enums to be deserialized need to derive [serde::Deserialize].
pub struct GenericDeserializer<'de> {
    input: ByteViewer<'de>,
}

impl<'de> GenericDeserializer<'de> {
    pub fn from_slice(s: &'de [u8]) -> Self {
        Self {
            input: ByteViewer::from_slice(s),
        }
    }
}

/// Validate the correctness of the next byte from [ByteViewer] and a
/// reference.
///
/// Pass in the appropriate error to return when the bytes do not match.
macro_rules! expect_byte {
    ($viewer: expr, $known: expr => $err: expr) => {
        match $viewer.next_byte()? == $known {
            true => (),
            false => return Err($err),
        }
    };
}

/// Impl deserialize signed primitives
macro_rules! deserialize_signed {
    ($fn_name: ident: $data_type: ty => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            expect_byte! {
                self.input,
                consts::PREFIX_NUM
                => WireError::PrefixNotMatched("numeric prefix not found".to_owned())
            }

            let bytes = self.input.next_bytes_fixed::<8>()?;
            visitor.$visitor_fn(i64::from_be_bytes(bytes) as $data_type)
        }
    };
}

/// Impl deserialize unsigned primitives
macro_rules! deserialize_unsigned {
    ($fn_name: ident: $data_type: ty => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            expect_byte! {
                self.input,
                consts::PREFIX_NUM
                => WireError::PrefixNotMatched("numeric prefix not found".to_owned())
            }

            let bytes = self.input.next_bytes_fixed::<8>()?;
            visitor.$visitor_fn(u64::from_be_bytes(bytes) as $data_type)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut GenericDeserializer<'de> {
    type Error = WireError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let prefix = self.input.peek();

        // only self-describing prefixes can be dispatched here.
        // `char` and tuples cannot be inferred from the stream.
        match prefix {
            Some(consts::PREFIX_BOOL) => self.deserialize_bool(visitor),
            Some(consts::PREFIX_BYTES) => self.deserialize_byte_buf(visitor),
            Some(consts::PREFIX_MAP) => self.deserialize_map(visitor),
            Some(consts::PREFIX_NUM) => self.deserialize_u64(visitor),
            Some(consts::PREFIX_FLOAT) => self.deserialize_f64(visitor),
            Some(consts::PREFIX_OPTIONAL) => self.deserialize_option(visitor),
            Some(consts::PREFIX_SEQ) => self.deserialize_seq(visitor),
            Some(consts::PREFIX_STR) => self.deserialize_str(visitor),
            Some(consts::PREFIX_UNIT) => self.deserialize_unit(visitor),
            Some(consts::PREFIX_ENUM) => Err(WireError::Message(
                "enums cannot be inferred from the stream".to_owned(),
            )),
            Some(consts::PREFIX_SEQ_CONST) => Err(WireError::Message(
                "fixed-size sequences cannot be inferred from the stream".to_owned(),
            )),
            Some(other) => Err(WireError::PrefixNotMatched(format!(
                "unrecognized prefix {:#04x}",
                other
            ))),
            None => Err(WireError::UnexpectedEof {
                needed: 1,
                remaining: 0,
            }),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_BOOL
            => WireError::PrefixNotMatched("bool prefix not found".to_owned())
        }

        let value = self.input.next_byte()?;

        match value {
            consts::BOOL_TRUE => visitor.visit_bool(true),
            consts::BOOL_FALSE => visitor.visit_bool(false),
            other => Err(WireError::PrefixNotMatched(format!(
                "invalid bool byte {:#04x}",
                other
            ))),
        }
    }

    deserialize_signed! {deserialize_i64: i64 => visit_i64}
    deserialize_signed! {deserialize_i32: i32 => visit_i32}
    deserialize_signed! {deserialize_i16: i16 => visit_i16}
    deserialize_signed! {deserialize_i8: i8 => visit_i8}

    deserialize_unsigned! {deserialize_u64: u64 => visit_u64}
    deserialize_unsigned! {deserialize_u32: u32 => visit_u32}
    deserialize_unsigned! {deserialize_u16: u16 => visit_u16}
    deserialize_unsigned! {deserialize_u8: u8 => visit_u8}

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_FLOAT
            => WireError::PrefixNotMatched("float prefix not found".to_owned())
        }

        let bytes = self.input.next_bytes_fixed::<8>()?;
        visitor.visit_f32(f64::from_be_bytes(bytes) as f32)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_FLOAT
            => WireError::PrefixNotMatched("float prefix not found".to_owned())
        }

        let bytes = self.input.next_bytes_fixed::<8>()?;
        visitor.visit_f64(f64::from_be_bytes(bytes))
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let bytes = self.input.next_bytes_fixed::<4>()?;
        let char_num = u32::from_be_bytes(bytes);

        match char::from_u32(char_num) {
            Some(c) => visitor.visit_char(c),
            None => Err(WireError::Message(format!(
                "invalid char code point {}",
                char_num
            ))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_STR
            => WireError::PrefixNotMatched("str prefix not found".to_owned())
        }

        let len = self.input.pop_size()?;
        let str_bytes = self.input.next_bytes(len as usize)?;

        visitor.visit_str(std::str::from_utf8(str_bytes).map_err(|_| WireError::InvalidUtf8)?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_STR
            => WireError::PrefixNotMatched("string prefix not found".to_owned())
        }

        let len = self.input.pop_size()?;
        let str_bytes = self.input.next_bytes(len as usize)?;

        visitor.visit_string(
            std::str::from_utf8(str_bytes)
                .map_err(|_| WireError::InvalidUtf8)?
                .to_owned(),
        )
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_BYTES
            => WireError::PrefixNotMatched("bytes prefix not found".to_owned())
        }

        let len = self.input.pop_size()?;
        let bytes = self.input.next_bytes(len as usize)?;

        visitor.visit_bytes(bytes)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_BYTES
            => WireError::PrefixNotMatched("bytes prefix not found".to_owned())
        }

        let len = self.input.pop_size()?;
        let bytes = self.input.next_bytes(len as usize)?;

        visitor.visit_byte_buf(bytes.to_owned())
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_OPTIONAL
            => WireError::PrefixNotMatched("option prefix not found".to_owned())
        }

        let variant = self.input.next_byte()?;

        match variant {
            consts::OPTION_NONE => visitor.visit_none(),
            consts::OPTION_SOME => visitor.visit_some(self),
            other => Err(WireError::PrefixNotMatched(format!(
                "invalid option byte {:#04x}",
                other
            ))),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input,
            consts::PREFIX_UNIT
            => WireError::PrefixNotMatched("unit prefix not found".to_owned())
        }

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

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // note that vecs and tuples have different delimiters
        expect_byte! {
            self.input, consts::PREFIX_SEQ => WireError::PrefixNotMatched("seq prefix not found".to_owned())
        }
        expect_byte! {
            self.input, consts::SEQ_OPEN => WireError::DelimiterNotFound(consts::SEQ_OPEN as char)
        }

        let accessor = CollectionsAccessor::from_deserializer(self, consts::SEQ_CLOSE);
        let val = visitor.visit_seq(accessor)?;

        expect_byte! {
            self.input, consts::SEQ_CLOSE => WireError::DelimiterNotFound(consts::SEQ_CLOSE as char)
        }

        Ok(val)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // note that tuples and vecs have different delimiters
        expect_byte! {
            self.input, consts::PREFIX_SEQ_CONST => WireError::PrefixNotMatched("tuple prefix not found".to_owned())
        }
        expect_byte! {
            self.input, consts::SEQ_CONST_OPEN => WireError::DelimiterNotFound(consts::SEQ_CONST_OPEN as char)
        }

        let accessor = CollectionsAccessor::from_deserializer(self, consts::SEQ_CONST_CLOSE);
        let val = visitor.visit_seq(accessor)?;

        expect_byte! {
            self.input, consts::SEQ_CONST_CLOSE => WireError::DelimiterNotFound(consts::SEQ_CONST_CLOSE as char)
        }

        Ok(val)
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
        expect_byte! {
            self.input, consts::PREFIX_MAP => WireError::PrefixNotMatched("map prefix not found".to_owned())
        }
        expect_byte! {
            self.input, consts::MAP_OPEN => WireError::DelimiterNotFound(consts::MAP_OPEN as char)
        }

        let accessor = CollectionsAccessor::from_deserializer(self, consts::MAP_CLOSE);
        let val = visitor.visit_map(accessor)?;

        expect_byte! {
            self.input, consts::MAP_CLOSE => WireError::DelimiterNotFound(consts::MAP_CLOSE as char)
        }

        Ok(val)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // structs and maps use the same underlying logic
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        expect_byte! {
            self.input, consts::PREFIX_ENUM => WireError::PrefixNotMatched("enum prefix not found".to_owned())
        }

        let accessor = CollectionsAccessor::from_deserializer(self, 0);
        visitor.visit_enum(accessor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // identifiers are serialized directly as strings
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }
}

/// A bounds-checked view into an existing slice of bytes.
pub(crate) struct ByteViewer<'arr> {
    slice: &'arr [u8],
    offset: usize,
}

impl<'arr> ByteViewer<'arr> {
    /// Create a new viewer on a byte slice
    pub fn from_slice(s: &'arr [u8]) -> Self {
        Self {
            slice: s,
            offset: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.slice.len() - self.offset
    }

    /// Peek at the next byte in the slice
    pub fn peek(&self) -> Option<u8> {
        self.slice.get(self.offset).copied()
    }

    /// Return the next byte and advance the view
    pub fn next_byte(&mut self) -> Result<u8, WireError> {
        let bytes = self.next_bytes_fixed::<1>()?;

        Ok(bytes[0])
    }

    /// Returns the next slice of bytes and advances the view.
    pub fn next_bytes(&mut self, size: usize) -> Result<&'arr [u8], WireError> {
        match self.remaining() {
            r if r >= size => {
                let view = &self.slice[self.offset..self.offset + size];
                self.offset += size;
                Ok(view)
            }
            remaining => Err(WireError::UnexpectedEof {
                needed: size,
                remaining,
            }),
        }
    }

    /// Returns a copy of the next slice of bytes as a fixed-size array
    /// and advances the view.
    pub fn next_bytes_fixed<const ARR_SIZE: usize>(&mut self) -> Result<[u8; ARR_SIZE], WireError> {
        let view = self.next_bytes(ARR_SIZE)?;

        // next_bytes returned exactly ARR_SIZE bytes
        Ok(view.try_into().unwrap_or([0_u8; ARR_SIZE]))
    }

    /// Takes the next 8 bytes and parses them into a [ByteSizePrefix].
    /// Contiguous collections store their sizes at the start; this
    /// retrieves the size and advances the viewer.
    pub fn pop_size(&mut self) -> Result<ByteSizePrefix, WireError> {
        const NUM_BYTES: usize = std::mem::size_of::<ByteSizePrefix>();
        let size_bytes = self.next_bytes_fixed::<NUM_BYTES>()?;

        Ok(ByteSizePrefix::from_be_bytes(size_bytes))
    }
}

/// This wrapper contains implementations for accessing collections.
struct CollectionsAccessor<'a, 'de: 'a> {
    des: &'a mut GenericDeserializer<'de>,
    // checks the immediate byte for this terminating condition
    terminator: u8,
}

impl<'a, 'de> CollectionsAccessor<'a, 'de> {
    /// Create a new instance of the collections accessor
    pub fn from_deserializer(des: &'a mut GenericDeserializer<'de>, terminator: u8) -> Self {
        Self { des, terminator }
    }
}

impl<'a, 'de> SeqAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = WireError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        // stop at the sequence boundary
        if self.des.input.peek() == Some(self.terminator) {
            return Ok(None);
        }

        seed.deserialize(&mut *self.des).map(Some)
    }
}

impl<'a, 'de> MapAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = WireError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.des.input.peek() == Some(self.terminator) {
            return Ok(None);
        }

        expect_byte! {
            self.des.input, consts::MAP_ENTRY_OPEN => WireError::DelimiterNotFound(consts::MAP_ENTRY_OPEN as char)
        }

        seed.deserialize(&mut *self.des).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        expect_byte! {
            self.des.input, consts::MAP_ENTRY_MID => WireError::DelimiterNotFound(consts::MAP_ENTRY_MID as char)
        }

        let val = seed.deserialize(&mut *self.des)?;

        expect_byte! {
            self.des.input, consts::MAP_ENTRY_CLOSE => WireError::DelimiterNotFound(consts::MAP_ENTRY_CLOSE as char)
        }

        Ok(val)
    }
}

impl<'a, 'de> EnumAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = WireError;

    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        // the variant is identified by its serialized name
        let val = seed.deserialize(&mut *self.des)?;

        Ok((val, self))
    }
}

impl<'a, 'de> VariantAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = WireError;

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
        self.des.deserialize_tuple(len, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.des.deserialize_map(visitor)
    }
}
