//! Generic self-describing serialization, the backend of the fallback
//! object codec.
//!
//! Any type deriving [`serde::Serialize`]/[`serde::Deserialize`] can
//! pass through here. The format is prefix-tagged and self-describing,
//! so a blob can also be decoded without its originating type, into a
//! dynamic [`crate::marshal::Value`] tree.

use crate::err::WireError;

mod consts;
mod de;
mod ser;

pub use de::GenericDeserializer;
pub use ser::GenericSerializer;

/// Serialize a data structure to a vector of bytes
pub fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut serializer = GenericSerializer::default();

    value.serialize(&mut serializer)?;

    Ok(serializer.output)
}

/// Deserialize a data structure from a slice of bytes
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, WireError>
where
    T: for<'a> serde::Deserialize<'a>,
{
    let mut deserializer = GenericDeserializer::from_slice(bytes);

    T::deserialize(&mut deserializer)
}
