//! Last-resort generic object codec.
//!
//! Values whose runtime type never got a type number are serialized
//! through the self-describing generic codec and carried as a
//! length-prefixed blob under the `serialized` tag. The path is logged
//! on every use; registered types never take it.

use super::builtin;
use super::consts;
use super::tag;
use super::value::Value;
use super::Marshal;
use crate::cursor::ByteCursor;
use crate::err::WireError;
use crate::ser_de;

/// Encode a value with no registered type number.
///
/// A value that does not support generic serialization is replaced by a
/// null tag rather than aborting the surrounding encode.
pub(crate) fn encode_unregistered(
    cursor: &mut ByteCursor,
    value: &dyn Marshal,
) -> Result<(), WireError> {
    log::warn!(
        "no type number for {}, falling back to generic serialization",
        value.type_name()
    );

    match value.to_generic_bytes() {
        Ok(blob) => {
            tag::put_type_tag(cursor, consts::SERIALIZED)?;
            builtin::put_count(cursor, blob.len());
            cursor.put_bytes(&blob);
            Ok(())
        }
        Err(e) => {
            log::error!(
                "generic serialization of {} failed: {}, writing null",
                value.type_name(),
                e
            );
            tag::put_type_tag(cursor, consts::NULL)
        }
    }
}

/// Decode a `serialized` blob back into a dynamic value tree.
///
/// The concrete type is not resurrected; structs come back as maps of
/// their fields.
pub(crate) fn decode(cursor: &mut ByteCursor) -> Result<Value, WireError> {
    let count = builtin::get_count(cursor)?;
    let blob = cursor.get_bytes(count)?;

    ser_de::deserialize::<Value>(blob)
}
