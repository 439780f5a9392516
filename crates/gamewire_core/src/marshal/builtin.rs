//! Encode/decode routines for the builtin atomic and aggregate types.
//!
//! The `put_*`/`get_*` pairs here are also the field-level codec used by
//! generated struct marshallers: a field statically typed as one of the
//! aggregate containers is written untagged through the matching pair,
//! while its elements go through the fully tagged recursive codec.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};

use super::consts::{self, TypeNumber};
use super::registry::Registry;
use super::value::Value;
use super::{marshal_object, unmarshal_object};
use crate::cursor::ByteCursor;
use crate::err::WireError;

/// Write a 4-byte element count.
pub(crate) fn put_count(cursor: &mut ByteCursor, len: usize) {
    cursor.put_i32(len as i32);
}

/// Read a 4-byte element count, rejecting negatives.
pub(crate) fn get_count(cursor: &mut ByteCursor) -> Result<usize, WireError> {
    let count = cursor.get_i32()?;

    match count {
        c if c < 0 => Err(WireError::NegativeCount(c)),
        c => Ok(c as usize),
    }
}

fn put_elements<'a, I>(
    registry: &Registry,
    cursor: &mut ByteCursor,
    len: usize,
    elements: I,
) -> Result<(), WireError>
where
    I: Iterator<Item = &'a Value>,
{
    put_count(cursor, len);
    for element in elements {
        marshal_object(registry, cursor, element)?;
    }

    Ok(())
}

fn put_entries<'a, I>(
    registry: &Registry,
    cursor: &mut ByteCursor,
    len: usize,
    entries: I,
) -> Result<(), WireError>
where
    I: Iterator<Item = (&'a Value, &'a Value)>,
{
    put_count(cursor, len);
    for (key, value) in entries {
        marshal_object(registry, cursor, key)?;
        marshal_object(registry, cursor, value)?;
    }

    Ok(())
}

pub fn put_list(
    registry: &Registry,
    cursor: &mut ByteCursor,
    items: &[Value],
) -> Result<(), WireError> {
    put_elements(registry, cursor, items.len(), items.iter())
}

pub fn get_list(registry: &Registry, cursor: &mut ByteCursor) -> Result<Vec<Value>, WireError> {
    let count = get_count(cursor)?;

    let mut items = Vec::new();
    for _ in 0..count {
        items.push(unmarshal_object(registry, cursor)?);
    }

    Ok(items)
}

pub fn put_deque(
    registry: &Registry,
    cursor: &mut ByteCursor,
    items: &VecDeque<Value>,
) -> Result<(), WireError> {
    put_elements(registry, cursor, items.len(), items.iter())
}

pub fn get_deque(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<VecDeque<Value>, WireError> {
    let count = get_count(cursor)?;

    let mut items = VecDeque::new();
    for _ in 0..count {
        items.push_back(unmarshal_object(registry, cursor)?);
    }

    Ok(items)
}

pub fn put_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
    entries: &HashMap<Value, Value>,
) -> Result<(), WireError> {
    put_entries(registry, cursor, entries.len(), entries.iter())
}

pub fn get_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<HashMap<Value, Value>, WireError> {
    let count = get_count(cursor)?;

    let mut entries = HashMap::new();
    for _ in 0..count {
        let key = unmarshal_object(registry, cursor)?;
        let value = unmarshal_object(registry, cursor)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

pub fn put_ordered_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
    entries: &IndexMap<Value, Value>,
) -> Result<(), WireError> {
    put_entries(registry, cursor, entries.len(), entries.iter())
}

pub fn get_ordered_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<IndexMap<Value, Value>, WireError> {
    let count = get_count(cursor)?;

    let mut entries = IndexMap::new();
    for _ in 0..count {
        let key = unmarshal_object(registry, cursor)?;
        let value = unmarshal_object(registry, cursor)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

pub fn put_sorted_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
    entries: &BTreeMap<Value, Value>,
) -> Result<(), WireError> {
    put_entries(registry, cursor, entries.len(), entries.iter())
}

pub fn get_sorted_map(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<BTreeMap<Value, Value>, WireError> {
    let count = get_count(cursor)?;

    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let key = unmarshal_object(registry, cursor)?;
        let value = unmarshal_object(registry, cursor)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

pub fn put_set(
    registry: &Registry,
    cursor: &mut ByteCursor,
    items: &HashSet<Value>,
) -> Result<(), WireError> {
    put_elements(registry, cursor, items.len(), items.iter())
}

pub fn get_set(registry: &Registry, cursor: &mut ByteCursor) -> Result<HashSet<Value>, WireError> {
    let count = get_count(cursor)?;

    let mut items = HashSet::new();
    for _ in 0..count {
        items.insert(unmarshal_object(registry, cursor)?);
    }

    Ok(items)
}

pub fn put_ordered_set(
    registry: &Registry,
    cursor: &mut ByteCursor,
    items: &IndexSet<Value>,
) -> Result<(), WireError> {
    put_elements(registry, cursor, items.len(), items.iter())
}

pub fn get_ordered_set(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<IndexSet<Value>, WireError> {
    let count = get_count(cursor)?;

    let mut items = IndexSet::new();
    for _ in 0..count {
        items.insert(unmarshal_object(registry, cursor)?);
    }

    Ok(items)
}

pub fn put_sorted_set(
    registry: &Registry,
    cursor: &mut ByteCursor,
    items: &BTreeSet<Value>,
) -> Result<(), WireError> {
    put_elements(registry, cursor, items.len(), items.iter())
}

pub fn get_sorted_set(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<BTreeSet<Value>, WireError> {
    let count = get_count(cursor)?;

    let mut items = BTreeSet::new();
    for _ in 0..count {
        items.insert(unmarshal_object(registry, cursor)?);
    }

    Ok(items)
}

/// Byte arrays carry no per-element tags: count, then raw bytes.
pub fn put_byte_array(cursor: &mut ByteCursor, bytes: &[u8]) {
    put_count(cursor, bytes.len());
    cursor.put_bytes(bytes);
}

pub fn get_byte_array(cursor: &mut ByteCursor) -> Result<Vec<u8>, WireError> {
    let count = get_count(cursor)?;

    Ok(cursor.get_bytes(count)?.to_vec())
}

/// Decode the payload of a builtin tag already read off the wire.
/// The shorthand band never reaches this point.
pub(crate) fn decode_builtin(
    registry: &Registry,
    cursor: &mut ByteCursor,
    number: TypeNumber,
) -> Result<Value, WireError> {
    match number {
        consts::BOOLEAN => Ok(Value::Bool(cursor.get_u8()? != 0)),
        consts::BYTE => Ok(Value::Byte(cursor.get_i8()?)),
        consts::DOUBLE => Ok(Value::Double(cursor.get_f64()?)),
        consts::FLOAT => Ok(Value::Float(cursor.get_f32()?)),
        consts::INT => Ok(Value::Int(cursor.get_i32()?)),
        consts::LONG => Ok(Value::Long(cursor.get_i64()?)),
        consts::SHORT => Ok(Value::Short(cursor.get_i16()?)),
        consts::STRING => Ok(Value::Str(cursor.get_str()?)),
        consts::LIST => get_list(registry, cursor).map(Value::List),
        consts::DEQUE => get_deque(registry, cursor).map(Value::Deque),
        consts::MAP => get_map(registry, cursor).map(Value::Map),
        consts::ORDERED_MAP => get_ordered_map(registry, cursor).map(Value::OrderedMap),
        consts::SORTED_MAP => get_sorted_map(registry, cursor).map(Value::SortedMap),
        consts::SET => get_set(registry, cursor).map(Value::Set),
        consts::ORDERED_SET => get_ordered_set(registry, cursor).map(Value::OrderedSet),
        consts::SORTED_SET => get_sorted_set(registry, cursor).map(Value::SortedSet),
        consts::BYTE_ARRAY => get_byte_array(cursor).map(Value::Bytes),
        _ => Err(WireError::UnknownTypeNumber(number)),
    }
}
