//! Dynamic value tree covering every wire-encodable shape.
//!
//! [`Value`] is the runtime surface of `marshal_object`/`unmarshal_object`:
//! one variant per builtin atomic and aggregate type, plus `Object` for
//! registered application types behind the [`Marshal`] trait.
//!
//! Equality, hashing and ordering are total and hand-defined so values
//! can be used as map keys and set elements:
//! - floats compare and hash by bit pattern (ordering via `total_cmp`),
//! - unordered and insertion-ordered containers compare content-wise,
//!   ignoring iteration order, and hash order-independently,
//! - objects compare through their generated equality hook; in sorted
//!   containers they order by type name, then by their `Debug` rendering,
//!   so types used as sorted keys should keep a derived, value-complete
//!   `Debug` impl.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};
use serde::de::{self, Visitor};
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};

use super::Marshal;
use crate::err::WireError;

/// A single marshallable value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    List(Vec<Value>),
    Deque(VecDeque<Value>),
    Map(HashMap<Value, Value>),
    OrderedMap(IndexMap<Value, Value>),
    SortedMap(BTreeMap<Value, Value>),
    Set(HashSet<Value>),
    OrderedSet(IndexSet<Value>),
    SortedSet(BTreeSet<Value>),
    Bytes(Vec<u8>),
    Object(Box<dyn Marshal>),
}

impl Value {
    /// Box an application type instance into a value.
    pub fn object<T: Marshal>(value: T) -> Self {
        Self::Object(Box::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Marshal> {
        match self {
            Self::Object(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    /// Borrow the contained object as a concrete type.
    pub fn downcast_ref<T: Marshal>(&self) -> Option<&T> {
        self.as_object()?.as_any().downcast_ref::<T>()
    }

    /// Take the contained object out as a concrete type.
    pub fn into_object<T: Marshal>(self) -> Result<T, WireError> {
        let wrong_type = || WireError::WrongType {
            expected: std::any::type_name::<T>(),
        };

        match self {
            Self::Object(obj) => obj
                .into_any()
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| wrong_type()),
            _ => Err(wrong_type()),
        }
    }

    /// Variant rank, used to order values of different kinds.
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Byte(_) => 2,
            Self::Short(_) => 3,
            Self::Int(_) => 4,
            Self::Long(_) => 5,
            Self::Float(_) => 6,
            Self::Double(_) => 7,
            Self::Str(_) => 8,
            Self::List(_) => 9,
            Self::Deque(_) => 10,
            Self::Map(_) => 11,
            Self::OrderedMap(_) => 12,
            Self::SortedMap(_) => 13,
            Self::Set(_) => 14,
            Self::OrderedSet(_) => 15,
            Self::SortedSet(_) => 16,
            Self::Bytes(_) => 17,
            Self::Object(_) => 18,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Deque(a), Deque(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (OrderedMap(a), OrderedMap(b)) => a == b,
            (SortedMap(a), SortedMap(b)) => a == b,
            (Set(a), Set(b)) => a == b,
            (OrderedSet(a), OrderedSet(b)) => a == b,
            (SortedSet(a), SortedSet(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Object(a), Object(b)) => a.eq_boxed(b.as_ref()),
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Standalone hash of one value, for order-independent combination.
fn entry_hash(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn unordered_entries_hash<'a, I>(entries: I) -> u64
where
    I: Iterator<Item = (&'a Value, &'a Value)>,
{
    entries
        .map(|(k, v)| entry_hash(k).wrapping_add(entry_hash(v).rotate_left(17)))
        .fold(0_u64, u64::wrapping_add)
}

fn unordered_elems_hash<'a, I>(elems: I) -> u64
where
    I: Iterator<Item = &'a Value>,
{
    elems.map(entry_hash).fold(0_u64, u64::wrapping_add)
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use Value::*;

        self.rank().hash(state);

        match self {
            Null => {}
            Bool(v) => v.hash(state),
            Byte(v) => v.hash(state),
            Short(v) => v.hash(state),
            Int(v) => v.hash(state),
            Long(v) => v.hash(state),
            Float(v) => v.to_bits().hash(state),
            Double(v) => v.to_bits().hash(state),
            Str(v) => v.hash(state),
            List(v) => v.hash(state),
            Deque(v) => v.hash(state),
            // content equality ignores iteration order, so the hash must too
            Map(m) => state.write_u64(unordered_entries_hash(m.iter())),
            OrderedMap(m) => state.write_u64(unordered_entries_hash(m.iter())),
            SortedMap(m) => {
                for (k, v) in m {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Set(s) => state.write_u64(unordered_elems_hash(s.iter())),
            OrderedSet(s) => state.write_u64(unordered_elems_hash(s.iter())),
            SortedSet(s) => {
                for v in s {
                    v.hash(state);
                }
            }
            Bytes(v) => v.hash(state),
            Object(o) => o.type_name().hash(state),
        }
    }
}

fn cmp_sorted_entries<'a, A, B>(a: A, b: B) -> Ordering
where
    A: Iterator<Item = (&'a Value, &'a Value)>,
    B: Iterator<Item = (&'a Value, &'a Value)>,
{
    a.cmp(b)
}

/// Compare unordered entry sets by sorting both sides first.
fn cmp_unordered_entries<'a, A, B>(a: A, b: B) -> Ordering
where
    A: Iterator<Item = (&'a Value, &'a Value)>,
    B: Iterator<Item = (&'a Value, &'a Value)>,
{
    let mut left: Vec<_> = a.collect();
    let mut right: Vec<_> = b.collect();
    left.sort();
    right.sort();

    left.cmp(&right)
}

fn cmp_unordered_elems<'a, A, B>(a: A, b: B) -> Ordering
where
    A: Iterator<Item = &'a Value>,
    B: Iterator<Item = &'a Value>,
{
    let mut left: Vec<_> = a.collect();
    let mut right: Vec<_> = b.collect();
    left.sort();
    right.sort();

    left.cmp(&right)
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Byte(a), Byte(b)) => a.cmp(b),
            (Short(a), Short(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Long(a), Long(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Double(a), Double(b)) => a.total_cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            (Deque(a), Deque(b)) => a.iter().cmp(b.iter()),
            (Map(a), Map(b)) => cmp_unordered_entries(a.iter(), b.iter()),
            (OrderedMap(a), OrderedMap(b)) => cmp_unordered_entries(a.iter(), b.iter()),
            (SortedMap(a), SortedMap(b)) => cmp_sorted_entries(a.iter(), b.iter()),
            (Set(a), Set(b)) => cmp_unordered_elems(a.iter(), b.iter()),
            (OrderedSet(a), OrderedSet(b)) => cmp_unordered_elems(a.iter(), b.iter()),
            (SortedSet(a), SortedSet(b)) => a.iter().cmp(b.iter()),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            (Object(a), Object(b)) => match a.type_name().cmp(b.type_name()) {
                Ordering::Equal if a.eq_boxed(b.as_ref()) => Ordering::Equal,
                Ordering::Equal => format!("{:?}", a).cmp(&format!("{:?}", b)),
                unequal => unequal,
            },
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

macro_rules! value_from {
    ($from_type:ty => $variant:ident) => {
        impl From<$from_type> for Value {
            fn from(v: $from_type) -> Self {
                Self::$variant(v)
            }
        }
    };
}

value_from! {bool => Bool}
value_from! {i8 => Byte}
value_from! {i16 => Short}
value_from! {i32 => Int}
value_from! {i64 => Long}
value_from! {f32 => Float}
value_from! {f64 => Double}
value_from! {String => Str}
value_from! {Vec<Value> => List}
value_from! {VecDeque<Value> => Deque}
value_from! {HashMap<Value, Value> => Map}
value_from! {IndexMap<Value, Value> => OrderedMap}
value_from! {BTreeMap<Value, Value> => SortedMap}
value_from! {HashSet<Value> => Set}
value_from! {IndexSet<Value> => OrderedSet}
value_from! {BTreeSet<Value> => SortedSet}
value_from! {Vec<u8> => Bytes}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

// Serde support so value trees can pass through the generic codec.
// Objects cannot: they only exist through the registry codec.

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Byte(v) => serializer.serialize_i8(*v),
            Self::Short(v) => serializer.serialize_i16(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::List(v) => serializer.collect_seq(v),
            Self::Deque(v) => serializer.collect_seq(v),
            Self::Map(v) => serializer.collect_map(v),
            Self::OrderedMap(v) => serializer.collect_map(v),
            Self::SortedMap(v) => serializer.collect_map(v),
            Self::Set(v) => serializer.collect_seq(v),
            Self::OrderedSet(v) => serializer.collect_seq(v),
            Self::SortedSet(v) => serializer.collect_seq(v),
            Self::Bytes(v) => serializer.serialize_bytes(v),
            Self::Object(o) => Err(S::Error::custom(format!(
                "object value {} requires the registry codec",
                o.type_name()
            ))),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "any wire value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Long(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Long(v as i64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Bytes(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }

        Ok(Value::List(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut entries = HashMap::new();
        while let Some((key, value)) = map.next_entry()? {
            entries.insert(key, value);
        }

        Ok(Value::Map(entries))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_membership_ignores_insertion_order() {
        let a: HashSet<Value> = ["a", "b", "c"].into_iter().map(Value::from).collect();
        let b: HashSet<Value> = ["c", "a", "b"].into_iter().map(Value::from).collect();

        assert_eq!(Value::Set(a), Value::Set(b));
    }

    #[test]
    fn test_float_keys() {
        let mut map = HashMap::new();
        map.insert(Value::from(1.5_f64), Value::from("edge"));

        assert_eq!(map.get(&Value::from(1.5_f64)).unwrap(), &Value::from("edge"));
        assert_eq!(map.get(&Value::from(2.5_f64)), None);
    }

    #[test]
    fn test_ordered_map_equality_is_content_based() {
        let mut a = IndexMap::new();
        a.insert(Value::from(1), Value::from("x"));
        a.insert(Value::from(2), Value::from("y"));

        let mut b = IndexMap::new();
        b.insert(Value::from(2), Value::from("y"));
        b.insert(Value::from(1), Value::from("x"));

        assert_eq!(Value::OrderedMap(a.clone()), Value::OrderedMap(b.clone()));
        assert_eq!(
            Value::OrderedMap(a).cmp(&Value::OrderedMap(b)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_sorted_set_of_mixed_kinds() {
        let mut sorted = BTreeSet::new();
        sorted.insert(Value::from("zebra"));
        sorted.insert(Value::from(7));
        sorted.insert(Value::Null);

        let order: Vec<_> = sorted.into_iter().collect();
        assert_eq!(
            order,
            vec![Value::Null, Value::from(7), Value::from("zebra")]
        );
    }

    #[test]
    fn test_null_is_default() {
        assert!(Value::default().is_null());
    }
}
