//! Type number bands shared by the registry and the wire codec.
//!
//! Non-negative numbers are partitioned into the builtin atomic band,
//! the builtin aggregate band, the value-shorthand band (tags that carry
//! no payload), the two-byte escape band, and the open application band.
//! The negative band holds the primitive, non-nullable variants used
//! only by schema bookkeeping; they are never written to the wire.

pub type TypeNumber = i16;

// builtin atomic types

pub const BOOLEAN: TypeNumber = 1;
pub const BYTE: TypeNumber = 2;
pub const DOUBLE: TypeNumber = 3;
pub const FLOAT: TypeNumber = 4;
pub const INT: TypeNumber = 5;
pub const LONG: TypeNumber = 6;
pub const SHORT: TypeNumber = 7;
pub const STRING: TypeNumber = 8;

// builtin aggregate types

pub const LIST: TypeNumber = 9;
pub const DEQUE: TypeNumber = 10;
pub const MAP: TypeNumber = 11;
pub const ORDERED_MAP: TypeNumber = 12;
pub const SORTED_MAP: TypeNumber = 13;
pub const SET: TypeNumber = 14;
pub const ORDERED_SET: TypeNumber = 15;
pub const SORTED_SET: TypeNumber = 16;
pub const BYTE_ARRAY: TypeNumber = 17;
/// Marker for the generic serialized fallback blob.
pub const SERIALIZED: TypeNumber = 18;

// value-shorthand tags. The tag alone is the value.

pub const FALSE: TypeNumber = 19;
pub const TRUE: TypeNumber = 20;
pub const NULL: TypeNumber = 21;

// escape prefixes extending the one-byte tag space

pub const FIRST_EXPANSION: TypeNumber = 22;
pub const LAST_EXPANSION: TypeNumber = 25;

/// Last reserved number. Application types are assigned above this.
pub const LAST_BUILTIN: TypeNumber = LAST_EXPANSION;

/// First number handed out to application types.
pub const FIRST_GENERATED: TypeNumber = LAST_BUILTIN + 1;

/// Largest number expressible with the current escape band:
/// four pages of 256 values on top of the one-byte range.
pub const MAX_TYPE_NUMBER: TypeNumber =
    ((LAST_EXPANSION - FIRST_EXPANSION + 1) << 8) | 0xFF;

// primitive, non-nullable variants. Registration bookkeeping only.

pub const PRIM_BOOLEAN: TypeNumber = -1;
pub const PRIM_BYTE: TypeNumber = -2;
pub const PRIM_DOUBLE: TypeNumber = -3;
pub const PRIM_FLOAT: TypeNumber = -4;
pub const PRIM_INT: TypeNumber = -5;
pub const PRIM_LONG: TypeNumber = -6;
pub const PRIM_SHORT: TypeNumber = -7;

/// Stable names under which the builtins are pre-registered.
pub(crate) const BUILTIN_NAMES: &[(TypeNumber, &str)] = &[
    (BOOLEAN, "boolean"),
    (BYTE, "byte"),
    (DOUBLE, "double"),
    (FLOAT, "float"),
    (INT, "int"),
    (LONG, "long"),
    (SHORT, "short"),
    (STRING, "string"),
    (LIST, "list"),
    (DEQUE, "deque"),
    (MAP, "map"),
    (ORDERED_MAP, "ordered_map"),
    (SORTED_MAP, "sorted_map"),
    (SET, "set"),
    (ORDERED_SET, "ordered_set"),
    (SORTED_SET, "sorted_set"),
    (BYTE_ARRAY, "byte_array"),
    (SERIALIZED, "serialized"),
];
