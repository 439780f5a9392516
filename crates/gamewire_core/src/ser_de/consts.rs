//! Shared constants between serialization and deserialization logic.

/// All collection sizes are stored with this width.
pub type ByteSizePrefix = u64;

// types are prefixed with labels so that their type can be
// inferred/asserted during deserialization.

pub const PREFIX_BOOL: u8 = b'b';
pub const BOOL_TRUE: u8 = u8::MAX;
pub const BOOL_FALSE: u8 = u8::MIN;

pub const PREFIX_UNIT: u8 = b'u';

pub const PREFIX_STR: u8 = b's';

pub const PREFIX_BYTES: u8 = b'y';

pub const PREFIX_OPTIONAL: u8 = b'o';
pub const OPTION_SOME: u8 = u8::MAX;
pub const OPTION_NONE: u8 = u8::MIN;

/// Prefix for integers. All primitive integer types are serialized as
/// `u64` or `i64`, into big endian.
pub const PREFIX_NUM: u8 = b'n';

/// Prefix for floats, widened to `f64` big endian.
pub const PREFIX_FLOAT: u8 = b'f';

pub const PREFIX_ENUM: u8 = b'e';

/// Prefix for sequences like vectors
pub const PREFIX_SEQ: u8 = b'q';
/// Prefix for fixed-size sequences like tuples
pub const PREFIX_SEQ_CONST: u8 = b'c';
/// Prefix for maps and structs
pub const PREFIX_MAP: u8 = b'm';

// byte delimiters for collections

// sequences with an arbitrary number of elements
pub const SEQ_OPEN: u8 = b'[';
pub const SEQ_CLOSE: u8 = b']';

// sequences with a known number of elements
pub const SEQ_CONST_OPEN: u8 = b'(';
pub const SEQ_CONST_CLOSE: u8 = b')';

// maps with an arbitrary number of elements
pub const MAP_OPEN: u8 = b'{';
pub const MAP_CLOSE: u8 = b'}';

pub const MAP_ENTRY_OPEN: u8 = b'<';
pub const MAP_ENTRY_MID: u8 = b'-';
pub const MAP_ENTRY_CLOSE: u8 = b'>';
