//! Per-type field schemas captured at compile time.
//!
//! The derive macro records every declared field, in declaration order,
//! into a `TypeSchema`. The registry keeps these for the completeness
//! checks that run before it freezes; the flag-bit layout of the struct
//! codec follows the same field order.

use super::consts::{self, TypeNumber};

/// Declared shape of one registered application type.
#[derive(Debug, Clone, Copy)]
pub struct TypeSchema {
    pub name: &'static str,

    /// Name of the registered base type whose fields are encoded first.
    pub base: Option<&'static str>,

    /// Declared fields, in declaration order.
    pub fields: &'static [FieldSchema],
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,

    /// Declared inside `Option`. A primitive scalar field becomes
    /// nullable this way, moving it from the negative band to its
    /// positive builtin number.
    pub optional: bool,
}

impl FieldSchema {
    pub fn is_null_testable(&self) -> bool {
        self.optional || self.kind.is_null_testable()
    }
}

/// Static type category of a declared field.
///
/// The two illegal kinds cannot be produced by the derive macro (the
/// trait system rejects them first), but hand-built schemas can carry
/// them and the validation pass rejects them with a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Str,
    Bytes,
    List,
    Deque,
    Map,
    OrderedMap,
    SortedMap,
    Set,
    OrderedSet,
    SortedSet,

    /// Dynamic `Value` field, dispatched on the runtime type.
    Any,

    /// Reference to a registered type, by name.
    Ref(&'static str),

    /// Array of a primitive other than byte. Not expressible on the wire.
    PrimitiveArray(&'static str),

    /// Enumeration field. Not supported.
    Enum(&'static str),
}

impl FieldKind {
    /// Resolved wire type number for this kind, when it has one without
    /// consulting the registry. Primitive scalars map into the negative
    /// non-nullable band.
    pub fn type_number(&self) -> Option<TypeNumber> {
        match self {
            Self::Bool => Some(consts::PRIM_BOOLEAN),
            Self::Byte => Some(consts::PRIM_BYTE),
            Self::Short => Some(consts::PRIM_SHORT),
            Self::Int => Some(consts::PRIM_INT),
            Self::Long => Some(consts::PRIM_LONG),
            Self::Float => Some(consts::PRIM_FLOAT),
            Self::Double => Some(consts::PRIM_DOUBLE),
            Self::Str => Some(consts::STRING),
            Self::Bytes => Some(consts::BYTE_ARRAY),
            Self::List => Some(consts::LIST),
            Self::Deque => Some(consts::DEQUE),
            Self::Map => Some(consts::MAP),
            Self::OrderedMap => Some(consts::ORDERED_MAP),
            Self::SortedMap => Some(consts::SORTED_MAP),
            Self::Set => Some(consts::SET),
            Self::OrderedSet => Some(consts::ORDERED_SET),
            Self::SortedSet => Some(consts::SORTED_SET),
            Self::Any | Self::Ref(_) | Self::PrimitiveArray(_) | Self::Enum(_) => None,
        }
    }

    /// Whether the field takes a presence flag bit. Primitive scalars
    /// (the negative band) never do.
    pub fn is_null_testable(&self) -> bool {
        self.type_number().map_or(true, |n| n >= 0)
    }

    pub fn is_legal(&self) -> bool {
        !matches!(self, Self::PrimitiveArray(_) | Self::Enum(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_scalars_are_not_null_testable() {
        for kind in [
            FieldKind::Bool,
            FieldKind::Byte,
            FieldKind::Short,
            FieldKind::Int,
            FieldKind::Long,
            FieldKind::Float,
            FieldKind::Double,
        ] {
            assert!(kind.type_number().unwrap() < 0);
            assert!(!kind.is_null_testable());
        }
    }

    #[test]
    fn test_reference_kinds_are_null_testable() {
        assert!(FieldKind::Str.is_null_testable());
        assert!(FieldKind::List.is_null_testable());
        assert!(FieldKind::Any.is_null_testable());
        assert!(FieldKind::Ref("Entity").is_null_testable());
    }

    /// Wrapping a primitive in `Option` makes it nullable.
    #[test]
    fn test_optional_primitive_is_null_testable() {
        let field = FieldSchema {
            name: "charges",
            kind: FieldKind::Int,
            optional: true,
        };

        assert!(field.is_null_testable());
        assert!(!FieldKind::Int.is_null_testable());
    }

    #[test]
    fn test_illegal_kinds() {
        assert!(!FieldKind::PrimitiveArray("i32").is_legal());
        assert!(!FieldKind::Enum("Color").is_legal());
        assert!(FieldKind::Bytes.is_legal());
    }
}
