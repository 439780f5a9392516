//! Runtime marshalling for the gamewire server platform.
//!
//! Converts in-memory game values to and from the compact binary wire
//! format: every serializable type owns a stable small type number, and
//! struct encode/decode pairs are generated by `#[derive(Marshal)]`
//! rather than written by hand.
//!
//! The pieces:
//! - [`marshal::Registry`]: name/number assignment, marshaller binding,
//!   completeness validation, freeze.
//! - [`marshal::marshal_object`] / [`marshal::unmarshal_object`]: the
//!   tagged codec over a [`cursor::ByteCursor`].
//! - [`ser_de`]: the generic self-describing codec backing the
//!   last-resort fallback for unregistered types.

pub mod cursor;
pub mod err;
pub mod marshal;
pub mod ser_de;

pub use cursor::ByteCursor;
pub use err::WireError;
pub use marshal::builtin;
pub use marshal::{
    consts, get_type_tag, marshal_object, marshal_ref, put_type_tag, unmarshal_object,
    ClassProperties, FieldKind, FieldSchema, FlagReader, FlagWriter, Marshal, Marshaller, Registry,
    TypeNumber, TypeSchema, ValidationReport, Value, Violation, WireDecode, WireType,
};

/// Derive for the marshalling capability.
pub use gamewire_macros::Marshal;
