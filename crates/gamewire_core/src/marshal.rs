//! Marshalling runtime: dynamic values, the type registry, and the
//! wire codec dispatch.
//!
//! Startup populates a [`Registry`] (builtins first, application types
//! from a declarative list), binds a marshaller to every registered
//! type, and calls [`Registry::validate_and_freeze`]. After that,
//! [`marshal_object`] and [`unmarshal_object`] are pure functions over
//! a caller-owned [`ByteCursor`] and may run from any number of threads.

pub mod builtin;
pub mod consts;
mod fallback;
mod flags;
mod registry;
mod schema;
mod tag;
mod validate;
mod value;

use std::any::Any;
use std::fmt::Debug;

pub use consts::TypeNumber;
pub use flags::{FlagReader, FlagWriter};
pub use registry::{ClassProperties, Marshaller, Registry};
pub use schema::{FieldKind, FieldSchema, TypeSchema};
pub use tag::{get_type_tag, put_type_tag};
pub use validate::{ValidationReport, Violation};
pub use value::Value;

use crate::cursor::ByteCursor;
use crate::err::WireError;

/// The marshalling capability: every registered application type
/// carries this, generated by `#[derive(Marshal)]` or hand-written.
///
/// `encode_fields` writes the field bodies only; the type tag is the
/// dispatcher's job. Types with a base type write the base's fields
/// first.
pub trait Marshal: Any + Debug + Send + Sync {
    /// Stable type identifier, the registry key. Not tied to the live
    /// Rust type path.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_boxed(&self) -> Box<dyn Marshal>;

    fn eq_boxed(&self, other: &dyn Marshal) -> bool;

    /// Write this instance's fields: base-type fields, presence flags,
    /// then the present field bodies in declaration order.
    fn encode_fields(&self, registry: &Registry, cursor: &mut ByteCursor)
        -> Result<(), WireError>;

    /// Serialize through the generic fallback codec. Types opt in with
    /// `#[wire(serde)]`; everything else reports no capability.
    fn to_generic_bytes(&self) -> Result<Vec<u8>, WireError> {
        Err(WireError::NotGenericSerializable(self.type_name()))
    }
}

impl Clone for Box<dyn Marshal> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Compile-time registration record for a type: its stable name and
/// declared field schema.
pub trait WireType {
    const NAME: &'static str;
    const SCHEMA: TypeSchema;
}

/// Decode half of the marshalling capability.
pub trait WireDecode: Marshal + Default + Sized {
    /// Fill this instance's fields from the cursor, mirroring
    /// [`Marshal::encode_fields`] exactly.
    fn decode_fields(&mut self, registry: &Registry, cursor: &mut ByteCursor)
        -> Result<(), WireError>;

    /// Decode a fresh instance. The returned value may be a substituted
    /// canonical instance rather than the one that was filled; callers
    /// must always use the return value.
    fn decode(registry: &Registry, cursor: &mut ByteCursor) -> Result<Self, WireError> {
        let mut value = Self::default();
        value.decode_fields(registry, cursor)?;

        Ok(value)
    }
}

/// Marshal any value: type tag, then payload.
pub fn marshal_object(
    registry: &Registry,
    cursor: &mut ByteCursor,
    value: &Value,
) -> Result<(), WireError> {
    registry.ensure_frozen()?;

    match value {
        Value::Null => put_type_tag(cursor, consts::NULL),

        // standalone booleans are tag-only
        Value::Bool(true) => put_type_tag(cursor, consts::TRUE),
        Value::Bool(false) => put_type_tag(cursor, consts::FALSE),

        Value::Byte(v) => {
            put_type_tag(cursor, consts::BYTE)?;
            cursor.put_i8(*v);
            Ok(())
        }
        Value::Short(v) => {
            put_type_tag(cursor, consts::SHORT)?;
            cursor.put_i16(*v);
            Ok(())
        }
        Value::Int(v) => {
            put_type_tag(cursor, consts::INT)?;
            cursor.put_i32(*v);
            Ok(())
        }
        Value::Long(v) => {
            put_type_tag(cursor, consts::LONG)?;
            cursor.put_i64(*v);
            Ok(())
        }
        Value::Float(v) => {
            put_type_tag(cursor, consts::FLOAT)?;
            cursor.put_f32(*v);
            Ok(())
        }
        Value::Double(v) => {
            put_type_tag(cursor, consts::DOUBLE)?;
            cursor.put_f64(*v);
            Ok(())
        }
        Value::Str(v) => {
            put_type_tag(cursor, consts::STRING)?;
            cursor.put_str(v);
            Ok(())
        }
        Value::List(v) => {
            put_type_tag(cursor, consts::LIST)?;
            builtin::put_list(registry, cursor, v)
        }
        Value::Deque(v) => {
            put_type_tag(cursor, consts::DEQUE)?;
            builtin::put_deque(registry, cursor, v)
        }
        Value::Map(v) => {
            put_type_tag(cursor, consts::MAP)?;
            builtin::put_map(registry, cursor, v)
        }
        Value::OrderedMap(v) => {
            put_type_tag(cursor, consts::ORDERED_MAP)?;
            builtin::put_ordered_map(registry, cursor, v)
        }
        Value::SortedMap(v) => {
            put_type_tag(cursor, consts::SORTED_MAP)?;
            builtin::put_sorted_map(registry, cursor, v)
        }
        Value::Set(v) => {
            put_type_tag(cursor, consts::SET)?;
            builtin::put_set(registry, cursor, v)
        }
        Value::OrderedSet(v) => {
            put_type_tag(cursor, consts::ORDERED_SET)?;
            builtin::put_ordered_set(registry, cursor, v)
        }
        Value::SortedSet(v) => {
            put_type_tag(cursor, consts::SORTED_SET)?;
            builtin::put_sorted_set(registry, cursor, v)
        }
        Value::Bytes(v) => {
            put_type_tag(cursor, consts::BYTE_ARRAY)?;
            builtin::put_byte_array(cursor, v);
            Ok(())
        }
        Value::Object(obj) => marshal_ref(registry, cursor, obj.as_ref()),
    }
}

/// Marshal a registered object reference: dynamic type tag, then the
/// bound marshaller's encoding. Unregistered runtime types degrade to
/// the generic fallback.
pub fn marshal_ref(
    registry: &Registry,
    cursor: &mut ByteCursor,
    value: &dyn Marshal,
) -> Result<(), WireError> {
    registry.ensure_frozen()?;

    match registry.lookup_number(value.type_name()) {
        Some(number) => {
            put_type_tag(cursor, number)?;

            let marshaller = registry
                .marshaller(number)
                .ok_or_else(|| WireError::NotBound(value.type_name().to_owned()))?;

            (marshaller.encode)(registry, cursor, value)
        }
        None => fallback::encode_unregistered(cursor, value),
    }
}

/// Unmarshal the next value: read the type tag and dispatch.
pub fn unmarshal_object(registry: &Registry, cursor: &mut ByteCursor) -> Result<Value, WireError> {
    registry.ensure_frozen()?;

    let number = get_type_tag(cursor)?;

    match number {
        consts::NULL => Ok(Value::Null),
        consts::TRUE => Ok(Value::Bool(true)),
        consts::FALSE => Ok(Value::Bool(false)),
        consts::SERIALIZED => fallback::decode(cursor),
        n if Registry::is_builtin(n) => builtin::decode_builtin(registry, cursor, n),
        n => {
            let marshaller = registry.marshaller(n).ok_or_else(|| {
                match registry.lookup_name(n) {
                    Some(name) => WireError::NotBound(name.to_owned()),
                    None => WireError::UnknownTypeNumber(n),
                }
            })?;

            (marshaller.decode)(registry, cursor).map(Value::Object)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Hand-written marshalling capability, the non-generated path.
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Blip {
        charge: i32,
        label: String,
    }

    impl WireType for Blip {
        const NAME: &'static str = "Blip";
        const SCHEMA: TypeSchema = TypeSchema {
            name: "Blip",
            base: None,
            fields: &[
                FieldSchema {
                    name: "charge",
                    kind: FieldKind::Int,
                    optional: false,
                },
                FieldSchema {
                    name: "label",
                    kind: FieldKind::Str,
                    optional: false,
                },
            ],
        };
    }

    impl Marshal for Blip {
        fn type_name(&self) -> &'static str {
            Self::NAME
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }

        fn clone_boxed(&self) -> Box<dyn Marshal> {
            Box::new(self.clone())
        }

        fn eq_boxed(&self, other: &dyn Marshal) -> bool {
            other
                .as_any()
                .downcast_ref::<Self>()
                .map_or(false, |o| self == o)
        }

        fn encode_fields(
            &self,
            _registry: &Registry,
            cursor: &mut ByteCursor,
        ) -> Result<(), WireError> {
            let mut flags = FlagWriter::default();
            flags.push(!self.label.is_empty());
            flags.write(cursor);

            cursor.put_i32(self.charge);
            if !self.label.is_empty() {
                cursor.put_str(&self.label);
            }

            Ok(())
        }
    }

    impl WireDecode for Blip {
        fn decode_fields(
            &mut self,
            _registry: &Registry,
            cursor: &mut ByteCursor,
        ) -> Result<(), WireError> {
            let flags = FlagReader::read(cursor, 1)?;

            self.charge = cursor.get_i32()?;
            if flags.get(0) {
                self.label = cursor.get_str()?;
            }

            Ok(())
        }
    }

    fn test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register::<Blip>(None).unwrap();
        registry.bind::<Blip>().unwrap();
        registry.validate_and_freeze().unwrap();

        registry
    }

    fn roundtrip(registry: &Registry, value: &Value) -> Value {
        let mut cursor = ByteCursor::new();
        marshal_object(registry, &mut cursor, value).unwrap();

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let back = unmarshal_object(registry, &mut cursor).unwrap();
        assert!(cursor.at_end());

        back
    }

    /// A standalone boolean is exactly one byte: its tag.
    #[test]
    fn test_standalone_booleans() {
        let registry = test_registry();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::Bool(true)).unwrap();
        assert_eq!(cursor.as_slice(), &[consts::TRUE as u8]);

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::Bool(false)).unwrap();
        assert_eq!(cursor.as_slice(), &[consts::FALSE as u8]);

        assert_eq!(roundtrip(&registry, &Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_standalone_null() {
        let registry = test_registry();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::Null).unwrap();
        assert_eq!(cursor.as_slice(), &[consts::NULL as u8]);
    }

    #[test]
    fn test_atomic_layout() {
        let registry = test_registry();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::Int(3)).unwrap();
        assert_eq!(cursor.as_slice(), &[consts::INT as u8, 0, 0, 0, 3]);
    }

    #[test]
    fn test_atomic_roundtrips() {
        let registry = test_registry();

        for value in [
            Value::Byte(-5),
            Value::Short(1000),
            Value::Int(-70_000),
            Value::Long(1 << 40),
            Value::Float(0.25),
            Value::Double(-2.5e10),
            Value::Str("overworld".to_owned()),
            Value::Bytes(vec![0, 1, 2, 255]),
        ] {
            assert_eq!(roundtrip(&registry, &value), value);
        }
    }

    /// A two-element string set: tag, count, self-tagged entries.
    /// Entry order on the wire is unspecified; equality is not.
    #[test]
    fn test_string_set() {
        let registry = test_registry();

        let set: HashSet<Value> = [Value::from("a"), Value::from("b")].into_iter().collect();
        let value = Value::Set(set);

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &value).unwrap();

        let bytes = cursor.as_slice();
        assert_eq!(bytes[0], consts::SET as u8);
        assert_eq!(&bytes[1..5], &[0, 0, 0, 2]);

        let mut cursor = ByteCursor::from_bytes(bytes.to_vec());
        assert_eq!(unmarshal_object(&registry, &mut cursor).unwrap(), value);
    }

    /// Heterogeneous elements keep their concrete runtime types.
    #[test]
    fn test_heterogeneous_list() {
        let registry = test_registry();

        let value = Value::List(vec![
            Value::from("spawn"),
            Value::Long(99),
            Value::object(Blip {
                charge: 7,
                label: "live".to_owned(),
            }),
            Value::Null,
        ]);

        let back = roundtrip(&registry, &value);
        assert_eq!(back, value);

        let items = back.as_list().unwrap();
        assert_eq!(items[2].downcast_ref::<Blip>().unwrap().charge, 7);
    }

    #[test]
    fn test_object_dispatch() {
        let registry = test_registry();

        let blip = Blip {
            charge: -3,
            label: String::new(),
        };
        let value = Value::object(blip.clone());

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &value).unwrap();

        // first generated number, then one flag byte with label absent
        assert_eq!(
            cursor.as_slice(),
            &[consts::FIRST_GENERATED as u8, 0b0000_0000, 255, 255, 255, 253]
        );

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let back = unmarshal_object(&registry, &mut cursor).unwrap();
        assert_eq!(back.into_object::<Blip>().unwrap(), blip);
    }

    #[test]
    fn test_unknown_type_number_is_fatal() {
        let registry = test_registry();

        let mut cursor = ByteCursor::from_bytes(vec![200_u8]);
        assert!(matches!(
            unmarshal_object(&registry, &mut cursor),
            Err(WireError::UnknownTypeNumber(200))
        ));
    }

    #[test]
    fn test_unfrozen_registry_refuses_traffic() {
        let registry = Registry::new();

        let mut cursor = ByteCursor::new();
        assert!(matches!(
            marshal_object(&registry, &mut cursor, &Value::Int(1)),
            Err(WireError::NotFrozen)
        ));

        let mut cursor = ByteCursor::from_bytes(vec![consts::NULL as u8]);
        assert!(matches!(
            unmarshal_object(&registry, &mut cursor),
            Err(WireError::NotFrozen)
        ));
    }

    /// Unregistered runtime type with serde support: degrades to the
    /// serialized blob and decodes as a dynamic map.
    #[test]
    fn test_fallback_serialization() {
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
        struct Stray {
            x: i32,
        }

        impl Marshal for Stray {
            fn type_name(&self) -> &'static str {
                "Stray"
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }

            fn clone_boxed(&self) -> Box<dyn Marshal> {
                Box::new(self.clone())
            }

            fn eq_boxed(&self, other: &dyn Marshal) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .map_or(false, |o| self == o)
            }

            fn encode_fields(
                &self,
                _registry: &Registry,
                _cursor: &mut ByteCursor,
            ) -> Result<(), WireError> {
                Ok(())
            }

            fn to_generic_bytes(&self) -> Result<Vec<u8>, WireError> {
                crate::ser_de::serialize(self)
            }
        }

        let _ = pretty_env_logger::try_init();

        let registry = test_registry();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::object(Stray { x: 5 })).unwrap();
        assert_eq!(cursor.as_slice()[0], consts::SERIALIZED as u8);

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let back = unmarshal_object(&registry, &mut cursor).unwrap();

        // the concrete type is gone; the field tree survives
        match back {
            Value::Map(entries) => {
                assert_eq!(entries.get(&Value::from("x")), Some(&Value::Long(5)));
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    /// A type with no serde capability degrades further: a null
    /// placeholder, not an aborted encode.
    #[test]
    fn test_fallback_unserializable_writes_null() {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Opaque;

        impl Marshal for Opaque {
            fn type_name(&self) -> &'static str {
                "Opaque"
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }

            fn clone_boxed(&self) -> Box<dyn Marshal> {
                Box::new(self.clone())
            }

            fn eq_boxed(&self, other: &dyn Marshal) -> bool {
                other.as_any().downcast_ref::<Self>().is_some()
            }

            fn encode_fields(
                &self,
                _registry: &Registry,
                _cursor: &mut ByteCursor,
            ) -> Result<(), WireError> {
                Ok(())
            }
        }

        let registry = test_registry();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::object(Opaque)).unwrap();
        assert_eq!(cursor.as_slice(), &[consts::NULL as u8]);
    }

    #[test]
    fn test_double_bind_rejected() {
        let mut registry = Registry::new();
        registry.register::<Blip>(None).unwrap();
        registry.bind::<Blip>().unwrap();

        assert!(matches!(
            registry.bind::<Blip>(),
            Err(WireError::DoubleBind(_))
        ));
    }
}
