//! The type registry: name/number assignment and marshaller binding.
//!
//! Lifecycle is construction, population, `validate_and_freeze`, then
//! read-only use. All mutating calls refuse to run on a frozen registry
//! and all marshalling calls refuse to run on an unfrozen one.

use std::collections::HashMap;

use super::consts::{self, TypeNumber};
use super::schema::TypeSchema;
use super::validate;
use super::{Marshal, WireDecode, WireType};
use crate::cursor::ByteCursor;
use crate::err::WireError;

pub(crate) type EncodeFn = fn(&Registry, &mut ByteCursor, &dyn Marshal) -> Result<(), WireError>;
pub(crate) type DecodeFn = fn(&Registry, &mut ByteCursor) -> Result<Box<dyn Marshal>, WireError>;

/// The encode/decode pair bound to one type number. Write-once.
#[derive(Debug, Clone, Copy)]
pub struct Marshaller {
    pub(crate) encode: EncodeFn,
    pub(crate) decode: DecodeFn,
}

/// Registry bookkeeping for one type.
#[derive(Debug, Clone)]
pub struct ClassProperties {
    name: String,
    number: TypeNumber,
    builtin: bool,
    ready: bool,
}

impl ClassProperties {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> TypeNumber {
        self.number
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Whether a marshaller implementation has been bound.
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

#[derive(Debug)]
pub struct Registry {
    numbers: HashMap<String, TypeNumber>,
    properties: HashMap<TypeNumber, ClassProperties>,
    schemas: HashMap<String, TypeSchema>,
    marshallers: HashMap<TypeNumber, Marshaller>,
    next_number: TypeNumber,
    frozen: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with the builtin bands pre-registered and nothing else.
    pub fn new() -> Self {
        let mut registry = Self {
            numbers: HashMap::new(),
            properties: HashMap::new(),
            schemas: HashMap::new(),
            marshallers: HashMap::new(),
            next_number: consts::FIRST_GENERATED,
            frozen: false,
        };

        for (number, name) in consts::BUILTIN_NAMES {
            registry.numbers.insert((*name).to_owned(), *number);
            registry.properties.insert(
                *number,
                ClassProperties {
                    name: (*name).to_owned(),
                    number: *number,
                    builtin: true,
                    ready: true,
                },
            );
        }

        registry
    }

    /// Register a type under its derived schema.
    pub fn register<T: WireType>(
        &mut self,
        explicit: Option<TypeNumber>,
    ) -> Result<TypeNumber, WireError> {
        self.register_schema(T::SCHEMA, explicit)
    }

    /// Register a type schema, assigning a type number.
    ///
    /// The explicit number is honored when it is free and outside the
    /// builtin band; without one, the next unused number above the
    /// builtin band is taken. Every failure leaves the registry
    /// untouched.
    pub fn register_schema(
        &mut self,
        schema: TypeSchema,
        explicit: Option<TypeNumber>,
    ) -> Result<TypeNumber, WireError> {
        self.ensure_mutable()?;

        if self.numbers.contains_key(schema.name) {
            log::error!("type {} is already registered", schema.name);
            return Err(WireError::DuplicateName(schema.name.to_owned()));
        }

        let number = match explicit {
            Some(n) if Self::is_builtin(n) => {
                log::error!("type {} requested builtin number {}", schema.name, n);
                return Err(WireError::BuiltinCollision(n));
            }
            Some(n) if !(consts::FIRST_GENERATED..=consts::MAX_TYPE_NUMBER).contains(&n) => {
                log::error!("type {} requested unencodable number {}", schema.name, n);
                return Err(WireError::TagOutOfRange(n as i32));
            }
            Some(n) => match self.properties.get(&n) {
                Some(holder) => {
                    log::error!(
                        "type {} requested number {}, already held by {}",
                        schema.name,
                        n,
                        holder.name()
                    );
                    return Err(WireError::NumberTaken {
                        number: n,
                        holder: holder.name().to_owned(),
                    });
                }
                None => n,
            },
            None => {
                let mut n = self.next_number;
                while self.properties.contains_key(&n) {
                    n += 1;
                }

                if n > consts::MAX_TYPE_NUMBER {
                    log::error!("type number space exhausted registering {}", schema.name);
                    return Err(WireError::TagOutOfRange(n as i32));
                }

                self.next_number = n + 1;
                n
            }
        };

        self.numbers.insert(schema.name.to_owned(), number);
        self.properties.insert(
            number,
            ClassProperties {
                name: schema.name.to_owned(),
                number,
                builtin: false,
                ready: false,
            },
        );
        self.schemas.insert(schema.name.to_owned(), schema);

        log::debug!("registered {} as type {}", schema.name, number);

        Ok(number)
    }

    /// Bind the generated (or hand-written) marshaller for `T` to its
    /// registered type number. Second binds for the same name fail.
    pub fn bind<T>(&mut self) -> Result<TypeNumber, WireError>
    where
        T: WireType + Marshal + WireDecode,
    {
        self.ensure_mutable()?;

        let number = match self.numbers.get(T::NAME) {
            Some(n) => *n,
            None => {
                log::error!("cannot bind marshaller: {} is not registered", T::NAME);
                return Err(WireError::UnknownTypeName(T::NAME.to_owned()));
            }
        };

        self.mark_ready(T::NAME)?;
        self.marshallers.insert(
            number,
            Marshaller {
                encode: encode_erased::<T>,
                decode: decode_erased::<T>,
            },
        );

        Ok(number)
    }

    /// Record that a marshaller implementation now exists for `name`.
    fn mark_ready(&mut self, name: &str) -> Result<(), WireError> {
        let number = self
            .numbers
            .get(name)
            .ok_or_else(|| WireError::UnknownTypeName(name.to_owned()))?;

        // registered names always have properties
        let properties = self
            .properties
            .get_mut(number)
            .ok_or_else(|| WireError::UnknownTypeName(name.to_owned()))?;

        if properties.ready {
            log::error!("marshaller for {} is already bound", name);
            return Err(WireError::DoubleBind(name.to_owned()));
        }

        properties.ready = true;
        Ok(())
    }

    pub fn lookup_number(&self, name: &str) -> Option<TypeNumber> {
        self.numbers.get(name).copied()
    }

    pub fn lookup_name(&self, number: TypeNumber) -> Option<&str> {
        self.properties.get(&number).map(|p| p.name())
    }

    pub fn properties(&self, number: TypeNumber) -> Option<&ClassProperties> {
        self.properties.get(&number)
    }

    pub(crate) fn schema(&self, name: &str) -> Option<&TypeSchema> {
        self.schemas.get(name)
    }

    pub(crate) fn marshaller(&self, number: TypeNumber) -> Option<&Marshaller> {
        self.marshallers.get(&number)
    }

    /// Band-membership test: reserved numbers that application types
    /// can never take.
    pub fn is_builtin(number: TypeNumber) -> bool {
        (1..=consts::LAST_BUILTIN).contains(&number)
    }

    pub fn is_builtin_name(&self, name: &str) -> bool {
        self.lookup_number(name).is_some_and(Self::is_builtin)
    }

    /// Registered application types, ordered by type number.
    pub(crate) fn application_types(&self) -> Vec<&ClassProperties> {
        let mut types: Vec<_> = self.properties.values().filter(|p| !p.builtin).collect();
        types.sort_by_key(|p| p.number);

        types
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn ensure_frozen(&self) -> Result<(), WireError> {
        match self.frozen {
            true => Ok(()),
            false => Err(WireError::NotFrozen),
        }
    }

    fn ensure_mutable(&self) -> Result<(), WireError> {
        match self.frozen {
            true => Err(WireError::Frozen),
            false => Ok(()),
        }
    }

    /// Run the completeness checks and, if every registered type passes,
    /// freeze the registry for concurrent read-only use.
    ///
    /// All violations are collected and logged before this fails;
    /// a failed validation leaves the registry unfrozen and unusable.
    pub fn validate_and_freeze(&mut self) -> Result<(), WireError> {
        if self.frozen {
            return Ok(());
        }

        let violations = validate::check(self);

        match violations.is_empty() {
            true => {
                self.frozen = true;
                log::debug!(
                    "registry frozen with {} registered types",
                    self.properties.len()
                );
                Ok(())
            }
            false => {
                for violation in &violations {
                    log::error!("{}", violation);
                }
                Err(super::ValidationReport { violations }.into())
            }
        }
    }
}

fn encode_erased<T: Marshal>(
    registry: &Registry,
    cursor: &mut ByteCursor,
    value: &dyn Marshal,
) -> Result<(), WireError> {
    let concrete = value
        .as_any()
        .downcast_ref::<T>()
        .ok_or(WireError::WrongType {
            expected: std::any::type_name::<T>(),
        })?;

    concrete.encode_fields(registry, cursor)
}

fn decode_erased<T: WireDecode>(
    registry: &Registry,
    cursor: &mut ByteCursor,
) -> Result<Box<dyn Marshal>, WireError> {
    T::decode(registry, cursor).map(|value| Box::new(value) as Box<dyn Marshal>)
}

#[cfg(test)]
mod tests {
    use super::super::schema::{FieldKind, FieldSchema};
    use super::*;

    const POINT: TypeSchema = TypeSchema {
        name: "Point",
        base: None,
        fields: &[
            FieldSchema {
                name: "x",
                kind: FieldKind::Int,
                optional: false,
            },
            FieldSchema {
                name: "y",
                kind: FieldKind::Int,
                optional: false,
            },
        ],
    };

    const OTHER: TypeSchema = TypeSchema {
        name: "Other",
        base: None,
        fields: &[],
    };

    #[test]
    fn test_sequential_assignment_starts_above_builtins() {
        let mut registry = Registry::new();

        assert_eq!(
            registry.register_schema(POINT, None).unwrap(),
            consts::FIRST_GENERATED
        );
        assert_eq!(
            registry.register_schema(OTHER, None).unwrap(),
            consts::FIRST_GENERATED + 1
        );
        assert_eq!(registry.lookup_number("Point"), Some(consts::FIRST_GENERATED));
        assert_eq!(registry.lookup_name(consts::FIRST_GENERATED), Some("Point"));
    }

    #[test]
    fn test_explicit_number() {
        let mut registry = Registry::new();

        assert_eq!(registry.register_schema(POINT, Some(100)).unwrap(), 100);

        // sequential assignment skips the pinned number
        assert_eq!(
            registry.register_schema(OTHER, None).unwrap(),
            consts::FIRST_GENERATED
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::new();
        registry.register_schema(POINT, None).unwrap();

        assert!(matches!(
            registry.register_schema(POINT, Some(200)),
            Err(WireError::DuplicateName(_))
        ));

        // failed registration does not take the number
        assert_eq!(registry.lookup_name(200), None);
    }

    #[test]
    fn test_number_collisions_rejected() {
        let mut registry = Registry::new();
        registry.register_schema(POINT, Some(100)).unwrap();

        assert!(matches!(
            registry.register_schema(OTHER, Some(100)),
            Err(WireError::NumberTaken { number: 100, .. })
        ));
        assert!(matches!(
            registry.register_schema(OTHER, Some(consts::NULL)),
            Err(WireError::BuiltinCollision(_))
        ));
        assert!(matches!(
            registry.register_schema(OTHER, Some(consts::MAX_TYPE_NUMBER + 1)),
            Err(WireError::TagOutOfRange(_))
        ));

        // the registry is unchanged by the failures
        assert_eq!(registry.lookup_number("Other"), None);
    }

    #[test]
    fn test_builtin_band() {
        assert!(Registry::is_builtin(consts::BOOLEAN));
        assert!(Registry::is_builtin(consts::LAST_BUILTIN));
        assert!(!Registry::is_builtin(consts::FIRST_GENERATED));
        assert!(!Registry::is_builtin(0));

        let registry = Registry::new();
        assert!(registry.is_builtin_name("string"));
        assert!(registry.is_builtin_name("serialized"));
        assert!(!registry.is_builtin_name("Point"));
    }

    #[test]
    fn test_frozen_registry_rejects_registration() {
        let mut registry = Registry::new();
        registry.validate_and_freeze().unwrap();

        assert!(matches!(
            registry.register_schema(POINT, None),
            Err(WireError::Frozen)
        ));
    }
}
