//! Registry completeness checks, run once before the freeze.
//!
//! Every violation is collected; the registry refuses to freeze on any.
//! Startup should fail rather than run with a partially-correct wire
//! format.

use super::registry::Registry;
use super::schema::FieldKind;

#[derive(Debug)]
pub enum Violation {
    /// A registered type never had a marshaller bound.
    MarshallerMissing { type_name: String },

    /// A field references a type name the registry does not know.
    UnknownFieldType {
        type_name: String,
        field: String,
        referenced: String,
    },

    /// A field kind the wire format cannot express.
    IllegalField {
        type_name: String,
        field: String,
        kind: String,
    },

    /// The declared base type is not a registered application type.
    UnknownBaseType { type_name: String, base: String },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MarshallerMissing { type_name } => {
                write!(f, "no marshaller bound for registered type {}", type_name)
            }
            Self::UnknownFieldType {
                type_name,
                field,
                referenced,
            } => write!(
                f,
                "{}.{} references unregistered type {}",
                type_name, field, referenced
            ),
            Self::IllegalField {
                type_name,
                field,
                kind,
            } => write!(f, "{}.{} has unsupported kind {}", type_name, field, kind),
            Self::UnknownBaseType { type_name, base } => write!(
                f,
                "base type {} of {} is not a registered application type",
                base, type_name
            ),
        }
    }
}

/// Everything wrong with the registry, reported at once.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "registry validation failed with {} violation(s): ",
            self.violations.len()
        )?;

        for (i, violation) in self.violations.iter().enumerate() {
            match i {
                0 => write!(f, "{}", violation)?,
                _ => write!(f, "; {}", violation)?,
            }
        }

        Ok(())
    }
}

/// Walk every registered application type and collect violations.
pub(crate) fn check(registry: &Registry) -> Vec<Violation> {
    let mut violations = Vec::new();

    for properties in registry.application_types() {
        let type_name = properties.name();

        if !properties.is_ready() {
            violations.push(Violation::MarshallerMissing {
                type_name: type_name.to_owned(),
            });
        }

        let Some(schema) = registry.schema(type_name) else {
            continue;
        };

        if let Some(base) = schema.base {
            let base_ok = registry
                .lookup_number(base)
                .is_some_and(|n| !Registry::is_builtin(n));

            if !base_ok {
                violations.push(Violation::UnknownBaseType {
                    type_name: type_name.to_owned(),
                    base: base.to_owned(),
                });
            }
        }

        for field in schema.fields {
            match field.kind {
                FieldKind::Ref(referenced) => {
                    if registry.lookup_number(referenced).is_none() {
                        violations.push(Violation::UnknownFieldType {
                            type_name: type_name.to_owned(),
                            field: field.name.to_owned(),
                            referenced: referenced.to_owned(),
                        });
                    }
                }
                kind if !kind.is_legal() => violations.push(Violation::IllegalField {
                    type_name: type_name.to_owned(),
                    field: field.name.to_owned(),
                    kind: format!("{:?}", kind),
                }),
                _ => (),
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::super::schema::{FieldSchema, TypeSchema};
    use super::*;
    use crate::err::WireError;

    fn report(registry: &mut Registry) -> ValidationReport {
        match registry.validate_and_freeze() {
            Err(WireError::Validation(report)) => report,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_marshaller_blocks_freeze() {
        let mut registry = Registry::new();
        registry
            .register_schema(
                TypeSchema {
                    name: "Orphan",
                    base: None,
                    fields: &[],
                },
                None,
            )
            .unwrap();

        let report = report(&mut registry);

        assert!(matches!(
            report.violations.as_slice(),
            [Violation::MarshallerMissing { type_name }] if type_name == "Orphan"
        ));
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_all_violations_collected() {
        let mut registry = Registry::new();
        registry
            .register_schema(
                TypeSchema {
                    name: "Broken",
                    base: Some("Ghost"),
                    fields: &[
                        FieldSchema {
                            name: "target",
                            kind: FieldKind::Ref("Missing"),
                            optional: false,
                        },
                        FieldSchema {
                            name: "cells",
                            kind: FieldKind::PrimitiveArray("i32"),
                            optional: false,
                        },
                        FieldSchema {
                            name: "color",
                            kind: FieldKind::Enum("Color"),
                            optional: true,
                        },
                    ],
                },
                None,
            )
            .unwrap();

        let report = report(&mut registry);

        // unbound marshaller + unknown base + unknown field ref + 2 illegal kinds
        assert_eq!(report.violations.len(), 5);
    }

    #[test]
    fn test_base_must_not_be_builtin() {
        let mut registry = Registry::new();
        registry
            .register_schema(
                TypeSchema {
                    name: "StringChild",
                    base: Some("string"),
                    fields: &[],
                },
                None,
            )
            .unwrap();

        let report = report(&mut registry);

        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::UnknownBaseType { base, .. } if base == "string")));
    }

    #[test]
    fn test_builtin_field_names_resolve() {
        let mut registry = Registry::new();
        let violations = {
            registry
                .register_schema(
                    TypeSchema {
                        name: "Tagged",
                        base: None,
                        fields: &[FieldSchema {
                            name: "label",
                            kind: FieldKind::Ref("string"),
                            optional: false,
                        }],
                    },
                    None,
                )
                .unwrap();
            check(&registry)
        };

        // only the missing marshaller, the field reference resolves
        assert_eq!(violations.len(), 1);
    }
}
