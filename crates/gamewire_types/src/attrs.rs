//! Interned attribute names.
//!
//! Attribute names arrive over the wire in whatever casing the sender
//! used; decoding canonicalizes well-known names to their shared
//! spelling. Callers must always use the instance decode returns.

use gamewire_core::Marshal;

/// Names the whole cluster agrees on.
pub const WELL_KNOWN: &[&str] = &["strength", "agility", "vitality", "focus", "luck"];

/// A stat or skill identifier attached to entities.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
#[wire(intern = AttributeName::canonical)]
pub struct AttributeName {
    pub name: String,
}

impl AttributeName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    /// Substitute the canonical instance for any well-known name.
    pub fn canonical(self) -> Self {
        match WELL_KNOWN
            .iter()
            .find(|known| known.eq_ignore_ascii_case(&self.name))
        {
            Some(known) => Self {
                name: (*known).to_owned(),
            },
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use gamewire_core::{marshal_object, unmarshal_object, ByteCursor, Value};

    use super::*;
    use crate::standard_registry;

    /// Decode returns the canonical instance, not the one that was
    /// filled from the wire.
    #[test]
    fn test_decode_substitutes_canonical_instance() {
        let registry = standard_registry().unwrap();

        let sent = AttributeName::new("STRENGTH");

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::object(sent)).unwrap();

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let received = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<AttributeName>()
            .unwrap();

        assert_eq!(received.name, "strength");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let registry = standard_registry().unwrap();

        let sent = AttributeName::new("moxie");

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::object(sent.clone())).unwrap();

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let received = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<AttributeName>()
            .unwrap();

        assert_eq!(received, sent);
    }
}
