//! Wire messages between client and server.

use std::collections::BTreeMap;

use gamewire_core::{Marshal, Value};
use indexmap::IndexSet;

/// Free-form chat relayed through a channel.
///
/// Also carries the generic serialization capability: chat archival
/// stores messages without a registry on hand.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, Marshal)]
#[wire(serde)]
pub struct ChatMessage {
    pub channel: String,
    pub sender: String,
    pub body: String,
}

/// Client intent to move an entity.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct MoveCommand {
    pub entity_id: i64,
    pub dx: i32,
    pub dy: i32,
    pub running: bool,
}

/// Periodic region state pushed to clients.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct StateSnapshot {
    pub tick: i64,

    /// Every entity visible to the recipient.
    pub entities: Vec<Value>,

    /// Leaderboard, ordered by key.
    pub scores: BTreeMap<Value, Value>,

    /// Region names in load order.
    pub regions: IndexSet<Value>,

    /// Server-local bookkeeping, never sent.
    #[wire(skip)]
    pub dirty: bool,
}

#[cfg(test)]
mod tests {
    use gamewire_core::{marshal_object, unmarshal_object, ByteCursor, Marshal};

    use super::*;
    use crate::entity::Entity;
    use crate::standard_registry;

    fn encode(registry: &gamewire_core::Registry, value: Value) -> Vec<u8> {
        let mut cursor = ByteCursor::new();
        marshal_object(registry, &mut cursor, &value).unwrap();
        cursor.into_bytes()
    }

    /// An absent body is strictly cheaper than a present one, and both
    /// decode to the right state.
    #[test]
    fn test_flag_omission_shrinks_message() {
        let registry = standard_registry().unwrap();

        let with_body = ChatMessage {
            channel: "region".to_owned(),
            sender: "brynn".to_owned(),
            body: "hello".to_owned(),
        };
        let without_body = ChatMessage {
            body: String::new(),
            ..with_body.clone()
        };

        let full = encode(&registry, Value::object(with_body.clone()));
        let slim = encode(&registry, Value::object(without_body.clone()));

        assert!(slim.len() < full.len());

        for (bytes, expected) in [(full, with_body), (slim, without_body)] {
            let mut cursor = ByteCursor::from_bytes(bytes);
            let back = unmarshal_object(&registry, &mut cursor)
                .unwrap()
                .into_object::<ChatMessage>()
                .unwrap();
            assert_eq!(back, expected);
        }
    }

    #[test]
    fn test_move_command_roundtrip() {
        let registry = standard_registry().unwrap();

        let command = MoveCommand {
            entity_id: 404,
            dx: -1,
            dy: 1,
            running: true,
        };

        let mut cursor = ByteCursor::from_bytes(encode(&registry, Value::object(command.clone())));
        let back = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<MoveCommand>()
            .unwrap();

        assert_eq!(back, command);
    }

    #[test]
    fn test_snapshot_containers_roundtrip() {
        let registry = standard_registry().unwrap();

        let mut scores = BTreeMap::new();
        scores.insert(Value::from("brynn"), Value::from(1200));
        scores.insert(Value::from("warg"), Value::from(-5));

        let mut regions = IndexSet::new();
        regions.insert(Value::from("harbor"));
        regions.insert(Value::from("keep"));

        let snapshot = StateSnapshot {
            tick: 880,
            entities: vec![Value::object(Entity {
                id: 1,
                name: "brynn".to_owned(),
                x: 2,
                y: 3,
            })],
            scores,
            regions,
            dirty: true,
        };

        let mut cursor = ByteCursor::from_bytes(encode(&registry, Value::object(snapshot.clone())));
        let back = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<StateSnapshot>()
            .unwrap();

        // skipped fields come back at their default
        assert!(!back.dirty);
        assert_eq!(back.tick, snapshot.tick);
        assert_eq!(back.entities, snapshot.entities);
        assert_eq!(back.scores, snapshot.scores);

        // insertion order survives the round trip
        let regions: Vec<_> = back.regions.iter().cloned().collect();
        assert_eq!(regions, vec![Value::from("harbor"), Value::from("keep")]);
    }

    /// The generic capability round-trips a chat message into a
    /// dynamic value tree, registry-free.
    #[test]
    fn test_chat_generic_capability() {
        let chat = ChatMessage {
            channel: "trade".to_owned(),
            sender: "brynn".to_owned(),
            body: "wts pelts".to_owned(),
        };

        let blob = chat.to_generic_bytes().unwrap();
        let tree: Value = gamewire_core::ser_de::deserialize(&blob).unwrap();

        match tree {
            Value::Map(entries) => {
                assert_eq!(
                    entries.get(&Value::from("body")),
                    Some(&Value::from("wts pelts"))
                );
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    /// Nine nullable fields spill into a second flag byte.
    #[test]
    fn test_wide_flag_batch() {
        #[derive(Debug, Clone, Default, PartialEq, Marshal)]
        struct Wide {
            f0: String,
            f1: String,
            f2: String,
            f3: String,
            f4: String,
            f5: String,
            f6: String,
            f7: String,
            f8: String,
        }

        let mut registry = gamewire_core::Registry::new();
        registry.register::<Wide>(None).unwrap();
        registry.bind::<Wide>().unwrap();
        registry.validate_and_freeze().unwrap();

        let wide = Wide {
            f0: "a".to_owned(),
            f8: "z".to_owned(),
            ..Wide::default()
        };

        let bytes = encode(&registry, Value::object(wide.clone()));

        // tag, then two flag bytes: bit 0 of the first, bit 0 of the second
        assert_eq!(bytes[1], 0b0000_0001);
        assert_eq!(bytes[2], 0b0000_0001);

        let mut cursor = ByteCursor::from_bytes(bytes);
        let back = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<Wide>()
            .unwrap();

        assert_eq!(back, wide);
    }
}
