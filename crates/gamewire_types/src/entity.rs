//! The entity hierarchy shared between server regions and clients.

use gamewire_core::{Marshal, Value};

use crate::items::ItemStack;

/// Base state every world object carries.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub x: i32,
    pub y: i32,
}

/// A connected player character.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct Player {
    #[wire(base)]
    pub base: Entity,

    pub level: i16,
    pub health: i32,
    pub guild: String,

    /// Carried items and quest tokens; heterogeneous on purpose.
    pub inventory: Vec<Value>,
}

/// Hostile NPC.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct Monster {
    #[wire(base)]
    pub base: Entity,

    pub awake: bool,
    pub aggression: f32,
    pub loot: Option<ItemStack>,
}

#[cfg(test)]
mod tests {
    use gamewire_core::{marshal_object, unmarshal_object, ByteCursor};

    use super::*;
    use crate::standard_registry;

    fn sample_player() -> Player {
        Player {
            base: Entity {
                id: 17,
                name: "brynn".to_owned(),
                x: -4,
                y: 120,
            },
            level: 9,
            health: 55,
            guild: "emberwatch".to_owned(),
            inventory: vec![
                Value::from("torch"),
                Value::object(ItemStack {
                    kind: "arrow".to_owned(),
                    count: 20,
                    charges: None,
                }),
            ],
        }
    }

    #[test]
    fn test_player_roundtrip() {
        let registry = standard_registry().unwrap();
        let player = sample_player();

        let mut cursor = ByteCursor::new();
        marshal_object(&registry, &mut cursor, &Value::object(player.clone())).unwrap();

        let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
        let back = unmarshal_object(&registry, &mut cursor)
            .unwrap()
            .into_object::<Player>()
            .unwrap();

        assert_eq!(back, player);
        assert_eq!(
            back.inventory[1].downcast_ref::<ItemStack>().unwrap().count,
            20
        );
    }

    /// A subtype's encoding starts with exactly the bytes its base type
    /// would produce for the same field values.
    #[test]
    fn test_base_fields_encode_first() {
        let registry = standard_registry().unwrap();
        let player = sample_player();

        let mut as_player = ByteCursor::new();
        marshal_object(&registry, &mut as_player, &Value::object(player.clone())).unwrap();

        let mut as_entity = ByteCursor::new();
        marshal_object(&registry, &mut as_entity, &Value::object(player.base.clone())).unwrap();

        // skip each one-byte tag, then compare the base prefix
        let player_fields = &as_player.as_slice()[1..];
        let entity_fields = &as_entity.as_slice()[1..];
        assert!(player_fields.starts_with(entity_fields));
        assert!(player_fields.len() > entity_fields.len());
    }

    #[test]
    fn test_monster_optional_loot() {
        let registry = standard_registry().unwrap();

        let awake = Monster {
            base: Entity {
                id: 3,
                name: "warg".to_owned(),
                x: 0,
                y: 0,
            },
            awake: true,
            aggression: 0.75,
            loot: Some(ItemStack {
                kind: "pelt".to_owned(),
                count: 1,
                charges: None,
            }),
        };

        let dormant = Monster {
            loot: None,
            ..awake.clone()
        };

        for monster in [awake, dormant] {
            let mut cursor = ByteCursor::new();
            marshal_object(&registry, &mut cursor, &Value::object(monster.clone())).unwrap();

            let mut cursor = ByteCursor::from_bytes(cursor.into_bytes());
            let back = unmarshal_object(&registry, &mut cursor)
                .unwrap()
                .into_object::<Monster>()
                .unwrap();

            assert_eq!(back, monster);
        }
    }

    /// Absent optional fields contribute zero bytes.
    #[test]
    fn test_null_field_shrinks_encoding() {
        let registry = standard_registry().unwrap();

        let with_loot = Monster {
            base: Entity::default(),
            awake: false,
            aggression: 0.0,
            loot: Some(ItemStack::default()),
        };
        let without_loot = Monster {
            loot: None,
            ..with_loot.clone()
        };

        let mut full = ByteCursor::new();
        marshal_object(&registry, &mut full, &Value::object(with_loot)).unwrap();

        let mut slim = ByteCursor::new();
        marshal_object(&registry, &mut slim, &Value::object(without_loot)).unwrap();

        assert!(slim.len() < full.len());
    }
}
