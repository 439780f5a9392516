//! Game types shared between server and client are defined here.
//!
//! Every type in this crate carries `#[derive(Marshal)]`; the
//! [`standard_registry`] bootstrap registers and binds them all, then
//! validates and freezes the registry for the life of the process.

pub mod attrs;
pub mod entity;
pub mod items;
pub mod messages;

pub use gamewire_core::{
    marshal_object, unmarshal_object, ByteCursor, Registry, Value, WireError,
};

/// Pinned wire constants shared between server and client.
pub mod defaults {
    use gamewire_core::TypeNumber;

    /// Bumped whenever the pinned type numbers below change meaning.
    pub const PROTOCOL_VERSION: u16 = 3;

    // the stable entity core keeps explicit numbers across releases

    pub const TYPE_ENTITY: TypeNumber = 32;
    pub const TYPE_PLAYER: TypeNumber = 33;
    pub const TYPE_MONSTER: TypeNumber = 34;
    pub const TYPE_ITEM_STACK: TypeNumber = 35;
    pub const TYPE_WAYPOINT: TypeNumber = 40;
}

/// Build the standard registry: builtins, then every game type from
/// the declarative list below, then validate and freeze.
///
/// Any error here is startup-fatal; the process must not serve traffic
/// with a partially-correct wire format.
pub fn standard_registry() -> Result<Registry, WireError> {
    let mut registry = Registry::new();

    registry.register::<entity::Entity>(Some(defaults::TYPE_ENTITY))?;
    registry.register::<entity::Player>(Some(defaults::TYPE_PLAYER))?;
    registry.register::<entity::Monster>(Some(defaults::TYPE_MONSTER))?;
    registry.register::<items::ItemStack>(Some(defaults::TYPE_ITEM_STACK))?;
    registry.register::<items::Waypoint>(Some(defaults::TYPE_WAYPOINT))?;

    // message types take the next free numbers
    registry.register::<attrs::AttributeName>(None)?;
    registry.register::<messages::ChatMessage>(None)?;
    registry.register::<messages::MoveCommand>(None)?;
    registry.register::<messages::StateSnapshot>(None)?;

    registry.bind::<entity::Entity>()?;
    registry.bind::<entity::Player>()?;
    registry.bind::<entity::Monster>()?;
    registry.bind::<items::ItemStack>()?;
    registry.bind::<items::Waypoint>()?;
    registry.bind::<attrs::AttributeName>()?;
    registry.bind::<messages::ChatMessage>()?;
    registry.bind::<messages::MoveCommand>()?;
    registry.bind::<messages::StateSnapshot>()?;

    registry.validate_and_freeze()?;

    log::debug!(
        "standard registry frozen, protocol version {}",
        defaults::PROTOCOL_VERSION
    );

    Ok(registry)
}
