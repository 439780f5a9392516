//! Items and map markers.

use gamewire_core::Marshal;

/// A stack of one item kind.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct ItemStack {
    pub kind: String,
    pub count: i32,

    /// Remaining uses, for wands and the like.
    pub charges: Option<i32>,
}

/// A named location on the world map.
#[derive(Debug, Clone, Default, PartialEq, Marshal)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    pub label: String,
}
