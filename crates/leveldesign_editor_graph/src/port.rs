// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port (slot) definitions for node inputs/outputs.
//!
//! Every port a level design node can expose is named by a [`Slot`]. The slot
//! fixes the port's display name, direction, type tag and capacity, so ports
//! are always looked up by slot and never by their position on the node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Type tag carried by a port. Only ports with equal tags can be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// Room-to-room links
    Room,
    /// Room-to-enemy placement links
    Enemy,
}

/// How many connections a port accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// At most one connection
    Single,
    /// Any number of connections
    Multi,
}

/// Every slot a level design node can expose.
///
/// Serialized as its display name, which is also the slot name stored in link
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Slot {
    /// Level node output leading to the start room
    StartingRoom,
    /// Room exit through the top
    Top,
    /// Room exit through the right side
    Right,
    /// Room exit through the bottom
    Bottom,
    /// Room output holding its enemy placements
    Enemies,
    /// Room input
    RoomInput,
    /// Enemy input
    EnemyInput,
}

impl Slot {
    /// Room exits, in the order they appear on a room node
    pub const ROOM_EXITS: [Slot; 3] = [Slot::Top, Slot::Right, Slot::Bottom];

    /// Display name of the slot
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartingRoom => "Starting room",
            Self::Top => "Top",
            Self::Right => "Right",
            Self::Bottom => "Bottom",
            Self::Enemies => "Enemies",
            Self::RoomInput => "Room",
            Self::EnemyInput => "Enemy",
        }
    }

    /// Parse a display name back into a slot
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::StartingRoom,
            Self::Top,
            Self::Right,
            Self::Bottom,
            Self::Enemies,
            Self::RoomInput,
            Self::EnemyInput,
        ]
        .into_iter()
        .find(|slot| slot.name() == name)
    }

    /// Direction of the slot
    pub fn direction(&self) -> PortDirection {
        match self {
            Self::RoomInput | Self::EnemyInput => PortDirection::Input,
            _ => PortDirection::Output,
        }
    }

    /// Type tag of the slot
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Enemies | Self::EnemyInput => PortType::Enemy,
            _ => PortType::Room,
        }
    }

    /// Capacity of the slot
    pub fn capacity(&self) -> Capacity {
        match self {
            Self::StartingRoom | Self::Top | Self::Right | Self::Bottom | Self::EnemyInput => {
                Capacity::Single
            }
            Self::Enemies | Self::RoomInput => Capacity::Multi,
        }
    }

    /// Whether this is one of the three room exits
    pub fn is_room_exit(&self) -> bool {
        Self::ROOM_EXITS.contains(self)
    }
}

/// Slot name that matches no known slot
#[derive(Debug, thiserror::Error)]
#[error("Unknown slot name: {0:?}")]
pub struct UnknownSlot(pub String);

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.name().to_string()
    }
}

impl TryFrom<String> for Slot {
    type Error = UnknownSlot;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Slot::from_name(&name).ok_or(UnknownSlot(name))
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Which slot this port realizes
    pub slot: Slot,
    /// Whether the port takes part in hit-testing. Protected links clear it.
    pub pickable: bool,
}

impl Port {
    /// Create a new port for a slot
    pub fn new(slot: Slot) -> Self {
        Self {
            id: PortId::new(),
            slot,
            pickable: true,
        }
    }

    /// Port name
    pub fn name(&self) -> &'static str {
        self.slot.name()
    }

    /// Port direction
    pub fn direction(&self) -> PortDirection {
        self.slot.direction()
    }

    /// Port type tag
    pub fn port_type(&self) -> PortType {
        self.slot.port_type()
    }

    /// Port capacity
    pub fn capacity(&self) -> Capacity {
        self.slot.capacity()
    }

    /// Check if a connection to another port is valid.
    ///
    /// Ports must face opposite directions and share a type tag. Whether the
    /// two ports sit on different nodes is checked by the graph.
    pub fn can_connect(&self, other: &Port) -> bool {
        if self.direction() == other.direction() {
            return false;
        }

        self.port_type() == other.port_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_round_trip() {
        for slot in [Slot::StartingRoom, Slot::Top, Slot::Enemies, Slot::EnemyInput] {
            assert_eq!(Slot::from_name(slot.name()), Some(slot));
        }
        assert_eq!(Slot::from_name("Left"), None);
    }

    #[test]
    fn test_slot_serializes_by_name() {
        let ron_str = ron::to_string(&Slot::StartingRoom).unwrap();
        assert_eq!(ron_str, "\"Starting room\"");
        let slot: Slot = ron::from_str("\"Top\"").unwrap();
        assert_eq!(slot, Slot::Top);
        assert!(ron::from_str::<Slot>("\"Left\"").is_err());
    }

    #[test]
    fn test_room_exits_are_single_capacity() {
        for slot in Slot::ROOM_EXITS {
            assert_eq!(slot.capacity(), Capacity::Single);
            assert_eq!(slot.port_type(), PortType::Room);
        }
        assert_eq!(Slot::Enemies.capacity(), Capacity::Multi);
    }

    #[test]
    fn test_can_connect() {
        let top = Port::new(Slot::Top);
        let room_in = Port::new(Slot::RoomInput);
        let enemy_in = Port::new(Slot::EnemyInput);
        let enemies = Port::new(Slot::Enemies);

        assert!(top.can_connect(&room_in));
        assert!(room_in.can_connect(&top));
        assert!(!top.can_connect(&enemy_in));
        assert!(enemies.can_connect(&enemy_in));
        assert!(!top.can_connect(&enemies));
    }
}
