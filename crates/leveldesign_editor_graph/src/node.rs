// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for level design graphs.

use crate::port::{Port, PortId, Slot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position given to a freshly created level node
pub const LEVEL_NODE_POSITION: [f32; 2] = [0.0, 200.0];

/// Unique identifier for a node (the node's GUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Enemy archetypes that can be placed in a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyType {
    /// First test archetype
    #[default]
    TestEnemy1,
    /// Second test archetype
    TestEnemy2,
    /// Third test archetype
    TestEnemy3,
    /// Fourth test archetype
    TestEnemy4,
    /// Fifth test archetype
    TestEnemy5,
}

impl EnemyType {
    /// Get display name for this enemy type
    pub fn display_name(&self) -> &'static str {
        match self {
            EnemyType::TestEnemy1 => "TestEnemy1",
            EnemyType::TestEnemy2 => "TestEnemy2",
            EnemyType::TestEnemy3 => "TestEnemy3",
            EnemyType::TestEnemy4 => "TestEnemy4",
            EnemyType::TestEnemy5 => "TestEnemy5",
        }
    }

    /// Get all enemy types
    pub fn all() -> &'static [EnemyType] {
        &[
            EnemyType::TestEnemy1,
            EnemyType::TestEnemy2,
            EnemyType::TestEnemy3,
            EnemyType::TestEnemy4,
            EnemyType::TestEnemy5,
        ]
    }
}

/// Reference to a room prefab asset, relative to the assets root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    /// Create a new asset reference
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Asset path
    pub fn path(&self) -> &str {
        &self.0
    }
}

/// Attributes of the level (entry point) node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelData {
    /// Level name
    pub level_name: String,
}

impl LevelData {
    /// Create level data with a name
    pub fn new(level_name: impl Into<String>) -> Self {
        Self {
            level_name: level_name.into(),
        }
    }
}

/// Attributes of a room node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomData {
    /// Room name
    pub room_name: String,
    /// Prefab spawned for this room at runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_prefab: Option<AssetRef>,
    /// Whether reaching this room finishes the level
    #[serde(default)]
    pub is_ending_point: bool,
}

impl RoomData {
    /// Create room data with a name
    pub fn new(room_name: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            room_prefab: None,
            is_ending_point: false,
        }
    }

    /// Set the prefab
    pub fn with_prefab(mut self, prefab: AssetRef) -> Self {
        self.room_prefab = Some(prefab);
        self
    }

    /// Mark as ending point
    pub fn ending(mut self) -> Self {
        self.is_ending_point = true;
        self
    }
}

/// Attributes of an enemy node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyData {
    /// Enemy archetype
    pub enemy_type: EnemyType,
}

impl EnemyData {
    /// Create enemy data
    pub fn new(enemy_type: EnemyType) -> Self {
        Self { enemy_type }
    }
}

/// Node variant together with its variant-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The level entry point
    Level(LevelData),
    /// A room
    Room(RoomData),
    /// An enemy placement
    Enemy(EnemyData),
}

impl NodeKind {
    /// Variant name, for logs and listings
    pub fn variant_name(&self) -> &'static str {
        match self {
            NodeKind::Level(_) => "Level",
            NodeKind::Room(_) => "Room",
            NodeKind::Enemy(_) => "Enemy",
        }
    }
}

/// Editing capabilities of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Can be removed through normal editing
    pub deletable: bool,
    /// Can be dragged around
    pub movable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            deletable: true,
            movable: true,
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Variant and attributes
    pub kind: NodeKind,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Whether this node is the level entry point
    pub entry_point: bool,
    /// Editing capabilities
    pub capabilities: Capabilities,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
}

impl Node {
    /// Create a level (entry point) node.
    ///
    /// The node is neither movable nor deletable and exposes a single
    /// `Starting room` output.
    pub fn level(data: LevelData) -> Self {
        Self {
            id: NodeId::new(),
            kind: NodeKind::Level(data),
            position: LEVEL_NODE_POSITION,
            entry_point: true,
            capabilities: Capabilities {
                deletable: false,
                movable: false,
            },
            inputs: vec![],
            outputs: vec![Port::new(Slot::StartingRoom)],
        }
    }

    /// Create a room node with its `Room` input, three exits and the
    /// `Enemies` output
    pub fn room(data: RoomData, position: [f32; 2]) -> Self {
        let mut outputs: Vec<Port> = Slot::ROOM_EXITS.into_iter().map(Port::new).collect();
        outputs.push(Port::new(Slot::Enemies));

        Self {
            id: NodeId::new(),
            kind: NodeKind::Room(data),
            position,
            entry_point: false,
            capabilities: Capabilities::default(),
            inputs: vec![Port::new(Slot::RoomInput)],
            outputs,
        }
    }

    /// Create an enemy node with a single `Enemy` input
    pub fn enemy(data: EnemyData, position: [f32; 2]) -> Self {
        Self {
            id: NodeId::new(),
            kind: NodeKind::Enemy(data),
            position,
            entry_point: false,
            capabilities: Capabilities::default(),
            inputs: vec![Port::new(Slot::EnemyInput)],
            outputs: vec![],
        }
    }

    /// Replace the generated ID (used when restoring persisted GUIDs)
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Title shown on the node
    pub fn title(&self) -> &str {
        match &self.kind {
            NodeKind::Level(level) => &level.level_name,
            NodeKind::Room(room) => &room.room_name,
            NodeKind::Enemy(enemy) => enemy.enemy_type.display_name(),
        }
    }

    /// Room attributes, if this is a room node
    pub fn as_room(&self) -> Option<&RoomData> {
        match &self.kind {
            NodeKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Enemy attributes, if this is an enemy node
    pub fn as_enemy(&self) -> Option<&EnemyData> {
        match &self.kind {
            NodeKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get the port realizing a slot
    pub fn slot(&self, slot: Slot) -> Option<&Port> {
        self.ports().find(|p| p.slot == slot)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == *port_id)
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: &PortId) -> Option<&mut Port> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == *port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// Entries of the node creation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMenuEntry {
    /// Create a room node
    Room,
    /// Create an enemy node
    Enemy,
}

impl NodeMenuEntry {
    /// Name given to rooms created from the menu
    pub const DEFAULT_ROOM_NAME: &'static str = "Room Node";

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            NodeMenuEntry::Room => "Room node",
            NodeMenuEntry::Enemy => "Enemy node",
        }
    }

    /// Build the node this entry stands for
    pub fn create_node(&self, position: [f32; 2]) -> Node {
        match self {
            NodeMenuEntry::Room => Node::room(RoomData::new(Self::DEFAULT_ROOM_NAME), position),
            NodeMenuEntry::Enemy => Node::enemy(EnemyData::default(), position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_node_layout() {
        let node = Node::level(LevelData::new("Level"));
        assert!(node.entry_point);
        assert!(!node.capabilities.deletable);
        assert!(!node.capabilities.movable);
        assert!(node.inputs.is_empty());
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.outputs[0].name(), "Starting room");
        assert_eq!(node.position, LEVEL_NODE_POSITION);
    }

    #[test]
    fn test_room_node_layout() {
        let node = Node::room(RoomData::new("Hall"), [10.0, 20.0]);
        let names: Vec<_> = node.outputs.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Top", "Right", "Bottom", "Enemies"]);
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.inputs[0].slot, Slot::RoomInput);
        assert_eq!(node.title(), "Hall");
        assert!(node.capabilities.deletable);
    }

    #[test]
    fn test_enemy_node_layout() {
        let node = Node::enemy(EnemyData::new(EnemyType::TestEnemy3), [0.0, 0.0]);
        assert!(node.outputs.is_empty());
        assert!(node.slot(Slot::EnemyInput).is_some());
        assert_eq!(node.title(), "TestEnemy3");
    }

    #[test]
    fn test_menu_entries() {
        let room = NodeMenuEntry::Room.create_node([5.0, 5.0]);
        assert_eq!(room.title(), NodeMenuEntry::DEFAULT_ROOM_NAME);
        let enemy = NodeMenuEntry::Enemy.create_node([5.0, 5.0]);
        assert_eq!(enemy.as_enemy().map(|e| e.enemy_type), Some(EnemyType::TestEnemy1));
    }
}
