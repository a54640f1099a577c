// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! [`Graph`] is the single authoritative store of a level design. Editor
//! widgets read and write it through the accessors below; they never own
//! nodes or edges themselves.

use crate::connection::{Connection, ConnectionId};
use crate::node::{EnemyData, LevelData, Node, NodeId, NodeKind, RoomData};
use crate::port::{Capacity, PortDirection, PortId, Slot};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Position of the start room in a fresh graph
pub const START_ROOM_POSITION: [f32; 2] = [300.0, 200.0];

/// A level design graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Create the graph every new level design starts from: a level node
    /// linked to a non-deletable start room by a protected connection.
    pub fn new_level(level_name: impl Into<String>, start_room_name: impl Into<String>) -> Self {
        let level_name = level_name.into();
        let mut graph = Self::new(level_name.clone());

        let level = graph.insert(Node::level(LevelData::new(level_name)));
        let mut start_room = Node::room(RoomData::new(start_room_name), START_ROOM_POSITION);
        start_room.capabilities.deletable = false;
        let start_room = graph.insert(start_room);

        let linked = graph.connect_slots(level, Slot::StartingRoom, start_room, Slot::RoomInput, true);
        debug_assert!(linked.is_ok(), "fresh level and start room must link: {linked:?}");
        graph
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        if node.entry_point && self.entry_node().is_some() {
            return Err(GraphError::EntryPointExists);
        }
        Ok(self.insert(node))
    }

    /// Create the level (entry point) node
    pub fn create_level_node(&mut self, data: LevelData) -> Result<NodeId, GraphError> {
        self.add_node(Node::level(data))
    }

    /// Create a room node at a position
    pub fn create_room_node(&mut self, data: RoomData, position: [f32; 2]) -> NodeId {
        self.insert(Node::room(data, position))
    }

    /// Create an enemy node at a position
    pub fn create_enemy_node(&mut self, data: EnemyData, position: [f32; 2]) -> NodeId {
        self.insert(Node::enemy(data, position))
    }

    /// Remove a node and its connections.
    ///
    /// Nodes without the deletable capability are refused, and so is any node
    /// held by a protected connection.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        let node = self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        if !node.capabilities.deletable
            || self.connections_for_node(node_id).any(|c| c.protected)
        {
            return Err(GraphError::NotDeletable(node_id));
        }

        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Remove every node and connection, protected ones included
    pub fn clear(&mut self) {
        self.connections.clear();
        self.nodes.clear();
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The level entry point, if present
    pub fn entry_node(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.entry_point)
    }

    /// The room the entry point leads to
    pub fn start_room(&self) -> Option<&Node> {
        let entry = self.entry_node()?;
        self.connections_for_node(entry.id)
            .find(|c| c.from_node == entry.id)
            .and_then(|c| self.node(c.to_node))
    }

    /// Find a node by its title (level name, room name or enemy type)
    pub fn node_by_title(&self, title: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.title() == title)
    }

    /// Set a node's position, ignoring the movable capability
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self.node_mut(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        Ok(())
    }

    /// Move a node as a user drag would
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self.node_mut(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        if !node.capabilities.movable {
            return Err(GraphError::NotMovable(node_id));
        }
        node.position = position;
        Ok(())
    }

    /// Add a connection between ports.
    ///
    /// With `protect` set, the connection and both of its ports are pinned:
    /// they cannot be deleted and are excluded from hit-testing.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
        protect: bool,
    ) -> Result<ConnectionId, GraphError> {
        // Validate nodes exist
        let source_node = self.nodes.get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        // Validate ports exist
        let source_port = source_node.port(&from_port)
            .ok_or(GraphError::PortNotFound(from_port))?;
        let target_port = target_node.port(&to_port)
            .ok_or(GraphError::PortNotFound(to_port))?;

        if from_node == to_node {
            return Err(GraphError::SelfLoop);
        }

        // Connections always run output -> input
        if !source_port.can_connect(target_port) || target_port.direction() != PortDirection::Input {
            return Err(GraphError::IncompatibleSlots {
                from: source_port.slot,
                to: target_port.slot,
            });
        }

        if source_port.capacity() == Capacity::Single && self.connections_from(from_port).next().is_some() {
            return Err(GraphError::PortAlreadyConnected(source_port.slot));
        }
        if target_port.capacity() == Capacity::Single && self.connections_to(to_port).next().is_some() {
            return Err(GraphError::PortAlreadyConnected(target_port.slot));
        }

        let mut connection = Connection::new(from_node, from_port, to_node, to_port);
        if protect {
            connection = connection.protected();
            for (node_id, port_id) in [(from_node, from_port), (to_node, to_port)] {
                if let Some(port) = self.nodes.get_mut(&node_id).and_then(|n| n.port_mut(&port_id)) {
                    port.pickable = false;
                }
            }
        }

        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Connect two nodes by slot instead of by port ID
    pub fn connect_slots(
        &mut self,
        from_node: NodeId,
        from_slot: Slot,
        to_node: NodeId,
        to_slot: Slot,
        protect: bool,
    ) -> Result<ConnectionId, GraphError> {
        let from_port = self.slot_port(from_node, from_slot)?;
        let to_port = self.slot_port(to_node, to_slot)?;
        self.connect(from_node, from_port, to_node, to_port, protect)
    }

    /// Connect an output slot to whatever input the target node exposes
    pub fn connect_to_input(
        &mut self,
        from_node: NodeId,
        from_slot: Slot,
        to_node: NodeId,
        protect: bool,
    ) -> Result<ConnectionId, GraphError> {
        let from_port = self.slot_port(from_node, from_slot)?;
        let target = self.nodes.get(&to_node).ok_or(GraphError::NodeNotFound(to_node))?;
        let to_port = target
            .input(0)
            .map(|p| p.id)
            .ok_or(GraphError::NoInput(to_node))?;
        self.connect(from_node, from_port, to_node, to_port, protect)
    }

    fn slot_port(&self, node_id: NodeId, slot: Slot) -> Result<PortId, GraphError> {
        let node = self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.slot(slot)
            .map(|p| p.id)
            .ok_or(GraphError::SlotNotFound { node: node_id, slot })
    }

    /// Remove a connection. Protected connections are refused.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Result<Connection, GraphError> {
        let connection = self.connections.get(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))?;
        if connection.protected {
            return Err(GraphError::ProtectedConnection(connection_id));
        }
        self.connections
            .shift_remove(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections, in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections from a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == port_id)
    }

    /// Get connections to a specific port
    pub fn connections_to(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to_port == port_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Outgoing links of a node as `(slot, target)` pairs
    pub fn links_from(&self, node_id: NodeId) -> Vec<(Slot, NodeId)> {
        let Some(node) = self.node(node_id) else {
            return Vec::new();
        };
        self.connections
            .values()
            .filter(|c| c.from_node == node_id)
            .filter_map(|c| node.port(&c.from_port).map(|p| (p.slot, c.to_node)))
            .collect()
    }

    /// Ports an interactive drag starting at `port_id` could be dropped on.
    ///
    /// A candidate sits on a different node, faces the opposite direction and
    /// carries the same type tag.
    pub fn compatible_ports(&self, node_id: NodeId, port_id: PortId) -> Vec<(NodeId, PortId)> {
        let Some(start) = self.node(node_id).and_then(|n| n.port(&port_id)) else {
            return Vec::new();
        };

        self.nodes
            .values()
            .filter(|n| n.id != node_id)
            .flat_map(|n| n.ports().map(move |p| (n.id, p)))
            .filter(|(_, p)| p.pickable && start.can_connect(p))
            .map(|(id, p)| (id, p.id))
            .collect()
    }

    /// Nodes reachable from the entry point, in breadth-first order.
    ///
    /// Room loops are allowed, so each node is visited once.
    pub fn reachable_from_entry(&self) -> Vec<NodeId> {
        let Some(entry) = self.entry_node() else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([entry.id]);
        let mut order = Vec::new();

        while let Some(node_id) = queue.pop_front() {
            if !visited.insert(node_id) {
                continue;
            }
            order.push(node_id);
            for connection in self.connections.values().filter(|c| c.from_node == node_id) {
                if !visited.contains(&connection.to_node) {
                    queue.push_back(connection.to_node);
                }
            }
        }

        order
    }

    /// Count nodes of each variant as `(levels, rooms, enemies)`
    pub fn variant_counts(&self) -> (usize, usize, usize) {
        self.nodes.values().fold((0, 0, 0), |(l, r, e), node| match node.kind {
            NodeKind::Level(_) => (l + 1, r, e),
            NodeKind::Room(_) => (l, r + 1, e),
            NodeKind::Enemy(_) => (l, r, e + 1),
        })
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error raised by graph editing operations
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Node does not expose the requested slot
    #[error("Node {node} has no {slot} slot")]
    SlotNotFound {
        /// Node that was searched
        node: NodeId,
        /// Requested slot
        slot: Slot,
    },

    /// Node has no input to link into
    #[error("Node {0} has no input slot")]
    NoInput(NodeId),

    /// Slot types or directions do not match
    #[error("Incompatible slots: {from} cannot link to {to}")]
    IncompatibleSlots {
        /// Slot the link starts at
        from: Slot,
        /// Slot the link ends at
        to: Slot,
    },

    /// A single-capacity slot already holds a connection
    #[error("Slot already connected: {0}")]
    PortAlreadyConnected(Slot),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Connection not found
    #[error("Connection not found: {0:?}")]
    ConnectionNotFound(ConnectionId),

    /// Protected connections cannot be removed
    #[error("Connection is protected: {0:?}")]
    ProtectedConnection(ConnectionId),

    /// Node cannot be removed
    #[error("Node cannot be deleted: {0}")]
    NotDeletable(NodeId),

    /// Node cannot be moved
    #[error("Node cannot be moved: {0}")]
    NotMovable(NodeId),

    /// A graph holds exactly one entry point
    #[error("Graph already has an entry point")]
    EntryPointExists,

    /// Node ID already in use
    #[error("Duplicate node ID: {0}")]
    DuplicateNode(NodeId),
}
