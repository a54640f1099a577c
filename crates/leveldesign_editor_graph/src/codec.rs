// SPDX-License-Identifier: MIT OR Apache-2.0
//! Save/load of level design graphs.
//!
//! Saving flattens the live [`Graph`] into a [`PersistedGraph`]: one link
//! record per connection plus one record per node, grouped by variant.
//! Loading rebuilds a live graph from those records. Persisted GUIDs become
//! the live node IDs again, and every link is reattached through the slot it
//! names, so no information rides on record order or port positions.

use crate::graph::Graph;
use crate::node::{
    AssetRef, EnemyData, EnemyType, LevelData, Node, NodeId, NodeKind, RoomData,
};
use crate::port::Slot;
use serde::{Deserialize, Serialize};

/// A persisted link between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// GUID of the node the link leaves from
    pub source_id: NodeId,
    /// Name of the output slot the link leaves from
    pub source_slot: String,
    /// GUID of the node the link enters
    pub target_id: NodeId,
    /// Set on the link from the level node to the start room
    #[serde(default)]
    pub is_entry_link: bool,
}

impl LinkRecord {
    /// Create a record for a link leaving through `slot`
    pub fn new(source_id: NodeId, slot: Slot, target_id: NodeId) -> Self {
        Self {
            source_id,
            source_slot: slot.into(),
            target_id,
            is_entry_link: false,
        }
    }

    /// The slot the record names, if it is a known one
    pub fn slot(&self) -> Option<Slot> {
        Slot::from_name(&self.source_slot)
    }
}

/// Persisted level node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Node GUID
    pub id: NodeId,
    /// Level name
    pub level_name: String,
    /// Position in the graph UI
    pub position: [f32; 2],
}

/// Persisted room node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Node GUID
    pub id: NodeId,
    /// Room name
    pub room_name: String,
    /// Prefab spawned for this room
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_prefab: Option<AssetRef>,
    /// Whether reaching this room finishes the level
    #[serde(default)]
    pub is_ending_point: bool,
    /// Position in the graph UI
    pub position: [f32; 2],
}

impl RoomRecord {
    fn data(&self) -> RoomData {
        RoomData {
            room_name: self.room_name.clone(),
            room_prefab: self.room_prefab.clone(),
            is_ending_point: self.is_ending_point,
        }
    }
}

/// Persisted enemy node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    /// Node GUID
    pub id: NodeId,
    /// Enemy archetype
    pub enemy_type: EnemyType,
    /// Position in the graph UI
    pub position: [f32; 2],
}

/// Flattened snapshot of a level design graph.
///
/// Created fresh on every save; never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedGraph {
    /// Links, entry link first
    pub link_records: Vec<LinkRecord>,
    /// Room nodes
    pub room_records: Vec<RoomRecord>,
    /// Enemy nodes
    pub enemy_records: Vec<EnemyRecord>,
    /// The level node
    pub level_record: LevelRecord,
}

/// Outcome of rebuilding a graph from records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes created
    pub nodes: usize,
    /// Links reattached
    pub links: usize,
    /// Links whose target GUID matched no node
    pub dangling_links: usize,
    /// Links the graph refused (wrong slot, occupied slot, ...)
    pub rejected_links: usize,
    /// Node records skipped because their GUID was already taken
    pub duplicate_nodes: usize,
}

impl PersistedGraph {
    /// Flatten a live graph.
    ///
    /// Fails with [`CodecError::EmptyGraph`] when the graph has no
    /// connections, so a saved design always describes at least the entry
    /// link.
    pub fn from_graph(graph: &Graph) -> Result<Self, CodecError> {
        if graph.connection_count() == 0 {
            return Err(CodecError::EmptyGraph);
        }

        let mut entry_links = Vec::new();
        let mut links = Vec::new();
        for connection in graph.connections() {
            let (Some(source), Some(_)) = (graph.node(connection.from_node), graph.node(connection.to_node))
            else {
                tracing::warn!("Skipping connection {:?} with a missing endpoint", connection.id);
                continue;
            };
            let Some(port) = source.port(&connection.from_port) else {
                tracing::warn!("Skipping connection {:?} with a missing source port", connection.id);
                continue;
            };

            let record = LinkRecord {
                is_entry_link: source.entry_point,
                ..LinkRecord::new(source.id, port.slot, connection.to_node)
            };
            if record.is_entry_link {
                entry_links.push(record);
            } else {
                links.push(record);
            }
        }
        entry_links.append(&mut links);

        let mut level_record = None;
        let mut room_records = Vec::new();
        let mut enemy_records = Vec::new();
        for node in graph.nodes() {
            match &node.kind {
                NodeKind::Level(level) => {
                    level_record = Some(LevelRecord {
                        id: node.id,
                        level_name: level.level_name.clone(),
                        position: node.position,
                    });
                }
                NodeKind::Room(room) => room_records.push(RoomRecord {
                    id: node.id,
                    room_name: room.room_name.clone(),
                    room_prefab: room.room_prefab.clone(),
                    is_ending_point: room.is_ending_point,
                    position: node.position,
                }),
                NodeKind::Enemy(enemy) => enemy_records.push(EnemyRecord {
                    id: node.id,
                    enemy_type: enemy.enemy_type,
                    position: node.position,
                }),
            }
        }

        let level_record = level_record.ok_or(CodecError::MissingEntryPoint)?;

        tracing::debug!(
            "Flattened graph {:?}: {} links, {} rooms, {} enemies",
            level_record.level_name,
            entry_links.len(),
            room_records.len(),
            enemy_records.len()
        );

        Ok(Self {
            link_records: entry_links,
            room_records,
            enemy_records,
            level_record,
        })
    }

    /// Build a new live graph from the records
    pub fn to_graph(&self) -> (Graph, LoadReport) {
        let mut graph = Graph::new(self.level_record.level_name.clone());
        let report = self.restore_into(&mut graph);
        (graph, report)
    }

    /// Replace the contents of `graph` with the records.
    ///
    /// The graph is cleared first. Nodes are created with their recorded
    /// GUIDs and positions, then links are reattached. A link whose target
    /// is missing is dropped; the rest of the graph still loads.
    pub fn restore_into(&self, graph: &mut Graph) -> LoadReport {
        graph.clear();
        graph.name = self.level_record.level_name.clone();

        let mut report = LoadReport::default();
        self.create_nodes(graph, &mut report);
        self.connect_nodes(graph, &mut report);

        tracing::info!(
            "Loaded level {:?}: {} nodes, {} links ({} dangling, {} rejected)",
            self.level_record.level_name,
            report.nodes,
            report.links,
            report.dangling_links,
            report.rejected_links
        );
        report
    }

    fn create_nodes(&self, graph: &mut Graph, report: &mut LoadReport) {
        let level = Node::level(LevelData::new(self.level_record.level_name.clone()))
            .with_id(self.level_record.id);
        let [x, y] = self.level_record.position;

        let rooms = self
            .room_records
            .iter()
            .map(|r| Node::room(r.data(), r.position).with_id(r.id));
        let enemies = self
            .enemy_records
            .iter()
            .map(|e| Node::enemy(EnemyData::new(e.enemy_type), e.position).with_id(e.id));

        for node in std::iter::once(level.with_position(x, y)).chain(rooms).chain(enemies) {
            let id = node.id;
            let variant = node.kind.variant_name();
            match graph.add_node(node) {
                Ok(_) => report.nodes += 1,
                Err(e) => {
                    tracing::warn!("Skipping {variant} record {id}: {e}");
                    report.duplicate_nodes += 1;
                }
            }
        }
    }

    fn connect_nodes(&self, graph: &mut Graph, report: &mut LoadReport) {
        let node_ids: Vec<NodeId> = graph.node_ids().collect();

        for node_id in node_ids {
            let entry_point = graph.node(node_id).is_some_and(|n| n.entry_point);

            let links = self.link_records.iter().filter(|link| {
                if entry_point {
                    link.is_entry_link || link.source_id == node_id
                } else {
                    link.source_id == node_id && !link.is_entry_link
                }
            });

            for link in links {
                if graph.node(link.target_id).is_none() {
                    tracing::warn!(
                        "Dropping link {} -> {}: target not found",
                        link.source_slot,
                        link.target_id
                    );
                    report.dangling_links += 1;
                    continue;
                }

                let slot = if entry_point {
                    Slot::StartingRoom
                } else if let Some(slot) = link.slot() {
                    slot
                } else {
                    tracing::warn!(
                        "Skipping link {node_id} -> {}: unknown slot {:?}",
                        link.target_id,
                        link.source_slot
                    );
                    report.rejected_links += 1;
                    continue;
                };
                match graph.connect_to_input(node_id, slot, link.target_id, entry_point) {
                    Ok(_) => {
                        tracing::debug!("Linked {node_id} {slot} -> {}", link.target_id);
                        report.links += 1;
                        if entry_point {
                            if let Some(start_room) = graph.node_mut(link.target_id) {
                                start_room.capabilities.deletable = false;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Rejected link {node_id} {slot} -> {}: {e}", link.target_id);
                        report.rejected_links += 1;
                    }
                }
            }
        }
    }

    /// The link from the level node to the start room
    pub fn entry_link(&self) -> Option<&LinkRecord> {
        self.link_records.iter().find(|l| l.is_entry_link)
    }

    /// The room the level starts in
    pub fn start_room(&self) -> Option<&RoomRecord> {
        self.entry_link().and_then(|l| self.room(l.target_id))
    }

    /// Look up a room record by GUID
    pub fn room(&self, id: NodeId) -> Option<&RoomRecord> {
        self.room_records.iter().find(|r| r.id == id)
    }

    /// Look up an enemy record by GUID
    pub fn enemy(&self, id: NodeId) -> Option<&EnemyRecord> {
        self.enemy_records.iter().find(|e| e.id == id)
    }

    /// Exits of a room as `(slot, destination)` pairs
    pub fn exits(&self, room_id: NodeId) -> impl Iterator<Item = (Slot, &RoomRecord)> {
        self.link_records
            .iter()
            .filter(move |l| l.source_id == room_id)
            .filter_map(move |l| l.slot().filter(Slot::is_room_exit).map(|slot| (slot, l)))
            .filter_map(move |(slot, l)| self.room(l.target_id).map(|room| (slot, room)))
    }

    /// Enemies placed in a room
    pub fn enemies_in(&self, room_id: NodeId) -> impl Iterator<Item = &EnemyRecord> {
        self.link_records
            .iter()
            .filter(move |l| l.source_id == room_id && l.slot() == Some(Slot::Enemies))
            .filter_map(move |l| self.enemy(l.target_id))
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Error when flattening a graph
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Nothing is connected, so there is nothing worth saving
    #[error("Graph has no connections, nothing to save")]
    EmptyGraph,

    /// The graph has no level node
    #[error("Graph has no entry point")]
    MissingEntryPoint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphError;
    use std::collections::{HashMap, HashSet};

    /// Level -> Start (Top) -> North, Start (Enemies) -> TestEnemy1
    fn sample_graph() -> Graph {
        let mut graph = Graph::new_level("Level", "Start");
        let start = graph.start_room().unwrap().id;
        let north = graph.create_room_node(RoomData::new("North"), [500.0, 50.0]);
        let enemy = graph.create_enemy_node(EnemyData::new(EnemyType::TestEnemy1), [500.0, 400.0]);
        graph.connect_to_input(start, Slot::Top, north, false).unwrap();
        graph.connect_to_input(start, Slot::Enemies, enemy, false).unwrap();
        graph
    }

    fn topology(graph: &Graph) -> HashSet<(NodeId, Slot, NodeId, bool)> {
        graph
            .connections()
            .map(|c| {
                let slot = graph.node(c.from_node).unwrap().port(&c.from_port).unwrap().slot;
                (c.from_node, slot, c.to_node, c.protected)
            })
            .collect()
    }

    fn attributes(graph: &Graph) -> HashMap<NodeId, (NodeKind, [f32; 2])> {
        graph.nodes().map(|n| (n.id, (n.kind.clone(), n.position))).collect()
    }

    #[test]
    fn test_save_sample_graph() {
        let graph = sample_graph();
        let persisted = PersistedGraph::from_graph(&graph).unwrap();

        assert_eq!(persisted.link_records.len(), 3);
        assert!(persisted.link_records[0].is_entry_link);
        assert_eq!(persisted.link_records[0].slot(), Some(Slot::StartingRoom));
        assert_eq!(persisted.link_records.iter().filter(|l| l.is_entry_link).count(), 1);
        assert_eq!(persisted.room_records.len(), 2);
        assert_eq!(persisted.enemy_records.len(), 1);
        assert_eq!(persisted.level_record.level_name, "Level");
    }

    #[test]
    fn test_entry_link_first_regardless_of_order() {
        // Build a graph whose entry connection is created last
        let mut graph = Graph::new("Level");
        let room = graph.create_room_node(RoomData::new("Start"), [0.0, 0.0]);
        let other = graph.create_room_node(RoomData::new("Other"), [0.0, 0.0]);
        graph.connect_to_input(room, Slot::Right, other, false).unwrap();
        let level = graph.create_level_node(LevelData::new("Level")).unwrap();
        graph.connect_to_input(level, Slot::StartingRoom, room, true).unwrap();

        let persisted = PersistedGraph::from_graph(&graph).unwrap();
        assert!(persisted.link_records[0].is_entry_link);
        assert_eq!(persisted.link_records[0].source_id, level);
        assert_eq!(persisted.start_room().unwrap().room_name, "Start");
    }

    #[test]
    fn test_empty_graph_is_not_saved() {
        let mut graph = Graph::new("Level");
        graph.create_level_node(LevelData::new("Level")).unwrap();
        assert!(matches!(PersistedGraph::from_graph(&graph), Err(CodecError::EmptyGraph)));
    }

    #[test]
    fn test_missing_entry_point() {
        let mut graph = Graph::new("Level");
        let a = graph.create_room_node(RoomData::new("A"), [0.0, 0.0]);
        let b = graph.create_room_node(RoomData::new("B"), [0.0, 0.0]);
        graph.connect_to_input(a, Slot::Top, b, false).unwrap();
        assert!(matches!(PersistedGraph::from_graph(&graph), Err(CodecError::MissingEntryPoint)));
    }

    #[test]
    fn test_round_trip_sample_graph() {
        let graph = sample_graph();
        let persisted = PersistedGraph::from_graph(&graph).unwrap();
        let (loaded, report) = persisted.to_graph();

        assert_eq!(report.nodes, 4);
        assert_eq!(report.links, 3);
        assert_eq!(report.dangling_links, 0);
        assert_eq!(topology(&loaded), topology(&graph));
        assert_eq!(attributes(&loaded), attributes(&graph));

        let start = loaded.start_room().unwrap();
        assert_eq!(start.title(), "Start");
        assert!(!start.capabilities.deletable);
        let entry_edge = loaded.connections().find(|c| c.to_node == start.id).unwrap();
        assert!(entry_edge.protected);
        assert!(matches!(
            loaded.clone().disconnect(entry_edge.id),
            Err(GraphError::ProtectedConnection(_))
        ));
    }

    #[test]
    fn test_round_trip_room_and_enemy_counts() {
        for rooms in 0..=5 {
            for enemies in 0..=5 {
                let mut graph = Graph::new_level("Level", "Start");
                let start = graph.start_room().unwrap().id;
                let exits = [Slot::Top, Slot::Right, Slot::Bottom];
                let mut previous = start;
                for i in 0..rooms {
                    let room = graph.create_room_node(
                        RoomData::new(format!("Room {i}")).with_prefab(AssetRef::new(format!("Rooms/R{i}"))),
                        [i as f32 * 10.0, 5.0],
                    );
                    graph.connect_to_input(previous, exits[i % 3], room, false).unwrap();
                    previous = room;
                }
                for i in 0..enemies {
                    let kind = EnemyType::all()[i % EnemyType::all().len()];
                    let enemy = graph.create_enemy_node(EnemyData::new(kind), [0.0, i as f32]);
                    graph.connect_to_input(previous, Slot::Enemies, enemy, false).unwrap();
                }

                let persisted = PersistedGraph::from_graph(&graph).unwrap();
                let (loaded, _) = persisted.to_graph();
                assert_eq!(topology(&loaded), topology(&graph), "{rooms} rooms, {enemies} enemies");
                assert_eq!(attributes(&loaded), attributes(&graph));
            }
        }
    }

    #[test]
    fn test_all_room_exits_reconnect() {
        let mut graph = Graph::new_level("Level", "Start");
        let start = graph.start_room().unwrap().id;
        for slot in Slot::ROOM_EXITS {
            let room = graph.create_room_node(RoomData::new(slot.name()), [0.0, 0.0]);
            graph.connect_to_input(start, slot, room, false).unwrap();
        }

        let (loaded, report) = PersistedGraph::from_graph(&graph).unwrap().to_graph();
        assert_eq!(report.links, 4);
        let mut slots: Vec<_> = loaded.links_from(start).into_iter().map(|(s, _)| s).collect();
        slots.sort_by_key(|s| s.name());
        assert_eq!(slots, vec![Slot::Bottom, Slot::Right, Slot::Top]);
    }

    #[test]
    fn test_dangling_link_is_dropped() {
        let mut persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let missing = NodeId::new();
        let start = persisted.start_room().unwrap().id;
        persisted.link_records.push(LinkRecord::new(start, Slot::Bottom, missing));

        let (loaded, report) = persisted.to_graph();
        assert_eq!(report.dangling_links, 1);
        assert_eq!(report.links, 3);
        assert_eq!(loaded.node_count(), 4);
        assert!(loaded.connections().all(|c| c.to_node != missing));
    }

    #[test]
    fn test_mismatched_slot_is_rejected() {
        let mut persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let start = persisted.start_room().unwrap().id;
        let enemy = persisted.enemy_records[0].id;
        // A room exit cannot lead to an enemy
        persisted.link_records.push(LinkRecord::new(start, Slot::Right, enemy));

        let (loaded, report) = persisted.to_graph();
        assert_eq!(report.rejected_links, 1);
        assert_eq!(loaded.connection_count(), 3);
    }

    #[test]
    fn test_unknown_slot_name_is_skipped() {
        let persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let start = persisted.start_room().unwrap().id;
        let north = persisted.room_records[1].id;

        let mut with_extra = persisted.clone();
        with_extra.link_records.push(LinkRecord {
            source_slot: "Left".to_string(),
            ..LinkRecord::new(start, Slot::Right, north)
        });
        let ron_str = with_extra.to_ron().unwrap();

        let loaded = PersistedGraph::from_ron(&ron_str).unwrap();
        assert_eq!(loaded.link_records[3].source_slot, "Left");
        assert_eq!(loaded.link_records[3].slot(), None);

        let (graph, report) = loaded.to_graph();
        assert_eq!(report.rejected_links, 1);
        assert_eq!(report.links, 3);
        assert_eq!(graph.connection_count(), 3);
        assert_eq!(loaded.exits(start).count(), 1);
    }

    #[test]
    fn test_entry_link_found_by_flag_on_load() {
        let mut persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        persisted.link_records.reverse();
        assert!(!persisted.link_records[0].is_entry_link);

        let (mut loaded, report) = persisted.to_graph();
        assert_eq!(report.links, 3);
        assert_eq!(report.rejected_links, 0);

        let start = loaded.start_room().unwrap();
        assert_eq!(start.title(), "Start");
        assert!(!start.capabilities.deletable);
        assert!(!start.inputs[0].pickable);
        let start_id = start.id;

        let entry_edge = loaded.connections().find(|c| c.to_node == start_id).unwrap();
        assert!(entry_edge.protected);
        let entry_edge = entry_edge.id;
        assert!(matches!(loaded.remove_node(start_id), Err(GraphError::NotDeletable(_))));
        assert!(matches!(loaded.disconnect(entry_edge), Err(GraphError::ProtectedConnection(_))));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let ron_str = persisted.to_ron().unwrap();
        let id = persisted.level_record.id.to_string();
        assert!(ron_str.contains(&format!("id: \"{id}\"")));
        assert!(!ron_str.contains(&format!("(\"{id}\")")));
    }

    #[test]
    fn test_restore_into_clears_existing_graph() {
        let persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let mut graph = Graph::new_level("Other", "Elsewhere");
        graph.create_room_node(RoomData::new("Stray"), [0.0, 0.0]);

        persisted.restore_into(&mut graph);
        assert_eq!(graph.name, "Level");
        assert_eq!(graph.node_count(), 4);
        assert!(graph.node_by_title("Stray").is_none());
        assert!(graph.node_by_title("Elsewhere").is_none());
    }

    #[test]
    fn test_reload_is_stable() {
        let first = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let (loaded, _) = first.to_graph();
        let second = PersistedGraph::from_graph(&loaded).unwrap();

        assert_eq!(second.level_record, first.level_record);
        assert_eq!(second.room_records, first.room_records);
        assert_eq!(second.enemy_records, first.enemy_records);
        assert_eq!(second.link_records[0], first.link_records[0]);
        assert_eq!(second.link_records.len(), first.link_records.len());
    }

    #[test]
    fn test_runtime_queries() {
        let persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let start = persisted.start_room().unwrap();
        assert_eq!(start.room_name, "Start");

        let exits: Vec<_> = persisted.exits(start.id).map(|(s, r)| (s, r.room_name.as_str())).collect();
        assert_eq!(exits, vec![(Slot::Top, "North")]);

        let enemies: Vec<_> = persisted.enemies_in(start.id).map(|e| e.enemy_type).collect();
        assert_eq!(enemies, vec![EnemyType::TestEnemy1]);
    }

    #[test]
    fn test_ron_round_trip() {
        let persisted = PersistedGraph::from_graph(&sample_graph()).unwrap();
        let ron_str = persisted.to_ron().unwrap();
        assert!(ron_str.contains("\"Starting room\""));
        let loaded = PersistedGraph::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, persisted);
    }
}
