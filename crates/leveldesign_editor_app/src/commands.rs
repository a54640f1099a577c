// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations.
//!
//! Editing commands follow the same cycle an editor window does: load the
//! design into a session, edit the live graph, save it back under its name.

use leveldesign_editor_graph::{
    AssetRef, ContainerStore, EditorSession, EditorSettings, EnemyData, EnemyType, Graph,
    GraphError, NodeId, NodeKind, RoomData, SessionError, SettingsError, Slot,
};
use std::fmt::Write as _;
use std::path::Path;

/// Gap between a room and the room behind one of its exits
const ROOM_SPACING: f32 = 250.0;

/// Horizontal gap between enemies placed in the same room
const ENEMY_SPACING: f32 = 60.0;

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Save/load failure
    #[error("{title}: {0}", title = .0.title())]
    Session(#[from] SessionError),

    /// Settings file could not be read
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// Edit refused by the graph
    #[error("Edit refused: {0}")]
    Graph(#[from] GraphError),

    /// No node with that title
    #[error("No node named {0:?}")]
    NodeNotFound(String),
}

/// Everything a command needs
pub struct CommandContext<S: ContainerStore> {
    /// Editor settings
    pub settings: EditorSettings,
    /// Where designs are stored
    pub store: S,
}

impl<S: ContainerStore> CommandContext<S> {
    /// Create a new context
    pub fn new(settings: EditorSettings, store: S) -> Self {
        Self { settings, store }
    }

    fn open(&self, name: &str) -> Result<EditorSession, CommandError> {
        let mut session = EditorSession::new(self.settings.clone());
        session.load(&self.store, name)?;
        Ok(session)
    }

    /// Create a fresh design and save it
    pub fn new_design(&mut self, name: &str, level_name: Option<&str>, force: bool) -> Result<(), CommandError> {
        let mut session = EditorSession::new(self.settings.clone());

        if let Some(level_name) = level_name {
            let graph = session.graph_mut();
            if let Some(entry) = graph.entry_node().map(|n| n.id) {
                if let Some(NodeKind::Level(level)) = graph.node_mut(entry).map(|n| &mut n.kind) {
                    level.level_name = level_name.to_string();
                }
            }
            graph.name = level_name.to_string();
        }

        session.save_as(&mut self.store, name, force)?;
        Ok(())
    }

    /// Describe a stored design
    pub fn show(&self, name: &str) -> Result<String, CommandError> {
        let session = self.open(name)?;
        Ok(render_graph(session.graph()))
    }

    /// Names of stored designs
    pub fn list(&self) -> Vec<String> {
        self.store.names()
    }

    /// Add a room behind an exit of an existing room
    pub fn add_room(
        &mut self,
        name: &str,
        from: &str,
        exit: Slot,
        room: RoomData,
    ) -> Result<NodeId, CommandError> {
        let mut session = self.open(name)?;
        let graph = session.graph_mut();

        let source = find_room(graph, from)?;
        let [x, y] = graph.node(source).map(|n| n.position).unwrap_or_default();
        let [dx, dy] = exit_offset(exit);

        let new_room = graph.create_room_node(room, [x + dx, y + dy]);
        graph.connect_to_input(source, exit, new_room, false)?;

        session.save(&mut self.store)?;
        Ok(new_room)
    }

    /// Place an enemy in a room
    pub fn add_enemy(&mut self, name: &str, room: &str, enemy_type: EnemyType) -> Result<NodeId, CommandError> {
        let mut session = self.open(name)?;
        let graph = session.graph_mut();

        let room = find_room(graph, room)?;
        let [x, y] = graph.node(room).map(|n| n.position).unwrap_or_default();
        let placed = graph
            .links_from(room)
            .iter()
            .filter(|(slot, _)| *slot == Slot::Enemies)
            .count();

        let position = [x + placed as f32 * ENEMY_SPACING, y + ROOM_SPACING];
        let enemy = graph.create_enemy_node(EnemyData::new(enemy_type), position);
        graph.connect_to_input(room, Slot::Enemies, enemy, false)?;

        session.save(&mut self.store)?;
        Ok(enemy)
    }

    /// Remove a room and its links
    pub fn remove(&mut self, name: &str, node: &str) -> Result<(), CommandError> {
        let mut session = self.open(name)?;
        let graph = session.graph_mut();

        let node = find_room(graph, node)?;
        graph.remove_node(node)?;

        session.save(&mut self.store)?;
        Ok(())
    }

    /// Copy a room and paste it at the paste offset
    pub fn duplicate(&mut self, name: &str, node: &str) -> Result<Vec<NodeId>, CommandError> {
        let mut session = self.open(name)?;

        let node = find_room(session.graph(), node)?;
        session.copy(&[node]);
        let pasted = session.paste();

        session.save(&mut self.store)?;
        Ok(pasted)
    }
}

/// Load settings, using defaults only when the file does not exist
pub fn load_settings(path: &Path) -> Result<EditorSettings, CommandError> {
    let settings = EditorSettings::load_or_default(path)?;
    tracing::debug!("Settings from {}", path.display());
    Ok(settings)
}

/// Build room data from command arguments
pub fn room_data(room_name: &str, prefab: Option<&str>, ending: bool) -> RoomData {
    let mut room = RoomData::new(room_name);
    if let Some(prefab) = prefab {
        room = room.with_prefab(AssetRef::new(prefab));
    }
    if ending {
        room = room.ending();
    }
    room
}

fn find_room(graph: &Graph, title: &str) -> Result<NodeId, CommandError> {
    graph
        .nodes()
        .find(|n| n.as_room().is_some_and(|room| room.room_name == title))
        .map(|n| n.id)
        .ok_or_else(|| CommandError::NodeNotFound(title.to_string()))
}

fn exit_offset(exit: Slot) -> [f32; 2] {
    match exit {
        Slot::Top => [0.0, -ROOM_SPACING],
        Slot::Bottom => [0.0, ROOM_SPACING],
        _ => [ROOM_SPACING, 0.0],
    }
}

/// Render a graph as text, walking from the entry point
pub fn render_graph(graph: &Graph) -> String {
    let mut out = String::new();
    let reachable = graph.reachable_from_entry();
    let (_, rooms, enemies) = graph.variant_counts();
    let _ = writeln!(
        out,
        "Level {:?}: {} rooms, {} enemies, {} links",
        graph.name,
        rooms,
        enemies,
        graph.connection_count()
    );

    let unreachable = graph.node_ids().filter(|id| !reachable.contains(id));
    for id in reachable.iter().copied().chain(unreachable) {
        let Some(node) = graph.node(id) else {
            continue;
        };

        let marker = match &node.kind {
            NodeKind::Level(_) => "level",
            NodeKind::Room(room) if room.is_ending_point => "room (ending)",
            NodeKind::Room(_) if !node.capabilities.deletable => "room (start)",
            NodeKind::Room(_) => "room",
            NodeKind::Enemy(_) => "enemy",
        };
        let _ = write!(out, "  [{marker}] {} at ({}, {})", node.title(), node.position[0], node.position[1]);
        if !reachable.contains(&id) {
            out.push_str(" (unreachable)");
        }
        out.push('\n');

        for (slot, target) in graph.links_from(id) {
            let target = graph.node(target).map(|n| n.title()).unwrap_or("?");
            let _ = writeln!(out, "      {slot} -> {target}");
        }
    }
    out
}
