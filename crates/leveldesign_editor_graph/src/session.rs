// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: the live graph, its file name and the node clipboard.
//!
//! The session is what an editor window owns. It turns store and codec
//! failures into [`SessionError`]s that carry a user-facing title and
//! message, so the window can show them as notifications.

use crate::codec::{CodecError, LoadReport, PersistedGraph};
use crate::graph::{Graph, GraphError};
use crate::node::{EnemyData, Node, NodeId, NodeKind, NodeMenuEntry, RoomData};
use crate::settings::EditorSettings;
use crate::store::{validate_name, ContainerStore, SaveOutcome, StoreError};

/// A node held by the clipboard
#[derive(Debug, Clone)]
enum ClipboardEntry {
    Room(RoomData, [f32; 2]),
    Enemy(EnemyData, [f32; 2]),
}

/// Nodes captured by the last cut or copy.
///
/// Only room and enemy nodes are captured; the level node is never copied.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of captured nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is captured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the clipboard with the selected nodes. Returns how many were
    /// captured.
    pub fn copy(&mut self, graph: &Graph, selection: &[NodeId]) -> usize {
        self.entries.clear();
        for node in selection.iter().filter_map(|id| graph.node(*id)) {
            match &node.kind {
                NodeKind::Room(room) => self.entries.push(ClipboardEntry::Room(room.clone(), node.position)),
                NodeKind::Enemy(enemy) => self.entries.push(ClipboardEntry::Enemy(enemy.clone(), node.position)),
                NodeKind::Level(_) => {}
            }
        }
        tracing::info!("Copied {} nodes to clipboard", self.entries.len());
        self.entries.len()
    }

    /// Insert copies of the captured nodes, shifted by `offset`.
    ///
    /// Every copy gets a fresh GUID. Returns the new node IDs, which become
    /// the selection.
    pub fn paste(&self, graph: &mut Graph, offset: [f32; 2]) -> Vec<NodeId> {
        let shift = |[x, y]: [f32; 2]| [x + offset[0], y + offset[1]];

        let pasted: Vec<NodeId> = self
            .entries
            .iter()
            .map(|entry| match entry {
                ClipboardEntry::Room(room, position) => graph.create_room_node(room.clone(), shift(*position)),
                ClipboardEntry::Enemy(enemy, position) => graph.create_enemy_node(enemy.clone(), shift(*position)),
            })
            .collect();

        tracing::info!("Pasted {} nodes from clipboard", pasted.len());
        pasted
    }
}

/// One open level design
#[derive(Debug)]
pub struct EditorSession {
    graph: Graph,
    file_name: String,
    clipboard: Clipboard,
    settings: EditorSettings,
}

impl EditorSession {
    /// Start a session on a fresh level design
    pub fn new(settings: EditorSettings) -> Self {
        let graph = Graph::new_level(&settings.default_level_name, &settings.start_room_name);
        Self {
            graph,
            file_name: settings.default_file_name.clone(),
            clipboard: Clipboard::new(),
            settings,
        }
    }

    /// The live graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The live graph, for editing
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Name the design is saved under
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Change the name the design is saved under
    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
    }

    /// Session settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The clipboard
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Create a node from the node menu
    pub fn create_node(&mut self, entry: NodeMenuEntry, position: [f32; 2]) -> Result<NodeId, GraphError> {
        let node: Node = entry.create_node(position);
        tracing::debug!("{} created at {:?}", entry.label(), position);
        self.graph.add_node(node)
    }

    /// Copy nodes to the clipboard
    pub fn copy(&mut self, selection: &[NodeId]) -> usize {
        self.clipboard.copy(&self.graph, selection)
    }

    /// Copy nodes to the clipboard, then remove the deletable ones
    pub fn cut(&mut self, selection: &[NodeId]) -> usize {
        let copied = self.clipboard.copy(&self.graph, selection);
        for id in selection {
            if let Err(e) = self.graph.remove_node(*id) {
                tracing::debug!("Cut kept node {id}: {e}");
            }
        }
        copied
    }

    /// Paste the clipboard at the configured offset
    pub fn paste(&mut self) -> Vec<NodeId> {
        self.clipboard.paste(&mut self.graph, self.settings.paste_offset)
    }

    /// Save the design under `name`.
    ///
    /// An existing design is only replaced when `overwrite` is set, which is
    /// how a caller confirms the overwrite prompt.
    pub fn save_as<S: ContainerStore>(
        &mut self,
        store: &mut S,
        name: &str,
        overwrite: bool,
    ) -> Result<SaveOutcome, SessionError> {
        validate_name(name).map_err(|_| SessionError::InvalidName(name.to_string()))?;

        if store.exists(name) && !overwrite {
            return Err(SessionError::OverwriteRequiresConfirmation(name.to_string()));
        }

        let container = PersistedGraph::from_graph(&self.graph)?;
        let outcome = store.save_container(name, &container)?;
        self.file_name = name.to_string();

        tracing::info!("Saved level design {:?} ({:?})", name, outcome);
        Ok(outcome)
    }

    /// Save under the current file name, replacing any existing design
    pub fn save<S: ContainerStore>(&mut self, store: &mut S) -> Result<SaveOutcome, SessionError> {
        let name = self.file_name.clone();
        self.save_as(store, &name, true)
    }

    /// Replace the live graph with the design stored under `name`.
    ///
    /// When the design does not exist the live graph is left untouched.
    pub fn load<S: ContainerStore>(&mut self, store: &S, name: &str) -> Result<LoadReport, SessionError> {
        validate_name(name).map_err(|_| SessionError::InvalidName(name.to_string()))?;

        let container = store.load_container(name).map_err(|e| match e {
            StoreError::NotFound(name) => SessionError::FileNotFound(name),
            other => SessionError::Store(other),
        })?;

        let report = container.restore_into(&mut self.graph);
        self.file_name = name.to_string();
        Ok(report)
    }
}

/// Failure of a session operation, shown to the user
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// File name is empty or not a plain name
    #[error("Please enter a valid file name (got {0:?})")]
    InvalidName(String),

    /// The design exists and the overwrite was not confirmed
    #[error("File {0} already exists. Do you want to override it?")]
    OverwriteRequiresConfirmation(String),

    /// No design under that name
    #[error("Target level design graph file {0:?} does not exist")]
    FileNotFound(String),

    /// The graph could not be flattened
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Short title for a notification
    pub fn title(&self) -> &'static str {
        match self {
            SessionError::InvalidName(_) => "Invalid file name!",
            SessionError::OverwriteRequiresConfirmation(_) => "Confirm save operation",
            SessionError::FileNotFound(_) => "File Not Found",
            SessionError::Codec(CodecError::EmptyGraph) => "Nothing to save",
            SessionError::Codec(CodecError::MissingEntryPoint) => "Invalid level design",
            SessionError::Store(_) => "Storage error",
        }
    }
}
