// SPDX-License-Identifier: MIT OR Apache-2.0
//! Level design graphs for the level editor.
//!
//! A level design is a node graph: one level node (the entry point) leads
//! to a start room, rooms lead to each other through their `Top`, `Right`
//! and `Bottom` exits, and rooms hold enemy placements through their
//! `Enemies` output.
//!
//! ## Architecture
//!
//! - [`Graph`] is the live, authoritative model the editor mutates
//! - [`PersistedGraph`] is the flattened form written to disk and read back
//!   by the runtime when it builds the level
//! - [`ContainerStore`] keeps persisted graphs by name
//! - [`EditorSession`] ties them together with a clipboard for copy/paste

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod codec;
pub mod store;
pub mod settings;
pub mod session;

pub use node::{AssetRef, EnemyData, EnemyType, LevelData, Node, NodeId, NodeKind, NodeMenuEntry, RoomData};
pub use port::{Capacity, Port, PortDirection, PortId, PortType, Slot};
pub use connection::{Connection, ConnectionId};
pub use graph::{Graph, GraphError};
pub use codec::{CodecError, LinkRecord, LoadReport, PersistedGraph};
pub use store::{ContainerStore, FileStore, MemoryStore, SaveOutcome, StoreError};
pub use settings::{EditorSettings, SettingsError};
pub use session::{Clipboard, EditorSession, SessionError};
