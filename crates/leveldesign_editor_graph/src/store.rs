// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named storage for persisted level designs.
//!
//! Containers live under a fixed namespace (`GraphLevels/<name>` by default).
//! Saving follows overwrite-or-create: an existing container is updated in
//! place so that anything holding on to it keeps a valid reference.

use crate::codec::PersistedGraph;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default namespace containers are stored under
pub const DEFAULT_NAMESPACE: &str = "GraphLevels";

/// Extension of container files
pub const CONTAINER_EXTENSION: &str = "ron";

/// Whether a save created a container or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No container existed under the name
    Created,
    /// An existing container was updated in place
    Overwritten,
}

/// Storage backend for persisted graphs
pub trait ContainerStore {
    /// Whether a container with this name exists
    fn exists(&self, name: &str) -> bool;

    /// Store a container, replacing any existing one in place
    fn save_container(&mut self, name: &str, container: &PersistedGraph) -> Result<SaveOutcome, StoreError>;

    /// Fetch a container by name
    fn load_container(&self, name: &str) -> Result<PersistedGraph, StoreError>;

    /// Names of all stored containers
    fn names(&self) -> Vec<String>;
}

/// Reject names that are empty or would escape the namespace
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Shared handle to a stored container
pub type ContainerHandle = Arc<RwLock<PersistedGraph>>;

/// In-memory store handing out shared container handles
#[derive(Debug, Default)]
pub struct MemoryStore {
    containers: IndexMap<String, ContainerHandle>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to a stored container. Re-saving under the same name updates
    /// the container behind every handle already given out.
    pub fn handle(&self, name: &str) -> Option<ContainerHandle> {
        self.containers.get(name).cloned()
    }

    /// Number of stored containers
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl ContainerStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    fn save_container(&mut self, name: &str, container: &PersistedGraph) -> Result<SaveOutcome, StoreError> {
        validate_name(name)?;

        if let Some(existing) = self.containers.get(name) {
            *existing.write() = container.clone();
            return Ok(SaveOutcome::Overwritten);
        }

        self.containers
            .insert(name.to_string(), Arc::new(RwLock::new(container.clone())));
        Ok(SaveOutcome::Created)
    }

    fn load_container(&self, name: &str) -> Result<PersistedGraph, StoreError> {
        self.containers
            .get(name)
            .map(|handle| handle.read().clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        self.containers.keys().cloned().collect()
    }
}

/// RON files under `<root>/<namespace>/<name>.ron`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    namespace: String,
}

impl FileStore {
    /// Create a store rooted at `root` using the default namespace
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_namespace(root, DEFAULT_NAMESPACE)
    }

    /// Create a store with a custom namespace folder
    pub fn with_namespace(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    /// Folder holding the containers
    pub fn folder(&self) -> PathBuf {
        self.root.join(&self.namespace)
    }

    /// File path of a container
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.folder().join(format!("{name}.{CONTAINER_EXTENSION}"))
    }

    fn read(path: &Path) -> Result<PersistedGraph, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(PersistedGraph::from_ron(&content)?)
    }
}

impl ContainerStore for FileStore {
    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.path_for(name).is_file()
    }

    fn save_container(&mut self, name: &str, container: &PersistedGraph) -> Result<SaveOutcome, StoreError> {
        validate_name(name)?;

        // Creates the namespace folder if it doesn't exist
        let folder = self.folder();
        if !folder.is_dir() {
            std::fs::create_dir_all(&folder)?;
            tracing::info!("Created level folder {:?}", folder);
        }

        let path = self.path_for(name);
        let outcome = if path.is_file() {
            SaveOutcome::Overwritten
        } else {
            SaveOutcome::Created
        };

        let content = container.to_ron()?;
        std::fs::write(&path, content)?;
        tracing::debug!("Wrote container {:?} ({:?})", path, outcome);
        Ok(outcome)
    }

    fn load_container(&self, name: &str) -> Result<PersistedGraph, StoreError> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Self::read(&path)
    }

    fn names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.folder()) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == CONTAINER_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

/// Error from a container store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No container under that name
    #[error("Level design {0:?} not found")]
    NotFound(String),

    /// Name is empty or not a plain file name
    #[error("Invalid level design name: {0:?}")]
    InvalidName(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON serialization error
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::node::RoomData;
    use crate::port::Slot;

    fn container(level_name: &str) -> PersistedGraph {
        PersistedGraph::from_graph(&Graph::new_level(level_name, "Start")).unwrap()
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("New Level").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn test_memory_store_create_then_overwrite() {
        let mut store = MemoryStore::new();
        assert!(!store.exists("Level1"));

        let outcome = store.save_container("Level1", &container("First")).unwrap();
        assert_eq!(outcome, SaveOutcome::Created);
        let handle = store.handle("Level1").unwrap();

        let outcome = store.save_container("Level1", &container("Second")).unwrap();
        assert_eq!(outcome, SaveOutcome::Overwritten);
        assert_eq!(store.len(), 1);

        // Handles taken before the overwrite see the new content
        assert_eq!(handle.read().level_record.level_name, "Second");
        assert!(Arc::ptr_eq(&handle, &store.handle("Level1").unwrap()));
    }

    #[test]
    fn test_memory_store_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.load_container("Missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(!store.folder().exists());

        let mut graph = Graph::new_level("Level", "Start");
        let start = graph.start_room().unwrap().id;
        let north = graph.create_room_node(RoomData::new("North"), [1.0, 2.0]);
        graph.connect_to_input(start, Slot::Top, north, false).unwrap();
        let persisted = PersistedGraph::from_graph(&graph).unwrap();

        assert_eq!(store.save_container("Dungeon", &persisted).unwrap(), SaveOutcome::Created);
        assert!(store.path_for("Dungeon").is_file());
        assert!(store.exists("Dungeon"));
        assert_eq!(store.save_container("Dungeon", &persisted).unwrap(), SaveOutcome::Overwritten);

        let loaded = store.load_container("Dungeon").unwrap();
        assert_eq!(loaded, persisted);
        assert_eq!(store.names(), vec!["Dungeon".to_string()]);
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_namespace(dir.path(), "Levels");
        assert!(matches!(store.load_container("Nope"), Err(StoreError::NotFound(_))));
        assert!(store.names().is_empty());
    }

    #[test]
    fn test_file_store_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::create_dir_all(store.folder()).unwrap();
        std::fs::write(store.path_for("Broken"), "not ron at all {").unwrap();
        assert!(matches!(store.load_container("Broken"), Err(StoreError::Parse(_))));
    }
}
