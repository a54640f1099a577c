// SPDX-License-Identifier: MIT OR Apache-2.0
//! Save a small level to disk and load it back into a fresh session.

use leveldesign_editor_graph::{
    ContainerStore, EditorSession, EditorSettings, EnemyData, EnemyType, FileStore, GraphError,
    NodeKind, RoomData, SaveOutcome, Slot,
};

#[test]
fn level_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());

    let mut session = EditorSession::new(EditorSettings {
        default_level_name: "Level".to_string(),
        start_room_name: "Start".to_string(),
        ..EditorSettings::default()
    });
    let graph = session.graph_mut();
    let start = graph.start_room().unwrap().id;
    let north = graph.create_room_node(RoomData::new("North").ending(), [600.0, 0.0]);
    let enemy = graph.create_enemy_node(EnemyData::new(EnemyType::TestEnemy1), [600.0, 400.0]);
    graph.connect_to_input(start, Slot::Top, north, false).unwrap();
    graph.connect_to_input(start, Slot::Enemies, enemy, false).unwrap();

    assert_eq!(session.save_as(&mut store, "Dungeon", false).unwrap(), SaveOutcome::Created);

    let persisted = store.load_container("Dungeon").unwrap();
    assert_eq!(persisted.link_records.len(), 3);
    assert!(persisted.link_records[0].is_entry_link);
    assert_eq!(persisted.room_records.len(), 2);
    assert_eq!(persisted.enemy_records.len(), 1);

    let mut reloaded = EditorSession::new(EditorSettings::default());
    let report = reloaded.load(&store, "Dungeon").unwrap();
    assert_eq!(report.links, 3);

    let graph = reloaded.graph();
    let (levels, rooms, enemies) = graph.variant_counts();
    assert_eq!((levels, rooms, enemies), (1, 2, 1));

    let start = graph.start_room().unwrap();
    assert_eq!(start.title(), "Start");
    assert_eq!(graph.links_from(start.id).len(), 2);

    let north = graph.node_by_title("North").unwrap();
    assert!(matches!(&north.kind, NodeKind::Room(room) if room.is_ending_point));
    assert_eq!(north.position, [600.0, 0.0]);
    assert!(graph.links_from(start.id).contains(&(Slot::Top, north.id)));

    let enemy = graph.node_by_title("TestEnemy1").unwrap();
    assert!(graph.links_from(start.id).contains(&(Slot::Enemies, enemy.id)));

    // The entry edge and start room stay protected after the reload
    let entry_edge = graph.connections().find(|c| c.protected).unwrap();
    assert_eq!(entry_edge.to_node, start.id);
    let start_id = start.id;
    let entry_edge_id = entry_edge.id;
    let graph = reloaded.graph_mut();
    assert!(matches!(graph.remove_node(start_id), Err(GraphError::NotDeletable(_))));
    assert!(matches!(graph.disconnect(entry_edge_id), Err(GraphError::ProtectedConnection(_))));
}
