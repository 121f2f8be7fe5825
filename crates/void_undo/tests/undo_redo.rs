//! End-to-end undo/redo tests for scene object snapshots
//!
//! Every test makes an edit the way the editor does: record first, then
//! change the graph, then drive the history.

use void_scene::{
    ColliderShape, Component, ComponentKind, FieldValue, NodeHandle, SceneGraph, SceneNodeData, Transform,
};
use void_undo::{
    commands, RecordSceneObjectCommand, RecordState, SceneSnapshotCodec, SnapshotBlob, SnapshotError,
    UndoConfig, UndoRedo,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Level
/// └── Table
///     ├── Lamp (light)
///     └── Book
///         └── Bookmark
fn furnished_scene() -> (SceneGraph, NodeHandle, NodeHandle) {
    let mut graph = SceneGraph::new();
    let level = graph.spawn("Level");
    let table = graph.spawn_child(level, "Table").unwrap();
    let lamp = graph.spawn_child(table, "Lamp").unwrap();
    let book = graph.spawn_child(table, "Book").unwrap();
    graph.spawn_child(book, "Bookmark").unwrap();

    {
        let node = graph.get_mut(table).unwrap();
        node.transform = Transform::new([0.1, -0.0, 3.3], [0.0, 0.7071068, 0.0, 0.7071068], [1.0, 1.5, 1.0]);
        node.add_component(Component::mesh("table.mesh"));
        node.add_component(Component::Collider {
            shape: ColliderShape::Box {
                half_extents: [1.0, 0.5, 1.0],
            },
            is_trigger: false,
        });
        node.add_component(
            Component::script("Wobble")
                .with_field("speed", FieldValue::Float(0.1))
                .with_field("label", FieldValue::Text("oak".into())),
        );
    }
    graph
        .get_mut(lamp)
        .unwrap()
        .add_component(Component::point_light([1.0, 0.9, 0.7], 3.0, 8.0));
    graph.get_mut(book).unwrap().transform = Transform::from_translation([f32::MIN_POSITIVE, 1e-7, -2.5]);

    (graph, level, table)
}

/// Transform bits of a subtree in pre-order
fn transform_bits(graph: &SceneGraph, node: NodeHandle) -> Vec<[u32; 10]> {
    std::iter::once(node)
        .chain(graph.descendants(node))
        .map(|h| graph.get(h).unwrap().transform.to_bits())
        .collect()
}

fn whole_scene(graph: &SceneGraph) -> Vec<SceneNodeData> {
    graph
        .roots()
        .iter()
        .map(|&root| graph.snapshot_data(root, true).unwrap())
        .collect()
}

#[test]
fn snapshot_roundtrip_deep_subtree() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let codec = SceneSnapshotCodec::new();

    let blob = codec.encode(&graph, table, true).unwrap();
    let copy = codec.decode(&mut graph, &blob).unwrap();

    assert_eq!(
        graph.snapshot_data(copy, true).unwrap(),
        graph.snapshot_data(table, true).unwrap()
    );
    assert_eq!(transform_bits(&graph, copy), transform_bits(&graph, table));

    // Encoding is deterministic
    assert_eq!(codec.encode(&graph, copy, true).unwrap(), blob);
}

#[test]
fn commit_is_idempotent() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let mut cmd = RecordSceneObjectCommand::new(table, true, "Move Table");
    cmd.rerecord(&graph).unwrap();

    graph.get_mut(table).unwrap().transform.translation = [5.0, 0.0, 0.0];
    let edited = whole_scene(&graph);

    cmd.commit(&mut graph).unwrap();
    cmd.commit(&mut graph).unwrap();

    assert_eq!(cmd.state(), RecordState::Committed);
    assert_eq!(cmd.target(), table);
    assert_eq!(whole_scene(&graph), edited);
}

#[test]
fn undo_redo_is_bit_exact() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let mut history = UndoRedo::new();
    let before = transform_bits(&graph, table);
    let table_id = graph.id_of(table).unwrap();

    commands::execute(&mut history, &graph, table, true, "Rotate Table").unwrap();
    graph.get_mut(table).unwrap().transform.rotation = [0.3826834, 0.0, 0.0, 0.9238795];
    let book = graph.children(table)[1];
    graph.get_mut(book).unwrap().transform.scale = [2.0, 2.0, 2.0];
    let after = transform_bits(&graph, table);

    assert!(history.undo(&mut graph).unwrap());
    let restored = graph.find(table_id).unwrap();
    assert_eq!(transform_bits(&graph, restored), before);

    assert!(history.redo(&mut graph).unwrap());
    let reapplied = graph.find(table_id).unwrap();
    assert_eq!(transform_bits(&graph, reapplied), after);
}

#[test]
fn hundred_cycles_are_stable() {
    init_logging();
    let (mut graph, level, table) = furnished_scene();
    let mut history = UndoRedo::new();
    let before = whole_scene(&graph);

    commands::execute(&mut history, &graph, table, true, "").unwrap();
    graph.get_mut(table).unwrap().name = "Desk".into();
    let after = whole_scene(&graph);
    let node_count = graph.len();

    for _ in 0..100 {
        history.undo(&mut graph).unwrap();
        assert_eq!(whole_scene(&graph), before);
        history.redo(&mut graph).unwrap();
        assert_eq!(whole_scene(&graph), after);
    }

    // No leaked nodes, and the table is still where it was
    assert_eq!(graph.len(), node_count);
    assert_eq!(graph.children(level).len(), 1);
}

#[test]
fn dangling_parent_falls_back_to_grandparent() {
    init_logging();
    let (mut graph, level, table) = furnished_scene();
    let book = graph.children(table)[1];
    let mut cmd = RecordSceneObjectCommand::new(book, false, "Move Book");
    cmd.rerecord(&graph).unwrap();

    // Move the book out, then delete the table it was recorded under
    graph.set_parent(book, None).unwrap();
    graph.destroy(table).unwrap();

    cmd.revert(&mut graph).unwrap();
    let restored = cmd.target();
    assert_eq!(graph.parent(restored), Some(level));
    assert_eq!(graph.get(restored).unwrap().name, "Book");

    // Redo puts it back at the root level where the edit left it
    cmd.commit(&mut graph).unwrap();
    assert_eq!(graph.parent(cmd.target()), None);
    assert!(graph.roots().contains(&cmd.target()));
}

#[test]
fn dangling_parent_with_no_survivor_goes_to_scene_root() {
    init_logging();
    let (mut graph, level, table) = furnished_scene();
    let mut cmd = RecordSceneObjectCommand::new(table, false, "");
    cmd.rerecord(&graph).unwrap();

    graph.set_parent(table, None).unwrap();
    graph.destroy(level).unwrap();

    cmd.revert(&mut graph).unwrap();
    assert!(graph.is_attached(cmd.target()));
    assert_eq!(graph.parent(cmd.target()), None);
}

#[test]
fn hierarchy_flag_controls_child_restore() {
    init_logging();

    // With the hierarchy, a deleted child comes back
    let (mut graph, _, table) = furnished_scene();
    let mut cmd = RecordSceneObjectCommand::new(table, true, "");
    cmd.rerecord(&graph).unwrap();
    let lamp = graph.children(table)[0];
    graph.destroy(lamp).unwrap();

    cmd.revert(&mut graph).unwrap();
    let names: Vec<_> = graph
        .children(cmd.target())
        .iter()
        .map(|&c| graph.get(c).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["Lamp", "Book"]);

    // Without it, child edits are out of scope and stay as they are
    let (mut graph, _, table) = furnished_scene();
    let mut cmd = RecordSceneObjectCommand::new(table, false, "");
    cmd.rerecord(&graph).unwrap();
    let lamp = graph.children(table)[0];
    let book = graph.children(table)[1];
    graph.destroy(lamp).unwrap();
    let vase = graph.spawn_child(table, "Vase").unwrap();
    graph.get_mut(table).unwrap().remove_components(ComponentKind::Script);

    cmd.revert(&mut graph).unwrap();
    let restored = cmd.target();
    assert_eq!(graph.children(restored), &[book, vase]);
    assert!(graph.get(restored).unwrap().component(ComponentKind::Script).is_some());
    assert!(graph.is_destroyed(lamp));
}

#[test]
fn corrupt_blob_leaves_graph_untouched() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let codec = SceneSnapshotCodec::new();
    let before = whole_scene(&graph);
    let nodes = graph.len();

    let mut bytes = codec.encode(&graph, table, true).unwrap().into_bytes();
    bytes.truncate(bytes.len() / 2);
    let truncated = SnapshotBlob::from_bytes(bytes);

    assert!(matches!(
        codec.decode(&mut graph, &truncated),
        Err(SnapshotError::CorruptBlob(_))
    ));
    assert!(matches!(
        codec.decode(&mut graph, &SnapshotBlob::from_bytes(b"not a snapshot".to_vec())),
        Err(SnapshotError::CorruptBlob(_))
    ));
    assert_eq!(graph.len(), nodes);
    assert_eq!(whole_scene(&graph), before);
}

#[test]
fn serialization_failure_leaves_command_empty() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    if let Some(Component::Script { faulted, .. }) = graph.get_mut(table).unwrap().component_mut(ComponentKind::Script) {
        *faulted = true;
    }

    let mut cmd = RecordSceneObjectCommand::new(table, true, "");
    assert!(matches!(cmd.rerecord(&graph), Err(SnapshotError::Serialization { .. })));
    assert_eq!(cmd.state(), RecordState::Empty);
    assert_eq!(cmd.snapshot_len(), 0);

    let mut history = UndoRedo::new();
    assert!(commands::execute(&mut history, &graph, table, true, "").is_err());
    assert!(!history.can_undo());
}

#[test]
fn capture_beyond_depth_limit_is_refused() {
    init_logging();
    let mut graph = SceneGraph::new();
    let root = graph.spawn("Chain0");
    let mut tail = root;
    for i in 1..1100 {
        tail = graph.spawn_child(tail, format!("Chain{}", i)).unwrap();
    }
    let mut history = UndoRedo::new();
    assert!(1100 > history.config().max_snapshot_depth);

    assert!(matches!(
        commands::execute(&mut history, &graph, root, true, "Move Chain"),
        Err(SnapshotError::Serialization { .. })
    ));
    assert!(!history.can_undo());
    assert!(history.is_empty());

    let mut cmd = RecordSceneObjectCommand::new(root, true, "");
    assert!(cmd.rerecord(&graph).is_err());
    assert_eq!(cmd.state(), RecordState::Empty);

    // Without the hierarchy the root alone is well within the limit
    commands::execute(&mut history, &graph, root, false, "Move Chain").unwrap();
    graph.get_mut(root).unwrap().transform = Transform::from_translation([1.0, 0.0, 0.0]);
    assert!(history.undo(&mut graph).unwrap());
    let restored = graph.find_by_name("Chain0").unwrap();
    assert_eq!(graph.get(restored).unwrap().transform, Transform::IDENTITY);
    assert_eq!(graph.descendants(restored).len(), 1099);
}

#[test]
fn identity_survives_parent_restore() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let mut history = UndoRedo::new();
    let book = graph.children(table)[1];
    let book_id = graph.id_of(book).unwrap();

    commands::execute(&mut history, &graph, book, false, "Rename Book").unwrap();
    graph.get_mut(book).unwrap().name = "Novel".into();

    commands::execute(&mut history, &graph, table, true, "Rename Table").unwrap();
    graph.get_mut(table).unwrap().name = "Desk".into();

    // Restoring the table recreates the book under a new handle
    history.undo(&mut graph).unwrap();
    assert!(graph.is_destroyed(book));
    let book_now = graph.find(book_id).unwrap();
    assert_eq!(graph.get(book_now).unwrap().name, "Novel");

    // The book's own command still finds it
    history.undo(&mut graph).unwrap();
    let book_now = graph.find(book_id).unwrap();
    assert_eq!(graph.get(book_now).unwrap().name, "Book");
    assert_eq!(graph.child_index(book_now), Some(1));

    history.redo(&mut graph).unwrap();
    history.redo(&mut graph).unwrap();
    let table_now = graph.find_by_name("Desk").unwrap();
    let book_now = graph.find(book_id).unwrap();
    assert_eq!(graph.parent(book_now), Some(table_now));
    assert_eq!(graph.get(book_now).unwrap().name, "Novel");
}

#[test]
fn history_evicts_oldest_snapshots() {
    init_logging();
    let (graph, _, table) = furnished_scene();
    let config = UndoConfig::from_toml_str("max_history = 2\n").unwrap();
    let mut history = UndoRedo::startup(config);

    for description in ["First", "Second", "Third"] {
        commands::execute(&mut history, &graph, table, false, description).unwrap();
    }

    assert_eq!(history.undo_count(), 2);
    assert_eq!(history.undo_description(), Some("Third"));
    history.shutdown();
}

#[test]
fn transaction_undoes_as_one_unit() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let mut history = UndoRedo::new();
    let lamp = graph.children(table)[0];
    let book = graph.children(table)[1];
    let before = whole_scene(&graph);

    history.begin_transaction("Tidy Table");
    commands::execute(&mut history, &graph, lamp, false, "").unwrap();
    graph.get_mut(lamp).unwrap().active = false;
    commands::execute(&mut history, &graph, book, false, "").unwrap();
    graph.get_mut(book).unwrap().transform.translation = [0.0, 0.0, 0.0];
    history.commit_transaction();
    let after = whole_scene(&graph);

    assert_eq!(history.undo_count(), 1);
    history.undo(&mut graph).unwrap();
    assert_eq!(whole_scene(&graph), before);
    history.redo(&mut graph).unwrap();
    assert_eq!(whole_scene(&graph), after);
}

#[test]
fn record_uses_configured_hierarchy_default() {
    init_logging();
    let (mut graph, _, table) = furnished_scene();
    let config = UndoConfig::from_toml_str("record_hierarchy = true\n").unwrap();
    let mut history = UndoRedo::with_config(config);
    let before = whole_scene(&graph);

    commands::record(&mut history, &graph, table, "Clear Table").unwrap();
    for child in graph.children(table).to_vec() {
        graph.destroy(child).unwrap();
    }

    history.undo(&mut graph).unwrap();
    assert_eq!(whole_scene(&graph), before);
}
