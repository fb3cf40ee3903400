use std::io::Write;

use eframe::egui::vec2;
use role_graph::{
    DataVersion, DrawCommand, Highlight, LayoutConfig, LayoutEngine, RenderStyle, SimulationState,
    Snapshot, ViewTransform, load_snapshot, parse_snapshot,
};

const SNAPSHOT: &str = r#"{
    "roles": [
        {"id": 1, "name": "Alice", "faction_id": 3},
        {"id": 2, "name": "Bob", "faction_id": 3},
        {"id": "3", "display_name": "Carol"},
        {"id": 4, "name": "Dmitri", "faction": 5}
    ],
    "relations": [
        {"role_id": 1, "related_role_id": 2, "relation_type": "friend", "relation_strength": 80, "description": "grew up together"},
        {"role_id": 2, "related_role_id": 1, "relation_type": "friend", "relation_strength": 80},
        {"role_id": 3, "related_role_id": 4, "relation_type": "rival", "relation_strength": "20"},
        {"role_id": 4, "related_role_id": 99, "relation_type": "debtor"}
    ],
    "relation_types": [
        {"value": "friend", "label": "Friend", "preset_strength": 75},
        {"value": "rival", "label": "Rival"}
    ]
}"#;

fn snapshot_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write snapshot");
    file
}

fn loaded_engine(snapshot: &Snapshot) -> LayoutEngine {
    let mut engine = LayoutEngine::new(LayoutConfig::default());
    engine.resize(800.0, 600.0);
    assert!(engine.load(snapshot, DataVersion(1)));
    engine
}

fn line_colors(commands: &[DrawCommand]) -> Vec<eframe::egui::Color32> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Line { stroke, .. } => Some(stroke.color),
            _ => None,
        })
        .collect()
}

#[test]
fn snapshot_file_settles_into_finite_layout() {
    let file = snapshot_file(SNAPSHOT);
    let snapshot = load_snapshot(file.path()).expect("snapshot loads");
    let mut engine = loaded_engine(&snapshot);

    assert_eq!(engine.nodes().len(), 4);
    assert_eq!(engine.edges().len(), 2);
    assert_eq!(engine.stats().dangling_relations, 1);

    let friends = &engine.edges()[0];
    assert!(friends.is_two_way());
    assert_eq!(friends.combined_strength(), 160);
    let rivals = &engine.edges()[1];
    assert!(!rivals.is_two_way());
    assert_eq!(rivals.combined_strength(), 55);

    let mut ticks = 0;
    while engine.tick() {
        ticks += 1;
        assert!(ticks < 2_000, "layout never settled");
    }
    assert!(ticks > 250);
    assert_eq!(engine.state(), SimulationState::Idle);
    assert!(!engine.is_running());
    for node in engine.nodes() {
        assert!(node.position.x.is_finite() && node.position.y.is_finite());
    }
}

#[test]
fn dragged_node_stays_on_pointer_then_moves_after_release() {
    let snapshot = parse_snapshot(SNAPSHOT).expect("snapshot parses");
    let mut engine = loaded_engine(&snapshot);
    for _ in 0..50 {
        engine.tick();
    }

    let index = engine.node_index("1").expect("role 1 present");
    let start = engine.nodes()[index].position;
    assert!(engine.pointer_down(start));
    let target = start + vec2(120.0, -40.0);
    assert!(engine.pointer_move(target));
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.nodes()[index].position, target);
    assert_eq!(engine.state(), SimulationState::Active);

    assert_eq!(engine.pointer_up(), None);
    assert!(!engine.nodes()[index].pinned());
    engine.reheat();
    engine.tick();
    assert_ne!(engine.nodes()[index].position, target);
}

#[test]
fn refresh_keeps_positions_of_persisting_roles() {
    let snapshot = parse_snapshot(SNAPSHOT).expect("snapshot parses");
    let mut engine = loaded_engine(&snapshot);
    for _ in 0..30 {
        engine.tick();
    }
    let before = engine.nodes()[engine.node_index("3").expect("role 3")].position;

    let mut refreshed = snapshot.clone();
    refreshed.roles.push(role_graph::RoleRecord::new("5", "Eve"));
    assert!(!engine.load(&refreshed, DataVersion(1)));
    assert!(engine.load(&refreshed, DataVersion(2)));

    assert_eq!(engine.nodes().len(), 5);
    let after = engine.nodes()[engine.node_index("3").expect("role 3")].position;
    assert_eq!(before, after);
    assert_eq!(engine.simulation().alpha(), 1.0);
}

#[test]
fn weak_threshold_switches_edge_color_at_seventy() {
    let style = RenderStyle::default();
    let color_for = |forward: u8, backward: u8| {
        let raw = format!(
            r#"{{
                "roles": [{{"id": "a"}}, {{"id": "b"}}],
                "relations": [
                    {{"source_id": "a", "target_id": "b", "relation_type": "x", "strength": {forward}}},
                    {{"source_id": "b", "target_id": "a", "relation_type": "x", "strength": {backward}}}
                ]
            }}"#
        );
        let engine = loaded_engine(&parse_snapshot(&raw).expect("snapshot parses"));
        let colors = line_colors(&engine.frame(
            &ViewTransform::default(),
            &style,
            &Highlight::default(),
        ));
        assert_eq!(colors.len(), 2);
        colors[0]
    };

    assert_eq!(color_for(34, 35), style.weak_edge_color);
    assert_eq!(color_for(35, 35), style.edge_color);
}

#[test]
fn collapsed_viewport_pauses_until_resized() {
    let snapshot = parse_snapshot(SNAPSHOT).expect("snapshot parses");
    let mut engine = loaded_engine(&snapshot);
    engine.resize(0.0, 0.0);
    assert!(!engine.tick());
    engine.resize(1024.0, 768.0);
    assert!(engine.tick());
}

#[test]
fn null_lists_give_an_empty_idle_engine() {
    let snapshot =
        parse_snapshot(r#"{"roles": null, "relations": null}"#).expect("snapshot parses");
    let mut engine = LayoutEngine::new(LayoutConfig::default());
    engine.resize(800.0, 600.0);
    engine.load(&snapshot, DataVersion(1));

    assert_eq!(engine.state(), SimulationState::Idle);
    assert!(!engine.tick());
    assert!(
        engine
            .frame(&ViewTransform::default(), &RenderStyle::default(), &Highlight::default())
            .is_empty()
    );
}
