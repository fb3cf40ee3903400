use eframe::egui::Vec2;
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::data::{RelationCatalog, Snapshot};
use crate::graph::{AggregateStats, Edge, Node, RelationRecord, RoleRecord, aggregate};
use crate::interaction::DragController;
use crate::physics::{Simulation, SimulationState};
use crate::render::{DrawCommand, Highlight, RenderStyle, ViewTransform, render};

/// Identifies one loaded snapshot. A different token means a full reseed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataVersion(pub u64);

type NodeClickCallback = Box<dyn FnMut(&str)>;

/// Aggregation, simulation, interaction and rendering behind one handle.
///
/// The host calls [`LayoutEngine::tick`] once per frame while
/// [`LayoutEngine::is_running`] holds, forwards pointer events in world
/// coordinates and paints [`LayoutEngine::frame`].
pub struct LayoutEngine {
    simulation: Simulation,
    controller: DragController,
    catalog: RelationCatalog,
    version: Option<DataVersion>,
    stats: AggregateStats,
    on_node_click: Option<NodeClickCallback>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            simulation: Simulation::new(config),
            controller: DragController::new(),
            catalog: RelationCatalog::default(),
            version: None,
            stats: AggregateStats::default(),
            on_node_click: None,
        }
    }

    /// Loads `snapshot` unless `version` is already loaded. Returns whether
    /// the layout was reseeded.
    pub fn load(&mut self, snapshot: &Snapshot, version: DataVersion) -> bool {
        self.load_records(
            &snapshot.roles,
            &snapshot.relations,
            snapshot.catalog.clone(),
            version,
        )
    }

    pub fn load_records(
        &mut self,
        roles: &[RoleRecord],
        relations: &[RelationRecord],
        catalog: RelationCatalog,
        version: DataVersion,
    ) -> bool {
        if self.version == Some(version) {
            debug!(version = version.0, "data version unchanged, keeping layout");
            return false;
        }

        // Any held node index belongs to the arena about to be replaced.
        self.controller.reset();
        let graph = aggregate(roles, relations);
        self.stats = graph.stats;
        self.simulation.reseed(graph);
        self.catalog = catalog;
        self.version = Some(version);
        info!(
            version = version.0,
            dangling = self.stats.dangling_relations,
            "loaded data version"
        );
        true
    }

    pub fn version(&self) -> Option<DataVersion> {
        self.version
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.simulation.resize(width, height);
    }

    pub fn tick(&mut self) -> bool {
        self.simulation.tick()
    }

    /// True while ticks still move nodes; hosts stop scheduling frames once
    /// this turns false.
    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn state(&self) -> SimulationState {
        self.simulation.state()
    }

    pub fn frame(
        &self,
        view: &ViewTransform,
        style: &RenderStyle,
        highlight: &Highlight,
    ) -> Vec<DrawCommand> {
        render(
            self.simulation.nodes(),
            self.simulation.edges(),
            view,
            style,
            &self.catalog,
            highlight,
        )
    }

    pub fn set_on_node_click(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_node_click = Some(Box::new(callback));
    }

    /// Screen pixels per world unit; pointer thresholds are scaled by it.
    pub fn set_pointer_zoom(&mut self, zoom: f32) {
        self.controller.set_zoom(zoom);
    }

    /// Returns whether a node captured the press.
    pub fn pointer_down(&mut self, world: Vec2) -> bool {
        self.controller.pointer_down(&mut self.simulation, world)
    }

    pub fn pointer_move(&mut self, world: Vec2) -> bool {
        self.controller.pointer_move(&mut self.simulation, world)
    }

    /// Ends the press; a press without drag fires the node-click callback
    /// and returns the clicked id.
    pub fn pointer_up(&mut self) -> Option<String> {
        let click = self.controller.pointer_up(&mut self.simulation)?;
        if let Some(callback) = self.on_node_click.as_mut() {
            callback(&click.node_id);
        }
        Some(click.node_id)
    }

    pub fn cancel_pointer(&mut self) {
        self.controller.cancel(&mut self.simulation);
    }

    pub fn is_pointer_captured(&self) -> bool {
        self.controller.is_captured()
    }

    pub fn reheat(&mut self) {
        self.simulation.reheat();
    }

    pub fn restart(&mut self) {
        self.simulation.restart();
    }

    /// Halts the tick loop. Safe to call more than once.
    pub fn stop(&mut self) {
        self.controller.cancel(&mut self.simulation);
        self.simulation.stop();
    }

    pub fn config(&self) -> &LayoutConfig {
        self.simulation.config()
    }

    /// Swaps the force constants in place and reheats so the change shows.
    pub fn set_config(&mut self, config: LayoutConfig) {
        if *self.simulation.config() == config {
            return;
        }
        self.simulation.set_config(config);
        self.simulation.reheat();
    }

    pub fn catalog(&self) -> &RelationCatalog {
        &self.catalog
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn nodes(&self) -> &[Node] {
        self.simulation.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.simulation.edges()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.simulation.index_of(id)
    }

    pub fn node_at(&self, world: Vec2) -> Option<usize> {
        self.simulation
            .node_at(world, self.controller.hit_radius(&self.simulation))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eframe::egui::vec2;

    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            roles: vec![
                RoleRecord::new("a", "A").with_faction(1),
                RoleRecord::new("b", "B"),
            ],
            relations: vec![
                RelationRecord::new("a", "b", "friend", 80),
                RelationRecord::new("a", "ghost", "friend", 80),
            ],
            catalog: RelationCatalog::default(),
        }
    }

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.resize(800.0, 600.0);
        engine
    }

    #[test]
    fn same_version_does_not_reseed() {
        let mut engine = engine();
        assert!(engine.load(&snapshot(), DataVersion(1)));
        for _ in 0..10 {
            engine.tick();
        }
        let alpha = engine.simulation().alpha();
        assert!(!engine.load(&snapshot(), DataVersion(1)));
        assert_eq!(engine.simulation().alpha(), alpha);
        assert!(engine.load(&snapshot(), DataVersion(2)));
        assert_eq!(engine.simulation().alpha(), 1.0);
        assert_eq!(engine.stats().dangling_relations, 1);
    }

    #[test]
    fn click_invokes_callback() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);
        engine.set_on_node_click(move |id| sink.borrow_mut().push(id.to_owned()));

        let position = engine.nodes()[0].position;
        assert!(engine.pointer_down(position));
        assert!(engine.is_pointer_captured());
        assert_eq!(engine.pointer_up().as_deref(), Some("a"));
        assert_eq!(clicked.borrow().as_slice(), ["a".to_owned()]);
        assert!(!engine.nodes()[0].pinned());
    }

    #[test]
    fn drag_does_not_invoke_callback() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        let clicked = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&clicked);
        engine.set_on_node_click(move |_| *sink.borrow_mut() += 1);

        let position = engine.nodes()[1].position;
        engine.pointer_down(position);
        engine.pointer_move(position + vec2(50.0, 0.0));
        assert_eq!(engine.pointer_up(), None);
        assert_eq!(*clicked.borrow(), 0);
    }

    #[test]
    fn pick_radius_follows_pointer_zoom() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        let a = engine.nodes()[0].position;
        let away = (a - engine.nodes()[1].position).normalized();
        let pointer = a + away * 20.0;

        assert_eq!(engine.node_at(pointer), None);
        engine.set_pointer_zoom(0.25);
        assert_eq!(engine.node_at(pointer), Some(0));
        assert!(engine.pointer_down(pointer));
        engine.pointer_move(pointer + away * 8.0);
        assert_eq!(engine.pointer_up().as_deref(), Some("a"));
    }

    #[test]
    fn reload_while_dragging_drops_the_press() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        let position = engine.nodes()[0].position;
        engine.pointer_down(position);

        engine.load(&snapshot(), DataVersion(2));
        assert!(!engine.is_pointer_captured());
        assert!(engine.nodes().iter().all(|node| !node.pinned()));
        assert_eq!(engine.pointer_up(), None);
    }

    #[test]
    fn stop_halts_ticking() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        assert!(engine.is_running());
        engine.stop();
        assert!(!engine.is_running());
        assert!(!engine.tick());
    }

    #[test]
    fn frame_reflects_loaded_graph() {
        let mut engine = engine();
        engine.load(&snapshot(), DataVersion(1));
        let commands = engine.frame(
            &ViewTransform::default(),
            &RenderStyle::default(),
            &Highlight::default(),
        );
        let circles = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 2);
    }
}
