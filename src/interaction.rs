//! Pointer-driven pinning and click detection.

use eframe::egui::Vec2;
use tracing::trace;

use crate::physics::Simulation;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerState {
    Idle,
    /// Pressed on a node but not yet moved past the click distance.
    Pressed {
        node: usize,
        origin: Vec2,
        grab_offset: Vec2,
    },
    Dragging {
        node: usize,
        grab_offset: Vec2,
    },
}

/// A press and release on a node without dragging it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeClick {
    pub node_id: String,
}

/// Drives the `Free -> Dragging -> Free` cycle of one node at a time.
///
/// The held node is pinned from press to release; a press that never
/// travels past `click_distance` is reported as a click on release and
/// leaves the node unpinned again.
///
/// `hit_radius` and `click_distance` are screen pixels; the controller turns
/// them into world units with the zoom last passed to [`Self::set_zoom`].
#[derive(Clone, Debug)]
pub struct DragController {
    state: PointerState,
    zoom: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: PointerState::Idle,
            zoom: 1.0,
        }
    }

    /// Screen pixels per world unit of the view the pointer lives in.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// World-space pick radius at the current zoom.
    pub fn hit_radius(&self, simulation: &Simulation) -> f32 {
        simulation.config().hit_radius / self.zoom
    }

    fn click_distance(&self, simulation: &Simulation) -> f32 {
        simulation.config().click_distance / self.zoom
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Whether a node currently owns the pointer. Hosts use this to keep
    /// pan gestures from firing underneath a node press.
    pub fn is_captured(&self) -> bool {
        !matches!(self.state, PointerState::Idle)
    }

    pub fn held_node(&self) -> Option<usize> {
        match self.state {
            PointerState::Idle => None,
            PointerState::Pressed { node, .. } | PointerState::Dragging { node, .. } => Some(node),
        }
    }

    /// Captures the node under `world`, if any, pins it where it stands and
    /// wakes the simulation.
    pub fn pointer_down(&mut self, simulation: &mut Simulation, world: Vec2) -> bool {
        if self.is_captured() {
            self.release(simulation);
        }

        let Some(node) = simulation.node_at(world, self.hit_radius(simulation)) else {
            return false;
        };

        let position = simulation.nodes()[node].position;
        let drag_alpha_target = simulation.config().drag_alpha_target;
        simulation.pin(node, position);
        simulation.set_alpha_target(drag_alpha_target);
        simulation.restart();

        self.state = PointerState::Pressed {
            node,
            origin: world,
            grab_offset: position - world,
        };
        trace!(node, "pointer captured node");
        true
    }

    /// Moves the pin of the held node along with the pointer.
    pub fn pointer_move(&mut self, simulation: &mut Simulation, world: Vec2) -> bool {
        match self.state {
            PointerState::Idle => false,
            PointerState::Pressed {
                node,
                origin,
                grab_offset,
            } => {
                if (world - origin).length() > self.click_distance(simulation) {
                    self.state = PointerState::Dragging { node, grab_offset };
                    simulation.pin(node, world + grab_offset);
                }
                true
            }
            PointerState::Dragging { node, grab_offset } => {
                simulation.pin(node, world + grab_offset);
                true
            }
        }
    }

    /// Releases the held node and lets the simulation cool down again.
    pub fn pointer_up(&mut self, simulation: &mut Simulation) -> Option<NodeClick> {
        let clicked = match self.state {
            PointerState::Pressed { node, .. } => simulation
                .nodes()
                .get(node)
                .map(|held| NodeClick {
                    node_id: held.id.clone(),
                }),
            _ => None,
        };
        self.release(simulation);
        clicked
    }

    /// Drops the held node without reporting a click, e.g. on focus loss.
    pub fn cancel(&mut self, simulation: &mut Simulation) {
        self.release(simulation);
    }

    /// Forgets the held node without touching the simulation. Used when the
    /// node arena is replaced underneath the controller.
    pub fn reset(&mut self) {
        self.state = PointerState::Idle;
    }

    fn release(&mut self, simulation: &mut Simulation) {
        if let Some(node) = self.held_node() {
            simulation.unpin(node);
            simulation.set_alpha_target(0.0);
        }
        self.state = PointerState::Idle;
    }
}
