mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::graph::{Edge, Node, RoleGraph};
use crate::util::{jiggle, stable_pair};

pub use forces::{
    centering_shift, faction_affinity, faction_pull, faction_weight, link_correction, link_distance,
    link_strength, many_body, spring_coefficient,
};
use forces::{ChargeParams, barnes_hut_charge};
use quadtree::Quadtree;
pub use quadtree::{QuadtreeCell, quadtree_cells};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    /// Settled; ticks do nothing.
    Idle,
    /// Alpha decaying toward zero.
    Cooling,
    /// Alpha held up by a non-zero target, e.g. while dragging.
    Active,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
    pending_cells: Vec<usize>,
}

/// Owns node kinematics for one data version and advances them per tick.
pub struct Simulation {
    config: LayoutConfig,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
    link_bias: Vec<f32>,
    alpha: f32,
    alpha_target: f32,
    viewport: Vec2,
    paused: bool,
    stopped: bool,
    scratch: PhysicsScratch,
}

impl Simulation {
    /// Starts empty and paused until [`Simulation::resize`] reports a
    /// positive viewport.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            link_bias: Vec::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            viewport: Vec2::ZERO,
            paused: true,
            stopped: false,
            scratch: PhysicsScratch::default(),
        }
    }

    /// Replaces the whole node arena. Ids present before keep their position
    /// and velocity, new ids are scattered around the center. Pins are
    /// cleared.
    pub fn reseed(&mut self, graph: RoleGraph) {
        let mut previous = self
            .nodes
            .drain(..)
            .map(|node| (node.id, (node.position, node.velocity)))
            .collect::<HashMap<_, _>>();

        let center = self.center();
        let RoleGraph {
            mut nodes,
            edges,
            index_by_id,
            ..
        } = graph;

        let mut carried = 0usize;
        for node in &mut nodes {
            node.pin = None;
            if let Some((position, velocity)) = previous.remove(&node.id) {
                node.position = position;
                node.velocity = velocity;
                carried += 1;
            } else {
                let (jx, jy) = stable_pair(&node.id);
                node.position = center + vec2(jx, jy) * self.config.seed_spread;
                node.velocity = Vec2::ZERO;
            }
        }

        let mut degree = vec![0usize; nodes.len()];
        for edge in &edges {
            let (a, b) = edge.endpoints();
            degree[a] += 1;
            degree[b] += 1;
        }
        self.link_bias = edges
            .iter()
            .map(|edge| {
                let (a, b) = edge.endpoints();
                degree[a] as f32 / (degree[a] + degree[b]) as f32
            })
            .collect();

        self.nodes = nodes;
        self.edges = edges;
        self.index_by_id = index_by_id;
        self.alpha = if self.nodes.is_empty() { 0.0 } else { 1.0 };
        self.alpha_target = 0.0;
        self.stopped = false;

        info!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            carried,
            "reseeded simulation"
        );
    }

    /// Updates the centering target. Node positions and alpha are left
    /// alone; a zero-sized viewport pauses ticking.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            if !self.paused {
                debug!(width, height, "viewport collapsed, pausing simulation");
            }
            self.paused = true;
            return;
        }
        self.viewport = vec2(width, height);
        self.paused = false;
    }

    pub fn center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> SimulationState {
        if self.alpha_target > 0.0 {
            SimulationState::Active
        } else if self.alpha >= self.config.alpha_min {
            SimulationState::Cooling
        } else {
            SimulationState::Idle
        }
    }

    /// Whether the next [`Simulation::tick`] would move anything.
    pub fn is_running(&self) -> bool {
        !self.stopped
            && !self.paused
            && !self.nodes.is_empty()
            && self.state() != SimulationState::Idle
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Raises alpha back to 1 and resumes ticking.
    pub fn reheat(&mut self) {
        if !self.nodes.is_empty() {
            self.alpha = 1.0;
        }
        self.stopped = false;
    }

    pub fn restart(&mut self) {
        self.stopped = false;
    }

    /// Halts ticking until the next restart, reheat or reseed.
    pub fn stop(&mut self) {
        if !self.stopped {
            debug!("simulation stopped");
        }
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Nearest node whose center lies within `radius` of `point`.
    pub fn node_at(&self, point: Vec2, radius: f32) -> Option<usize> {
        let radius_sq = radius * radius;
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, (node.position - point).length_sq()))
            .filter(|(_, distance_sq)| *distance_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Fixes `index` at `position`; the integrator leaves it there.
    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = Some(position);
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    /// Advances one step. Returns false when nothing moved because the
    /// simulation is idle, stopped, paused or empty.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let node_count = self.nodes.len();
        let config = self.config;
        let center = self.center();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.nodes.iter().map(|node| node.position));
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);
        let positions = &scratch.positions;
        let deltas = &mut scratch.deltas;
        let pending = &mut scratch.pending_cells;

        let charge = ChargeParams {
            strength: config.charge_strength,
            alpha,
            distance_min_sq: config.charge_distance_min * config.charge_distance_min,
            theta: config.barnes_hut_theta,
        };
        let tree = if node_count >= config.barnes_hut_min_nodes {
            Quadtree::build(positions, charge.strength)
        } else {
            None
        };
        if let Some(tree) = tree {
            for (index, delta) in deltas.iter_mut().enumerate() {
                *delta += barnes_hut_charge(&tree, index, positions, charge, pending);
            }
        } else {
            for i in 0..node_count {
                for j in (i + 1)..node_count {
                    let push = many_body(
                        positions[i],
                        positions[j],
                        charge.strength,
                        alpha,
                        charge.distance_min_sq,
                        jiggle(i, j),
                    );
                    deltas[i] += push;
                    deltas[j] -= push;
                }
            }
        }

        let pair_weight = faction_weight(config.faction_scale, node_count);
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let affinity = faction_affinity(&self.nodes[i], &self.nodes[j], &config);
                let pull = faction_pull(
                    positions[i],
                    positions[j],
                    affinity,
                    alpha,
                    pair_weight,
                    jiggle(i, j),
                );
                deltas[i] += pull;
                deltas[j] -= pull;
            }
        }

        for (edge, &bias) in self.edges.iter().zip(&self.link_bias) {
            let strength = link_strength(edge, &config);
            let (source, target) = edge.endpoints();
            if strength == 0.0 || source == target {
                continue;
            }
            let correction = link_correction(
                positions[source],
                positions[target],
                link_distance(edge.combined_strength(), &config),
                strength,
                alpha,
                jiggle(source, target),
            );
            deltas[target] -= correction * bias;
            deltas[source] += correction * (1.0 - bias);
        }

        let shift = centering_shift(positions, center, config.center_strength);
        let retain = 1.0 - config.velocity_decay;
        for (node, delta) in self.nodes.iter_mut().zip(deltas.iter()) {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }
            node.velocity = (node.velocity + *delta) * retain;
            node.position += node.velocity + shift;
        }

        true
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|node| node.position).collect()
    }
}
