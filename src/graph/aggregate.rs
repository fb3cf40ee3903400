use std::collections::HashMap;

use eframe::egui::Vec2;
use tracing::debug;

use super::records::{FactionId, NEUTRAL_STRENGTH, RelationRecord, RoleRecord};

/// Order-independent key of a role pair: the two ids, sorted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(first: &str, second: &str) -> Self {
        if first <= second {
            Self {
                low: first.to_owned(),
                high: second.to_owned(),
            }
        } else {
            Self {
                low: second.to_owned(),
                high: first.to_owned(),
            }
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub display_name: String,
    pub faction_id: Option<FactionId>,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed position while the node is held by the pointer.
    pub pin: Option<Vec2>,
}

impl Node {
    fn from_record(record: &RoleRecord) -> Self {
        Self {
            id: record.id.clone(),
            display_name: record.display_name.clone(),
            faction_id: record.faction_id,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
        }
    }

    pub fn pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// All records connecting one unordered pair of nodes.
///
/// `endpoints` are indices into the node arena the edge was aggregated
/// against; `endpoints.0` belongs to [`PairKey::low`]. A role related to
/// itself gets a loop edge with both endpoints on the same node.
#[derive(Clone, Debug)]
pub struct Edge {
    key: PairKey,
    endpoints: (usize, usize),
    records: Vec<RelationRecord>,
    is_two_way: bool,
    combined_strength: u16,
}

impl Edge {
    pub fn new(key: PairKey, endpoints: (usize, usize)) -> Self {
        Self {
            key,
            endpoints,
            records: Vec::new(),
            is_two_way: false,
            combined_strength: u16::from(NEUTRAL_STRENGTH) * 2,
        }
    }

    /// Appends a record. Duplicates are kept, not merged.
    pub fn push(&mut self, record: RelationRecord) {
        self.records.push(record);
        self.refresh();
    }

    fn refresh(&mut self) {
        let forward = self.first_strength(self.key.low(), self.key.high());
        let backward = if self.is_self_loop() {
            None
        } else {
            self.first_strength(self.key.high(), self.key.low())
        };
        self.is_two_way = forward.is_some() && backward.is_some();
        self.combined_strength = u16::from(forward.unwrap_or(NEUTRAL_STRENGTH))
            + u16::from(backward.unwrap_or(NEUTRAL_STRENGTH));
    }

    fn first_strength(&self, from: &str, to: &str) -> Option<u8> {
        self.records
            .iter()
            .find(|record| record.source_id == from && record.target_id == to)
            .map(|record| record.strength)
    }

    pub fn key(&self) -> &PairKey {
        &self.key
    }

    pub fn endpoints(&self) -> (usize, usize) {
        self.endpoints
    }

    /// Source and target are the same role. Never two-way, never pulls.
    pub fn is_self_loop(&self) -> bool {
        self.key.low() == self.key.high()
    }

    pub fn records(&self) -> &[RelationRecord] {
        &self.records
    }

    pub fn is_two_way(&self) -> bool {
        self.is_two_way
    }

    /// Forward plus reverse strength, a missing side counting as 35.
    pub fn combined_strength(&self) -> u16 {
        self.combined_strength
    }

    /// Arena index the arrowhead of a one-way edge points at.
    pub fn arrow_target(&self) -> usize {
        match self.records.first() {
            Some(record) if record.target_id == self.key.low() => self.endpoints.0,
            _ => self.endpoints.1,
        }
    }

    /// Two-way pairs are weak below a combined 70, one-way pairs when any
    /// record sits below neutral.
    pub fn is_weak(&self) -> bool {
        if self.is_two_way {
            self.combined_strength < u16::from(NEUTRAL_STRENGTH) * 2
        } else {
            self.records
                .iter()
                .any(|record| record.strength < NEUTRAL_STRENGTH)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub duplicate_roles: usize,
    pub dangling_relations: usize,
    /// Records whose source and target are the same role, kept as loops.
    pub self_relations: usize,
}

#[derive(Clone, Debug, Default)]
pub struct RoleGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub index_by_id: HashMap<String, usize>,
    pub stats: AggregateStats,
}

/// Builds the node arena and the pair-keyed edges.
///
/// Duplicate role ids keep the slot of their first occurrence but take the
/// data of the last one. Relations naming an unknown role are left out; a
/// relation with the same role on both ends becomes a loop edge.
pub fn aggregate(roles: &[RoleRecord], relations: &[RelationRecord]) -> RoleGraph {
    let mut stats = AggregateStats::default();
    let mut nodes: Vec<Node> = Vec::with_capacity(roles.len());
    let mut index_by_id = HashMap::with_capacity(roles.len());

    for role in roles {
        if let Some(&index) = index_by_id.get(&role.id) {
            nodes[index] = Node::from_record(role);
            stats.duplicate_roles += 1;
            continue;
        }
        index_by_id.insert(role.id.clone(), nodes.len());
        nodes.push(Node::from_record(role));
    }

    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_by_key: HashMap<PairKey, usize> = HashMap::new();
    for relation in relations {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(&relation.source_id),
            index_by_id.get(&relation.target_id),
        ) else {
            stats.dangling_relations += 1;
            debug!(
                source = %relation.source_id,
                target = %relation.target_id,
                "dropping relation with unknown endpoint"
            );
            continue;
        };
        if source == target {
            stats.self_relations += 1;
        }

        let key = PairKey::new(&relation.source_id, &relation.target_id);
        let edge_index = *edge_by_key.entry(key.clone()).or_insert_with(|| {
            let endpoints = if key.low() == relation.source_id {
                (source, target)
            } else {
                (target, source)
            };
            edges.push(Edge::new(key, endpoints));
            edges.len() - 1
        });
        edges[edge_index].push(relation.clone());
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dangling = stats.dangling_relations,
        self_loops = stats.self_relations,
        "aggregated role graph"
    );

    RoleGraph {
        nodes,
        edges,
        index_by_id,
        stats,
    }
}
