//! Per-pair force terms. Every function here returns a velocity contribution
//! for the current tick and keeps no state of its own.

use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::graph::{Edge, NEUTRAL_STRENGTH, Node};
use crate::util::jiggle;

use super::quadtree::Quadtree;

const MAX_COMBINED_STRENGTH: f32 = 200.0;

/// Rest length of a link: 500 for a combined strength of 0 down to 20 for
/// 200, never increasing with strength.
pub fn link_distance(combined_strength: u16, config: &LayoutConfig) -> f32 {
    let span = config.max_link_distance - config.min_link_distance;
    let combined = f32::from(combined_strength);
    (config.max_link_distance - (combined / MAX_COMBINED_STRENGTH) * span)
        .clamp(config.min_link_distance, config.max_link_distance)
}

/// Raw spring coefficient `min(0, combined - 35)`.
///
/// Never positive: pairs at or above neutral get no spring at all and weaker
/// pairs get a slightly repulsive one. Pull between related roles comes from
/// the shorter rest length only.
pub fn spring_coefficient(combined_strength: u16) -> f32 {
    (f32::from(combined_strength) - f32::from(NEUTRAL_STRENGTH)).min(0.0)
}

pub fn link_strength(edge: &Edge, config: &LayoutConfig) -> f32 {
    spring_coefficient(edge.combined_strength()) * config.link_strength_scale
}

/// Correction along `source -> target`; the caller subtracts its share from
/// the target and adds the rest to the source.
pub fn link_correction(
    source: Vec2,
    target: Vec2,
    distance: f32,
    strength: f32,
    alpha: f32,
    fallback: Vec2,
) -> Vec2 {
    let mut delta = target - source;
    if delta.length_sq() < 1e-12 {
        delta = fallback * 1e-6;
    }
    let length = delta.length();
    delta * ((length - distance) / length * alpha * strength)
}

/// Inverse-square many-body term acting on `point`. Negative strength
/// repels.
pub fn many_body(
    point: Vec2,
    other: Vec2,
    strength: f32,
    alpha: f32,
    distance_min_sq: f32,
    fallback: Vec2,
) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq < 1e-12 {
        delta = fallback;
        distance_sq = 1.0;
    }
    if distance_sq < distance_min_sq {
        distance_sq = (distance_min_sq * distance_sq).sqrt();
    }
    delta * (strength * alpha / distance_sq)
}

/// `+faction_attraction` for two nodes of the same faction,
/// `faction_repulsion` for every other pair, unaffiliated nodes included.
pub fn faction_affinity(node: &Node, other: &Node, config: &LayoutConfig) -> f32 {
    match (node.faction_id, other.faction_id) {
        (Some(first), Some(second)) if first == second => config.faction_attraction,
        _ => config.faction_repulsion,
    }
}

/// Per-pair weight that keeps the summed faction term on one node within
/// `faction_scale * |affinity|`, however many nodes share the layout.
pub fn faction_weight(scale: f32, node_count: usize) -> f32 {
    scale / node_count.saturating_sub(1).max(1) as f32
}

/// Pull (positive affinity) or push toward `other`, unit length times
/// `affinity * alpha * weight`.
pub fn faction_pull(
    point: Vec2,
    other: Vec2,
    affinity: f32,
    alpha: f32,
    weight: f32,
    fallback: Vec2,
) -> Vec2 {
    let delta = other - point;
    let length = delta.length();
    let direction = if length > 1e-6 { delta / length } else { fallback };
    direction * (affinity * alpha * weight)
}

/// Translation that moves the mean of `positions` onto `center`.
pub fn centering_shift(positions: &[Vec2], center: Vec2, strength: f32) -> Vec2 {
    if positions.is_empty() {
        return Vec2::ZERO;
    }
    let mean = positions.iter().fold(Vec2::ZERO, |acc, point| acc + *point) / positions.len() as f32;
    (center - mean) * strength
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) alpha: f32,
    pub(super) distance_min_sq: f32,
    pub(super) theta: f32,
}

/// Repulsion on `index` from every other body, treating any cell that looks
/// smaller than `theta` from `index` as a single charge at its centroid.
/// `pending` is a reusable traversal stack.
pub(super) fn barnes_hut_charge(
    tree: &Quadtree,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    pending: &mut Vec<usize>,
) -> Vec2 {
    let point = positions[index];
    let mut force = Vec2::ZERO;
    pending.clear();
    pending.push(Quadtree::ROOT);

    while let Some(id) = pending.pop() {
        let cell = tree.cell(id);
        if cell.charge == 0.0 {
            continue;
        }

        if cell.is_leaf() {
            for &other in tree.bodies(cell) {
                if other != index {
                    force += many_body(
                        point,
                        positions[other],
                        params.strength,
                        params.alpha,
                        params.distance_min_sq,
                        jiggle(index, other),
                    );
                }
            }
            continue;
        }

        let distance_sq = (cell.centroid - point).length_sq();
        let side = cell.square.side();
        let far = !cell.square.contains(point) && side * side < params.theta * params.theta * distance_sq;
        if far {
            force += many_body(
                point,
                cell.centroid,
                cell.charge,
                params.alpha,
                params.distance_min_sq,
                jiggle(index, id),
            );
        } else {
            pending.extend(cell.children());
        }
    }
    force
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::graph::{FactionId, RoleRecord, aggregate};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn link_distance_reference_points() {
        let config = LayoutConfig::default();
        assert!(close(link_distance(0, &config), 500.0));
        assert!(close(link_distance(160, &config), 116.0));
        assert!(close(link_distance(200, &config), 20.0));
    }

    #[test]
    fn link_distance_never_increases() {
        let config = LayoutConfig::default();
        let mut previous = f32::INFINITY;
        for combined in 0..=200 {
            let distance = link_distance(combined, &config);
            assert!(distance <= previous);
            assert!((20.0..=500.0).contains(&distance));
            previous = distance;
        }
    }

    #[test]
    fn spring_coefficient_is_never_positive() {
        for combined in 0..=200 {
            assert!(spring_coefficient(combined) <= 0.0);
        }
        assert_eq!(spring_coefficient(160), 0.0);
        assert_eq!(spring_coefficient(35), 0.0);
        assert_eq!(spring_coefficient(20), -15.0);
    }

    #[test]
    fn negative_charge_pushes_apart() {
        let push = many_body(vec2(0.0, 0.0), vec2(10.0, 0.0), -300.0, 1.0, 1.0, vec2(1.0, 0.0));
        assert!(push.x < 0.0);
        assert!(close(push.x, -30.0));
        assert!(close(push.y, 0.0));
    }

    #[test]
    fn coincident_points_still_get_finite_force() {
        let push = many_body(vec2(5.0, 5.0), vec2(5.0, 5.0), -300.0, 0.5, 1.0, vec2(0.0, 1.0));
        assert!(push.x.is_finite() && push.y.is_finite());
        assert!(push.length() > 0.0);

        let correction = link_correction(
            vec2(1.0, 1.0),
            vec2(1.0, 1.0),
            100.0,
            -0.1,
            1.0,
            vec2(1.0, 0.0),
        );
        assert!(correction.x.is_finite() && correction.y.is_finite());
    }

    #[test]
    fn zero_strength_link_exerts_nothing() {
        let correction = link_correction(vec2(0.0, 0.0), vec2(300.0, 0.0), 116.0, 0.0, 1.0, vec2(1.0, 0.0));
        assert_eq!(correction, Vec2::ZERO);
    }

    #[test]
    fn faction_affinity_signs() {
        let config = LayoutConfig::default();
        let graph = aggregate(
            &[
                RoleRecord::new("a", "A").with_faction(1),
                RoleRecord::new("b", "B").with_faction(1),
                RoleRecord::new("c", "C").with_faction(2),
                RoleRecord::new("d", "D"),
                RoleRecord::new("e", "E"),
            ],
            &[],
        );
        let nodes = &graph.nodes;
        assert_eq!(nodes[0].faction_id, Some(FactionId(1)));
        assert_eq!(faction_affinity(&nodes[0], &nodes[1], &config), 0.7);
        assert_eq!(faction_affinity(&nodes[0], &nodes[2], &config), -0.4);
        assert_eq!(faction_affinity(&nodes[3], &nodes[4], &config), -0.4);

        let pull = faction_pull(vec2(0.0, 0.0), vec2(50.0, 0.0), 0.7, 1.0, 1.0, vec2(1.0, 0.0));
        assert!(close(pull.x, 0.7));
        let push = faction_pull(vec2(0.0, 0.0), vec2(50.0, 0.0), -0.4, 1.0, 1.0, vec2(1.0, 0.0));
        assert!(close(push.x, -0.4));
    }

    #[test]
    fn faction_push_on_one_node_is_bounded() {
        for count in [3usize, 30, 300] {
            let others = (1..count)
                .map(|index| vec2(100.0 + index as f32, (index % 7) as f32))
                .collect::<Vec<_>>();
            let weight = faction_weight(1.0, count);
            let total = others.iter().fold(Vec2::ZERO, |acc, other| {
                acc + faction_pull(vec2(0.0, 0.0), *other, -0.4, 1.0, weight, vec2(1.0, 0.0))
            });
            assert!(total.length() <= 0.4 + 1e-4, "{count} nodes pushed {}", total.length());
            assert!(total.x < -0.39);
        }
        assert_eq!(faction_weight(2.0, 0), 2.0);
        assert_eq!(faction_weight(2.0, 5), 0.5);
    }

    #[test]
    fn centering_moves_mean_onto_center() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 50.0)];
        let shift = centering_shift(&positions, vec2(400.0, 300.0), 1.0);
        assert!(close(shift.x, 350.0));
        assert!(close(shift.y, 275.0));
        assert_eq!(centering_shift(&[], vec2(1.0, 1.0), 1.0), Vec2::ZERO);
    }

    #[test]
    fn barnes_hut_matches_exact_for_distant_cluster() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..60 {
            positions.push(vec2(
                2000.0 + (index % 8) as f32 * 4.0,
                (index / 8) as f32 * 4.0,
            ));
        }
        let tree = Quadtree::build(&positions, -300.0).expect("tree builds");
        let params = ChargeParams {
            strength: -300.0,
            alpha: 1.0,
            distance_min_sq: 1.0,
            theta: 0.9,
        };
        let approximate = barnes_hut_charge(&tree, 0, &positions, params, &mut Vec::new());

        let exact = positions[1..].iter().fold(Vec2::ZERO, |acc, other| {
            acc + many_body(positions[0], *other, -300.0, 1.0, 1.0, vec2(1.0, 0.0))
        });
        assert!((approximate - exact).length() / exact.length() < 0.05);
        assert!(approximate.x < 0.0);
    }
}
