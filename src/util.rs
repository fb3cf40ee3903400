use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::{Vec2, vec2};

/// Deterministic pseudo-random pair in `[-1, 1]` derived from `id`.
pub(crate) fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Unit direction used when two points coincide. Antisymmetric in its
/// arguments so paired contributions still cancel.
pub(crate) fn jiggle(from: usize, to: usize) -> Vec2 {
    let (low, high, sign) = if from <= to {
        (from, to, 1.0)
    } else {
        (to, from, -1.0)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * sign
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("role-7");
        let second = stable_pair("role-7");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }

    #[test]
    fn jiggle_is_antisymmetric_unit_vector() {
        let forward = jiggle(3, 9);
        let backward = jiggle(9, 3);
        assert!((forward + backward).length() < 1e-6);
        assert!((forward.length() - 1.0).abs() < 1e-5);
    }
}
