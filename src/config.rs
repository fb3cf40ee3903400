//! Tunable constants of the force layout.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout config {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid layout config {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid layout config value: {0}")]
    Invalid(String),
}

/// Every numeric knob of the force model and the integrator.
///
/// Missing fields in a config file fall back to [`LayoutConfig::default`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Link target distance for the strongest possible pair.
    pub min_link_distance: f32,
    /// Link target distance for a pair with zero combined strength.
    pub max_link_distance: f32,
    /// Maps the raw spring coefficient onto a per-tick link strength.
    pub link_strength_scale: f32,
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub faction_attraction: f32,
    pub faction_repulsion: f32,
    pub faction_scale: f32,
    pub center_strength: f32,
    pub barnes_hut_theta: f32,
    /// Node count from which the repulsion switches to Barnes-Hut.
    pub barnes_hut_min_nodes: usize,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    /// Pointer travel in screen pixels below which a press counts as a click.
    pub click_distance: f32,
    /// Pick radius around a node centre, in screen pixels.
    pub hit_radius: f32,
    /// Radius of the jitter disc new nodes are seeded in.
    pub seed_spread: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_link_distance: 20.0,
            max_link_distance: 500.0,
            link_strength_scale: 1.0 / 200.0,
            charge_strength: -300.0,
            charge_distance_min: 1.0,
            faction_attraction: 0.7,
            faction_repulsion: -0.4,
            faction_scale: 1.0,
            center_strength: 1.0,
            barnes_hut_theta: 0.9,
            barnes_hut_min_nodes: 128,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            click_distance: 3.0,
            hit_radius: 8.0,
            seed_spread: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        config.validate()?;
        debug!(path = %shown, "loaded layout config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_link_distance > 0.0 && self.min_link_distance <= self.max_link_distance) {
            return Err(ConfigError::Invalid(format!(
                "link distances must satisfy 0 < min <= max, got {} and {}",
                self.min_link_distance, self.max_link_distance
            )));
        }
        if !(self.alpha_decay > 0.0 && self.alpha_decay < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha_decay must lie in (0, 1), got {}",
                self.alpha_decay
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(ConfigError::Invalid(format!(
                "velocity_decay must lie in [0, 1], got {}",
                self.velocity_decay
            )));
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha_min must lie in (0, 1), got {}",
                self.alpha_min
            )));
        }
        if !(0.0..1.0).contains(&self.drag_alpha_target) {
            return Err(ConfigError::Invalid(format!(
                "drag_alpha_target must lie in [0, 1), got {}",
                self.drag_alpha_target
            )));
        }
        if self.barnes_hut_theta <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "barnes_hut_theta must be positive, got {}",
                self.barnes_hut_theta
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.alpha_decay - 0.0228).abs() < 0.001);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "charge_strength": -120.0, "faction_scale": 0.5 }}"#).expect("write");

        let config = LayoutConfig::from_path(file.path()).expect("config loads");
        assert_eq!(config.charge_strength, -120.0);
        assert_eq!(config.faction_scale, 0.5);
        assert_eq!(config.velocity_decay, LayoutConfig::default().velocity_decay);
    }

    #[test]
    fn rejects_inverted_link_distances() {
        let config = LayoutConfig {
            min_link_distance: 600.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ \"charge_strength\": ").expect("write");

        let expected = file.path().display().to_string();
        match LayoutConfig::from_path(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, expected),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = LayoutConfig::from_path(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
