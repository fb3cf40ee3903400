use eframe::egui::Color32;

use crate::graph::FactionId;

pub const GOLDEN_ANGLE_DEGREES: f64 = 137.5;

const FACTION_SATURATION: f32 = 0.65;
const FILL_LIGHTNESS: f32 = 0.55;
const LABEL_LIGHTNESS: f32 = 0.30;

pub const NEUTRAL_NODE: Color32 = Color32::from_rgb(153, 153, 153);
pub const NEUTRAL_LABEL: Color32 = Color32::from_rgb(85, 85, 85);

/// Hue in degrees, spread by the golden angle so neighbouring ids differ.
pub fn faction_hue(faction: FactionId) -> f32 {
    ((faction.0 as f64 * GOLDEN_ANGLE_DEGREES).rem_euclid(360.0)) as f32
}

pub fn node_fill(faction: Option<FactionId>) -> Color32 {
    match faction {
        Some(faction) => hsl(faction_hue(faction), FACTION_SATURATION, FILL_LIGHTNESS),
        None => NEUTRAL_NODE,
    }
}

pub fn node_label_color(faction: Option<FactionId>) -> Color32 {
    match faction {
        Some(faction) => hsl(faction_hue(faction), FACTION_SATURATION, LABEL_LIGHTNESS),
        None => NEUTRAL_LABEL,
    }
}

pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let second = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_angle_hues() {
        assert_eq!(faction_hue(FactionId(0)), 0.0);
        assert_eq!(faction_hue(FactionId(1)), 137.5);
        assert_eq!(faction_hue(FactionId(2)), 275.0);
        assert_eq!(faction_hue(FactionId(3)), 52.5);
    }

    #[test]
    fn same_faction_same_color() {
        assert_eq!(node_fill(Some(FactionId(7))), node_fill(Some(FactionId(7))));
        assert_ne!(node_fill(Some(FactionId(7))), node_fill(Some(FactionId(8))));
        assert_eq!(node_fill(None), NEUTRAL_NODE);
    }

    #[test]
    fn label_is_darker_variant() {
        let fill = node_fill(Some(FactionId(4)));
        let label = node_label_color(Some(FactionId(4)));
        let brightness = |color: Color32| u32::from(color.r()) + u32::from(color.g()) + u32::from(color.b());
        assert!(brightness(label) < brightness(fill));
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
        assert_eq!(hsl(0.0, 0.0, 0.6), Color32::from_rgb(153, 153, 153));
    }
}
