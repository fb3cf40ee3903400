use eframe::egui::{Pos2, Vec2};

const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 6.0;

/// Pan/zoom applied when drawing. Simulation coordinates never see it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the world origin before panning.
    pub origin: Pos2,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        self.origin + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.origin - self.pan) / self.zoom
    }

    /// Scales around `anchor` so the world point under it stays put.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        let world_before = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - self.origin - (world_before * self.zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}
