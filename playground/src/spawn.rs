//! Click-to-spawn widget factory.

use glam::Vec3;
use tracing::debug;

use crate::scene::{EntityId, IdMint, Scene};

use std::collections::HashMap;

/// Click cooldown in frames: 250 ms at the nominal 120 fps tick.
pub const SPAWN_COOLDOWN_FRAMES: u32 = 30;

/// Where new widgets appear, in front of and above the camera origin.
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 2.0, -2.0);

/// Spawns one kind of widget each time its button is clicked.
///
/// Spawned widgets are parented under a shared layout root (dom-id prefixed
/// `layout`), created on first use, so the whole arrangement can be saved
/// or cleared as a unit.
pub struct Spawner {
    /// Widget kind to create, e.g. "box".
    pub kind: String,
    /// Attributes applied to every spawned widget.  The reserved `type` key
    /// is skipped.
    pub attributes: HashMap<String, String>,
    cooldown: u32,
}

impl Spawner {
    pub fn new(kind: &str, attributes: HashMap<String, String>) -> Self {
        Spawner {
            kind: kind.to_string(),
            attributes,
            cooldown: 0,
        }
    }

    /// Advance one frame of cooldown.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Handle a click on the spawner's button.  Returns the new widget, or
    /// `None` while the cooldown is running.
    pub fn on_click(&mut self, scene: &mut Scene, ids: &mut IdMint) -> Option<EntityId> {
        if self.cooldown > 0 {
            return None;
        }
        self.cooldown = SPAWN_COOLDOWN_FRAMES;

        let layout = scene
            .find_by_dom_prefix("layout")
            .unwrap_or_else(|| {
                let dom_id = ids.mint_dom_id("layout");
                scene.create("entity", &dom_id)
            });

        let dom_id = ids.mint_dom_id(&self.kind);
        let id = scene.create(&self.kind, &dom_id);
        if let Some(e) = scene.get_mut(id) {
            e.transform.position = SPAWN_POSITION;
            e.parent = Some(layout);
        }
        for (name, value) in &self.attributes {
            if name == "type" {
                continue;
            }
            scene.set_attribute(id, name, value);
        }
        debug!(kind = %self.kind, dom_id = %dom_id, "spawned widget");
        Some(id)
    }
}

/// Evenly-spaced hue-wheel color for the `index`-th spawned widget, as a
/// `#rrggbb` attribute value.
pub fn hue_color(index: usize, wheel: usize) -> String {
    let hue = (index as f32 / wheel.max(1) as f32) * 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.82, 0.92);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h % 360.0;
    let hi = (h / 60.0) as u32;
    let f = h / 60.0 - hi as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
