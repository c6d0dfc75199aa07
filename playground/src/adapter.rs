//! Event renaming adapter.
//!
//! Lets gesture-driven scenes reuse widgets written for pointer input: a
//! `handgrab` can be re-emitted as `mousedown`, a `handrelease` as
//! `mouseup`, and so on.  Adapting to `click` additionally requires the
//! entity to be in the hovered state, so a hand closing somewhere across
//! the room cannot press a button.

use crate::scene::{EntityId, Scene};

#[derive(Clone, Debug)]
pub struct EventAdapter {
    pub from: String,
    pub to: String,
}

impl EventAdapter {
    pub fn new(from: &str, to: &str) -> Self {
        EventAdapter {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// The event name to re-emit on `entity`, if this adapter applies.
    pub fn adapt(&self, scene: &Scene, entity: EntityId, event: &str) -> Option<&str> {
        if event != self.from {
            return None;
        }
        if self.to == "click" && !scene.has_state(entity, "hovered") {
            return None;
        }
        Some(&self.to)
    }
}

impl Default for EventAdapter {
    fn default() -> Self {
        EventAdapter::new("grab-start", "mousedown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_matching_event() {
        let mut scene = Scene::new();
        let id = scene.create("box", "box1");
        let adapter = EventAdapter::new("handgrab", "mousedown");
        assert_eq!(adapter.adapt(&scene, id, "handgrab"), Some("mousedown"));
        assert_eq!(adapter.adapt(&scene, id, "handpinch"), None);
    }

    #[test]
    fn click_requires_hovered_state() {
        let mut scene = Scene::new();
        let id = scene.create("box", "box1");
        let adapter = EventAdapter::new("handrelease", "click");
        assert_eq!(adapter.adapt(&scene, id, "handrelease"), None);
        scene.add_state(id, "hovered");
        assert_eq!(adapter.adapt(&scene, id, "handrelease"), Some("click"));
    }

    #[test]
    fn non_click_targets_skip_the_hover_guard() {
        let mut scene = Scene::new();
        let id = scene.create("box", "box1");
        let adapter = EventAdapter::new("handrelease", "mouseup");
        assert_eq!(adapter.adapt(&scene, id, "handrelease"), Some("mouseup"));
    }
}
