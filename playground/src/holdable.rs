//! Pinch-to-hold physics binding.
//!
//! A holdable object reacts to the hand gesture events: `handpinch` locks
//! the object's body to the pinching hand's body and recolors it;
//! `handopen` from the same hand undoes both.  Events from other hands are
//! ignored while held, so two hands cannot fight over one object.

use tracing::debug;

use gesture_stream::{GestureEvent, GestureKind, HandId};

use crate::scene::{ConstraintHandle, EntityId, PhysicsWorld, Scene};

pub struct Holdable {
    pub entity: EntityId,
    pub active_color: String,
    original_color: Option<String>,
    constraint: Option<ConstraintHandle>,
    holding_hand: Option<HandId>,
}

impl Holdable {
    pub fn new(entity: EntityId, active_color: &str) -> Self {
        Holdable {
            entity,
            active_color: active_color.to_string(),
            original_color: None,
            constraint: None,
            holding_hand: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.holding_hand.is_some()
    }

    pub fn holding_hand(&self) -> Option<HandId> {
        self.holding_hand
    }

    /// Feed one gesture event that reached this entity.
    pub fn on_gesture(
        &mut self,
        scene: &mut Scene,
        physics: &mut dyn PhysicsWorld,
        event: &GestureEvent,
    ) {
        match event.kind {
            GestureKind::Pinch => self.start_hold(scene, physics, event),
            GestureKind::Open => self.stop_hold(scene, physics, event.hand_id),
            _ => {}
        }
    }

    fn start_hold(
        &mut self,
        scene: &mut Scene,
        physics: &mut dyn PhysicsWorld,
        event: &GestureEvent,
    ) {
        if self.holding_hand.is_some() {
            return;
        }
        // Both bodies must exist for a lock constraint.
        let own_body = match scene.get(self.entity).and_then(|e| e.body) {
            Some(b) => b,
            None => return,
        };
        let hand_body = match event.body {
            Some(b) => b,
            None => return,
        };

        self.original_color = scene.attribute(self.entity, "color").map(str::to_string);
        let active = self.active_color.clone();
        scene.set_attribute(self.entity, "color", &active);
        self.constraint = Some(physics.add_lock_constraint(own_body, hand_body));
        self.holding_hand = Some(event.hand_id);
        debug!(hand = %event.hand_id, "holdable grabbed");
    }

    fn stop_hold(&mut self, scene: &mut Scene, physics: &mut dyn PhysicsWorld, hand: HandId) {
        if self.holding_hand != Some(hand) {
            return;
        }
        if let Some(color) = self.original_color.take() {
            scene.set_attribute(self.entity, "color", &color);
        }
        if let Some(constraint) = self.constraint.take() {
            physics.remove_constraint(constraint);
        }
        self.holding_hand = None;
        debug!(hand = %hand, "holdable released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
