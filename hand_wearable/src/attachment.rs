//! The per-hand runtime unit: one debouncer plus its wearables.

use tracing::debug;

use gesture_stream::{
    BodyHandle, DebounceConfig, GestureDebouncer, GestureEvent, GestureKind, HandIdAllocator,
    HandSnapshot, HandType, StrengthFrame,
};

use crate::anchor::{Wearable, WearableConfig, WearablePose};

/// Configuration for one hand attachment.
#[derive(Clone, Debug, Default)]
pub struct AttachmentConfig {
    pub debounce: DebounceConfig,
    /// Wearables anchored to the palm; these receive gesture events.
    pub palm_wearables: Vec<WearableConfig>,
    /// Wearables anchored to fingers; positioned only, no events.
    pub finger_wearables: Vec<WearableConfig>,
}

/// Everything one `tick` produced.
#[derive(Clone, Debug)]
pub struct AttachmentTick {
    /// Gesture events for the hand entity itself.
    pub events: Vec<GestureEvent>,
    /// The subset fanned out to palm wearables.  `click` only reaches
    /// wearables while the hand was pinching.
    pub wearable_events: Vec<GestureEvent>,
    /// One pose per palm wearable; `None` means hidden or untracked — park.
    pub palm_poses: Vec<Option<WearablePose>>,
    pub finger_poses: Vec<Option<WearablePose>>,
    /// `Some(visible)` on the frame visibility flipped.
    pub visibility_changed: Option<bool>,
}

/// One tracked hand: debouncer, wearables, visibility.
pub struct HandAttachment {
    debouncer: GestureDebouncer,
    palm_wearables: Vec<Wearable>,
    finger_wearables: Vec<Wearable>,
    visible: bool,
}

impl HandAttachment {
    pub fn new(hand: HandType, ids: &mut HandIdAllocator, config: AttachmentConfig) -> Self {
        HandAttachment {
            debouncer: GestureDebouncer::new(hand, ids.mint(), config.debounce),
            palm_wearables: config.palm_wearables.into_iter().map(Wearable::new).collect(),
            finger_wearables: config
                .finger_wearables
                .into_iter()
                .map(Wearable::new)
                .collect(),
            visible: false,
        }
    }

    pub fn hand(&self) -> HandType {
        self.debouncer.hand()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn debouncer(&self) -> &GestureDebouncer {
        &self.debouncer
    }

    pub fn set_body(&mut self, body: Option<BodyHandle>) {
        self.debouncer.set_body(body);
    }

    /// Advance one frame.  `None` marks the hand untracked: gestures are
    /// force-released, wearables report no pose and the hand goes invisible.
    pub fn tick(&mut self, snapshot: Option<&HandSnapshot>) -> AttachmentTick {
        let was_pinching = self.debouncer.is_pinching();

        let frame = snapshot.map(StrengthFrame::from_snapshot);
        let events = self.debouncer.update(frame.as_ref());

        // Fan out to palm wearables.  Click is withheld unless the hand had
        // been pinching, so a bare open/close cannot trigger wearable UI.
        let wearable_events: Vec<GestureEvent> = events
            .iter()
            .copied()
            .filter(|e| e.kind != GestureKind::Click || was_pinching)
            .collect();
        for event in &wearable_events {
            for wearable in &mut self.palm_wearables {
                wearable.handle_event(event.kind.name());
            }
        }

        let palm_poses = self.palm_wearables.iter().map(|w| w.tick(snapshot)).collect();
        let finger_poses = self
            .finger_wearables
            .iter()
            .map(|w| w.tick(snapshot))
            .collect();

        let now_visible = snapshot.is_some();
        let visibility_changed = if now_visible != self.visible {
            debug!(hand = self.hand().name(), visible = now_visible, "hand visibility");
            Some(now_visible)
        } else {
            None
        };
        self.visible = now_visible;

        AttachmentTick {
            events,
            wearable_events,
            palm_poses,
            finger_poses,
            visibility_changed,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Origin;
    use gesture_stream::{ChannelConfig, FingerPose, FingerType, HandId, Thresholds};
    use glam::Vec3;

    fn sharp_debounce() -> DebounceConfig {
        DebounceConfig {
            pinch: ChannelConfig::new(0.0, 0.95, 0.75),
            grab: ChannelConfig::new(0.0, 0.95, 0.75),
            hold: Thresholds::new(0.95, 0.75),
            open: Thresholds::new(0.95, 0.75),
            tap: Some(ChannelConfig::new(0.0, -0.05, -0.075)),
            turn_debounce_ms: Some(0.0),
        }
    }

    fn snapshot(pinch: f32) -> HandSnapshot {
        let mut fingers = [FingerPose::default(); 5];
        // Keep the tap proxy quiet.
        fingers[FingerType::Index.index()].tip = Vec3::new(0.2, 0.0, 0.0);
        HandSnapshot {
            hand: HandType::Right,
            pinch_strength: pinch,
            grab_strength: 0.0,
            palm_position: Vec3::new(0.0, 1.0, -0.2),
            palm_normal: Vec3::new(0.0, -1.0, 0.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            fingers,
        }
    }

    fn attachment(palm: Vec<WearableConfig>) -> HandAttachment {
        let mut ids = HandIdAllocator::new();
        HandAttachment::new(
            HandType::Right,
            &mut ids,
            AttachmentConfig {
                debounce: sharp_debounce(),
                palm_wearables: palm,
                finger_wearables: vec![],
            },
        )
    }

    #[test]
    fn visibility_follows_tracking() {
        let mut a = attachment(vec![]);
        assert!(!a.is_visible());
        let tick = a.tick(Some(&snapshot(0.0)));
        assert_eq!(tick.visibility_changed, Some(true));
        assert!(a.is_visible());
        // No flip while still tracked.
        assert_eq!(a.tick(Some(&snapshot(0.0))).visibility_changed, None);
        let tick = a.tick(None);
        assert_eq!(tick.visibility_changed, Some(false));
    }

    #[test]
    fn click_reaches_wearables_only_while_pinching() {
        let mut a = attachment(vec![]);
        // Grab (not pinch) then drop it: the hand event set has a click,
        // the wearable set does not.
        let mut s = snapshot(0.0);
        s.grab_strength = 1.0;
        a.tick(Some(&s));
        let tick = a.tick(Some(&snapshot(0.0)));
        assert!(tick.events.iter().any(|e| e.kind == GestureKind::Click));
        assert!(!tick.wearable_events.iter().any(|e| e.kind == GestureKind::Click));

        // Pinch then release: click reaches wearables too.
        a.tick(Some(&snapshot(1.0)));
        let tick = a.tick(Some(&snapshot(0.0)));
        assert!(tick.wearable_events.iter().any(|e| e.kind == GestureKind::Click));
    }

    #[test]
    fn wearable_show_hide_driven_by_gesture_events() {
        let mut a = attachment(vec![WearableConfig {
            show_on: vec!["handpinch".into()],
            hide_on: vec!["handopen".into()],
            ..WearableConfig::default()
        }]);
        // Relaxed hand: handopen fires and hides the wearable.
        let tick = a.tick(Some(&snapshot(0.0)));
        assert!(tick.palm_poses[0].is_none());

        // Pinch shows it.
        let tick = a.tick(Some(&snapshot(1.0)));
        assert!(tick.palm_poses[0].is_some());

        // Opening the hand again hides it.
        let tick = a.tick(Some(&snapshot(0.0)));
        assert!(tick.palm_poses[0].is_none());
    }

    #[test]
    fn untracked_hand_parks_all_wearables() {
        let mut a = attachment(vec![WearableConfig::cursor()]);
        a.tick(Some(&snapshot(0.0)));
        let tick = a.tick(None);
        assert!(tick.palm_poses[0].is_none());
    }

    #[test]
    fn tracking_loss_forces_release_through_attachment() {
        let mut a = attachment(vec![]);
        a.tick(Some(&snapshot(1.0)));
        assert!(a.debouncer().is_pinching());
        let tick = a.tick(None);
        assert!(tick.events.iter().any(|e| e.kind == GestureKind::Release));
        assert!(!a.debouncer().is_pinching());
    }

    #[test]
    fn finger_wearables_are_positioned_but_not_evented() {
        let mut ids = HandIdAllocator::new();
        let mut a = HandAttachment::new(
            HandType::Left,
            &mut ids,
            AttachmentConfig {
                debounce: sharp_debounce(),
                palm_wearables: vec![],
                finger_wearables: vec![WearableConfig {
                    origin: Origin::Finger(FingerType::Index),
                    // A hide trigger that must never fire for finger wearables.
                    hide_on: vec!["handopen".into()],
                    ..WearableConfig::default()
                }],
            },
        );
        // handopen fires on the relaxed hand, but finger wearables receive
        // no events, so the pose is still produced.
        let tick = a.tick(Some(&snapshot(0.0)));
        assert!(tick.finger_poses[0].is_some());
    }

    #[test]
    fn attachment_ids_come_from_the_allocator() {
        let mut ids = HandIdAllocator::new();
        let a = HandAttachment::new(HandType::Left, &mut ids, AttachmentConfig::default());
        let b = HandAttachment::new(HandType::Right, &mut ids, AttachmentConfig::default());
        assert_eq!(a.debouncer().hand_id(), HandId(1));
        assert_eq!(b.debouncer().hand_id(), HandId(2));
    }
}
