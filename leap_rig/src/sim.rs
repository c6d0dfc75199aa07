//! Keyboard-driven hand simulation (always available).
//!
//! The monitor window sends [`SimInput`] events here; this source keeps a
//! small per-hand model whose strengths ramp toward their targets, and
//! emits synthesized [`HandSnapshot`]s at the tracking rate.  Ramping
//! matters: the debouncer smooths over a window, so a simulated pinch has
//! to rise through the engage threshold the way a real hand would.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use glam::Vec3;

use gesture_stream::{FingerPose, HandSnapshot, HandType};

use crate::source::{HandUpdate, RigUpdate, SnapshotSource};

/// Simulated tracking rate.
const SIM_FRAME: Duration = Duration::from_millis(8);

/// Per-frame strength ramp while a key is held (or released).
const STRENGTH_RAMP: f32 = 0.15;

/// Per-frame thumb-to-index gap change for the tap control, metres.
const GAP_RAMP: f32 = 0.01;

/// Thumb-to-index gap bounds, metres.  Apart sits past the tap release
/// threshold, touching sits past engage.
const GAP_APART: f32 = 0.09;
const GAP_TOUCH: f32 = 0.02;

// ════════════════════════════════════════════════════════════════════════════
// SimInput
// ════════════════════════════════════════════════════════════════════════════

/// Continuous controls, polled by the window every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimControls {
    /// Indexed 0 = left hand, 1 = right hand.
    pub pinch: [bool; 2],
    pub grab:  [bool; 2],
    pub tap:   [bool; 2],
}

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug)]
pub enum SimInput {
    /// Current held-key state, sent once per rendered frame.
    Controls(SimControls),
    /// Flip the hand's palm between palm-down and palm-up.
    FlipPalm(HandType),
    /// Toggle whether the device "sees" the hand at all.
    ToggleTracking(HandType),
    SaveLayout,
    ClearLayout,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// SimSnapshotSource
// ════════════════════════════════════════════════════════════════════════════

/// One simulated hand.
struct SimHand {
    pinch:   f32,
    grab:    f32,
    /// Thumb-to-index tip gap, metres.
    gap:     f32,
    palmar:  bool,
    tracked: bool,
}

impl SimHand {
    fn new() -> Self {
        SimHand {
            pinch: 0.0,
            grab: 0.0,
            gap: GAP_APART,
            palmar: false,
            tracked: true,
        }
    }

    fn step(&mut self, pinch_held: bool, grab_held: bool, tap_held: bool) {
        self.pinch = ramp(self.pinch, if pinch_held { 1.0 } else { 0.0 }, STRENGTH_RAMP);
        self.grab = ramp(self.grab, if grab_held { 1.0 } else { 0.0 }, STRENGTH_RAMP);
        self.gap = ramp(self.gap, if tap_held { GAP_TOUCH } else { GAP_APART }, GAP_RAMP);
    }
}

fn ramp(current: f32, target: f32, step: f32) -> f32 {
    if (target - current).abs() <= step {
        target
    } else if target > current {
        current + step
    } else {
        current - step
    }
}

/// Snapshot source driven by [`SimInput`] events from the monitor window.
pub struct SimSnapshotSource {
    pub rx: Receiver<SimInput>,
}

impl SnapshotSource for SimSnapshotSource {
    fn run(self: Box<Self>, tx: Sender<RigUpdate>) {
        let mut hands = [SimHand::new(), SimHand::new()];
        let mut controls = SimControls::default();

        loop {
            // Pick up window input, then emit one frame on the tick.
            match self.rx.recv_timeout(SIM_FRAME) {
                Ok(SimInput::Controls(c)) => controls = c,
                Ok(SimInput::FlipPalm(hand)) => {
                    hands[hand_index(hand)].palmar = !hands[hand_index(hand)].palmar;
                }
                Ok(SimInput::ToggleTracking(hand)) => {
                    hands[hand_index(hand)].tracked = !hands[hand_index(hand)].tracked;
                }
                Ok(SimInput::SaveLayout) => {
                    if tx.send(RigUpdate::SaveLayout).is_err() {
                        return;
                    }
                    continue;
                }
                Ok(SimInput::ClearLayout) => {
                    if tx.send(RigUpdate::ClearLayout).is_err() {
                        return;
                    }
                    continue;
                }
                Ok(SimInput::Quit) => {
                    let _ = tx.send(RigUpdate::Quit);
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }

            let mut updates = Vec::with_capacity(2);
            for (i, kind) in [HandType::Left, HandType::Right].into_iter().enumerate() {
                hands[i].step(controls.pinch[i], controls.grab[i], controls.tap[i]);
                let snapshot = if hands[i].tracked {
                    Some(synth_snapshot(
                        kind,
                        hands[i].pinch,
                        hands[i].grab,
                        hands[i].gap,
                        hands[i].palmar,
                    ))
                } else {
                    None
                };
                updates.push(HandUpdate { hand: kind, snapshot });
            }

            if tx.send(RigUpdate::Hands(updates)).is_err() {
                return;
            }
        }
    }
}

fn hand_index(hand: HandType) -> usize {
    match hand {
        HandType::Left => 0,
        HandType::Right => 1,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Snapshot synthesis
// ════════════════════════════════════════════════════════════════════════════

/// Build a plausible [`HandSnapshot`] from scalar controls.
///
/// The palm sits at shoulder height in front of the body, fingers pointing
/// away from the viewer.  `gap` is the thumb-to-index tip distance that
/// drives the tap channel; `palmar` flips the palm normal between down
/// (dorsal) and up (palmar).
pub fn synth_snapshot(
    hand: HandType,
    pinch: f32,
    grab: f32,
    gap: f32,
    palmar: bool,
) -> HandSnapshot {
    let side = match hand {
        HandType::Left => -0.15,
        HandType::Right => 0.15,
    };
    let palm = Vec3::new(side, 1.2, -0.3);
    let forward = Vec3::NEG_Z;

    let mut fingers = [FingerPose::default(); 5];
    for (i, pose) in fingers.iter_mut().enumerate() {
        let dx = (i as f32 - 2.0) * 0.02;
        let lateral = Vec3::new(dx, 0.0, 0.0);
        pose.metacarpal_base = palm + lateral + Vec3::new(0.0, 0.0, 0.02);
        pose.knuckle = palm + lateral + Vec3::new(0.0, 0.0, -0.02);
        pose.proximal_base = palm + lateral + Vec3::new(0.0, 0.0, -0.045);
        pose.tip = palm + lateral + Vec3::new(0.0, 0.0, -0.09);
        pose.direction = forward;
    }

    // Thumb and index tips carry the tap gap.
    let thumb_tip = palm + Vec3::new(-0.04, 0.0, -0.04);
    fingers[0].tip = thumb_tip;
    fingers[1].tip = thumb_tip + Vec3::new(gap, 0.0, 0.0);

    HandSnapshot {
        hand,
        pinch_strength: pinch.clamp(0.0, 1.0),
        grab_strength: grab.clamp(0.0, 1.0),
        palm_position: palm,
        palm_normal: if palmar { Vec3::Y } else { Vec3::NEG_Y },
        direction: forward,
        fingers,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
