//! Hand snapshot sources — real LeapMotion hardware and the keyboard sim.
//!
//! The public interface is [`RigUpdate`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware or
//! the keyboard simulator: both sides emit one [`HandUpdate`] per hand per
//! frame, with `snapshot: None` marking a hand the device lost.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use gesture_stream::{HandSnapshot, HandType};

// ════════════════════════════════════════════════════════════════════════════
// RigUpdate
// ════════════════════════════════════════════════════════════════════════════

/// One hand's worth of tracking data for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandUpdate {
    pub hand: HandType,
    /// `None` while the device has lost this hand.
    pub snapshot: Option<HandSnapshot>,
}

/// Everything a source can deliver to the app loop.
#[derive(Clone, Debug, PartialEq)]
pub enum RigUpdate {
    /// Tracking frame: one entry per hand, both hands every frame.
    Hands(Vec<HandUpdate>),

    /// Persist the current widget layout.
    SaveLayout,

    /// Remove every spawned widget.
    ClearLayout,

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// SnapshotSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`RigUpdate`]s over a channel.
pub trait SnapshotSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<RigUpdate>);
}

/// Spawn a snapshot source on its own thread and return the receiving end.
pub fn spawn_snapshot_source<S: SnapshotSource>(source: S) -> Receiver<RigUpdate> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSnapshotSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Snapshot source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Device coordinates arrive in millimetres; they are scaled to metres so
/// the tap thresholds downstream read as centimetre distances.
#[cfg(feature = "leap")]
pub struct LeapSnapshotSource;

#[cfg(feature = "leap")]
impl SnapshotSource for LeapSnapshotSource {
    fn run(self: Box<Self>, tx: Sender<RigUpdate>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "LeapC connection failed");
                let _ = tx.send(RigUpdate::Quit);
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!(error = %e, "LeapMotion device failed to open");
            let _ = tx.send(RigUpdate::Quit);
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();

                let mut updates = Vec::with_capacity(2);
                for kind in [HandType::Left, HandType::Right] {
                    let device_kind = match kind {
                        HandType::Left => leaprs::HandType::Left,
                        HandType::Right => leaprs::HandType::Right,
                    };
                    let snapshot = hands
                        .iter()
                        .find(|h| h.hand_type() == device_kind)
                        .map(|h| snapshot_from_device(kind, h));
                    updates.push(HandUpdate { hand: kind, snapshot });
                }

                if tx.send(RigUpdate::Hands(updates)).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn snapshot_from_device(kind: HandType, hand: &leaprs::Hand) -> HandSnapshot {
    use gesture_stream::FingerPose;
    use glam::Vec3;

    // mm → m
    let pos = |v: leaprs::Vector| Vec3::new(v.x, v.y, v.z) / 1000.0;
    let dir = |v: leaprs::Vector| Vec3::new(v.x, v.y, v.z);

    let palm = hand.palm();
    let digits: Vec<_> = hand.digits().collect();

    let mut fingers = [FingerPose::default(); 5];
    for (i, digit) in digits.iter().take(5).enumerate() {
        let metacarpal_base = pos(digit.metacarpal().prev_joint());
        let knuckle = pos(digit.metacarpal().next_joint());
        let proximal_base = pos(digit.proximal().next_joint());
        let tip = pos(digit.distal().next_joint());
        fingers[i] = FingerPose {
            metacarpal_base,
            knuckle,
            proximal_base,
            tip,
            direction: (tip - proximal_base).normalize_or_zero(),
        };
    }

    HandSnapshot {
        hand: kind,
        pinch_strength: hand.pinch_strength(),
        grab_strength: hand.grab_strength(),
        palm_position: pos(palm.position()),
        palm_normal: dir(palm.normal()),
        direction: dir(palm.direction()),
        fingers,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
