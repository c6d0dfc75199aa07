//! Per-frame hand tracking data.
//!
//! [`HandSnapshot`] is the full pose the device reports for one hand on one
//! frame.  [`StrengthFrame`] is the reduced view the debouncer consumes: one
//! scalar per gesture channel, including the derived tap and turn proxies.

use glam::Vec3;

/// Which physical hand a snapshot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandType {
    Left,
    Right,
}

impl HandType {
    pub fn name(&self) -> &'static str {
        match self {
            HandType::Left => "left",
            HandType::Right => "right",
        }
    }
}

/// Finger indices as reported by the tracking device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FingerType {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerType {
    pub const ALL: [FingerType; 5] = [
        FingerType::Thumb,
        FingerType::Index,
        FingerType::Middle,
        FingerType::Ring,
        FingerType::Pinky,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Joint positions for one finger, palm-to-tip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FingerPose {
    /// Metacarpal base — where the finger bone meets the wrist edge.
    pub metacarpal_base: Vec3,
    /// Knuckle (metacarpophalangeal joint).
    pub knuckle: Vec3,
    /// Base of the proximal phalanx.
    pub proximal_base: Vec3,
    pub tip: Vec3,
    /// Unit vector the finger points along.
    pub direction: Vec3,
}

/// Opaque reference to the physics body riding along with a tracked hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

/// Everything the tracking device reports for one hand on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSnapshot {
    pub hand: HandType,
    /// Continuous pinch strength in [0,1].
    pub pinch_strength: f32,
    /// Continuous grab strength in [0,1].
    pub grab_strength: f32,
    pub palm_position: Vec3,
    /// Unit normal out of the palm surface.
    pub palm_normal: Vec3,
    /// Unit vector from palm toward the fingers.
    pub direction: Vec3,
    pub fingers: [FingerPose; 5],
}

impl HandSnapshot {
    pub fn finger(&self, finger: FingerType) -> &FingerPose {
        &self.fingers[finger.index()]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StrengthFrame
// ════════════════════════════════════════════════════════════════════════════

/// Raw per-frame channel strengths fed to the debouncer.
///
/// `pinch` and `grab` come straight from the device.  `tap` and `turn` are
/// derived proxies: tap is the *negative* thumb-to-index tip distance (so
/// "fingers touching" is the high end of the signal and the usual
/// greater-than hysteresis rule applies), and turn is the palm-normal Y
/// component whose sign distinguishes a palm-up from a palm-down hand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrengthFrame {
    pub pinch: f32,
    pub grab: f32,
    pub tap: f32,
    pub turn: f32,
}

impl StrengthFrame {
    pub fn from_snapshot(snapshot: &HandSnapshot) -> Self {
        let thumb = snapshot.finger(FingerType::Thumb).tip;
        let index = snapshot.finger(FingerType::Index).tip;
        StrengthFrame {
            pinch: snapshot.pinch_strength,
            grab: snapshot.grab_strength,
            tap: -thumb.distance(index),
            turn: snapshot.palm_normal.y,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> HandSnapshot {
        let mut fingers = [FingerPose::default(); 5];
        fingers[FingerType::Thumb.index()].tip = Vec3::new(0.0, 1.0, 0.0);
        fingers[FingerType::Index.index()].tip = Vec3::new(0.03, 1.0, 0.0);
        HandSnapshot {
            hand: HandType::Right,
            pinch_strength: 0.4,
            grab_strength: 0.2,
            palm_position: Vec3::new(0.0, 1.0, -0.2),
            palm_normal: Vec3::new(0.0, -1.0, 0.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            fingers,
        }
    }

    #[test]
    fn strengths_pass_through() {
        let f = StrengthFrame::from_snapshot(&snapshot());
        assert_eq!(f.pinch, 0.4);
        assert_eq!(f.grab, 0.2);
    }

    #[test]
    fn tap_is_negative_touch_distance() {
        let f = StrengthFrame::from_snapshot(&snapshot());
        assert!((f.tap - -0.03).abs() < 1e-6);
    }

    #[test]
    fn turn_is_palm_normal_component() {
        let f = StrengthFrame::from_snapshot(&snapshot());
        assert_eq!(f.turn, -1.0);
    }

    #[test]
    fn finger_lookup_by_type() {
        let s = snapshot();
        assert_eq!(s.finger(FingerType::Index).tip.x, 0.03);
    }
}
