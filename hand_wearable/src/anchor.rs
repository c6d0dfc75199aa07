//! Wearable anchoring math.

use glam::Vec3;

use gesture_stream::{FingerType, HandSnapshot};

/// Where hidden wearables are parked, far outside any plausible scene.
pub const PARK_POSITION: Vec3 = Vec3::new(-10000.0, -10000.0, -10000.0);

// ════════════════════════════════════════════════════════════════════════════
// Anchor configuration
// ════════════════════════════════════════════════════════════════════════════

/// The hand landmark a wearable is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Palm centre.
    Palm,
    /// Pinky metacarpal base — the lower edge of the palm.
    PalmEdgeLower,
    /// Pinky knuckle — the middle of the palm edge.
    PalmEdgeMiddle,
    /// Pinky proximal base — the upper edge of the palm.
    PalmEdgeUpper,
    /// A fingertip.
    Finger(FingerType),
}

/// The direction the wearable's Z translation and facing run along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    PalmNormal,
    /// Palm-to-fingers direction.
    PalmDirection,
    /// Pointing blend used by the hand cursor: direction/2 + normal,
    /// normalized.
    PalmSelection,
    Finger(FingerType),
}

/// What the wearable faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LookAt {
    /// Face back toward the anchor point.
    Origin,
    /// Face along the anchor direction.
    End,
    /// Face a fixed world point.
    Point(Vec3),
}

/// Static configuration for one wearable.
#[derive(Clone, Debug)]
pub struct WearableConfig {
    pub origin: Origin,
    pub direction: Direction,
    /// X/Y are world-axis offsets; Z runs along the anchor direction.
    pub translation: Vec3,
    pub look_at: LookAt,
    /// Event names that reveal the wearable.
    pub show_on: Vec<String>,
    /// Event names that hide it.
    pub hide_on: Vec<String>,
}

impl Default for WearableConfig {
    fn default() -> Self {
        WearableConfig {
            origin: Origin::Palm,
            direction: Direction::PalmNormal,
            translation: Vec3::ZERO,
            look_at: LookAt::End,
            show_on: Vec::new(),
            hide_on: Vec::new(),
        }
    }
}

impl WearableConfig {
    /// The palm cursor: sits on the palm, points along the selection blend.
    pub fn cursor() -> Self {
        WearableConfig {
            origin: Origin::Palm,
            direction: Direction::PalmSelection,
            ..WearableConfig::default()
        }
    }

    /// The cursor ring: floats `distance` along the selection ray, facing
    /// back at the palm.
    pub fn cursor_ring(distance: f32) -> Self {
        WearableConfig {
            origin: Origin::Palm,
            direction: Direction::PalmSelection,
            translation: Vec3::new(0.0, 0.0, distance),
            look_at: LookAt::Origin,
            ..WearableConfig::default()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pose
// ════════════════════════════════════════════════════════════════════════════

/// A wearable's resolved pose for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WearablePose {
    pub position: Vec3,
    /// World point the wearable should face.
    pub look_target: Vec3,
    /// Pick ray for hosts that raycast from the wearable.
    pub ray_origin: Vec3,
    pub ray_direction: Vec3,
}

// ════════════════════════════════════════════════════════════════════════════
// Wearable
// ════════════════════════════════════════════════════════════════════════════

/// One wearable and its live/hidden state.
#[derive(Clone, Debug)]
pub struct Wearable {
    pub config: WearableConfig,
    live: bool,
}

impl Wearable {
    pub fn new(config: WearableConfig) -> Self {
        Wearable { config, live: true }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn show(&mut self) {
        self.live = true;
    }

    /// Hide; the host should park the object at [`PARK_POSITION`].
    pub fn hide(&mut self) {
        self.live = false;
    }

    /// React to a named event.  Returns true when visibility changed.
    /// When an event is listed under both show and hide, hide wins.
    pub fn handle_event(&mut self, event: &str) -> bool {
        let was = self.live;
        if self.config.show_on.iter().any(|e| e == event) {
            self.live = true;
        }
        if self.config.hide_on.iter().any(|e| e == event) {
            self.live = false;
        }
        self.live != was
    }

    /// Pose for the current frame; `None` while hidden or untracked (the
    /// host parks the object).
    pub fn tick(&self, snapshot: Option<&HandSnapshot>) -> Option<WearablePose> {
        match snapshot {
            Some(s) if self.live => Some(self.solve(s)),
            _ => None,
        }
    }

    /// Resolve the anchor math against one snapshot.
    pub fn solve(&self, snapshot: &HandSnapshot) -> WearablePose {
        let origin = match self.config.origin {
            Origin::Palm => snapshot.palm_position,
            Origin::PalmEdgeLower => snapshot.finger(FingerType::Pinky).metacarpal_base,
            Origin::PalmEdgeMiddle => snapshot.finger(FingerType::Pinky).knuckle,
            Origin::PalmEdgeUpper => snapshot.finger(FingerType::Pinky).proximal_base,
            Origin::Finger(f) => snapshot.finger(f).tip,
        };

        let direction = match self.config.direction {
            Direction::PalmNormal => snapshot.palm_normal,
            Direction::PalmDirection => snapshot.direction,
            Direction::PalmSelection => {
                (snapshot.direction / 2.0 + snapshot.palm_normal).normalize_or_zero()
            }
            Direction::Finger(f) => snapshot.finger(f).direction,
        };

        let t = self.config.translation;
        let position = origin + Vec3::new(t.x, t.y, 0.0) + direction * t.z;
        let end = position + direction;

        let look_target = match self.config.look_at {
            LookAt::Origin => origin,
            LookAt::End => end,
            LookAt::Point(p) => p,
        };

        WearablePose {
            position,
            look_target,
            ray_origin: origin,
            ray_direction: direction,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
