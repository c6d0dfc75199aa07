//! # hand_wearable
//!
//! Wearables are scene objects that ride along with a tracked hand: a menu
//! strapped to the palm, a pointer on a fingertip, a cursor ring floating
//! along the palm's pick ray.  Each frame a wearable resolves its anchor
//! (a palm landmark or a finger joint), a direction (palm normal, palm
//! direction, a blend, or a finger direction) and a translation into a world
//! pose, plus a ray for hosts that do their own picking.
//!
//! [`attachment::HandAttachment`] combines a gesture debouncer with a set of
//! wearables into the per-hand runtime unit: tick it with the current
//! [`gesture_stream::HandSnapshot`] (or `None` while untracked) and it
//! returns the frame's gesture events, the events to fan out to palm
//! wearables, every wearable pose and any visibility change.

pub mod anchor;
pub mod attachment;

pub use anchor::{Direction, LookAt, Origin, Wearable, WearableConfig, WearablePose, PARK_POSITION};
pub use attachment::{AttachmentConfig, AttachmentTick, HandAttachment};
