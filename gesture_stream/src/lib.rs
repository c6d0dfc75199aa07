//! # gesture_stream
//!
//! Debounced gesture recognition for tracked hands.
//!
//! A motion-tracking device reports continuous pinch/grab strengths once per
//! frame.  The raw signals are noisy: a hand hovering near the pinch
//! threshold would otherwise flicker between "pinching" and "not pinching"
//! many times per second.  This crate turns those signals into stable,
//! edge-triggered gesture events:
//!
//! * **Smoothing** — each channel keeps a fixed-capacity ring buffer of
//!   recent samples and uses the window mean as the channel's strength.
//! * **Hysteresis** — entering a gesture requires crossing a high engage
//!   threshold; staying in it only requires staying above a lower release
//!   threshold.
//! * **Edge detection** — exactly one begin event per transition, one
//!   `handrelease` per simultaneously-ending set, and a `click` when a
//!   hold-class gesture ends.
//!
//! ## Channels
//!
//! | Channel | Raw signal | Event |
//! |---|---|---|
//! | pinch | device pinch strength [0,1] | `handpinch` |
//! | grab | device grab strength [0,1] | `handgrab` |
//! | hold | max(pinch, grab), derived | `handhold` |
//! | open | 1 − hold, derived | `handopen` |
//! | tap | negative thumb-to-index distance | `fingertap` |
//! | turn | palm-normal component, sign-tested | `handturnpalmar` / `handturndorsal` |
//!
//! Tracking loss is an implicit release: an untracked frame force-ends every
//! active gesture in the same update, so nothing is ever left stuck.
//!
//! The [`debounce::GestureDebouncer`] is single-threaded and frame-driven;
//! one instance per tracked hand, no state shared between hands.

pub mod channel;
pub mod debounce;
pub mod frame;
pub mod ids;

pub use channel::{ChannelConfig, SmoothingWindow, Thresholds};
pub use debounce::{Channel, DebounceConfig, GestureDebouncer, GestureEvent, GestureKind};
pub use frame::{BodyHandle, FingerPose, FingerType, HandSnapshot, HandType, StrengthFrame};
pub use ids::{HandId, HandIdAllocator};
