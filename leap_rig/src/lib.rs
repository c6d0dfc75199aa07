//! # leap_rig
//!
//! LeapMotion hand rig for the gesture playground: debounced gestures,
//! hand-anchored wearables, pinch-to-hold physics, click-to-spawn widgets,
//! layout persistence and the in-scene event editor, monitored through a
//! software-rendered window.
//!
//! ## Gesture → Action mapping
//!
//! | Event | Channel | Action in the rig |
//! |---|---|---|
//! | `handpinch` | pinch | grab the hovered holdable (lock constraint) |
//! | `handgrab` | grab | adapted to `mousedown` on the hovered widget |
//! | `handopen` | open | release the held object |
//! | `fingertap` | tap | open the event editor beside the hovered widget |
//! | `click` | hold-class release | spawn a widget (30-frame cooldown) |
//! | `handrelease` | any ending | hides pinch-gated wearables |
//! | `handturnpalmar` / `handturndorsal` | turn | palm facing readout |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard keys ramp synthetic hand
//!   strengths through the same debouncing path real tracking takes.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Control |
//! |---|---|
//! | `A` / `J` | hold to pinch (left / right hand) |
//! | `S` / `K` | hold to grab |
//! | `D` / `L` | hold to touch thumb and index (tap) |
//! | `F` / `U` | flip the palm (turn channel) |
//! | `G` / `I` | toggle hand tracking on and off |
//! | `W` | save the widget layout |
//! | `C` | clear spawned widgets |
//! | `Q` | quit |

pub mod app;
pub mod sim;
pub mod source;
pub mod visualizer;
