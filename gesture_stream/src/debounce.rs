//! The per-hand gesture debouncer.
//!
//! One [`GestureDebouncer`] per tracked hand.  Each frame it consumes a
//! [`StrengthFrame`] (or `None` when the hand is untracked), updates every
//! channel's smoothing window and hysteresis boolean, and returns the edge
//! events for that frame.
//!
//! The channel set is data-driven: every boolean channel goes through the
//! same smooth → hysteresis → mutual-exclusion → edge-detect path, indexed
//! by [`Channel`], rather than one hand-written block per gesture.

use tracing::debug;

use crate::channel::{ChannelConfig, SmoothingWindow, Thresholds};
use crate::frame::{BodyHandle, HandType, StrengthFrame};
use crate::ids::HandId;

// ════════════════════════════════════════════════════════════════════════════
// Channels and event kinds
// ════════════════════════════════════════════════════════════════════════════

/// Boolean gesture channels, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Pinch,
    Grab,
    Hold,
    Open,
    Tap,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Pinch,
        Channel::Grab,
        Channel::Hold,
        Channel::Open,
        Channel::Tap,
    ];

    fn index(&self) -> usize {
        *self as usize
    }

    /// Hold-class channels gate the `click` event on release.
    pub fn is_hold_class(&self) -> bool {
        matches!(self, Channel::Pinch | Channel::Grab | Channel::Hold)
    }

    fn begin_kind(&self) -> GestureKind {
        match self {
            Channel::Pinch => GestureKind::Pinch,
            Channel::Grab => GestureKind::Grab,
            Channel::Hold => GestureKind::Hold,
            Channel::Open => GestureKind::Open,
            Channel::Tap => GestureKind::Tap,
        }
    }
}

/// The gesture lifecycle events a debouncer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Pinch,
    Grab,
    Hold,
    Open,
    Tap,
    /// One per simultaneously-ending set of gestures.
    Release,
    /// Follows `Release` when the ending set contained a hold-class gesture.
    Click,
    TurnPalmar,
    TurnDorsal,
}

impl GestureKind {
    /// Event name as delivered to the scene host.
    pub fn name(&self) -> &'static str {
        match self {
            GestureKind::Pinch => "handpinch",
            GestureKind::Grab => "handgrab",
            GestureKind::Hold => "handhold",
            GestureKind::Open => "handopen",
            GestureKind::Tap => "fingertap",
            GestureKind::Release => "handrelease",
            GestureKind::Click => "click",
            GestureKind::TurnPalmar => "handturnpalmar",
            GestureKind::TurnDorsal => "handturndorsal",
        }
    }
}

/// One fired event with its payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub hand: HandType,
    pub hand_id: HandId,
    /// Physics body riding with the hand, when the host supplies one.
    pub body: Option<BodyHandle>,
}

// ════════════════════════════════════════════════════════════════════════════
// DebounceConfig
// ════════════════════════════════════════════════════════════════════════════

/// Channel tuning for one debouncer.
///
/// Pinch, grab and tap are smoothed from raw samples; hold and open are
/// derived from the smoothed pinch/grab values and only need thresholds.
/// Tap and turn are optional — a hand variant without them simply leaves
/// those channels permanently inactive.
#[derive(Clone, Debug)]
pub struct DebounceConfig {
    pub pinch: ChannelConfig,
    pub grab: ChannelConfig,
    pub hold: Thresholds,
    pub open: Thresholds,
    pub tap: Option<ChannelConfig>,
    pub turn_debounce_ms: Option<f32>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig {
            pinch: ChannelConfig::default(),
            grab: ChannelConfig::default(),
            hold: Thresholds::default(),
            open: Thresholds::default(),
            // Tap signal is a negated tip distance in metres: engaged when
            // the tips come within 5 cm, released once they part past 7.5 cm.
            tap: Some(ChannelConfig::new(100.0, -0.05, -0.075)),
            turn_debounce_ms: Some(100.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureDebouncer
// ════════════════════════════════════════════════════════════════════════════

struct TurnState {
    window: SmoothingWindow,
    /// Sign of the smoothed turn signal; `None` until seeded by a tracked
    /// frame.  `true` = positive = palmar.
    sign: Option<bool>,
    palmar: bool,
}

/// Hysteresis-stabilized gesture state for one tracked hand.
pub struct GestureDebouncer {
    hand: HandType,
    hand_id: HandId,
    body: Option<BodyHandle>,

    thresholds: [Thresholds; 5],
    pinch_window: SmoothingWindow,
    grab_window: SmoothingWindow,
    tap_window: Option<SmoothingWindow>,
    turn: Option<TurnState>,

    smoothed: [f32; 5],
    active: [bool; 5],
}

impl GestureDebouncer {
    pub fn new(hand: HandType, hand_id: HandId, config: DebounceConfig) -> Self {
        let tap_thresholds = config
            .tap
            .as_ref()
            .map(|c| c.thresholds)
            .unwrap_or_default();
        GestureDebouncer {
            hand,
            hand_id,
            body: None,
            thresholds: [
                config.pinch.thresholds,
                config.grab.thresholds,
                config.hold,
                config.open,
                tap_thresholds,
            ],
            pinch_window: config.pinch.window(),
            grab_window: config.grab.window(),
            tap_window: config.tap.as_ref().map(|c| c.window()),
            turn: config.turn_debounce_ms.map(|ms| TurnState {
                window: SmoothingWindow::for_debounce(ms),
                sign: None,
                palmar: false,
            }),
            smoothed: [0.0; 5],
            active: [false; 5],
        }
    }

    /// Attach the physics body carried in event payloads.
    pub fn set_body(&mut self, body: Option<BodyHandle>) {
        self.body = body;
    }

    pub fn hand(&self) -> HandType {
        self.hand
    }

    pub fn hand_id(&self) -> HandId {
        self.hand_id
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.active[channel.index()]
    }

    pub fn smoothed(&self, channel: Channel) -> f32 {
        self.smoothed[channel.index()]
    }

    pub fn is_pinching(&self) -> bool {
        self.is_active(Channel::Pinch)
    }

    pub fn is_grabbing(&self) -> bool {
        self.is_active(Channel::Grab)
    }

    pub fn is_holding(&self) -> bool {
        self.is_active(Channel::Hold)
    }

    pub fn is_opening(&self) -> bool {
        self.is_active(Channel::Open)
    }

    pub fn is_tapping(&self) -> bool {
        self.is_active(Channel::Tap)
    }

    /// Last observed palm orientation (meaningful once a frame has seeded
    /// the turn sign).
    pub fn is_palmar(&self) -> bool {
        self.turn.as_ref().map(|t| t.palmar).unwrap_or(false)
    }

    /// Advance one frame.  `None` means the hand is currently untracked and
    /// force-releases every active gesture.  Never fails: malformed input
    /// degrades to "no gesture active".
    pub fn update(&mut self, frame: Option<&StrengthFrame>) -> Vec<GestureEvent> {
        match frame {
            Some(frame) => self.update_tracked(frame),
            None => self.release_all(),
        }
    }

    fn update_tracked(&mut self, frame: &StrengthFrame) -> Vec<GestureEvent> {
        // Smooth the sampled channels, then derive the composites.
        self.smoothed[Channel::Pinch.index()] = self.pinch_window.push(frame.pinch);
        self.smoothed[Channel::Grab.index()] = self.grab_window.push(frame.grab);
        let hold = self.smoothed[Channel::Pinch.index()].max(self.smoothed[Channel::Grab.index()]);
        self.smoothed[Channel::Hold.index()] = hold;
        self.smoothed[Channel::Open.index()] = 1.0 - hold;
        self.smoothed[Channel::Tap.index()] = match self.tap_window.as_mut() {
            Some(w) => w.push(frame.tap),
            None => 0.0,
        };

        // Raw booleans under hysteresis.
        let mut raw = [false; 5];
        for ch in Channel::ALL {
            let i = ch.index();
            if ch == Channel::Tap && self.tap_window.is_none() {
                continue;
            }
            raw[i] = self.thresholds[i].check(self.smoothed[i], self.active[i]);
        }

        // Mutual exclusion: hold and tap cannot both assert; hold wins.
        if self.tap_window.is_some() {
            if raw[Channel::Hold.index()] {
                raw[Channel::Tap.index()] = false;
            } else if raw[Channel::Tap.index()] {
                raw[Channel::Hold.index()] = false;
            }
        }

        // Edge detection.
        let mut events = Vec::new();
        let mut any_ended = false;
        let mut hold_class_ended = false;
        for ch in Channel::ALL {
            let i = ch.index();
            let was = self.active[i];
            let is = raw[i];
            if is && !was {
                debug!(hand = self.hand.name(), channel = ?ch, "gesture begin");
                events.push(self.event(ch.begin_kind()));
            }
            if !is && was {
                debug!(hand = self.hand.name(), channel = ?ch, "gesture end");
                any_ended = true;
                hold_class_ended |= ch.is_hold_class();
            }
            self.active[i] = is;
        }
        if any_ended {
            events.push(self.event(GestureKind::Release));
            if hold_class_ended {
                events.push(self.event(GestureKind::Click));
            }
        }

        // Turn channel: strict sign test on the smoothed signal, no
        // hysteresis and no release.  Exactly zero is not a crossing.
        let mut turned = None;
        if let Some(turn) = self.turn.as_mut() {
            let smoothed = turn.window.push(frame.turn);
            let sign = if smoothed > 0.0 {
                Some(true)
            } else if smoothed < 0.0 {
                Some(false)
            } else {
                None
            };
            match (turn.sign, sign) {
                (Some(was), Some(is)) if was != is => {
                    turn.sign = Some(is);
                    turn.palmar = is;
                    turned = Some(if is {
                        GestureKind::TurnPalmar
                    } else {
                        GestureKind::TurnDorsal
                    });
                }
                (None, Some(is)) => {
                    // First signed frame seeds the orientation silently.
                    turn.sign = Some(is);
                    turn.palmar = is;
                }
                _ => {}
            }
        }
        if let Some(kind) = turned {
            debug!(hand = self.hand.name(), kind = kind.name(), "hand turned");
            events.push(self.event(kind));
        }

        events
    }

    /// Tracking loss: force every active gesture to its end transition and
    /// drop all buffered state, so nothing is left stuck.
    fn release_all(&mut self) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let any_active = self.active.iter().any(|a| *a);
        if any_active {
            let hold_class_active = Channel::ALL
                .iter()
                .any(|ch| ch.is_hold_class() && self.active[ch.index()]);
            debug!(hand = self.hand.name(), "tracking lost, releasing");
            events.push(self.event(GestureKind::Release));
            if hold_class_active {
                events.push(self.event(GestureKind::Click));
            }
        }
        self.reset();
        events
    }

    /// Drop all state: gestures released, windows emptied, turn sign
    /// unseeded.  The next tracked frame starts from scratch.
    pub fn reset(&mut self) {
        self.active = [false; 5];
        self.smoothed = [0.0; 5];
        self.pinch_window.clear();
        self.grab_window.clear();
        if let Some(w) = self.tap_window.as_mut() {
            w.clear();
        }
        if let Some(t) = self.turn.as_mut() {
            t.window.clear();
            t.sign = None;
        }
    }

    fn event(&self, kind: GestureKind) -> GestureEvent {
        GestureEvent {
            kind,
            hand: self.hand,
            hand_id: self.hand_id,
            body: self.body,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Config with single-sample windows so smoothed == raw, making the
    /// hysteresis behavior easy to drive directly.
    fn sharp_config() -> DebounceConfig {
        DebounceConfig {
            pinch: ChannelConfig::new(0.0, 0.95, 0.75),
            grab: ChannelConfig::new(0.0, 0.95, 0.75),
            hold: Thresholds::new(0.95, 0.75),
            open: Thresholds::new(0.95, 0.75),
            tap: Some(ChannelConfig::new(0.0, -0.05, -0.075)),
            turn_debounce_ms: Some(0.0),
        }
    }

    fn debouncer() -> GestureDebouncer {
        GestureDebouncer::new(HandType::Right, HandId(1), sharp_config())
    }

    fn frame(pinch: f32, grab: f32) -> StrengthFrame {
        StrengthFrame {
            pinch,
            grab,
            tap: -0.2,
            turn: -1.0,
        }
    }

    fn kinds(events: &[GestureEvent]) -> Vec<GestureKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn pinch_begin_fires_exactly_once() {
        let mut d = debouncer();
        let events = d.update(Some(&frame(1.0, 0.0)));
        assert!(kinds(&events).contains(&GestureKind::Pinch));
        // Sustained strength: no repeat while it stays above release.
        for _ in 0..10 {
            let events = d.update(Some(&frame(1.0, 0.0)));
            assert!(!kinds(&events).contains(&GestureKind::Pinch));
        }
        assert!(d.is_pinching());
    }

    #[test]
    fn full_window_of_ones_engages_on_first_sample() {
        // Defaults: engage 0.95, release 0.75, 12-sample window.  The mean
        // of any prefix of 1.0s is 1.0, so the channel engages on the very
        // first sample.
        let mut d = GestureDebouncer::new(HandType::Left, HandId(2), DebounceConfig::default());
        let events = d.update(Some(&frame(1.0, 0.0)));
        assert!(kinds(&events).contains(&GestureKind::Pinch));
    }

    #[test]
    fn hysteresis_holds_between_release_and_engage() {
        let mut d = debouncer();
        d.update(Some(&frame(1.0, 0.0)));
        assert!(d.is_pinching());
        // 0.80 is below engage but above release: stays active, no events.
        let events = d.update(Some(&frame(0.80, 0.0)));
        assert!(d.is_pinching());
        assert!(!kinds(&events).contains(&GestureKind::Release));
        // 0.70 is below release: ends.
        let events = d.update(Some(&frame(0.70, 0.0)));
        assert!(!d.is_pinching());
        assert!(kinds(&events).contains(&GestureKind::Release));
    }

    #[test]
    fn smoothed_decay_releases_when_mean_crosses_release() {
        // 4-sample window: drive the mean down from 1.0 and check the
        // release fires on the frame the mean first drops to 0.75 or below.
        let config = DebounceConfig {
            pinch: ChannelConfig::new(4.0 * crate::channel::FRAME_INTERVAL_MS, 0.95, 0.75),
            ..sharp_config()
        };
        let mut d = GestureDebouncer::new(HandType::Right, HandId(3), config);
        for _ in 0..4 {
            d.update(Some(&frame(1.0, 0.0)));
        }
        assert!(d.is_pinching());
        // Means: 0.75, 0.50 — the first zero frame already hits release.
        let events = d.update(Some(&frame(0.0, 0.0)));
        assert!(kinds(&events).contains(&GestureKind::Release));
        assert!(!d.is_pinching());
    }

    #[test]
    fn tracking_loss_releases_everything_once() {
        let mut d = debouncer();
        d.update(Some(&frame(1.0, 1.0)));
        assert!(d.is_pinching() && d.is_grabbing() && d.is_holding());

        let events = d.update(None);
        let ks = kinds(&events);
        assert_eq!(ks.iter().filter(|k| **k == GestureKind::Release).count(), 1);
        assert_eq!(ks.iter().filter(|k| **k == GestureKind::Click).count(), 1);
        assert!(!d.is_pinching() && !d.is_grabbing() && !d.is_holding());

        // Nothing stuck: a second untracked frame is silent.
        assert!(d.update(None).is_empty());
    }

    #[test]
    fn retracking_starts_from_inactive() {
        let mut d = debouncer();
        d.update(Some(&frame(1.0, 0.0)));
        d.update(None);
        // A weak new frame must not resurrect the old pinch state.
        let events = d.update(Some(&frame(0.80, 0.0)));
        assert!(!d.is_pinching());
        assert!(!kinds(&events).contains(&GestureKind::Pinch));
    }

    #[test]
    fn single_release_for_simultaneous_endings() {
        let mut d = debouncer();
        d.update(Some(&frame(1.0, 1.0)));
        let events = d.update(Some(&frame(0.0, 0.0)));
        let ks = kinds(&events);
        assert_eq!(ks.iter().filter(|k| **k == GestureKind::Release).count(), 1);
        assert_eq!(ks.iter().filter(|k| **k == GestureKind::Click).count(), 1);
    }

    #[test]
    fn open_engages_on_relaxed_hand() {
        let mut d = debouncer();
        let events = d.update(Some(&frame(0.0, 0.0)));
        assert!(d.is_opening());
        assert!(kinds(&events).contains(&GestureKind::Open));
    }

    #[test]
    fn open_ending_alone_releases_without_click() {
        let mut d = debouncer();
        d.update(Some(&frame(0.0, 0.0)));
        assert!(d.is_opening());
        // Hand closes: open ends, pinch/hold begin.  The ending set contains
        // no hold-class gesture, so no click.
        let events = d.update(Some(&frame(1.0, 0.0)));
        let ks = kinds(&events);
        assert!(ks.contains(&GestureKind::Release));
        assert!(!ks.contains(&GestureKind::Click));
        assert!(ks.contains(&GestureKind::Pinch));
        assert!(ks.contains(&GestureKind::Hold));
    }

    #[test]
    fn hold_wins_mutual_exclusion_over_tap() {
        let mut d = debouncer();
        // Strong pinch and touching fingertips in the same frame.
        let f = StrengthFrame {
            pinch: 1.0,
            grab: 0.0,
            tap: -0.01,
            turn: -1.0,
        };
        let events = d.update(Some(&f));
        assert!(d.is_holding());
        assert!(!d.is_tapping());
        assert!(!kinds(&events).contains(&GestureKind::Tap));
    }

    #[test]
    fn tap_without_hold_asserts_tap_only() {
        let mut d = debouncer();
        let f = StrengthFrame {
            pinch: 0.0,
            grab: 0.0,
            tap: -0.01,
            turn: -1.0,
        };
        let events = d.update(Some(&f));
        assert!(d.is_tapping());
        assert!(!d.is_holding());
        assert!(kinds(&events).contains(&GestureKind::Tap));
    }

    #[test]
    fn tap_ending_releases_without_click() {
        let mut d = debouncer();
        let touch = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.01, turn: -1.0 };
        let apart = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.2, turn: -1.0 };
        d.update(Some(&touch));
        let events = d.update(Some(&apart));
        let ks = kinds(&events);
        assert!(ks.contains(&GestureKind::Release));
        assert!(!ks.contains(&GestureKind::Click));
    }

    #[test]
    fn turn_seeds_silently_then_fires_on_crossing() {
        let mut d = debouncer();
        // First frame seeds the dorsal sign without an event.
        let events = d.update(Some(&frame(0.0, 0.0)));
        assert!(!kinds(&events).contains(&GestureKind::TurnPalmar));
        assert!(!d.is_palmar());

        // Flip the palm: positive crossing → palmar event.
        let flipped = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.2, turn: 1.0 };
        let events = d.update(Some(&flipped));
        assert!(kinds(&events).contains(&GestureKind::TurnPalmar));
        assert!(d.is_palmar());

        // Flip back: dorsal event.
        let events = d.update(Some(&frame(0.0, 0.0)));
        assert!(kinds(&events).contains(&GestureKind::TurnDorsal));
        assert!(!d.is_palmar());
    }

    #[test]
    fn turn_ignores_exact_zero() {
        let mut d = debouncer();
        d.update(Some(&frame(0.0, 0.0))); // seed dorsal
        let flat = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.2, turn: 0.0 };
        let events = d.update(Some(&flat));
        assert!(!kinds(&events).contains(&GestureKind::TurnPalmar));
        assert!(!kinds(&events).contains(&GestureKind::TurnDorsal));
        // Still dorsal afterwards; a later positive frame fires normally.
        let flipped = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.2, turn: 1.0 };
        assert!(kinds(&d.update(Some(&flipped))).contains(&GestureKind::TurnPalmar));
    }

    #[test]
    fn turn_never_emits_release() {
        let mut d = debouncer();
        d.update(Some(&frame(0.0, 0.0)));
        let flipped = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.2, turn: 1.0 };
        let events = d.update(Some(&flipped));
        assert!(!kinds(&events).contains(&GestureKind::Release));
    }

    #[test]
    fn disabled_tap_and_turn_stay_silent() {
        let config = DebounceConfig {
            tap: None,
            turn_debounce_ms: None,
            ..sharp_config()
        };
        let mut d = GestureDebouncer::new(HandType::Left, HandId(9), config);
        let f = StrengthFrame { pinch: 0.0, grab: 0.0, tap: -0.001, turn: 1.0 };
        let events = d.update(Some(&f));
        assert!(!d.is_tapping());
        let ks = kinds(&events);
        assert!(!ks.contains(&GestureKind::Tap));
        assert!(!ks.contains(&GestureKind::TurnPalmar));
    }

    #[test]
    fn payload_carries_hand_identity_and_body() {
        let mut d = debouncer();
        d.set_body(Some(BodyHandle(7)));
        let events = d.update(Some(&frame(1.0, 0.0)));
        let pinch = events.iter().find(|e| e.kind == GestureKind::Pinch).unwrap();
        assert_eq!(pinch.hand, HandType::Right);
        assert_eq!(pinch.hand_id, HandId(1));
        assert_eq!(pinch.body, Some(BodyHandle(7)));
    }

    #[test]
    fn event_names_match_scene_contract() {
        assert_eq!(GestureKind::Pinch.name(), "handpinch");
        assert_eq!(GestureKind::Tap.name(), "fingertap");
        assert_eq!(GestureKind::Release.name(), "handrelease");
        assert_eq!(GestureKind::TurnPalmar.name(), "handturnpalmar");
        assert_eq!(GestureKind::TurnDorsal.name(), "handturndorsal");
    }
}
