//! Top-level application state machine.
//!
//! `RigState` owns the scene model, the two `HandAttachment`s, the spawner,
//! the holdables and the event editor.  It consumes `RigUpdate`s from the
//! snapshot source and drives the monitor window each frame.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, TryRecvError};

use gesture_stream::{
    BodyHandle, Channel, DebounceConfig, FingerType, GestureEvent, GestureKind, HandIdAllocator,
    HandType, Thresholds,
};
use hand_wearable::{AttachmentConfig, HandAttachment, WearableConfig, WearablePose};
use playground::{
    clear_layout, hue_color, save_layout, ConstraintHandle, EditorForm, EntityId, EventAdapter,
    Holdable, IdMint, MemoryStore, OpenEditor, PhysicsWorld, Scene, ScriptRegistry, Spawner,
};

#[cfg(not(feature = "leap"))]
use crate::sim::SimSnapshotSource;
use crate::source::{spawn_snapshot_source, HandUpdate, RigUpdate};
use crate::visualizer::{parse_color, BarReadout, HandReadout, Visualizer, WidgetReadout};

/// How many recent event lines the monitor keeps.
const EVENT_LOG_CAP: usize = 12;

// ════════════════════════════════════════════════════════════════════════════
// RigConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct RigConfig {
    /// Applied to both hands.
    pub attachment: AttachmentConfig,
    /// Widget kind the spawner creates on click.
    pub widget_kind: String,
    pub widget_attributes: HashMap<String, String>,
    /// Color a holdable takes while held.
    pub active_color: String,
    /// Hue wheel size for spawned widget colors.
    pub color_wheel: usize,
}

impl Default for RigConfig {
    fn default() -> Self {
        let mut palm_wearables = vec![WearableConfig::cursor()];
        let mut ring = WearableConfig::cursor_ring(0.4);
        ring.show_on = vec!["handpinch".to_string()];
        ring.hide_on = vec!["handopen".to_string()];
        palm_wearables.push(ring);

        let finger_wearables = FingerType::ALL
            .iter()
            .map(|&f| WearableConfig {
                origin: hand_wearable::Origin::Finger(f),
                direction: hand_wearable::Direction::Finger(f),
                ..WearableConfig::default()
            })
            .collect();

        RigConfig {
            attachment: AttachmentConfig {
                debounce: DebounceConfig::default(),
                palm_wearables,
                finger_wearables,
            },
            widget_kind: "box".to_string(),
            widget_attributes: HashMap::new(),
            active_color: "#ffff00".to_string(),
            color_wheel: 12,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RigPhysics
// ════════════════════════════════════════════════════════════════════════════

/// Constraint bookkeeping standing in for the host's solver.
#[derive(Debug, Default)]
pub struct RigPhysics {
    next: u64,
    active: Vec<ConstraintHandle>,
}

impl RigPhysics {
    pub fn active_constraints(&self) -> usize {
        self.active.len()
    }
}

impl PhysicsWorld for RigPhysics {
    fn add_lock_constraint(&mut self, _a: BodyHandle, _b: BodyHandle) -> ConstraintHandle {
        self.next += 1;
        let handle = ConstraintHandle(self.next);
        self.active.push(handle);
        handle
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        self.active.retain(|c| *c != constraint);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RigState
// ════════════════════════════════════════════════════════════════════════════

pub struct RigState {
    // ── scene model ──────────────────────────────────────────────────────
    scene: Scene,
    ids: IdMint,
    physics: RigPhysics,
    store: MemoryStore,

    // ── hands ────────────────────────────────────────────────────────────
    left: HandAttachment,
    right: HandAttachment,
    cursor: [Option<WearablePose>; 2],

    // ── playground ───────────────────────────────────────────────────────
    holdables: Vec<Holdable>,
    spawner: Spawner,
    adapter: EventAdapter,
    open_editor: OpenEditor,
    editor: EditorForm,
    registry: ScriptRegistry,
    hovered: Option<EntityId>,

    // ── display ──────────────────────────────────────────────────────────
    debounce_cfg: DebounceConfig,
    active_color: String,
    color_wheel: usize,
    widget_count: usize,
    pub status: String,
    event_log: VecDeque<String>,
}

impl RigState {
    pub fn new(cfg: RigConfig) -> Self {
        let mut hand_ids = HandIdAllocator::new();
        let mut left = HandAttachment::new(HandType::Left, &mut hand_ids, cfg.attachment.clone());
        let mut right = HandAttachment::new(HandType::Right, &mut hand_ids, cfg.attachment.clone());

        // Each hand rides its own physics body in the host.
        left.set_body(Some(BodyHandle(1)));
        right.set_body(Some(BodyHandle(2)));

        RigState {
            scene: Scene::new(),
            ids: IdMint::new(),
            physics: RigPhysics::default(),
            store: MemoryStore::new(),
            left,
            right,
            cursor: [None, None],
            holdables: Vec::new(),
            spawner: Spawner::new(&cfg.widget_kind, cfg.widget_attributes),
            adapter: EventAdapter::new("handgrab", "mousedown"),
            open_editor: OpenEditor::default(),
            editor: EditorForm::new(),
            registry: ScriptRegistry::new(),
            hovered: None,
            debounce_cfg: cfg.attachment.debounce,
            active_color: cfg.active_color,
            color_wheel: cfg.color_wheel,
            widget_count: 0,
            status: "Ready — waiting for hands".to_string(),
            event_log: VecDeque::new(),
        }
    }

    // ── process one RigUpdate ────────────────────────────────────────────

    pub fn handle_update(&mut self, update: RigUpdate) {
        match update {
            RigUpdate::Hands(updates) => {
                self.spawner.tick();
                for hand_update in updates {
                    self.tick_hand(hand_update);
                }
            }

            RigUpdate::SaveLayout => match save_layout(&self.scene, &mut self.store) {
                Ok(records) => {
                    self.status = format!("layout saved: {} widgets", records.len());
                }
                Err(e) => self.status = format!("layout: {}", e),
            },

            RigUpdate::ClearLayout => {
                let removed = clear_layout(&mut self.scene);
                let scene = &self.scene;
                self.holdables.retain(|h| scene.get(h.entity).is_some());
                self.hovered = None;
                self.status = format!("layout cleared: {} widgets removed", removed);
            }

            RigUpdate::Quit => { /* handled in run loop */ }
        }
    }

    fn tick_hand(&mut self, update: HandUpdate) {
        let idx = match update.hand {
            HandType::Left => 0,
            HandType::Right => 1,
        };
        let tick = match update.hand {
            HandType::Left => self.left.tick(update.snapshot.as_ref()),
            HandType::Right => self.right.tick(update.snapshot.as_ref()),
        };

        self.cursor[idx] = tick.palm_poses.first().copied().flatten();

        if let Some(visible) = tick.visibility_changed {
            self.status = format!(
                "{} hand {}",
                update.hand.name(),
                if visible { "tracked" } else { "lost" }
            );
        }

        for event in tick.events {
            self.on_gesture(event);
        }
    }

    fn on_gesture(&mut self, event: GestureEvent) {
        let name = event.kind.name();
        self.log_event(format!("{} {}", event.hand.name(), name));

        // Holdables see every event; each one filters by kind and hand.
        for holdable in &mut self.holdables {
            holdable.on_gesture(&mut self.scene, &mut self.physics, &event);
        }

        // Drop a hovered entity the scene no longer contains.
        if let Some(target) = self.hovered {
            if self.scene.get(target).is_none() {
                self.hovered = None;
            }
        }

        if let Some(target) = self.hovered {
            let dom_id = self
                .scene
                .get(target)
                .map(|e| e.dom_id.clone())
                .unwrap_or_default();

            // Wirings fire on the raw event and on its adapted alias.
            let adapted = self
                .adapter
                .adapt(&self.scene, target, name)
                .map(str::to_string);
            self.registry.dispatch(&mut self.scene, &dom_id, name);
            if let Some(alias) = adapted {
                self.registry.dispatch(&mut self.scene, &dom_id, &alias);
            }

            if self.open_editor.matches(&self.scene, target, name) {
                if self.editor.visible {
                    // Second tap commits a recolor wiring back to the widget.
                    self.editor.target_id = dom_id;
                    self.editor.event_name = "click".to_string();
                    if self.editor.action.is_empty() {
                        self.editor.action =
                            format!("setAttribute('color', '{}')", self.active_color);
                    }
                    match self.editor.save(&mut self.registry) {
                        Ok(rule) => self.status = format!("wired: {}", rule.script()),
                        Err(e) => self.status = format!("editor: {}", e),
                    }
                } else {
                    self.editor.show(&mut self.scene, &mut self.ids, target);
                    self.status = "editor open — tap again to wire".to_string();
                }
            }
        }

        if event.kind == GestureKind::Click {
            if let Some(id) = self.spawner.on_click(&mut self.scene, &mut self.ids) {
                let color = hue_color(self.widget_count, self.color_wheel);
                self.scene.set_attribute(id, "color", &color);
                if let Some(entity) = self.scene.get_mut(id) {
                    entity.body = Some(BodyHandle(100 + self.widget_count as u64));
                }

                // The cursor rests on the newest widget.
                if let Some(prev) = self.hovered.take() {
                    self.scene.remove_state(prev, "hovered");
                }
                self.scene.add_state(id, "hovered");
                self.hovered = Some(id);

                self.holdables.push(Holdable::new(id, &self.active_color));
                self.widget_count += 1;
                self.status = format!("spawned widget {} ({})", self.widget_count, color);
            }
        }
    }

    fn log_event(&mut self, line: String) {
        self.event_log.push_back(line);
        while self.event_log.len() > EVENT_LOG_CAP {
            self.event_log.pop_front();
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn editor(&self) -> &EditorForm {
        &self.editor
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn cursor_pose(&self, hand: HandType) -> Option<WearablePose> {
        match hand {
            HandType::Left => self.cursor[0],
            HandType::Right => self.cursor[1],
        }
    }

    pub fn recent_events(&self) -> Vec<String> {
        self.event_log.iter().cloned().collect()
    }

    pub fn hand_readout(&self, hand: HandType) -> HandReadout {
        let attachment = match hand {
            HandType::Left => &self.left,
            HandType::Right => &self.right,
        };
        let debouncer = attachment.debouncer();

        let bars = Channel::ALL
            .iter()
            .map(|&channel| {
                let (name, thresholds, lo, hi) = self.channel_display(channel);
                BarReadout {
                    name,
                    value: debouncer.smoothed(channel),
                    engage: thresholds.engage,
                    release: thresholds.release,
                    active: debouncer.is_active(channel),
                    lo,
                    hi,
                }
            })
            .collect();

        HandReadout {
            label: match hand {
                HandType::Left => "LEFT HAND",
                HandType::Right => "RIGHT HAND",
            },
            tracked: attachment.is_visible(),
            bars,
            palmar: if attachment.is_visible() {
                Some(debouncer.is_palmar())
            } else {
                None
            },
        }
    }

    fn channel_display(&self, channel: Channel) -> (&'static str, Thresholds, f32, f32) {
        let cfg = &self.debounce_cfg;
        match channel {
            Channel::Pinch => ("pinch", cfg.pinch.thresholds, 0.0, 1.0),
            Channel::Grab => ("grab", cfg.grab.thresholds, 0.0, 1.0),
            Channel::Hold => ("hold", cfg.hold, 0.0, 1.0),
            Channel::Open => ("open", cfg.open, 0.0, 1.0),
            Channel::Tap => (
                "tap",
                cfg.tap.map(|t| t.thresholds).unwrap_or_default(),
                -0.12,
                0.0,
            ),
        }
    }

    pub fn widget_readouts(&self) -> Vec<WidgetReadout> {
        let root = match self.scene.find_by_dom_prefix("layout") {
            Some(r) => r,
            None => return Vec::new(),
        };
        self.scene
            .children_of(root)
            .into_iter()
            .map(|id| WidgetReadout {
                color: self
                    .scene
                    .attribute(id, "color")
                    .map(parse_color)
                    .unwrap_or(0xFF888888),
                held: self
                    .holdables
                    .iter()
                    .any(|h| h.entity == id && h.is_held()),
            })
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the monitor
/// window, the snapshot source (simulation by default, hardware with
/// `--features leap`), and drives the event/render loop at ~60 fps.
pub fn run(cfg: RigConfig) -> Result<(), String> {
    // ── Sim input channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(feature = "leap")]
    let rig_rx = {
        drop(sim_rx); // hardware mode ignores keyboard hand controls
        spawn_snapshot_source(crate::source::LeapSnapshotSource)
    };
    #[cfg(not(feature = "leap"))]
    let rig_rx = spawn_snapshot_source(SimSnapshotSource { rx: sim_rx });

    // ── Monitor window (owns the sim input sender) ────────────────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut state = RigState::new(cfg);

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        // Drain source updates
        loop {
            match rig_rx.try_recv() {
                Ok(RigUpdate::Quit) => return Ok(()),
                Ok(update) => state.handle_update(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        let left = state.hand_readout(HandType::Left);
        let right = state.hand_readout(HandType::Right);
        let widgets = state.widget_readouts();
        let events = state.recent_events();

        vis.render(&left, &right, &widgets, &events, &state.status);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::synth_snapshot;
    use playground::LayoutStore;

    const GAP_APART: f32 = 0.09;
    const GAP_TOUCH: f32 = 0.02;

    fn make_state() -> RigState {
        RigState::new(RigConfig::default())
    }

    /// Feed `n` identical frames for one hand (the other stays untracked).
    fn frames(state: &mut RigState, hand: HandType, pinch: f32, gap: f32, n: usize) {
        for _ in 0..n {
            let snap = synth_snapshot(hand, pinch, 0.0, gap, false);
            state.handle_update(RigUpdate::Hands(vec![HandUpdate {
                hand,
                snapshot: Some(snap),
            }]));
        }
    }

    /// Full pinch until engaged, then relax until the click fires.
    fn pinch_click(state: &mut RigState, hand: HandType) {
        frames(state, hand, 1.0, GAP_APART, 3);
        frames(state, hand, 0.0, GAP_APART, 12);
    }

    #[test]
    fn pinch_release_spawns_a_widget() {
        let mut state = make_state();
        pinch_click(&mut state, HandType::Right);
        // Layout root plus one widget.
        assert_eq!(state.scene().len(), 2);
        assert_eq!(state.widget_readouts().len(), 1);
        assert!(state.hovered().is_some());
    }

    #[test]
    fn spawn_cooldown_swallows_rapid_clicks() {
        let mut state = make_state();
        pinch_click(&mut state, HandType::Right);
        // Second click lands well inside the 30-frame cooldown.
        frames(&mut state, HandType::Right, 1.0, GAP_APART, 3);
        frames(&mut state, HandType::Right, 0.0, GAP_APART, 12);
        assert_eq!(state.widget_readouts().len(), 1);
    }

    #[test]
    fn second_pinch_holds_the_spawned_widget() {
        let mut state = make_state();
        pinch_click(&mut state, HandType::Right);
        // Outlast the cooldown without gestures.
        frames(&mut state, HandType::Right, 0.0, GAP_APART, 40);

        frames(&mut state, HandType::Right, 1.0, GAP_APART, 3);
        let widgets = state.widget_readouts();
        // The cooldown spawned a second widget on this click; the first
        // one is held.
        assert!(widgets.iter().any(|w| w.held));
        assert_eq!(state.physics.active_constraints(), 1);

        // Open releases it.
        frames(&mut state, HandType::Right, 0.0, GAP_APART, 12);
        assert_eq!(state.physics.active_constraints(), 0);
    }

    #[test]
    fn tracking_loss_releases_gestures() {
        let mut state = make_state();
        frames(&mut state, HandType::Right, 1.0, GAP_APART, 3);
        state.handle_update(RigUpdate::Hands(vec![HandUpdate {
            hand: HandType::Right,
            snapshot: None,
        }]));
        let readout = state.hand_readout(HandType::Right);
        assert!(!readout.tracked);
        assert!(readout.bars.iter().all(|b| !b.active));
    }

    #[test]
    fn tap_opens_editor_and_second_tap_wires() {
        let mut state = make_state();
        pinch_click(&mut state, HandType::Right);

        // First tap: tips touch until the smoothed gap crosses engage.
        frames(&mut state, HandType::Right, 0.0, GAP_TOUCH, 10);
        assert!(state.editor().visible);

        // Part the tips until the tap channel releases, then tap again.
        frames(&mut state, HandType::Right, 0.0, GAP_APART, 20);
        frames(&mut state, HandType::Right, 0.0, GAP_TOUCH, 20);
        assert!(!state.editor().visible);
        assert_eq!(state.registry().rules().len(), 1);
    }

    #[test]
    fn save_and_clear_layout_round_trip() {
        let mut state = make_state();
        pinch_click(&mut state, HandType::Right);
        state.handle_update(RigUpdate::SaveLayout);
        assert!(state.store().get("layout-1").is_some());

        state.handle_update(RigUpdate::ClearLayout);
        assert_eq!(state.widget_readouts().len(), 0);
        assert!(state.hovered().is_none());
        // The root survives a clear.
        assert!(state.scene().find_by_dom_prefix("layout").is_some());
    }

    #[test]
    fn save_without_widgets_reports_missing_root() {
        let mut state = make_state();
        state.handle_update(RigUpdate::SaveLayout);
        assert!(state.status.contains("layout"));
        assert!(state.store().keys().is_empty());
    }

    #[test]
    fn hand_readout_reflects_smoothed_values() {
        let mut state = make_state();
        frames(&mut state, HandType::Right, 1.0, GAP_APART, 3);
        let readout = state.hand_readout(HandType::Right);
        let pinch = readout.bars.iter().find(|b| b.name == "pinch").unwrap();
        assert!(pinch.active);
        assert!(pinch.value > 0.95);
        let left = state.hand_readout(HandType::Left);
        assert!(!left.tracked);
    }
}
