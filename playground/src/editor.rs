//! In-scene event editor.
//!
//! The editor is a small form a widget can summon next to itself: pick a
//! target entity, an event name, and an action, then save.  Saving turns
//! the form into a typed [`WiringRule`] registered in a [`ScriptRegistry`];
//! from then on the registry answers "what should happen" whenever the
//! source entity sees that event.  Rules also render back out as
//! human-readable script lines for export.

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, info};

use crate::scene::{IdMint, Scene};

/// Where a hidden form parks, matching the offscreen convention used by
/// hand-attached gear.
pub const EDITOR_PARK: Vec3 = Vec3::new(-10_000.0, -10_000.0, -10_000.0);

/// Offset from the summoning widget to the form panel.
pub const EDITOR_OFFSET: Vec3 = Vec3::new(0.65, 0.0, 0.0);

// ════════════════════════════════════════════════════════════════════════════
// Actions
// ════════════════════════════════════════════════════════════════════════════

/// What a wiring rule does to its target when triggered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SetAttribute { name: String, value: String },
    Emit { event: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("empty action")]
    Empty,
    #[error("unknown action `{0}`")]
    UnknownVerb(String),
    #[error("malformed arguments in `{0}`")]
    BadArguments(String),
}

impl Action {
    /// Parse the editor's action field.  Accepts the two call shapes the
    /// form offers, with single or double quotes:
    /// `setAttribute('name', 'value')` and `emit('event')`.
    pub fn parse(text: &str) -> Result<Action, ActionParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ActionParseError::Empty);
        }
        let (verb, rest) = match text.find('(') {
            Some(open) if text.ends_with(')') => {
                (text[..open].trim(), &text[open + 1..text.len() - 1])
            }
            _ => return Err(ActionParseError::BadArguments(text.to_string())),
        };
        let args: Vec<String> = rest
            .split(',')
            .map(|a| a.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|a| !a.is_empty())
            .collect();
        match verb {
            "setAttribute" => {
                if args.len() != 2 {
                    return Err(ActionParseError::BadArguments(text.to_string()));
                }
                Ok(Action::SetAttribute {
                    name: args[0].clone(),
                    value: args[1].clone(),
                })
            }
            "emit" => {
                if args.len() != 1 {
                    return Err(ActionParseError::BadArguments(text.to_string()));
                }
                Ok(Action::Emit {
                    event: args[0].clone(),
                })
            }
            other => Err(ActionParseError::UnknownVerb(other.to_string())),
        }
    }

    /// Canonical script rendering of this action.
    pub fn script(&self) -> String {
        match self {
            Action::SetAttribute { name, value } => {
                format!("setAttribute('{}', '{}')", name, value)
            }
            Action::Emit { event } => format!("emit('{}')", event),
        }
    }

    /// Apply the action to `target`.  Returns the event name when the
    /// action re-emits, so the caller can keep dispatching.
    pub fn apply(&self, scene: &mut Scene, target: &str) -> Option<String> {
        match self {
            Action::SetAttribute { name, value } => {
                if let Some(id) = scene.find_by_dom_id(target) {
                    scene.set_attribute(id, name, value);
                }
                None
            }
            Action::Emit { event } => Some(event.clone()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wiring rules
// ════════════════════════════════════════════════════════════════════════════

/// One saved wiring: when `source` sees `event`, do `action` to `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct WiringRule {
    pub source: String,
    pub event:  String,
    pub target: String,
    pub action: Action,
}

impl WiringRule {
    /// Export line for this rule.
    pub fn script(&self) -> String {
        format!(
            "on {} `{}`: {} -> {}",
            self.source,
            self.event,
            self.target,
            self.action.script()
        )
    }
}

/// All saved wirings, queried each time an entity sees an event.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    rules: Vec<WiringRule>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        ScriptRegistry::default()
    }

    pub fn add(&mut self, rule: WiringRule) {
        info!(line = %rule.script(), "wiring registered");
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[WiringRule] {
        &self.rules
    }

    /// Rules matching a (source, event) pair, in registration order.
    pub fn matching(&self, source: &str, event: &str) -> Vec<&WiringRule> {
        self.rules
            .iter()
            .filter(|r| r.source == source && r.event == event)
            .collect()
    }

    /// Run every matching rule against the scene, chasing re-emits
    /// until the cascade settles.
    pub fn dispatch(&self, scene: &mut Scene, source: &str, event: &str) -> usize {
        let mut fired = 0;
        let mut pending = vec![(source.to_string(), event.to_string())];
        // Cap the cascade so a rule that re-emits its own trigger
        // cannot loop forever.
        let mut budget = 64;
        while let Some((src, ev)) = pending.pop() {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let matched: Vec<WiringRule> =
                self.matching(&src, &ev).into_iter().cloned().collect();
            for rule in matched {
                fired += 1;
                if let Some(emitted) = rule.action.apply(scene, &rule.target) {
                    debug!(target = %rule.target, event = %emitted, "rule re-emitted");
                    pending.push((rule.target.clone(), emitted));
                }
            }
        }
        fired
    }

    /// Full script export, one line per rule.
    pub fn export(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(&rule.script());
            out.push('\n');
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// The form
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("field `{0}` is empty")]
    MissingField(&'static str),
    #[error(transparent)]
    Action(#[from] ActionParseError),
}

/// Gesture event that summons the editor next to the hovered widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenEditor {
    pub event: String,
}

impl Default for OpenEditor {
    fn default() -> Self {
        OpenEditor {
            event: "fingertap".to_string(),
        }
    }
}

impl OpenEditor {
    /// True when `event` aimed at a hovered widget should open the form.
    pub fn matches(&self, scene: &Scene, target: crate::scene::EntityId, event: &str) -> bool {
        if event != self.event {
            return false;
        }
        scene.has_state(target, "hovered")
    }
}

/// The editor panel state.  Field strings mirror the form inputs.
#[derive(Debug, Default)]
pub struct EditorForm {
    pub entity_id:  String,
    pub target_id:  String,
    pub event_name: String,
    pub action:     String,
    pub visible:    bool,
    pub position:   Vec3,
    pub caller:     Option<crate::scene::EntityId>,
}

impl EditorForm {
    pub fn new() -> Self {
        EditorForm {
            position: EDITOR_PARK,
            ..EditorForm::default()
        }
    }

    /// Summon the form beside `caller`.  A caller without a dom id gets
    /// one minted so the rule can name it.
    pub fn show(&mut self, scene: &mut Scene, ids: &mut IdMint, caller: crate::scene::EntityId) {
        if let Some(entity) = scene.get_mut(caller) {
            if entity.dom_id.is_empty() {
                entity.dom_id = ids.mint_dom_id(&entity.kind);
            }
            self.entity_id = entity.dom_id.clone();
            self.position = entity.transform.position + EDITOR_OFFSET;
        }
        self.caller = Some(caller);
        self.visible = true;
        debug!(entity = %self.entity_id, "editor opened");
    }

    /// Park the form offscreen.
    pub fn hide(&mut self) {
        self.visible = false;
        self.position = EDITOR_PARK;
        self.caller = None;
    }

    /// Blank everything except the source entity, which survives so a
    /// second rule can be wired without re-summoning.
    pub fn clear(&mut self) {
        self.target_id.clear();
        self.event_name.clear();
        self.action.clear();
    }

    /// Validate and commit the form as a wiring rule.  On success the
    /// form clears and hides; on failure it stays up for correction.
    pub fn save(&mut self, registry: &mut ScriptRegistry) -> Result<WiringRule, EditorError> {
        if self.entity_id.trim().is_empty() {
            return Err(EditorError::MissingField("entity"));
        }
        if self.target_id.trim().is_empty() {
            return Err(EditorError::MissingField("target"));
        }
        if self.event_name.trim().is_empty() {
            return Err(EditorError::MissingField("event"));
        }
        let action = Action::parse(&self.action)?;
        let rule = WiringRule {
            source: self.entity_id.trim().to_string(),
            event:  self.event_name.trim().to_string(),
            target: self.target_id.trim().to_string(),
            action,
        };
        registry.add(rule.clone());
        self.clear();
        self.hide();
        Ok(rule)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
