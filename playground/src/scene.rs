//! Minimal scene-host model.
//!
//! The real scene graph, renderer and physics engine live in the host
//! runtime; the playground components only need entities with string ids,
//! attributes, states, parent links and transforms, plus a lock-constraint
//! surface on the physics world.  This module models exactly that and
//! nothing more.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use gesture_stream::BodyHandle;

// ════════════════════════════════════════════════════════════════════════════
// Handles
// ════════════════════════════════════════════════════════════════════════════

/// Stable handle to one scene entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Handle to a physics constraint created through [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(pub u64);

/// The physics surface the playground consumes: lock two bodies together,
/// or undo it.  The actual solver lives in the host.
pub trait PhysicsWorld {
    fn add_lock_constraint(&mut self, a: BodyHandle, b: BodyHandle) -> ConstraintHandle;
    fn remove_constraint(&mut self, constraint: ConstraintHandle);
}

// ════════════════════════════════════════════════════════════════════════════
// Entities
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    /// Host-facing string id (the DOM id in a browser host).
    pub dom_id: String,
    /// Widget kind, e.g. "box" or "sphere".
    pub kind: String,
    pub attributes: HashMap<String, String>,
    pub states: HashSet<String>,
    pub transform: Transform,
    pub parent: Option<EntityId>,
    pub visible: bool,
    pub opacity: f32,
    pub body: Option<BodyHandle>,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

/// Flat entity store with parent links.  Scenes here are dozens of widgets,
/// so linear scans are fine.
#[derive(Debug, Default)]
pub struct Scene {
    entities: Vec<Entity>,
    next: u64,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn create(&mut self, kind: &str, dom_id: &str) -> EntityId {
        self.next += 1;
        let id = EntityId(self.next);
        self.entities.push(Entity {
            id,
            dom_id: dom_id.to_string(),
            kind: kind.to_string(),
            attributes: HashMap::new(),
            states: HashSet::new(),
            transform: Transform::default(),
            parent: None,
            visible: true,
            opacity: 1.0,
            body: None,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<EntityId> {
        self.entities.iter().find(|e| e.dom_id == dom_id).map(|e| e.id)
    }

    /// First entity whose dom id starts with `prefix` (the `[id^=layout]`
    /// query of a browser host).
    pub fn find_by_dom_prefix(&self, prefix: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.dom_id.starts_with(prefix))
            .map(|e| e.id)
    }

    pub fn children_of(&self, parent: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.parent == Some(parent))
            .map(|e| e.id)
            .collect()
    }

    pub fn remove(&mut self, id: EntityId) {
        self.entities.retain(|e| e.id != id);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    // ── attribute / state helpers ────────────────────────────────────────

    pub fn set_attribute(&mut self, id: EntityId, name: &str, value: &str) {
        if let Some(e) = self.get_mut(id) {
            e.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, id: EntityId, name: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.attributes.get(name)).map(String::as_str)
    }

    pub fn add_state(&mut self, id: EntityId, state: &str) {
        if let Some(e) = self.get_mut(id) {
            e.states.insert(state.to_string());
        }
    }

    pub fn remove_state(&mut self, id: EntityId, state: &str) {
        if let Some(e) = self.get_mut(id) {
            e.states.remove(state);
        }
    }

    pub fn has_state(&self, id: EntityId, state: &str) -> bool {
        self.get(id).map(|e| e.states.contains(state)).unwrap_or(false)
    }

    /// Apply an opacity to an entity and all its descendants.
    pub fn set_group_opacity(&mut self, root: EntityId, opacity: f32) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(e) = self.get_mut(id) {
                e.opacity = opacity;
            }
            stack.extend(self.children_of(id));
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// IdMint
// ════════════════════════════════════════════════════════════════════════════

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 5;

/// Session-scoped generator of short entity-id suffixes.
///
/// Base-36 encoding of an owned counter; unique within the session and
/// deterministic, unlike the random suffixes it replaces.
#[derive(Debug, Default)]
pub struct IdMint {
    next: u64,
}

impl IdMint {
    pub fn new() -> Self {
        IdMint::default()
    }

    /// Five-character base-36 suffix, e.g. "00001", "0000a".
    pub fn mint_suffix(&mut self) -> String {
        self.next += 1;
        let mut n = self.next;
        let mut out = [b'0'; SUFFIX_LEN];
        for slot in out.iter_mut().rev() {
            *slot = SUFFIX_ALPHABET[(n % 36) as usize];
            n /= 36;
            if n == 0 {
                break;
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// A full dom id, e.g. "box00001".
    pub fn mint_dom_id(&mut self, prefix: &str) -> String {
        format!("{}{}", prefix, self.mint_suffix())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
