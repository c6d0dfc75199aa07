//! # playground
//!
//! The spawnable-object playground: everything that sits between the hand
//! gesture events and the scene host.
//!
//! * [`scene`] — a minimal model of the host scene graph (entities, string
//!   ids, attributes, states, transforms) plus the physics-world trait the
//!   holdable binding talks to.
//! * [`holdable`] — pinch an object to lock it to the hand's physics body,
//!   open the hand to let go.
//! * [`adapter`] — re-emit one event name as another, with the hovered
//!   guard on synthesized clicks.
//! * [`spawn`] — click-to-spawn widget factory with a cooldown and a
//!   lazily-created layout root.
//! * [`layout`] — save widget transforms as JSON into a keyed store, and
//!   clear the layout root.
//! * [`editor`] — the floating form that wires "when entity X fires event E,
//!   apply action A to entity Y" rules into a script registry.

pub mod adapter;
pub mod editor;
pub mod holdable;
pub mod layout;
pub mod scene;
pub mod spawn;

pub use adapter::EventAdapter;
pub use editor::{Action, EditorForm, OpenEditor, ScriptRegistry, WiringRule};
pub use holdable::Holdable;
pub use layout::{
    clear_layout, last_layout_index, load_layout, save_layout, LayoutError, LayoutStore,
    MemoryStore, WidgetRecord,
};
pub use scene::{ConstraintHandle, Entity, EntityId, IdMint, PhysicsWorld, Scene, Transform};
pub use spawn::{hue_color, Spawner};
