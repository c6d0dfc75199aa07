//! Layout persistence.
//!
//! Widget arrangements are snapshots of the layout root's children: one
//! record per widget holding its kind plus position / rotation / scale.
//! Records serialize to JSON under `layout-<n>` keys in a [`LayoutStore`]
//! (the host's key-value storage).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::scene::Scene;

pub const LAYOUT_KEYWORD: &str = "layout";

/// One saved widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "pX")]
    pub p_x: f32,
    #[serde(rename = "pY")]
    pub p_y: f32,
    #[serde(rename = "pZ")]
    pub p_z: f32,
    #[serde(rename = "rX")]
    pub r_x: f32,
    #[serde(rename = "rY")]
    pub r_y: f32,
    #[serde(rename = "rZ")]
    pub r_z: f32,
    #[serde(rename = "sX")]
    pub s_x: f32,
    #[serde(rename = "sY")]
    pub s_y: f32,
    #[serde(rename = "sZ")]
    pub s_z: f32,
}

/// The key-value storage surface layouts persist into.
pub trait LayoutStore {
    fn keys(&self) -> Vec<String>;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store; the default for the rig and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl LayoutStore for MemoryStore {
    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no layout root in scene")]
    MissingRoot,
    #[error("layout serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Number of layouts already stored under `keyword`.
pub fn last_layout_index(store: &dyn LayoutStore, keyword: &str) -> usize {
    store.keys().iter().filter(|k| k.contains(keyword)).count()
}

/// Snapshot the layout root's children into the store under the next
/// `layout-<n>` key.  Returns the records written.
pub fn save_layout(
    scene: &Scene,
    store: &mut dyn LayoutStore,
) -> Result<Vec<WidgetRecord>, LayoutError> {
    let root = scene
        .find_by_dom_prefix(LAYOUT_KEYWORD)
        .ok_or(LayoutError::MissingRoot)?;

    let records: Vec<WidgetRecord> = scene
        .children_of(root)
        .into_iter()
        .filter_map(|id| scene.get(id))
        .map(|e| WidgetRecord {
            kind: e.kind.clone(),
            p_x: e.transform.position.x,
            p_y: e.transform.position.y,
            p_z: e.transform.position.z,
            r_x: e.transform.rotation.x,
            r_y: e.transform.rotation.y,
            r_z: e.transform.rotation.z,
            s_x: e.transform.scale.x,
            s_y: e.transform.scale.y,
            s_z: e.transform.scale.z,
        })
        .collect();

    let key = format!("{}-{}", LAYOUT_KEYWORD, last_layout_index(store, LAYOUT_KEYWORD) + 1);
    store.set(&key, serde_json::to_string(&records)?);
    info!(key = %key, widgets = records.len(), "layout saved");
    Ok(records)
}

/// Load one stored layout back into records.
pub fn load_layout(store: &dyn LayoutStore, key: &str) -> Result<Vec<WidgetRecord>, LayoutError> {
    let raw = store.get(key).ok_or(LayoutError::MissingRoot)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Remove every widget under the layout root.  Returns how many were
/// removed; a missing root clears nothing.
pub fn clear_layout(scene: &mut Scene) -> usize {
    let root = match scene.find_by_dom_prefix(LAYOUT_KEYWORD) {
        Some(r) => r,
        None => return 0,
    };
    let children = scene.children_of(root);
    for id in &children {
        scene.remove(*id);
    }
    children.len()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn scene_with_widgets() -> Scene {
        let mut scene = Scene::new();
        let root = scene.create("entity", "layout00001");
        let a = scene.create("box", "box00002");
        let b = scene.create("sphere", "sphere00003");
        scene.get_mut(a).unwrap().parent = Some(root);
        scene.get_mut(a).unwrap().transform.position = Vec3::new(0.0, 2.0, -2.0);
        scene.get_mut(b).unwrap().parent = Some(root);
        scene.get_mut(b).unwrap().transform.scale = Vec3::splat(2.0);
        scene
    }

    #[test]
    fn save_snapshots_children_transforms() {
        let scene = scene_with_widgets();
        let mut store = MemoryStore::new();
        let records = save_layout(&scene, &mut store).unwrap();
        assert_eq!(records.len(), 2);
        let box_rec = records.iter().find(|r| r.kind == "box").unwrap();
        assert_eq!(box_rec.p_y, 2.0);
        assert_eq!(box_rec.p_z, -2.0);
    }

    #[test]
    fn save_keys_increment() {
        let scene = scene_with_widgets();
        let mut store = MemoryStore::new();
        save_layout(&scene, &mut store).unwrap();
        save_layout(&scene, &mut store).unwrap();
        assert!(store.get("layout-1").is_some());
        assert!(store.get("layout-2").is_some());
        assert_eq!(last_layout_index(&store, "layout"), 2);
    }

    #[test]
    fn save_without_root_is_an_error() {
        let scene = Scene::new();
        let mut store = MemoryStore::new();
        assert!(matches!(
            save_layout(&scene, &mut store),
            Err(LayoutError::MissingRoot)
        ));
    }

    #[test]
    fn records_round_trip_through_json() {
        let scene = scene_with_widgets();
        let mut store = MemoryStore::new();
        let saved = save_layout(&scene, &mut store).unwrap();
        let loaded = load_layout(&store, "layout-1").unwrap();
        assert_eq!(saved, loaded);
    }

    #[test]
    fn record_json_uses_host_field_names() {
        let scene = scene_with_widgets();
        let mut store = MemoryStore::new();
        save_layout(&scene, &mut store).unwrap();
        let raw = store.get("layout-1").unwrap();
        assert!(raw.contains("\"type\""));
        assert!(raw.contains("\"pX\""));
        assert!(raw.contains("\"sZ\""));
    }

    #[test]
    fn clear_removes_widgets_but_keeps_root() {
        let mut scene = scene_with_widgets();
        assert_eq!(clear_layout(&mut scene), 2);
        assert!(scene.find_by_dom_prefix("layout").is_some());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn clear_without_root_is_a_noop() {
        let mut scene = Scene::new();
        assert_eq!(clear_layout(&mut scene), 0);
    }
}
