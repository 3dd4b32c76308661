//! In-memory scene.
//!
//! [`MemoryScene`] implements [`SceneAccess`] over plain maps. It backs the
//! test-suite and lets the CLI capture from and restore onto JSON scene
//! snapshots without a host application.

use std::path::Path;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::{Frame, FrameRange, SceneAccess, TypedValue};
use crate::util::{json, Error, Result};

/// Serializable scene content.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    /// Object path -> attribute name -> value, in scene order
    #[serde(default)]
    pub objects: IndexMap<String, IndexMap<String, TypedValue>>,
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default = "SceneSnapshot::default_time_range")]
    pub time_range: FrameRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<Frame>,
}

impl SceneSnapshot {
    fn default_time_range() -> FrameRange {
        FrameRange::at(1.0)
    }
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            objects: IndexMap::new(),
            selection: Vec::new(),
            time_range: Self::default_time_range(),
            current_time: None,
        }
    }
}

/// Thread-safe in-memory scene.
#[derive(Debug, Default)]
pub struct MemoryScene {
    state: RwLock<SceneSnapshot>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the current content.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.state.read().clone()
    }

    /// Load a scene snapshot file (`//` comments allowed).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let snapshot: SceneSnapshot = json::read_json(path.as_ref(), true)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Atomically write the scene to a snapshot file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        json::write_json_atomic(path.as_ref(), &*self.state.read(), true)
    }

    /// Create an empty object if it does not exist yet.
    pub fn add_object(&self, path: &str) {
        self.state.write().objects.entry(path.to_string()).or_default();
    }

    /// Create or overwrite an attribute without any type checks.
    pub fn define(&self, path: &str, attr: &str, value: TypedValue) {
        self.state
            .write()
            .objects
            .entry(path.to_string())
            .or_default()
            .insert(attr.to_string(), value);
    }

    /// Builder form of [`define`](Self::define).
    pub fn with(self, path: &str, attr: &str, value: TypedValue) -> Self {
        self.define(path, attr, value);
        self
    }

    /// Current value of an attribute, if defined.
    pub fn value(&self, path: &str, attr: &str) -> Option<TypedValue> {
        self.state.read().objects.get(path)?.get(attr).cloned()
    }

    /// Object paths in scene order.
    pub fn objects(&self) -> Vec<String> {
        self.state.read().objects.keys().cloned().collect()
    }

    pub fn select<S: AsRef<str>>(&self, paths: &[S]) {
        self.state.write().selection = paths.iter().map(|p| p.as_ref().to_string()).collect();
    }

    pub fn set_time_range(&self, range: FrameRange) {
        self.state.write().time_range = range;
    }

    pub fn set_current_time(&self, frame: Frame) {
        self.state.write().current_time = Some(frame);
    }
}

impl SceneAccess for MemoryScene {
    fn exists(&self, path: &str) -> bool {
        self.state.read().objects.contains_key(path)
    }

    fn get_attr(&self, path: &str, name: &str) -> Result<TypedValue> {
        let state = self.state.read();
        let attrs = state
            .objects
            .get(path)
            .ok_or_else(|| Error::ObjectNotFound(path.to_string()))?;
        attrs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AttributeNotFound(format!("{}.{}", path, name)))
    }

    fn set_attr(&self, path: &str, name: &str, value: TypedValue) -> Result<()> {
        let mut state = self.state.write();
        let attrs = state
            .objects
            .get_mut(path)
            .ok_or_else(|| Error::ObjectNotFound(path.to_string()))?;
        let slot = attrs
            .get_mut(name)
            .ok_or_else(|| Error::AttributeNotFound(format!("{}.{}", path, name)))?;

        if slot.value_type() != value.value_type() {
            return Err(Error::TypeMismatch {
                attribute: format!("{}.{}", path, name),
                expected: slot.value_type().to_string(),
                actual: value.value_type().to_string(),
            });
        }
        *slot = value;
        Ok(())
    }

    fn list_attrs(&self, path: &str) -> Vec<String> {
        self.state
            .read()
            .objects
            .get(path)
            .map(|attrs| attrs.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn list_selected(&self) -> Vec<String> {
        self.state.read().selection.clone()
    }

    fn current_time_range(&self) -> FrameRange {
        self.state.read().time_range
    }

    fn current_time(&self) -> Frame {
        let state = self.state.read();
        state.current_time.unwrap_or(state.time_range.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueType;

    #[test]
    fn test_get_set() {
        let scene = MemoryScene::new().with("|ctrl", "rotateX", TypedValue::Double(0.0));
        scene.set_attr("|ctrl", "rotateX", TypedValue::Double(5.0)).unwrap();
        assert_eq!(scene.get_attr("|ctrl", "rotateX").unwrap(), TypedValue::Double(5.0));
        assert!(scene.has_attr("|ctrl", "rotateX"));
    }

    #[test]
    fn test_missing_object_and_attr() {
        let scene = MemoryScene::new().with("|ctrl", "rotateX", TypedValue::Double(0.0));
        assert!(matches!(scene.get_attr("|nope", "rotateX"), Err(Error::ObjectNotFound(_))));
        assert!(matches!(
            scene.set_attr("|ctrl", "nope", TypedValue::Double(1.0)),
            Err(Error::AttributeNotFound(_))
        ));
    }

    #[test]
    fn test_set_attr_type_mismatch_keeps_value() {
        let scene = MemoryScene::new().with("|ctrl", "visibility", TypedValue::Bool(true));
        let err = scene
            .set_attr("|ctrl", "visibility", TypedValue::Double(0.0))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(scene.value("|ctrl", "visibility"), Some(TypedValue::Bool(true)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let scene = MemoryScene::new()
            .with("|a", "tx", TypedValue::Double(1.5))
            .with("|a", "mode", TypedValue::Enum(2));
        scene.select(&["|a"]);
        scene.set_time_range(FrameRange::new(1.0, 48.0).unwrap());
        scene.save(&path).unwrap();

        let loaded = MemoryScene::load(&path).unwrap();
        assert_eq!(loaded.list_selected(), vec!["|a".to_string()]);
        assert_eq!(loaded.current_time_range().end(), 48.0);
        assert_eq!(loaded.value("|a", "mode").map(|v| v.value_type()), Some(ValueType::Enum));
        assert_eq!(loaded.current_time(), 1.0);
    }
}
