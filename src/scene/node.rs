//! Handles onto live scene objects and attributes.
//!
//! [`Node`] and [`Attribute`] are short-lived views: the scene behind
//! [`SceneAccess`] stays the single source of truth. Lookups on missing
//! objects or attributes return `None` instead of failing, so a restore over
//! a partially missing scene can carry on with what does exist.

use std::fmt;

use crate::core::{SceneAccess, TypedValue, ValueType};
use crate::naming::{namespace_of, short_name};
use crate::util::{Error, Result};

/// Which attributes to read from a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttributeFilter {
    /// Every attribute the scene lists for the object
    #[default]
    All,
    /// Only these names, in this order
    Names(Vec<String>),
}

impl AttributeFilter {
    pub fn names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::Names(names.iter().map(|n| n.as_ref().to_string()).collect())
    }
}

/// View of one scene object.
#[derive(Clone)]
pub struct Node<'a> {
    path: String,
    scene: &'a dyn SceneAccess,
}

impl<'a> Node<'a> {
    pub fn new(scene: &'a dyn SceneAccess, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            scene,
        }
    }

    /// Full object path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn namespace(&self) -> &str {
        namespace_of(&self.path)
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.scene.exists(&self.path)
    }

    pub fn scene(&self) -> &'a dyn SceneAccess {
        self.scene
    }

    /// Attribute handle, `None` if the object or attribute is missing.
    pub fn attribute(&self, name: &str) -> Option<Attribute<'a>> {
        if !self.exists() {
            return None;
        }
        let value = self.scene.get_attr(&self.path, name).ok()?;
        Some(Attribute {
            node: self.clone(),
            name: name.to_string(),
            value_type: value.value_type(),
            value,
        })
    }

    /// Attributes selected by `filter`, skipping missing ones.
    pub fn attributes(&self, filter: &AttributeFilter) -> Vec<Attribute<'a>> {
        if !self.exists() {
            return Vec::new();
        }
        let names = match filter {
            AttributeFilter::All => self.scene.list_attrs(&self.path),
            AttributeFilter::Names(names) => names.clone(),
        };
        names.iter().filter_map(|name| self.attribute(name)).collect()
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.path).finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

/// View of one attribute with a cached value.
#[derive(Clone, Debug)]
pub struct Attribute<'a> {
    node: Node<'a>,
    name: String,
    value_type: ValueType,
    value: TypedValue,
}

impl<'a> Attribute<'a> {
    pub fn node(&self) -> &Node<'a> {
        &self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `path.attribute`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.node.path, self.name)
    }

    /// Declared scalar type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Value as of the last read or write through this handle.
    pub fn cached(&self) -> &TypedValue {
        &self.value
    }

    /// Read the live value.
    pub fn value(&self) -> Result<TypedValue> {
        self.node.scene.get_attr(&self.node.path, &self.name)
    }

    /// Re-read the live value into the cache.
    pub fn refresh(&mut self) -> Result<&TypedValue> {
        self.value = self.value()?;
        Ok(&self.value)
    }

    /// True if the live attribute currently carries a curve.
    pub fn is_animatable(&self) -> Result<bool> {
        Ok(self.value()?.is_curve())
    }

    /// Write a value.
    ///
    /// Fails with [`Error::TypeMismatch`] before touching the scene when the
    /// value's scalar type differs from the declared one. A curve may replace
    /// a static value of the same type and vice versa.
    pub fn set_value(&mut self, value: TypedValue) -> Result<()> {
        if value.value_type() != self.value_type {
            return Err(Error::TypeMismatch {
                attribute: self.full_name(),
                expected: self.value_type.to_string(),
                actual: value.value_type().to_string(),
            });
        }
        self.node
            .scene
            .set_attr(&self.node.path, &self.name, value.clone())?;
        self.value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Curve, Key};
    use crate::scene::MemoryScene;

    fn scene() -> MemoryScene {
        MemoryScene::new()
            .with("|char:L_arm", "rotateX", TypedValue::Double(10.0))
            .with("|char:L_arm", "visibility", TypedValue::Bool(true))
    }

    #[test]
    fn test_node_soft_failures() {
        let scene = scene();
        let missing = Node::new(&scene, "|char:R_arm");
        assert!(!missing.exists());
        assert!(missing.attribute("rotateX").is_none());
        assert!(missing.attributes(&AttributeFilter::All).is_empty());

        let node = Node::new(&scene, "|char:L_arm");
        assert_eq!(node.namespace(), "char");
        assert_eq!(node.short_name(), "L_arm");
        assert!(node.attribute("nope").is_none());
    }

    #[test]
    fn test_attribute_filter() {
        let scene = scene();
        let node = Node::new(&scene, "|char:L_arm");
        let all: Vec<String> = node
            .attributes(&AttributeFilter::All)
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(all, vec!["rotateX", "visibility"]);

        let some = node.attributes(&AttributeFilter::names(&["visibility", "missing"]));
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].full_name(), "|char:L_arm.visibility");
    }

    #[test]
    fn test_set_value_type_mismatch() {
        let scene = scene();
        let node = Node::new(&scene, "|char:L_arm");
        let mut attr = node.attribute("visibility").unwrap();

        let err = attr.set_value(TypedValue::Double(0.0)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(attr.value().unwrap(), TypedValue::Bool(true));
        assert_eq!(attr.cached(), &TypedValue::Bool(true));
    }

    #[test]
    fn test_set_curve_on_static() {
        let scene = scene();
        let node = Node::new(&scene, "|char:L_arm");
        let mut attr = node.attribute("rotateX").unwrap();
        assert!(!attr.is_animatable().unwrap());

        let curve = Curve::from_keys([Key::new(1.0, 0.0), Key::new(10.0, 90.0)]);
        attr.set_value(TypedValue::Curve(ValueType::Double, curve)).unwrap();
        assert!(attr.is_animatable().unwrap());
        assert!(node.attribute("rotateX").unwrap().is_animatable().unwrap());
    }

    #[test]
    fn test_is_animatable_reads_live_value() {
        let scene = scene();
        let node = Node::new(&scene, "|char:L_arm");
        let attr = node.attribute("rotateX").unwrap();
        assert!(!attr.is_animatable().unwrap());

        let curve = Curve::from_keys([Key::new(1.0, 0.0), Key::new(10.0, 90.0)]);
        scene
            .set_attr("|char:L_arm", "rotateX", TypedValue::Curve(ValueType::Double, curve))
            .unwrap();
        assert!(attr.is_animatable().unwrap());
        assert!(!attr.cached().is_curve());
    }
}
