//! Transfer objects: poses, animation and selection sets.
//!
//! A [`TransferObject`] is an ordered snapshot `object path -> attribute ->
//! value` plus [`MetaData`]. The three kinds share one representation and
//! differ only in which values they accept, driven by [`TransferKind`]:
//!
//! - `Pose` - static values, one per attribute
//! - `Animation` - curves (and static values for unanimated attributes)
//!   over a captured frame range
//! - `SelectionSet` - object membership only
//!
//! ## Example
//!
//! ```ignore
//! use poselib::prelude::*;
//!
//! let pose = TransferObject::capture_selection(&scene, TransferKind::Pose, &AttributeFilter::All, None)?;
//! pose.save("walk.pose.json")?;
//!
//! let pose = TransferObject::load("walk.pose.json")?;
//! let report = pose.restore(&scene, &RestoreOptions::default().namespaces(&["char"], &["char2"]))?;
//! ```

mod format;
mod capture;
mod animation;
mod restore;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{clamp_range, FrameRange, MetaData, TypedValue};
use crate::util::{Error, Result};

pub use animation::{AnimationOptions, PasteOption, TimeRemap};
pub use restore::{FailedWrite, RestoreOptions, RestoreReport};

/// Attribute name -> value, in capture order.
pub type AttributeValues = IndexMap<String, TypedValue>;

/// Kind of transfer, deciding how value records are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferKind {
    Pose,
    Animation,
    SelectionSet,
}

impl TransferKind {
    /// Metadata tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::Animation => "animation",
            Self::SelectionSet => "selectionSet",
        }
    }

    /// Whether a record of this kind may hold `value`.
    pub fn accepts(&self, value: &TypedValue) -> bool {
        match self {
            Self::Pose => !value.is_curve(),
            Self::Animation => true,
            Self::SelectionSet => false,
        }
    }

    /// What `accepts` allows, for error messages.
    fn expectation(&self) -> &'static str {
        match self {
            Self::Pose => "static value",
            Self::Animation => "curve or static value",
            Self::SelectionSet => "no attributes",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pose" => Ok(Self::Pose),
            "animation" | "anim" => Ok(Self::Animation),
            "selectionSet" | "selection" | "set" => Ok(Self::SelectionSet),
            other => Err(Error::format(format!("unknown transfer kind: {}", other))),
        }
    }
}

/// Ordered snapshot of attribute values keyed by object path.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferObject {
    kind: TransferKind,
    metadata: MetaData,
    objects: IndexMap<String, AttributeValues>,
}

impl TransferObject {
    /// Empty transfer of `kind`.
    pub fn new(kind: TransferKind) -> Self {
        let mut metadata = MetaData::new();
        metadata.set(MetaData::KIND_KEY, kind.as_str());
        Self {
            kind,
            metadata,
            objects: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetaData {
        &mut self.metadata
    }

    /// All objects with their attribute values, in capture order.
    pub fn objects(&self) -> &IndexMap<String, AttributeValues> {
        &self.objects
    }

    /// Object paths in capture order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }

    pub fn attributes(&self, path: &str) -> Option<&AttributeValues> {
        self.objects.get(path)
    }

    pub fn value(&self, path: &str, attr: &str) -> Option<&TypedValue> {
        self.objects.get(path)?.get(attr)
    }

    /// Register an object. Existing objects keep their position and values.
    pub fn add_object(&mut self, path: impl Into<String>) {
        self.objects.entry(path.into()).or_default();
    }

    /// Store one value, checking it against the kind.
    pub fn insert(&mut self, path: &str, attr: &str, value: TypedValue) -> Result<()> {
        if !self.kind.accepts(&value) {
            return Err(Error::TypeMismatch {
                attribute: format!("{}.{}", path, attr),
                expected: self.kind.expectation().to_string(),
                actual: value.to_string(),
            });
        }
        self.objects
            .entry(path.to_string())
            .or_default()
            .insert(attr.to_string(), value);
        Ok(())
    }

    /// Captured frame range of an animation.
    pub fn captured_range(&self) -> Option<FrameRange> {
        self.metadata.captured_range()
    }

    /// Copy of an animation restricted to `range` (clamped to the captured
    /// range). Fails with `OutOfBounds` when the ranges do not overlap.
    pub fn subrange(&self, range: FrameRange) -> Result<TransferObject> {
        let captured = self.captured_range().ok_or_else(|| {
            Error::other(format!("{} transfer has no captured frame range", self.kind))
        })?;
        let clamped = clamp_range(range, captured)?;

        let mut sub = self.clone();
        for values in sub.objects.values_mut() {
            for value in values.values_mut() {
                if let TypedValue::Curve(ty, curve) = value {
                    *curve = curve.crop(clamped, ty.interpolates());
                }
            }
        }
        sub.metadata.set_captured_range(clamped);
        Ok(sub)
    }
}
