//! JSON transfer files.
//!
//! ```text
//! {
//!   "metadata": { "kind": "pose", ... },
//!   "objects": {
//!     "|char:L_arm": { "rotateX": { "type": "double", "value": 10.0 } }
//!   }
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AttributeValues, TransferKind, TransferObject};
use crate::core::{FrameRange, MetaData, TypedValue};
use crate::util::{json, Error, Result};

/// Borrowed view used for writing.
#[derive(Serialize)]
struct TransferFileRef<'a> {
    metadata: &'a MetaData,
    objects: &'a IndexMap<String, AttributeValues>,
}

#[derive(Deserialize)]
struct TransferFile {
    #[serde(default)]
    metadata: MetaData,
    objects: IndexMap<String, AttributeValues>,
}

impl TransferObject {
    /// Atomically write a pretty-printed transfer file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path, true)
    }

    /// Atomically write a transfer file, optionally indented.
    pub fn save_with(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        check_finite(&self.objects)?;
        json::write_json_atomic(path, &self.as_file(), pretty)?;
        info!("Saved {} ({} objects) to {}", self.kind, self.len(), path.display());
        Ok(())
    }

    /// Read a transfer file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: TransferFile = json::read_json(path, false)?;
        let transfer = Self::from_file(file)?;
        info!("Loaded {} ({} objects) from {}", transfer.kind, transfer.len(), path.display());
        Ok(transfer)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        check_finite(&self.objects)?;
        let text = if pretty {
            serde_json::to_string_pretty(&self.as_file())?
        } else {
            serde_json::to_string(&self.as_file())?
        };
        Ok(text)
    }

    /// Parse a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: TransferFile =
            serde_json::from_str(text).map_err(|e| Error::format(e.to_string()))?;
        Self::from_file(file)
    }

    fn as_file(&self) -> TransferFileRef<'_> {
        TransferFileRef {
            metadata: &self.metadata,
            objects: &self.objects,
        }
    }

    fn from_file(file: TransferFile) -> Result<Self> {
        let TransferFile { mut metadata, objects } = file;

        let kind = match metadata.get(MetaData::KIND_KEY) {
            Some(value) => value
                .as_str()
                .ok_or_else(|| Error::format("metadata kind is not a string"))?
                .parse()?,
            None => {
                let kind = infer_kind(&objects);
                debug!("No kind in metadata, inferred {}", kind);
                metadata.set(MetaData::KIND_KEY, kind.as_str());
                kind
            }
        };

        validate(kind, &objects)?;

        if kind == TransferKind::Animation && metadata.captured_range().is_none() {
            let range = curves_range(&objects)
                .ok_or_else(|| Error::format("animation has no frame range and no keys"))?;
            debug!("No frame range in metadata, using keyed range {}..{}", range.start(), range.end());
            metadata.set_captured_range(range);
        }

        Ok(Self {
            kind,
            metadata,
            objects,
        })
    }
}

/// Any curve makes an animation, any attribute a pose.
fn infer_kind(objects: &IndexMap<String, AttributeValues>) -> TransferKind {
    let mut values = objects.values().flat_map(|attrs| attrs.values()).peekable();
    if values.peek().is_none() {
        return TransferKind::SelectionSet;
    }
    if values.any(TypedValue::is_curve) {
        TransferKind::Animation
    } else {
        TransferKind::Pose
    }
}

fn validate(kind: TransferKind, objects: &IndexMap<String, AttributeValues>) -> Result<()> {
    for (path, attrs) in objects {
        if kind == TransferKind::SelectionSet && !attrs.is_empty() {
            return Err(Error::format(format!(
                "selection set object {} carries attributes",
                path
            )));
        }
        for (attr, value) in attrs {
            if !kind.accepts(value) {
                return Err(Error::format(format!(
                    "{}.{}: {} record holds {}",
                    path, attr, kind, value
                )));
            }
        }
    }
    Ok(())
}

/// JSON has no NaN or infinity; serde_json would write them as `null`.
fn check_finite(objects: &IndexMap<String, AttributeValues>) -> Result<()> {
    for (path, attrs) in objects {
        for (attr, value) in attrs {
            if !value.is_finite() {
                return Err(Error::format(format!(
                    "{}.{}: non-finite value {}",
                    path, attr, value
                )));
            }
        }
    }
    Ok(())
}

/// Union of every curve's keyed range.
fn curves_range(objects: &IndexMap<String, AttributeValues>) -> Option<FrameRange> {
    objects
        .values()
        .flat_map(|attrs| attrs.values())
        .filter_map(|value| value.as_curve()?.range())
        .reduce(|a, b| a.union(&b))
}
