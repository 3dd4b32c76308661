//! Capturing transfer objects from a live scene.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use super::{TransferKind, TransferObject};
use crate::core::{FrameRange, MetaData, SceneAccess, TypedValue};
use crate::scene::{AttributeFilter, Node};
use crate::util::{Error, Result, Warning};

/// `writer` metadata value.
fn writer() -> String {
    format!(
        "{} {} (built {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("POSELIB_BUILD_STAMP")
    )
}

fn current_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|user| !user.is_empty())
}

impl TransferObject {
    /// Capture `nodes` in the given order.
    ///
    /// Missing nodes are skipped with a warning. `range` only applies to
    /// animation and defaults to the scene's playback range.
    pub fn capture(
        kind: TransferKind,
        nodes: &[Node<'_>],
        filter: &AttributeFilter,
        range: Option<FrameRange>,
    ) -> Result<Self> {
        Self::capture_with_warnings(kind, nodes, filter, range).map(|(transfer, _)| transfer)
    }

    /// [`capture`](Self::capture), also returning the skipped nodes.
    pub fn capture_with_warnings(
        kind: TransferKind,
        nodes: &[Node<'_>],
        filter: &AttributeFilter,
        range: Option<FrameRange>,
    ) -> Result<(Self, Vec<Warning>)> {
        let scene = nodes
            .first()
            .map(Node::scene)
            .ok_or_else(|| Error::other("no objects to capture"))?;

        let mut transfer = Self::new(kind);
        let mut warnings = Vec::new();
        stamp(&mut transfer.metadata);

        let range = match kind {
            TransferKind::Animation => {
                let range = range.unwrap_or_else(|| scene.current_time_range());
                transfer.metadata.set_captured_range(range);
                Some(range)
            }
            _ => None,
        };
        let time = scene.current_time();

        for node in nodes {
            if !node.exists() {
                warn!("Cannot capture {}: object not found", node.path());
                warnings.push(Warning::MissingObject {
                    path: node.path().to_string(),
                });
                continue;
            }

            transfer.add_object(node.path());
            if kind == TransferKind::SelectionSet {
                continue;
            }

            for attr in node.attributes(filter) {
                let value = match range {
                    Some(range) => animation_value(attr.cached(), range),
                    None => attr.cached().sample(time),
                };
                match value {
                    Some(value) => transfer.insert(node.path(), attr.name(), value)?,
                    None => debug!("Skipping {}: empty curve", attr.full_name()),
                }
            }
            debug!("Captured {}", node.path());
        }

        info!("Captured {} of {} objects as {}", transfer.len(), nodes.len(), kind);
        Ok((transfer, warnings))
    }

    /// Capture the scene's current selection.
    pub fn capture_selection(
        scene: &dyn SceneAccess,
        kind: TransferKind,
        filter: &AttributeFilter,
        range: Option<FrameRange>,
    ) -> Result<Self> {
        let nodes: Vec<Node<'_>> = scene
            .list_selected()
            .into_iter()
            .map(|path| Node::new(scene, path))
            .collect();
        Self::capture(kind, &nodes, filter, range)
    }
}

/// Curves are cropped to `range`. A curve keyed entirely outside it is held
/// at the range start as a static value.
fn animation_value(value: &TypedValue, range: FrameRange) -> Option<TypedValue> {
    match value {
        TypedValue::Curve(ty, curve) => {
            let cropped = curve.crop(range, ty.interpolates());
            if cropped.is_empty() {
                value.sample(range.start())
            } else {
                Some(TypedValue::Curve(*ty, cropped))
            }
        }
        other => Some(other.clone()),
    }
}

fn stamp(metadata: &mut MetaData) {
    metadata.set(MetaData::WRITER_KEY, writer());
    if let Some(user) = current_user() {
        metadata.set(MetaData::USER_KEY, user);
    }
    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        metadata.set(MetaData::CTIME_KEY, now.as_secs());
    }
}
