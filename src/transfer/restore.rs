//! Restoring transfer objects onto a live scene.
//!
//! Restore runs in two phases. Planning resolves every stored object and
//! prepares the values to write (mirrored, cropped, offset) without touching
//! the scene, so strict-mode and range failures leave the scene unchanged.
//! Applying then writes the plan in stored order, collecting per-attribute
//! failures instead of stopping.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::animation::{paste, AnimationOptions, TimeRemap};
use super::{TransferKind, TransferObject};
use crate::config::Config;
use crate::core::{Frame, FrameRange, SceneAccess, TypedValue};
use crate::mirror::{MirrorOption, MirrorTable};
use crate::naming::{match_with_map, resolve_in_scene, MatchMethod, MatchResult, NamespaceMap};
use crate::scene::Node;
use crate::util::{Error, Result, Warning};

/// Restore settings.
#[derive(Clone, Debug, Default)]
pub struct RestoreOptions {
    /// Stored namespaces, paired positionally with `to_namespaces`
    pub from_namespaces: Vec<String>,
    pub to_namespaces: Vec<String>,
    /// Stored path -> destination path, bypassing name matching
    pub rename: IndexMap<String, String>,
    /// Destination candidates; the scene is queried directly when `None`
    pub objects: Option<Vec<String>>,
    /// Use the scene selection as destination candidates
    pub use_selection: bool,
    /// Restore only these attributes
    pub attributes: Option<Vec<String>>,
    pub mirror: Option<MirrorTable>,
    pub mirror_option: MirrorOption,
    /// Fail on the first unresolved object, before writing anything
    pub strict: bool,
    /// Pose blend percentage (0-100); 100 when `None`
    pub blend: Option<f64>,
    pub animation: AnimationOptions,
}

impl RestoreOptions {
    /// Defaults taken from `config`. The mirror table is loaded separately.
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict: config.strict,
            animation: AnimationOptions {
                paste: config.paste,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn namespaces<F, T>(mut self, from: &[F], to: &[T]) -> Self
    where
        F: AsRef<str>,
        T: AsRef<str>,
    {
        self.from_namespaces = from.iter().map(|s| s.as_ref().to_string()).collect();
        self.to_namespaces = to.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn rename(mut self, stored: impl Into<String>, destination: impl Into<String>) -> Self {
        self.rename.insert(stored.into(), destination.into());
        self
    }

    pub fn objects<S: AsRef<str>>(mut self, objects: &[S]) -> Self {
        self.objects = Some(objects.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn use_selection(mut self, use_selection: bool) -> Self {
        self.use_selection = use_selection;
        self
    }

    pub fn attributes<S: AsRef<str>>(mut self, attributes: &[S]) -> Self {
        self.attributes = Some(attributes.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn mirror(mut self, table: MirrorTable, option: MirrorOption) -> Self {
        self.mirror = Some(table);
        self.mirror_option = option;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn blend(mut self, percent: f64) -> Self {
        self.blend = Some(percent);
        self
    }

    pub fn animation(mut self, animation: AnimationOptions) -> Self {
        self.animation = animation;
        self
    }

    fn restores_attribute(&self, name: &str) -> bool {
        self.attributes
            .as_ref()
            .map_or(true, |only| only.iter().any(|attr| attr == name))
    }
}

/// Attribute write that failed during apply.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedWrite {
    /// `path.attribute`
    pub attribute: String,
    pub error: String,
}

/// Outcome of a restore.
#[derive(Clone, Debug, Default)]
pub struct RestoreReport {
    /// One entry per considered stored object, in stored order
    pub matches: Vec<MatchResult>,
    /// `path.attribute` of every successful write
    pub written: Vec<String>,
    /// Stored objects without a destination
    pub skipped: Vec<String>,
    pub failed: Vec<FailedWrite>,
    pub warnings: Vec<Warning>,
    /// Destination frames pasted (animation only)
    pub time_range: Option<FrameRange>,
}

impl RestoreReport {
    /// Live paths of every resolved object, in stored order.
    pub fn resolved(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter_map(|m| m.destination.as_deref())
            .collect()
    }

    /// Nothing skipped and nothing failed.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects resolved, {} values written, {} skipped, {} failed",
            self.resolved().len(),
            self.written.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Values destined for one live object.
struct PlannedObject {
    destination: String,
    values: Vec<(String, TypedValue)>,
}

impl TransferObject {
    /// Write the stored values onto `scene`.
    ///
    /// Fails before any write on `OutOfBounds` (animation range) or, with
    /// `strict`, `ObjectNotFound`. Everything else is reported.
    pub fn restore(&self, scene: &dyn SceneAccess, options: &RestoreOptions) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        let remap = match self.kind {
            TransferKind::Animation => {
                let captured = self
                    .captured_range()
                    .ok_or_else(|| Error::format("animation has no captured frame range"))?;
                let remap = TimeRemap::resolve(captured, &options.animation)?;
                report.time_range = Some(remap.destination());
                Some(remap)
            }
            _ => None,
        };

        let plan = self.plan(scene, options, remap.as_ref(), &mut report)?;
        apply(scene, plan, options, remap.as_ref(), &mut report);

        info!("Restored {}: {}", self.kind, report);
        Ok(report)
    }

    fn plan(
        &self,
        scene: &dyn SceneAccess,
        options: &RestoreOptions,
        remap: Option<&TimeRemap>,
        report: &mut RestoreReport,
    ) -> Result<Vec<PlannedObject>> {
        let sources: Vec<&str> = self
            .paths()
            .filter(|path| match &options.mirror {
                Some(table) => {
                    let side = table.side_of(path);
                    let applies = options.mirror_option.applies_to(side);
                    if !applies {
                        debug!("Skipping {} ({:?} side)", path, side);
                    }
                    applies
                }
                None => true,
            })
            .collect();

        let map = NamespaceMap::new(self.paths(), &options.from_namespaces, &options.to_namespaces);

        // Explicit renames first; everything else goes through name matching.
        let mut slots: Vec<Option<MatchResult>> = vec![None; sources.len()];
        let mut lookups = Vec::new();
        let mut lookup_slots = Vec::new();
        for (slot, stored) in sources.iter().enumerate() {
            match options.rename.get(*stored) {
                Some(dest) if scene.exists(dest) => {
                    slots[slot] = Some(MatchResult::resolved(stored, dest, MatchMethod::Explicit));
                }
                Some(dest) => {
                    debug!("Rename target {} for {} does not exist", dest, stored);
                    slots[slot] = Some(MatchResult::unresolved(stored));
                }
                None => {
                    let lookup = match &options.mirror {
                        Some(table) => table.mirror_target(stored),
                        None => stored.to_string(),
                    };
                    lookups.push(lookup);
                    lookup_slots.push(slot);
                }
            }
        }

        let candidates = match &options.objects {
            Some(objects) => Some(objects.clone()),
            None if options.use_selection => Some(scene.list_selected()),
            None => None,
        };
        let matched: Vec<MatchResult> = match candidates {
            Some(candidates) => {
                let (results, warnings) = match_with_map(&lookups, &candidates, &map).into_parts();
                report.warnings.extend(warnings);
                results
            }
            None => lookups
                .iter()
                .map(|lookup| resolve_in_scene(lookup, scene, &map))
                .collect(),
        };
        for (slot, mut result) in lookup_slots.into_iter().zip(matched) {
            result.source = sources[slot].to_string();
            slots[slot] = Some(result);
        }

        let mut plan = Vec::new();
        for result in slots.into_iter().flatten() {
            match &result.destination {
                Some(destination) => {
                    debug!("{} -> {}", result.source, destination);
                    plan.push(PlannedObject {
                        destination: destination.clone(),
                        values: self.planned_values(&result.source, options, remap),
                    });
                }
                None if options.strict => return Err(Error::ObjectNotFound(result.source)),
                None => {
                    warn!("Cannot resolve {}", result.source);
                    report.warnings.push(Warning::UnresolvedName {
                        path: result.source.clone(),
                    });
                    report.skipped.push(result.source.clone());
                }
            }
            report.matches.push(result);
        }
        Ok(plan)
    }

    /// Stored values of one object, mirrored and moved in time.
    fn planned_values(
        &self,
        stored: &str,
        options: &RestoreOptions,
        remap: Option<&TimeRemap>,
    ) -> Vec<(String, TypedValue)> {
        let Some(attrs) = self.objects.get(stored) else {
            return Vec::new();
        };
        attrs
            .iter()
            .filter(|(name, _)| options.restores_attribute(name))
            .map(|(name, value)| {
                let value = match &options.mirror {
                    Some(table) => table.mirror_value(name, value),
                    None => value.clone(),
                };
                let value = match remap {
                    Some(remap) => remap.apply(&value),
                    None => value,
                };
                (name.clone(), value)
            })
            .collect()
    }
}

fn apply(
    scene: &dyn SceneAccess,
    plan: Vec<PlannedObject>,
    options: &RestoreOptions,
    remap: Option<&TimeRemap>,
    report: &mut RestoreReport,
) {
    let time = scene.current_time();
    for planned in plan {
        let node = Node::new(scene, planned.destination.as_str());
        for (name, value) in planned.values {
            let Some(mut attr) = node.attribute(&name) else {
                debug!("{} has no attribute {}", node.path(), name);
                report.warnings.push(Warning::MissingAttribute {
                    path: node.path().to_string(),
                    attribute: name,
                });
                continue;
            };

            let value = match (remap, options.blend) {
                (Some(remap), _) => {
                    paste(attr.cached(), value, remap.destination(), options.animation.paste)
                }
                (None, Some(percent)) => blend(attr.cached(), value, time, percent),
                (None, None) => value,
            };

            match attr.set_value(value) {
                Ok(()) => report.written.push(attr.full_name()),
                Err(e) => {
                    warn!("Cannot set {}: {}", attr.full_name(), e);
                    report.failed.push(FailedWrite {
                        attribute: attr.full_name(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Move `current` towards `target` by `percent`. Bool and enum values jump.
fn blend(current: &TypedValue, target: TypedValue, time: Frame, percent: f64) -> TypedValue {
    let weight = percent.clamp(0.0, 100.0) / 100.0;
    match (current.sample(time), target) {
        (Some(TypedValue::Double(from)), TypedValue::Double(to)) => {
            TypedValue::Double(from + (to - from) * weight)
        }
        (Some(TypedValue::Long(from)), TypedValue::Long(to)) => {
            let (from, to) = (from as f64, to as f64);
            TypedValue::Long((from + (to - from) * weight).round() as i64)
        }
        (_, target) => target,
    }
}
