//! Animation paste: source range selection, time offset and merge modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{clamp_range, Curve, Frame, FrameRange, Key, TypedValue};
use crate::util::{Error, Result};

/// How pasted curves combine with existing destination keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PasteOption {
    /// Remove destination keys inside the pasted span, then merge
    #[default]
    Replace,
    /// Push destination keys from the paste start onward later, then merge
    Insert,
    /// Drop the destination curve entirely
    ReplaceAll,
}

impl PasteOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Insert => "insert",
            Self::ReplaceAll => "replaceAll",
        }
    }
}

impl fmt::Display for PasteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PasteOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "replace" => Ok(Self::Replace),
            "insert" => Ok(Self::Insert),
            "replaceAll" | "replace-all" | "replace_all" => Ok(Self::ReplaceAll),
            other => Err(Error::other(format!("unknown paste option: {}", other))),
        }
    }
}

/// Animation-specific restore settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationOptions {
    /// Part of the captured range to paste; the whole range when `None`
    pub source_range: Option<FrameRange>,
    /// Destination frame of the first pasted frame; the source start when `None`
    pub start_frame: Option<Frame>,
    pub paste: PasteOption,
}

/// Resolved mapping from captured frames to destination frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRemap {
    source: FrameRange,
    offset: Frame,
}

impl TimeRemap {
    /// Clamp the requested source range to `captured` and compute the offset.
    ///
    /// Fails with `OutOfBounds` when the requested range misses the capture.
    pub fn resolve(captured: FrameRange, options: &AnimationOptions) -> Result<Self> {
        let source = clamp_range(options.source_range.unwrap_or(captured), captured)?;
        let start = options.start_frame.unwrap_or(source.start());
        Ok(Self {
            source,
            offset: start - source.start(),
        })
    }

    /// Captured frames being pasted.
    pub fn source(&self) -> FrameRange {
        self.source
    }

    /// Frames written in the destination.
    pub fn destination(&self) -> FrameRange {
        self.source.offset(self.offset)
    }

    pub fn offset(&self) -> Frame {
        self.offset
    }

    /// Crop a stored curve to the source range and move it into place.
    /// Static values pass through.
    pub fn apply(&self, value: &TypedValue) -> TypedValue {
        match value {
            TypedValue::Curve(ty, curve) => {
                let cropped = curve.crop(self.source, ty.interpolates());
                TypedValue::Curve(*ty, cropped.shifted(self.offset))
            }
            other => other.clone(),
        }
    }
}

/// Combine a remapped `incoming` value with the destination's `existing` one.
///
/// Only curve-onto-curve pastes merge; anything else is replaced outright.
pub fn paste(
    existing: &TypedValue,
    incoming: TypedValue,
    destination: FrameRange,
    option: PasteOption,
) -> TypedValue {
    let (current, (ty, pasted)) = match (existing.as_curve(), incoming) {
        (Some(current), TypedValue::Curve(ty, pasted)) => (current, (ty, pasted)),
        (_, incoming) => return incoming,
    };

    let merged = match option {
        PasteOption::ReplaceAll => pasted,
        PasteOption::Replace => {
            let mut merged = current.clone();
            merged.remove_keys(|frame| destination.contains(frame));
            merged.merge(&pasted);
            merged
        }
        PasteOption::Insert => {
            // Inclusive range: the pasted span occupies length + 1 frames.
            let shift = destination.length() + 1.0;
            let mut merged = Curve::from_keys(current.keys().iter().map(|key| {
                if key.frame >= destination.start() {
                    Key::new(key.frame + shift, key.value)
                } else {
                    *key
                }
            }));
            merged.merge(&pasted);
            merged
        }
    };
    TypedValue::Curve(ty, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueType;

    fn curve(keys: &[(f64, f64)]) -> TypedValue {
        TypedValue::Curve(
            ValueType::Double,
            Curve::from_keys(keys.iter().map(|&(f, v)| Key::new(f, v))),
        )
    }

    fn frames(value: &TypedValue) -> Vec<(f64, f64)> {
        value
            .as_curve()
            .unwrap()
            .keys()
            .iter()
            .map(|k| (k.frame, k.value))
            .collect()
    }

    fn range(start: f64, end: f64) -> FrameRange {
        FrameRange::new(start, end).unwrap()
    }

    #[test]
    fn test_remap_defaults_to_captured_range() {
        let remap = TimeRemap::resolve(range(1.0, 10.0), &AnimationOptions::default()).unwrap();
        assert_eq!(remap.source(), range(1.0, 10.0));
        assert_eq!(remap.offset(), 0.0);
    }

    #[test]
    fn test_remap_clamps_and_offsets() {
        let options = AnimationOptions {
            source_range: Some(range(5.0, 50.0)),
            start_frame: Some(100.0),
            ..Default::default()
        };
        let remap = TimeRemap::resolve(range(1.0, 10.0), &options).unwrap();
        assert_eq!(remap.source(), range(5.0, 10.0));
        assert_eq!(remap.destination(), range(100.0, 105.0));

        let moved = remap.apply(&curve(&[(1.0, 0.0), (10.0, 9.0)]));
        assert_eq!(frames(&moved), vec![(100.0, 4.0), (105.0, 9.0)]);
        assert_eq!(remap.apply(&TypedValue::Long(3)), TypedValue::Long(3));
    }

    #[test]
    fn test_remap_out_of_bounds() {
        let options = AnimationOptions {
            source_range: Some(range(20.0, 30.0)),
            ..Default::default()
        };
        assert!(matches!(
            TimeRemap::resolve(range(1.0, 10.0), &options),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_paste_modes() {
        let existing = curve(&[(0.0, 1.0), (5.0, 1.0), (10.0, 1.0), (20.0, 1.0)]);
        let incoming = curve(&[(4.0, 7.0), (8.0, 7.0)]);
        let span = range(4.0, 8.0);

        let replaced = paste(&existing, incoming.clone(), span, PasteOption::Replace);
        assert_eq!(
            frames(&replaced),
            vec![(0.0, 1.0), (4.0, 7.0), (8.0, 7.0), (10.0, 1.0), (20.0, 1.0)]
        );

        let inserted = paste(&existing, incoming.clone(), span, PasteOption::Insert);
        assert_eq!(
            frames(&inserted),
            vec![(0.0, 1.0), (4.0, 7.0), (8.0, 7.0), (10.0, 1.0), (15.0, 1.0), (25.0, 1.0)]
        );

        let all = paste(&existing, incoming.clone(), span, PasteOption::ReplaceAll);
        assert_eq!(all, incoming);
    }

    #[test]
    fn test_paste_over_static_replaces() {
        let incoming = curve(&[(1.0, 2.0)]);
        let pasted = paste(&TypedValue::Double(0.0), incoming.clone(), range(1.0, 1.0), PasteOption::Insert);
        assert_eq!(pasted, incoming);
        assert_eq!(
            paste(&incoming, TypedValue::Double(4.0), range(1.0, 1.0), PasteOption::Replace),
            TypedValue::Double(4.0)
        );
    }

    #[test]
    fn test_paste_option_parse() {
        assert_eq!("replaceAll".parse::<PasteOption>().unwrap(), PasteOption::ReplaceAll);
        assert_eq!(serde_json::to_string(&PasteOption::Insert).unwrap(), "\"insert\"");
        assert!("merge".parse::<PasteOption>().is_err());
    }
}
