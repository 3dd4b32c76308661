//! Typed attribute values and animation curves.
//!
//! A [`TypedValue`] is what the scene hands back for one attribute and what
//! a transfer file stores for it. On disk every value is a record tagged
//! with its scalar type:
//!
//! ```text
//! {"type": "double", "value": 10.0}
//! {"type": "double", "curve": [[1.0, 0.0], [10.0, 45.0]]}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::time_range::{Frame, FrameRange};

/// Scalar type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Floating point channel (linear, angle, time...)
    #[serde(alias = "doubleLinear", alias = "doubleAngle", alias = "float", alias = "time")]
    Double,
    /// Integer channel
    #[serde(alias = "short", alias = "byte", alias = "int")]
    Long,
    Bool,
    /// Enumerated channel, stored as its integer index
    Enum,
}

impl ValueType {
    /// Type tag as written to disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Long => "long",
            Self::Bool => "bool",
            Self::Enum => "enum",
        }
    }

    /// Curves of this type interpolate linearly (otherwise stepped).
    #[inline]
    pub fn interpolates(&self) -> bool {
        matches!(self, Self::Double)
    }

    /// Convert a curve sample back to a static value of this type.
    pub fn scalar(&self, sample: f64) -> TypedValue {
        match self {
            Self::Double => TypedValue::Double(sample),
            Self::Long => TypedValue::Long(sample.round() as i64),
            Self::Bool => TypedValue::Bool(sample != 0.0),
            Self::Enum => TypedValue::Enum(sample.round() as i64),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyframe, serialized as `[frame, value]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Frame, f64)", into = "(Frame, f64)")]
pub struct Key {
    pub frame: Frame,
    pub value: f64,
}

impl Key {
    pub fn new(frame: Frame, value: f64) -> Self {
        Self { frame, value }
    }
}

impl From<(Frame, f64)> for Key {
    fn from((frame, value): (Frame, f64)) -> Self {
        Self { frame, value }
    }
}

impl From<Key> for (Frame, f64) {
    fn from(key: Key) -> Self {
        (key.frame, key.value)
    }
}

/// Time-indexed samples of one attribute, sorted by frame with unique frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Key>", into = "Vec<Key>")]
pub struct Curve {
    keys: Vec<Key>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from keys in any order. On duplicate frames the last key wins.
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut curve = Self::new();
        for key in keys {
            curve.set_key(key);
        }
        curve
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert or replace the key at `key.frame`.
    pub fn set_key(&mut self, key: Key) {
        match self.keys.binary_search_by(|k| k.frame.total_cmp(&key.frame)) {
            Ok(idx) => self.keys[idx] = key,
            Err(idx) => self.keys.insert(idx, key),
        }
    }

    /// Frame range covered by the keys, `None` for an empty curve.
    pub fn range(&self) -> Option<FrameRange> {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => FrameRange::new(first.frame, last.frame).ok(),
            _ => None,
        }
    }

    /// Sample the curve, holding the end values outside the keyed range.
    ///
    /// `interpolate` selects linear interpolation between keys; otherwise
    /// the previous key's value is held (stepped).
    pub fn evaluate(&self, frame: Frame, interpolate: bool) -> Option<f64> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if frame <= first.frame {
            return Some(first.value);
        }
        if frame >= last.frame {
            return Some(last.value);
        }

        // First key strictly after `frame`; both neighbours exist here.
        let idx = self.keys.partition_point(|k| k.frame <= frame);
        let prev = self.keys[idx - 1];
        let next = self.keys[idx];
        if prev.frame == frame || !interpolate {
            return Some(prev.value);
        }
        let t = (frame - prev.frame) / (next.frame - prev.frame);
        Some(prev.value + (next.value - prev.value) * t)
    }

    /// Keys inside `range`, plus evaluated keys at the range ends when the
    /// curve spans past them.
    pub fn crop(&self, range: FrameRange, interpolate: bool) -> Curve {
        let mut keys: Vec<Key> = self
            .keys
            .iter()
            .filter(|k| range.contains(k.frame))
            .copied()
            .collect();

        if let Some(span) = self.range() {
            for edge in [range.start(), range.end()] {
                let covered = span.contains(edge) && !keys.iter().any(|k| k.frame == edge);
                if covered {
                    if let Some(value) = self.evaluate(edge, interpolate) {
                        keys.push(Key::new(edge, value));
                    }
                }
            }
        }

        Curve::from_keys(keys)
    }

    /// Same curve moved by `offset` frames.
    pub fn shifted(&self, offset: Frame) -> Curve {
        Curve {
            keys: self
                .keys
                .iter()
                .map(|k| Key::new(k.frame + offset, k.value))
                .collect(),
        }
    }

    /// Apply `f` to every key value.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Curve {
        Curve {
            keys: self.keys.iter().map(|k| Key::new(k.frame, f(k.value))).collect(),
        }
    }

    /// Drop keys whose frame satisfies `pred`.
    pub fn remove_keys(&mut self, pred: impl Fn(Frame) -> bool) {
        self.keys.retain(|k| !pred(k.frame));
    }

    /// Insert every key of `other`, replacing keys on the same frames.
    pub fn merge(&mut self, other: &Curve) {
        for key in &other.keys {
            self.set_key(*key);
        }
    }
}

impl From<Vec<Key>> for Curve {
    fn from(keys: Vec<Key>) -> Self {
        Self::from_keys(keys)
    }
}

impl From<Curve> for Vec<Key> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

/// Value of one attribute: a static scalar or a curve of scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueRecord", into = "ValueRecord")]
pub enum TypedValue {
    Double(f64),
    Long(i64),
    Bool(bool),
    Enum(i64),
    /// Animated attribute: curve samples of the given scalar type
    Curve(ValueType, Curve),
}

impl TypedValue {
    /// Scalar type; for curves, the type of the samples.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Double(_) => ValueType::Double,
            Self::Long(_) => ValueType::Long,
            Self::Bool(_) => ValueType::Bool,
            Self::Enum(_) => ValueType::Enum,
            Self::Curve(ty, _) => *ty,
        }
    }

    #[inline]
    pub fn is_curve(&self) -> bool {
        matches!(self, Self::Curve(..))
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            Self::Curve(_, curve) => Some(curve),
            _ => None,
        }
    }

    /// Numeric view of a static value (bools as 0/1), `None` for curves.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Long(v) | Self::Enum(v) => Some(*v as f64),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Curve(..) => None,
        }
    }

    /// Static value at `frame`. Static values are returned unchanged;
    /// empty curves yield `None`.
    pub fn sample(&self, frame: Frame) -> Option<TypedValue> {
        match self {
            Self::Curve(ty, curve) => curve
                .evaluate(frame, ty.interpolates())
                .map(|v| ty.scalar(v)),
            other => Some(other.clone()),
        }
    }

    /// No NaN or infinite number anywhere, curve frames included.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Double(v) => v.is_finite(),
            Self::Curve(_, curve) => curve
                .keys()
                .iter()
                .all(|k| k.frame.is_finite() && k.value.is_finite()),
            _ => true,
        }
    }

    /// Sign-inverted copy. Bool and enum values are returned unchanged.
    pub fn negated(&self) -> TypedValue {
        match self {
            Self::Double(v) => Self::Double(-v),
            Self::Long(v) => Self::Long(v.saturating_neg()),
            Self::Curve(ty @ (ValueType::Double | ValueType::Long), curve) => {
                Self::Curve(*ty, curve.map_values(|v| -v))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Enum(v) => write!(f, "enum({})", v),
            Self::Curve(ty, curve) => match curve.range() {
                Some(range) => write!(
                    f,
                    "{} curve, {} keys, {}..{}",
                    ty,
                    curve.len(),
                    range.start(),
                    range.end()
                ),
                None => write!(f, "{} curve, empty", ty),
            },
        }
    }
}

/// On-disk shape of a value: `{"type", "value"}` or `{"type", "curve"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ValueRecord {
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    curve: Option<Curve>,
}

impl TryFrom<ValueRecord> for TypedValue {
    type Error = String;

    fn try_from(record: ValueRecord) -> std::result::Result<Self, Self::Error> {
        let ty = record.value_type;
        match (record.value, record.curve) {
            (Some(_), Some(_)) => Err(format!("{} record has both value and curve", ty)),
            (None, None) => Err(format!("{} record has neither value nor curve", ty)),
            (None, Some(curve)) => Ok(TypedValue::Curve(ty, curve)),
            (Some(value), None) => {
                let parsed = match ty {
                    ValueType::Double => value.as_f64().map(TypedValue::Double),
                    ValueType::Long => value.as_i64().map(TypedValue::Long),
                    ValueType::Enum => value.as_i64().map(TypedValue::Enum),
                    ValueType::Bool => value
                        .as_bool()
                        .or_else(|| value.as_i64().map(|v| v != 0))
                        .map(TypedValue::Bool),
                };
                parsed.ok_or_else(|| format!("value {} is not a valid {}", value, ty))
            }
        }
    }
}

impl From<TypedValue> for ValueRecord {
    fn from(value: TypedValue) -> Self {
        let value_type = value.value_type();
        let (value, curve) = match value {
            TypedValue::Double(v) => (Some(serde_json::Value::from(v)), None),
            TypedValue::Long(v) | TypedValue::Enum(v) => (Some(serde_json::Value::from(v)), None),
            TypedValue::Bool(v) => (Some(serde_json::Value::from(v)), None),
            TypedValue::Curve(_, curve) => (None, Some(curve)),
        };
        Self { value_type, value, curve }
    }
}
