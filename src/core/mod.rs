//! Core layer - value types and the scene-access trait.
//!
//! This module provides:
//! - [`FrameRange`] / [`clamp_range`] - Captured and requested frame ranges
//! - [`TypedValue`] / [`ValueType`] / [`Curve`] - Attribute values
//! - [`MetaData`] - Ordered key-value metadata
//! - [`SceneAccess`] - The narrow interface to a live scene

mod time_range;
mod value;
mod metadata;
mod traits;

pub use time_range::{clamp_range, Frame, FrameRange};
pub use value::{Curve, Key, TypedValue, ValueType};
pub use metadata::MetaData;
pub use traits::SceneAccess;
