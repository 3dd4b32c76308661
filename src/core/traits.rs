//! Scene-access interface.
//!
//! This is the only contact the transfer layer has with a host application.
//! Hosts implement [`SceneAccess`] over their native scene graph; tests and
//! the CLI use [`MemoryScene`](crate::scene::MemoryScene).

use crate::core::{Frame, FrameRange, TypedValue};
use crate::util::Result;

/// Narrow view of a live scene.
///
/// Methods take `&self`: the scene is an external, shared resource and
/// implementations provide their own interior mutability.
pub trait SceneAccess {
    /// Check whether an object exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read an attribute value. Animated attributes return a curve.
    fn get_attr(&self, path: &str, name: &str) -> Result<TypedValue>;

    /// Write an attribute value.
    fn set_attr(&self, path: &str, name: &str, value: TypedValue) -> Result<()>;

    /// Names of the transferable attributes of an object, in host order.
    fn list_attrs(&self, path: &str) -> Vec<String>;

    /// Currently selected objects, in selection order.
    fn list_selected(&self) -> Vec<String>;

    /// Playback range of the scene.
    fn current_time_range(&self) -> FrameRange;

    /// Current frame. Defaults to the start of the playback range.
    fn current_time(&self) -> Frame {
        self.current_time_range().start()
    }

    /// Check whether `name` exists on the object at `path`.
    fn has_attr(&self, path: &str, name: &str) -> bool {
        self.list_attrs(path).iter().any(|attr| attr == name)
    }
}
