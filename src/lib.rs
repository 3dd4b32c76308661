//! # poselib
//!
//! Capture and restore of poses, animation and selection sets between
//! animation scenes.
//!
//! Stored objects are matched to live objects across namespaces, optionally
//! mirrored left/right, and written back through the narrow [`SceneAccess`]
//! interface a host application implements.
//!
//! ## Modules
//!
//! - [`util`] - Errors, warnings and JSON file helpers
//! - [`core`] - Values, curves, frame ranges, metadata and the scene trait
//! - [`naming`] - Namespace handling and source/destination name matching
//! - [`scene`] - Node/Attribute handles and the in-memory scene
//! - [`mirror`] - Left/right mirror tables
//! - [`transfer`] - Pose, animation and selection-set transfer objects
//! - [`config`] - User configuration
//!
//! ## Example
//!
//! ```ignore
//! use poselib::prelude::*;
//!
//! let scene = MemoryScene::load("shot.scene.json")?;
//! let pose = TransferObject::load("idle.pose.json")?;
//!
//! let options = RestoreOptions::default().namespaces(&["char"], &["char2"]);
//! let report = pose.restore(&scene, &options)?;
//! for warning in &report.warnings {
//!     println!("{}", warning);
//! }
//! ```

pub mod util;
pub mod core;
pub mod naming;
pub mod scene;
pub mod mirror;
pub mod transfer;
pub mod config;

// Re-export commonly used types
pub use crate::util::{Error, Result, Warning};
pub use crate::core::SceneAccess;
pub use crate::transfer::{TransferKind, TransferObject};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::core::{Curve, Frame, FrameRange, Key, MetaData, SceneAccess, TypedValue, ValueType};
    pub use crate::mirror::{MirrorMode, MirrorOption, MirrorTable};
    pub use crate::naming::{match_names, MatchMethod, MatchResult};
    pub use crate::scene::{Attribute, AttributeFilter, MemoryScene, Node};
    pub use crate::transfer::{
        AnimationOptions, PasteOption, RestoreOptions, RestoreReport, TransferKind, TransferObject,
    };
    pub use crate::util::{Error, Result, Warning};
}
