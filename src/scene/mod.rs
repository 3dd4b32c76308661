//! Live-scene handles and the in-memory scene.

mod node;
mod memory;

pub use node::{Attribute, AttributeFilter, Node};
pub use memory::{MemoryScene, SceneSnapshot};
