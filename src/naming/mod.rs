//! Name resolution between stored and live objects.
//!
//! - [`namespace`] - Pure string operations on namespaced object paths
//! - [`matcher`] - Source/destination matching with namespace remapping

pub mod namespace;
pub mod matcher;

pub use namespace::{namespace_of, namespaces_of, short_name, strip_namespaces, with_namespace};
pub use matcher::{
    group_objects, match_names, match_with_map, resolve_in_scene, MatchMethod, MatchResult,
    NameMatches, NamespaceMap,
};
