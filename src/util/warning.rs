//! Soft failures collected during capture, matching and restore.

use std::fmt;

/// Non-fatal problem reported back to the caller instead of raised.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// Stored object has no counterpart in the destination
    UnresolvedName { path: String },
    /// Several destinations matched a namespace-agnostic lookup; the first won
    AmbiguousMatch {
        source: String,
        chosen: String,
        candidates: usize,
    },
    /// Resolved object lacks a stored attribute
    MissingAttribute { path: String, attribute: String },
    /// Object passed for capture is not in the scene
    MissingObject { path: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedName { path } => write!(f, "Cannot resolve {}", path),
            Self::AmbiguousMatch { source, chosen, candidates } => write!(
                f,
                "{} matched {} objects by short name, using {}",
                source, candidates, chosen
            ),
            Self::MissingAttribute { path, attribute } => {
                write!(f, "{} has no attribute {}", path, attribute)
            }
            Self::MissingObject { path } => write!(f, "{} does not exist", path),
        }
    }
}
