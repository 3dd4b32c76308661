//! Namespace handling for hierarchical object paths.
//!
//! Paths look like `|group|control`, with an optional namespace on each
//! segment: `char:group|char:control`. A segment's namespace is everything
//! before its last `:`, so nested namespaces (`a:b:ctrl`) resolve to `a:b`.

use indexmap::IndexSet;

/// Path segment separator.
pub const SEPARATOR: char = '|';

/// Namespace separator within a segment.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Split a path into segments. A leading `|` yields an empty first segment.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Split one segment into `(namespace, short name)`.
fn split_segment(segment: &str) -> (&str, &str) {
    match segment.rfind(NAMESPACE_SEPARATOR) {
        Some(idx) => (&segment[..idx], &segment[idx + 1..]),
        None => ("", segment),
    }
}

/// Trailing segment of a path, namespace included.
fn leaf(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Namespace of the trailing segment, `""` if it has none.
pub fn namespace_of(path: &str) -> &str {
    split_segment(leaf(path)).0
}

/// Trailing segment without its namespace.
pub fn short_name(path: &str) -> &str {
    split_segment(leaf(path)).1
}

/// Replace the namespace of every segment with `namespace`.
///
/// An empty `namespace` strips namespaces. Empty segments (the root of an
/// absolute path) are left alone. Applying the same namespace twice is the
/// same as applying it once.
pub fn with_namespace(path: &str, namespace: &str) -> String {
    let mut out = String::with_capacity(path.len() + namespace.len() * 2);
    for (i, segment) in segments(path).enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        if segment.is_empty() {
            continue;
        }
        if !namespace.is_empty() {
            out.push_str(namespace);
            out.push(NAMESPACE_SEPARATOR);
        }
        out.push_str(split_segment(segment).1);
    }
    out
}

/// Path with every namespace removed.
pub fn strip_namespaces(path: &str) -> String {
    with_namespace(path, "")
}

/// Distinct namespaces of `paths` in first-seen order.
pub fn namespaces_of<'a, I>(paths: I) -> IndexSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .map(|path| namespace_of(path).to_string())
        .collect()
}
