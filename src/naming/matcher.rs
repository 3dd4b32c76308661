//! Matching stored object names against destination objects.
//!
//! A stored path is first moved into its target namespace and looked up
//! exactly. Only when that fails do the namespace-agnostic fallbacks run:
//! the full path with namespaces stripped, then the leaf short name. The
//! first destination (in destination order) wins a fallback lookup.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use super::namespace::{namespace_of, namespaces_of, short_name, strip_namespaces, with_namespace};
use crate::core::SceneAccess;
use crate::util::Warning;

/// How a destination was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMethod {
    /// Caller-supplied rename map
    Explicit,
    /// Exact lookup after namespace remapping
    Namespace,
    /// Namespace-agnostic full path
    ShortName,
    /// Namespace-agnostic leaf name
    LeafName,
}

/// Resolution of one stored object.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    /// Stored path
    pub source: String,
    /// Live path, `None` when unresolved
    pub destination: Option<String>,
    /// `(from, to)` namespaces when they differ
    pub substitution: Option<(String, String)>,
    pub method: Option<MatchMethod>,
}

impl MatchResult {
    pub fn resolved(source: &str, destination: &str, method: MatchMethod) -> Self {
        let from = namespace_of(source);
        let to = namespace_of(destination);
        Self {
            source: source.to_string(),
            destination: Some(destination.to_string()),
            substitution: (from != to).then(|| (from.to_string(), to.to_string())),
            method: Some(method),
        }
    }

    pub fn unresolved(source: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: None,
            substitution: None,
            method: None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.destination.is_some()
    }
}

/// Outcome of [`match_names`]: one result per source, in source order.
#[derive(Clone, Debug, Default)]
pub struct NameMatches {
    results: Vec<MatchResult>,
    warnings: Vec<Warning>,
}

impl NameMatches {
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Resolved `(source, destination)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results
            .iter()
            .filter_map(|r| r.destination.as_deref().map(|d| (r.source.as_str(), d)))
    }

    /// Sources without a destination.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.is_resolved())
            .map(|r| r.source.as_str())
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Vec<MatchResult>, Vec<Warning>) {
        (self.results, self.warnings)
    }
}

/// Source namespace to destination namespace mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamespaceMap {
    pairs: IndexMap<String, String>,
}

impl NamespaceMap {
    /// Pair `from` and `to` positionally, truncated to the shorter list.
    ///
    /// With an empty `from` and a non-empty `to`, the source namespaces are
    /// used as `from`; a single `to` entry then receives all of them.
    pub fn new<'a, I>(sources: I, from: &[String], to: &[String]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pairs = IndexMap::new();
        if from.is_empty() && !to.is_empty() {
            let derived: Vec<String> = namespaces_of(sources).into_iter().collect();
            if to.len() == 1 {
                for ns in derived {
                    pairs.insert(ns, to[0].clone());
                }
            } else {
                for (f, t) in derived.into_iter().zip(to) {
                    pairs.insert(f, t.clone());
                }
            }
        } else {
            for (f, t) in from.iter().zip(to) {
                pairs.entry(f.clone()).or_insert_with(|| t.clone());
            }
        }
        Self { pairs }
    }

    /// Destination namespace for `namespace` (itself when unmapped).
    pub fn target<'a>(&'a self, namespace: &'a str) -> &'a str {
        self.pairs.get(namespace).map(String::as_str).unwrap_or(namespace)
    }

    /// Candidate destination path for `source`.
    pub fn remap(&self, source: &str) -> String {
        let namespace = namespace_of(source);
        let target = self.target(namespace);
        if target == namespace {
            source.to_string()
        } else {
            with_namespace(source, target)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Destination lookup tables built once per match run.
struct Destinations<'a> {
    exact: IndexSet<&'a str>,
    stripped: Vec<(String, &'a str)>,
}

impl<'a> Destinations<'a> {
    fn new<S: AsRef<str>>(objects: &'a [S]) -> Self {
        Self {
            exact: objects.iter().map(AsRef::as_ref).collect(),
            stripped: objects
                .iter()
                .map(|o| (strip_namespaces(o.as_ref()), o.as_ref()))
                .collect(),
        }
    }

    /// First destination satisfying `pred`, and how many did.
    fn first_of(&self, pred: impl Fn(&str, &str) -> bool) -> Option<(&'a str, usize)> {
        let mut hits = self.stripped.iter().filter(|(s, o)| pred(s, o));
        let (_, first) = hits.next()?;
        Some((*first, 1 + hits.count()))
    }
}

/// Match every source path against `dst`.
///
/// Namespaces are remapped `from[i] -> to[i]` (see [`NamespaceMap::new`]).
/// A namespace-remapped exact hit always beats the namespace-agnostic
/// fallbacks. Unmatched sources are reported, never raised.
pub fn match_names<S, D>(src: &[S], dst: &[D], from: &[String], to: &[String]) -> NameMatches
where
    S: AsRef<str>,
    D: AsRef<str>,
{
    let map = NamespaceMap::new(src.iter().map(AsRef::as_ref), from, to);
    match_with_map(src, dst, &map)
}

/// [`match_names`] with a prebuilt namespace map.
pub fn match_with_map<S, D>(src: &[S], dst: &[D], map: &NamespaceMap) -> NameMatches
where
    S: AsRef<str>,
    D: AsRef<str>,
{
    let destinations = Destinations::new(dst);
    let mut matches = NameMatches::default();

    for source in src.iter().map(AsRef::as_ref) {
        let result = match_one(source, &destinations, map, &mut matches.warnings);
        if let Some(dest) = &result.destination {
            debug!("Matched {} -> {} ({:?})", source, dest, result.method);
        } else {
            debug!("No match for {}", source);
        }
        matches.results.push(result);
    }

    matches
}

fn match_one(
    source: &str,
    destinations: &Destinations<'_>,
    map: &NamespaceMap,
    warnings: &mut Vec<Warning>,
) -> MatchResult {
    let candidate = map.remap(source);
    if let Some(dest) = destinations.exact.get(candidate.as_str()) {
        return MatchResult::resolved(source, dest, MatchMethod::Namespace);
    }

    let stripped = strip_namespaces(source);
    let leaf = short_name(source);
    let fallback = destinations
        .first_of(|s, _| s == stripped)
        .map(|hit| (hit, MatchMethod::ShortName))
        .or_else(|| {
            destinations
                .first_of(|_, o| short_name(o) == leaf)
                .map(|hit| (hit, MatchMethod::LeafName))
        });

    match fallback {
        Some(((dest, candidates), method)) => {
            if candidates > 1 {
                warn!("{} matched {} destinations, using {}", source, candidates, dest);
                warnings.push(Warning::AmbiguousMatch {
                    source: source.to_string(),
                    chosen: dest.to_string(),
                    candidates,
                });
            }
            MatchResult::resolved(source, dest, method)
        }
        None => MatchResult::unresolved(source),
    }
}

/// Resolve `source` against the live scene without a destination list.
///
/// Only the namespace-remapped candidate is tried; the scene is never
/// enumerated, so there is no short-name fallback.
pub fn resolve_in_scene(source: &str, scene: &dyn SceneAccess, map: &NamespaceMap) -> MatchResult {
    let candidate = map.remap(source);
    if scene.exists(&candidate) {
        MatchResult::resolved(source, &candidate, MatchMethod::Namespace)
    } else {
        MatchResult::unresolved(source)
    }
}

/// Partition `objects` by namespace, keeping input order within each group.
pub fn group_objects<S: AsRef<str>>(objects: &[S]) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for object in objects.iter().map(AsRef::as_ref) {
        groups
            .entry(namespace_of(object).to_string())
            .or_default()
            .push(object.to_string());
    }
    groups
}
