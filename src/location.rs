//! Locations and navigation targets.
//!
//! A [`Location`] is a fully resolved navigation destination: path, query,
//! hash, extracted parameters, the canonical composed full path, and the
//! ordered chain of [`RouteEntry`](crate::RouteEntry) values that match it
//! (least to most specific — parent layout before nested view).
//!
//! A [`RawTarget`] is a navigation *request* before matching: a path or a
//! route name plus optional query/hash/params and a replace flag. Plain
//! strings convert directly, so `controller.transition_to("/users/7?tab=posts")`
//! just works.
//!
//! # Canonical full paths
//!
//! Query keys are stored in an ordered map, so two locations describing the
//! same destination always compose the same full path. The engine compares
//! locations by canonical full path (see [`Location::same_as`]).
//!
//! ```
//! use waymark::location::full_path_of;
//! use std::collections::BTreeMap;
//!
//! let mut query = BTreeMap::new();
//! query.insert("tab".to_string(), "posts".to_string());
//! assert_eq!(full_path_of("/users/7", &query, "bio"), "/users/7?tab=posts#bio");
//! ```

use crate::entry::RouteEntry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Query-string pairs, ordered by key for canonical composition.
pub type Query = BTreeMap<String, String>;

/// Matcher-extracted path parameters, ordered by key.
pub type Params = BTreeMap<String, String>;

// ============================================================================
// Location
// ============================================================================

/// A resolved navigation destination plus its matched-entry chain.
///
/// Locations are immutable values: the engine never mutates one after
/// construction, and cloning is cheap (entries are shared by `Arc`).
#[derive(Debug, Clone)]
pub struct Location {
    /// Path component, always beginning with `/`.
    pub path: String,
    /// Query pairs, ordered by key.
    pub query: Query,
    /// Hash fragment without the leading `#`; empty when absent.
    pub hash: String,
    /// Parameters extracted by the matcher; empty when none.
    pub params: Params,
    /// Canonical `path?query#hash` composition.
    pub full_path: String,
    /// Matched route entries, least to most specific.
    pub matched: Vec<Arc<RouteEntry>>,
}

impl Location {
    /// Build a location, composing the canonical full path.
    pub fn new(
        path: impl Into<String>,
        query: Query,
        hash: impl Into<String>,
        params: Params,
        matched: Vec<Arc<RouteEntry>>,
    ) -> Self {
        let path = path.into();
        let hash = hash.into();
        let full_path = full_path_of(&path, &query, &hash);
        Self {
            path,
            query,
            hash,
            params,
            full_path,
            matched,
        }
    }

    /// Plain-path location with no query, hash, params, or matched entries.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::new(path, Query::new(), "", Params::new(), Vec::new())
    }

    /// The sentinel initial location, current before any navigation completes.
    ///
    /// It sits at `/` with an empty matched list, so the first real navigation
    /// to `/` (which matches at least one entry) is never mistaken for a
    /// same-location no-op.
    pub fn nowhere() -> Self {
        Self::from_path("/")
    }

    /// Whether two locations describe the same destination.
    ///
    /// Compares canonical full paths; matched-entry chains are not consulted.
    pub fn same_as(&self, other: &Location) -> bool {
        self.full_path == other.full_path
    }
}

/// Compose the canonical `path?query#hash` form.
///
/// Query pairs are emitted in key order; empty query and hash contribute
/// nothing.
pub fn full_path_of(path: &str, query: &Query, hash: &str) -> String {
    let mut out = String::from(path);
    let mut first = true;
    for (key, value) in query {
        out.push(if first { '?' } else { '&' });
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        first = false;
    }
    if !hash.is_empty() {
        out.push('#');
        out.push_str(hash);
    }
    out
}

/// Split a raw target string into `(path, query, hash)` components.
///
/// The hash is split off first, then the query, mirroring address-bar
/// semantics. No percent-decoding is performed; that is a host concern.
pub fn parse_target(raw: &str) -> (String, Query, String) {
    let (rest, hash) = match raw.split_once('#') {
        Some((rest, hash)) => (rest, hash.to_string()),
        None => (raw, String::new()),
    };
    let (path, query_str) = match rest.split_once('?') {
        Some((path, query)) => (path, query),
        None => (rest, ""),
    };
    let mut query = Query::new();
    for pair in query_str.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((key, value)) => query.insert(key.to_string(), value.to_string()),
            None => query.insert(pair.to_string(), String::new()),
        };
    }
    (path.to_string(), query, hash)
}

// ============================================================================
// RawTarget
// ============================================================================

/// A navigation request before matching.
///
/// Either `path` or `name` identifies the destination; checkpoints that
/// redirect produce one of these, and every public navigation entry point
/// accepts `impl Into<RawTarget>`.
///
/// # Examples
///
/// ```
/// use waymark::RawTarget;
///
/// let target = RawTarget::from("/users/7?tab=posts#bio");
/// assert_eq!(target.path.as_deref(), Some("/users/7"));
/// assert_eq!(target.query.get("tab").map(String::as_str), Some("posts"));
/// assert_eq!(target.hash, "bio");
///
/// let target = RawTarget::named("profile").with_param("id", "7").replacing();
/// assert!(target.replace);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawTarget {
    /// Destination path; `None` when targeting a named route.
    pub path: Option<String>,
    /// Destination route name; `None` when targeting a path.
    pub name: Option<String>,
    /// Query pairs to carry to the destination.
    pub query: Query,
    /// Parameter values for named-route pattern substitution.
    pub params: Params,
    /// Hash fragment without the leading `#`.
    pub hash: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl RawTarget {
    /// Target a path. Inline `?query` and `#hash` parts are split off.
    pub fn path(path: impl AsRef<str>) -> Self {
        let (path, query, hash) = parse_target(path.as_ref());
        Self {
            path: Some(path),
            query,
            hash,
            ..Self::default()
        }
    }

    /// Target a registered route name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a query pair.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a parameter value for named-route substitution.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the hash fragment.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Mark this navigation as a replace instead of a push.
    #[must_use]
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Short description for logs and errors.
    pub fn describe(&self) -> String {
        match (&self.path, &self.name) {
            (Some(path), _) => path.clone(),
            (None, Some(name)) => format!("name:{}", name),
            (None, None) => "/".to_string(),
        }
    }
}

impl From<&str> for RawTarget {
    fn from(raw: &str) -> Self {
        Self::path(raw)
    }
}

impl From<String> for RawTarget {
    fn from(raw: String) -> Self {
        Self::path(raw)
    }
}

impl From<&String> for RawTarget {
    fn from(raw: &String) -> Self {
        Self::path(raw)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_composition() {
        let mut query = Query::new();
        query.insert("b".to_string(), "2".to_string());
        query.insert("a".to_string(), "1".to_string());
        assert_eq!(full_path_of("/x", &query, ""), "/x?a=1&b=2");
        assert_eq!(full_path_of("/x", &query, "top"), "/x?a=1&b=2#top");
        assert_eq!(full_path_of("/x", &Query::new(), ""), "/x");
    }

    #[test]
    fn test_parse_target_components() {
        let (path, query, hash) = parse_target("/users/7?tab=posts&sort=new#bio");
        assert_eq!(path, "/users/7");
        assert_eq!(query.get("tab").map(String::as_str), Some("posts"));
        assert_eq!(query.get("sort").map(String::as_str), Some("new"));
        assert_eq!(hash, "bio");
    }

    #[test]
    fn test_parse_target_bare_path() {
        let (path, query, hash) = parse_target("/plain");
        assert_eq!(path, "/plain");
        assert!(query.is_empty());
        assert!(hash.is_empty());
    }

    #[test]
    fn test_parse_target_valueless_query_key() {
        let (_, query, _) = parse_target("/p?flag");
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_roundtrips_through_composition() {
        let (path, query, hash) = parse_target("/a?k=v#h");
        assert_eq!(full_path_of(&path, &query, &hash), "/a?k=v#h");
    }

    #[test]
    fn test_nowhere_is_rootlike_but_unmatched() {
        let nowhere = Location::nowhere();
        assert_eq!(nowhere.full_path, "/");
        assert!(nowhere.matched.is_empty());
    }

    #[test]
    fn test_same_as_ignores_query_insertion_order() {
        let mut q1 = Query::new();
        q1.insert("a".to_string(), "1".to_string());
        q1.insert("b".to_string(), "2".to_string());
        let mut q2 = Query::new();
        q2.insert("b".to_string(), "2".to_string());
        q2.insert("a".to_string(), "1".to_string());
        let l1 = Location::new("/x", q1, "", Params::new(), Vec::new());
        let l2 = Location::new("/x", q2, "", Params::new(), Vec::new());
        assert!(l1.same_as(&l2));
    }

    #[test]
    fn test_raw_target_from_str() {
        let target = RawTarget::from("/login?next=%2Fadmin");
        assert_eq!(target.path.as_deref(), Some("/login"));
        assert!(!target.replace);
    }

    #[test]
    fn test_raw_target_describe() {
        assert_eq!(RawTarget::from("/a").describe(), "/a");
        assert_eq!(RawTarget::named("home").describe(), "name:home");
        assert_eq!(RawTarget::default().describe(), "/");
    }
}
