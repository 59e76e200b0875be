//! Location matching boundary, and the feature-gated default matcher.
//!
//! The engine itself never interprets paths: the [`Matcher`] collaborator
//! turns a [`RawTarget`] into a [`Location`] whose matched-entry chain
//! drives the checkpoint pipeline. The contract is total — unknown targets
//! produce a location with an empty matched list, never an error.
//!
//! With the `matcher` feature (default), [`RouteMap`] provides a ready
//! implementation: nested [`RouteDef`] registration flattened into
//! full-path patterns, resolved through a [`matchit`] router. Each route
//! node becomes exactly one [`RouteEntry`] shared by every location that
//! matches it, so entry identity is stable across resolves — the property
//! the diffing algorithm relies on. With the `cache` feature, resolution
//! results are memoized in an LRU keyed by canonical full path (sound,
//! because resolution is pure).
//!
//! # Pattern syntax
//!
//! Segments are literal except parameters, written `{id}` or `:id`
//! (the latter is translated at registration). Nested definitions use
//! relative segments:
//!
//! ```
//! use waymark::{RouteDef, RouteMap};
//!
//! let map = RouteMap::builder()
//!     .route(RouteDef::new("/"))
//!     .route(RouteDef::new("/users").child(RouteDef::new("{id}").named("user")))
//!     .build()
//!     .expect("route table is well-formed");
//! # let _ = map;
//! ```

use crate::location::{Location, RawTarget};

#[cfg(feature = "matcher")]
use crate::entry::{FragmentDefinition, RouteEntry};
#[cfg(feature = "matcher")]
use crate::error::NavigationError;
#[cfg(feature = "matcher")]
use crate::guards::{GuardNext, NavigationGuard};
#[cfg(feature = "matcher")]
use crate::location::Params;
#[cfg(feature = "matcher")]
use crate::{debug_log, info_log, warn_log};
#[cfg(feature = "matcher")]
use std::collections::HashMap;
#[cfg(feature = "matcher")]
use std::sync::Arc;

#[cfg(feature = "cache")]
use crate::location::full_path_of;
#[cfg(feature = "cache")]
use crate::sync::lock;
#[cfg(feature = "cache")]
use crate::trace_log;
#[cfg(feature = "cache")]
use lru::LruCache;
#[cfg(feature = "cache")]
use std::num::NonZeroUsize;
#[cfg(feature = "cache")]
use std::sync::Mutex;

// ============================================================================
// Matcher trait
// ============================================================================

/// Resolve a navigation target to a location.
///
/// Pure and total: two calls with the same target against the same current
/// location produce equivalent locations, and unknown targets resolve to a
/// location with an empty matched list.
pub trait Matcher: Send + Sync {
    /// Resolve `target` against the current location.
    fn resolve(&self, target: &RawTarget, current: &Location) -> Location;
}

// ============================================================================
// RouteDef
// ============================================================================

/// One node of route registration for [`RouteMap`]: a path segment pattern,
/// optional name, entry-level before-enter checkpoints, fragment slots, and
/// children (relative segments).
#[cfg(feature = "matcher")]
#[must_use]
pub struct RouteDef {
    path: String,
    name: Option<String>,
    before_enter: Vec<NavigationGuard>,
    slots: Vec<(String, Arc<FragmentDefinition>)>,
    children: Vec<RouteDef>,
}

#[cfg(feature = "matcher")]
impl RouteDef {
    /// Define a route at `path` (absolute for top-level routes, a relative
    /// segment for children).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            before_enter: Vec::new(),
            slots: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name this route for [`RawTarget::named`] targeting.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an entry-level before-enter checkpoint.
    pub fn before_enter<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        self.before_enter.push(Arc::new(guard));
        self
    }

    /// Attach a fragment definition under a named slot.
    pub fn slot(mut self, name: impl Into<String>, definition: Arc<FragmentDefinition>) -> Self {
        self.slots.push((name.into(), definition));
        self
    }

    /// Attach a fragment definition under the default slot.
    pub fn fragment(self, definition: Arc<FragmentDefinition>) -> Self {
        self.slot(crate::entry::DEFAULT_SLOT, definition)
    }

    /// Nest a child route under this one.
    pub fn child(mut self, child: RouteDef) -> Self {
        self.children.push(child);
        self
    }
}

// ============================================================================
// RouteMap
// ============================================================================

/// Default [`Matcher`]: a registered route table resolved through
/// [`matchit`].
#[cfg(feature = "matcher")]
pub struct RouteMap {
    router: matchit::Router<Vec<Arc<RouteEntry>>>,
    named: HashMap<String, String>,
    #[cfg(feature = "cache")]
    cache: Mutex<LruCache<String, Location>>,
}

/// Resolution cache capacity.
#[cfg(feature = "cache")]
const RESOLVE_CACHE_CAPACITY: usize = 128;

#[cfg(feature = "matcher")]
impl RouteMap {
    /// Start registering routes.
    pub fn builder() -> RouteMapBuilder {
        RouteMapBuilder { defs: Vec::new() }
    }

    fn resolve_path(&self, target: &RawTarget) -> Option<String> {
        if let Some(name) = &target.name {
            let Some(pattern) = self.named.get(name) else {
                warn_log!("no route registered under name '{}'", name);
                return None;
            };
            let Some(path) = expand_pattern(pattern, &target.params) else {
                warn_log!(
                    "named route '{}' is missing parameter values for '{}'",
                    name,
                    pattern
                );
                return None;
            };
            return Some(path);
        }
        Some(target.path.clone().unwrap_or_else(|| "/".to_string()))
    }
}

#[cfg(feature = "matcher")]
impl Matcher for RouteMap {
    fn resolve(&self, target: &RawTarget, _current: &Location) -> Location {
        let Some(path) = self.resolve_path(target) else {
            return Location::new("/", target.query.clone(), "", Params::new(), Vec::new());
        };

        #[cfg(feature = "cache")]
        let key = full_path_of(&path, &target.query, &target.hash);
        #[cfg(feature = "cache")]
        if let Some(hit) = lock(&self.cache).get(&key) {
            trace_log!("resolve cache hit for '{}'", key);
            return hit.clone();
        }

        let location = match self.router.at(&path) {
            Ok(matched) => {
                let mut params = target.params.clone();
                for (key, value) in matched.params.iter() {
                    params.insert(key.to_string(), value.to_string());
                }
                let value = matched.value.clone();
                Location::new(
                    path,
                    target.query.clone(),
                    target.hash.clone(),
                    params,
                    value,
                )
            }
            Err(_) => {
                debug_log!("no route matches '{}'", path);
                Location::new(
                    path,
                    target.query.clone(),
                    target.hash.clone(),
                    target.params.clone(),
                    Vec::new(),
                )
            }
        };

        #[cfg(feature = "cache")]
        lock(&self.cache).put(key, location.clone());

        location
    }
}

/// Builder for [`RouteMap`].
#[cfg(feature = "matcher")]
#[must_use]
pub struct RouteMapBuilder {
    defs: Vec<RouteDef>,
}

#[cfg(feature = "matcher")]
impl RouteMapBuilder {
    /// Register a top-level route (and, recursively, its children).
    pub fn route(mut self, def: RouteDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Build the map. Fails on conflicting patterns.
    pub fn build(self) -> Result<RouteMap, NavigationError> {
        let mut router = matchit::Router::new();
        let mut named = HashMap::new();
        for def in self.defs {
            register(def, "", Vec::new(), &mut router, &mut named)?;
        }
        Ok(RouteMap {
            router,
            named,
            #[cfg(feature = "cache")]
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(RESOLVE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }
}

#[cfg(feature = "matcher")]
fn register(
    def: RouteDef,
    parent: &str,
    chain: Vec<Arc<RouteEntry>>,
    router: &mut matchit::Router<Vec<Arc<RouteEntry>>>,
    named: &mut HashMap<String, String>,
) -> Result<(), NavigationError> {
    let RouteDef {
        path,
        name,
        before_enter,
        slots,
        children,
    } = def;

    let full = join_paths(parent, &path);
    let mut entry = RouteEntry::new(&full);
    if let Some(name) = name {
        named.insert(name.clone(), full.clone());
        entry = entry.named(name);
    }
    for guard in before_enter {
        entry.push_before_enter(guard);
    }
    for (slot, definition) in slots {
        entry = entry.slot(slot, definition);
    }

    let mut chain = chain;
    chain.push(Arc::new(entry));

    info_log!("registered route '{}' (depth {})", full, chain.len());
    router
        .insert(to_matchit_pattern(&full), chain.clone())
        .map_err(|err| {
            NavigationError::custom(format!("route registration failed for '{}': {}", full, err))
        })?;

    for child in children {
        register(child, &full, chain.clone(), router, named)?;
    }
    Ok(())
}

/// Join a parent full path and a child segment.
#[cfg(feature = "matcher")]
fn join_paths(parent: &str, child: &str) -> String {
    let child = child.trim_start_matches('/');
    let parent = parent.trim_end_matches('/');
    if child.is_empty() {
        if parent.is_empty() {
            "/".to_string()
        } else {
            parent.to_string()
        }
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Translate `:param` segments into matchit's `{param}` syntax.
#[cfg(feature = "matcher")]
fn to_matchit_pattern(path: &str) -> String {
    if !path.contains(':') {
        return path.to_string();
    }
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Substitute parameter values into a registered pattern. `None` when a
/// required parameter has no value.
#[cfg(feature = "matcher")]
fn expand_pattern(pattern: &str, params: &Params) -> Option<String> {
    let mut out = Vec::new();
    for segment in pattern.split('/') {
        let key = segment
            .strip_prefix(':')
            .or_else(|| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')));
        match key {
            Some(key) => out.push(params.get(key)?.clone()),
            None => out.push(segment.to_string()),
        }
    }
    Some(out.join("/"))
}

// ============================================================================
// Tests
// ============================================================================
