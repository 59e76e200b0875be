//! On-demand fragment resolution boundary.
//!
//! Activated entries may reference fragments that are not loaded yet. The
//! engine inserts one synthetic checkpoint per transition — built from the
//! configured [`FragmentResolver`] — that suspends the queue until every
//! on-demand fragment referenced by the activated entries is available.
//! Enter guards are extracted only after this step completes, because
//! extraction needs the final instance-producing definitions.
//!
//! A load failure fails the whole transition through the same vetoed-abort
//! path as an explicit checkpoint rejection.
//!
//! [`EagerResolver`] is the default: it completes immediately, for hosts
//! whose fragment definitions are all present at registration.

use crate::entry::RouteEntry;
use crate::error::NavigationError;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// ResolveDone
// ============================================================================

/// One-shot completion handle for a fragment resolution.
///
/// Like a checkpoint continuation, it may be resolved at any later time;
/// the transition suspends until then.
pub struct ResolveDone {
    deliver: Box<dyn FnOnce(Result<(), NavigationError>) + Send>,
}

impl ResolveDone {
    pub(crate) fn new<F>(deliver: F) -> Self
    where
        F: FnOnce(Result<(), NavigationError>) + Send + 'static,
    {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Resolve with an explicit result.
    pub fn resolve(self, result: Result<(), NavigationError>) {
        (self.deliver)(result);
    }

    /// All referenced fragments are loaded; the transition advances.
    pub fn ok(self) {
        self.resolve(Ok(()));
    }

    /// A load failed; the transition aborts with this error.
    pub fn fail(self, err: NavigationError) {
        self.resolve(Err(err));
    }
}

impl fmt::Debug for ResolveDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveDone").finish_non_exhaustive()
    }
}

// ============================================================================
// FragmentResolver
// ============================================================================

/// Loads the on-demand fragments referenced by activated entries.
pub trait FragmentResolver: Send + Sync {
    /// Begin loading everything `activated` references; resolve `done` once
    /// all loads finish, or fail it on the first load error.
    fn load(&self, activated: &[Arc<RouteEntry>], done: ResolveDone);
}

/// Resolver for hosts with no on-demand fragments: completes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct EagerResolver;

impl FragmentResolver for EagerResolver {
    fn load(&self, _activated: &[Arc<RouteEntry>], done: ResolveDone) {
        done.ok();
    }
}

// ============================================================================
// Tests
// ============================================================================
