//! Checkpoint types: guard signatures, verdicts, and the one-shot
//! continuation every checkpoint receives.
//!
//! A checkpoint ("guard") is a function invoked with the target location,
//! the current location, and a [`GuardNext`] continuation. The checkpoint
//! decides the navigation's fate by resolving the continuation with a
//! [`GuardVerdict`] — immediately, or at any later time (checkpoints are
//! free to stash the continuation and resolve it after an arbitrary delay;
//! the queue suspends until they do).
//!
//! # Checkpoint kinds and precedence
//!
//! | Order | Kind | Owner | Signature |
//! |-------|------|-------|-----------|
//! | 1 | leave | live instance on a deactivated entry (child first) | [`InstanceGuard`] |
//! | 2 | global before | controller, registration order | [`NavigationGuard`] |
//! | 3 | update | live instance on a reused entry | [`InstanceGuard`] |
//! | 4 | entry before-enter | the activated [`RouteEntry`](crate::RouteEntry) itself | [`NavigationGuard`] |
//! | 5 | fragment resolution | synthetic, see [`FragmentResolver`](crate::FragmentResolver) | — |
//! | 6 | fragment enter | definition on an activated entry | [`NavigationGuard`] |
//! | 7 | global before-resolve | controller, registration order | [`NavigationGuard`] |
//! | 8 | global after | controller; post-commit, cannot abort | [`AfterHook`] |
//!
//! # Example
//!
//! ```
//! use waymark::{guard_fn, GuardNext, Location};
//!
//! let auth = guard_fn(|to: &Location, _from: &Location, next: GuardNext| {
//!     if to.path.starts_with("/admin") {
//!         next.redirect("/login");
//!     } else {
//!         next.proceed();
//!     }
//! });
//! ```

use crate::entry::FragmentHandle;
use crate::error::NavigationError;
use crate::location::{Location, RawTarget};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Guard signatures
// ============================================================================

/// A checkpoint with no instance binding: global hooks, entry-level
/// before-enter guards, and fragment enter guards (whose instance does not
/// exist yet when they run).
pub type NavigationGuard = Arc<dyn Fn(&Location, &Location, GuardNext) + Send + Sync>;

/// A checkpoint bound to the live instance occupying a fragment slot:
/// leave and update guards. Receives the instance first.
pub type InstanceGuard =
    Arc<dyn Fn(&FragmentHandle, &Location, &Location, GuardNext) + Send + Sync>;

/// Deferred enter callback, delivered with the concrete instance once it
/// becomes available. See [`GuardNext::when_ready`].
pub type InstanceCallback = Arc<dyn Fn(&FragmentHandle) + Send + Sync>;

/// Post-commit hook receiving `(new, previous)`. Takes no continuation and
/// cannot abort or redirect.
pub type AfterHook = Arc<dyn Fn(&Location, &Location) + Send + Sync>;

/// Wrap a closure as a [`NavigationGuard`].
pub fn guard_fn<F>(f: F) -> NavigationGuard
where
    F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as an [`InstanceGuard`].
pub fn instance_guard_fn<F>(f: F) -> InstanceGuard
where
    F: Fn(&FragmentHandle, &Location, &Location, GuardNext) + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// GuardVerdict
// ============================================================================

/// What a checkpoint decided.
pub enum GuardVerdict {
    /// Allow the transition to advance to the next checkpoint.
    Proceed,

    /// Veto the transition. The engine synthesizes a
    /// [`NavigationError::Aborted`] and dispatches it to the global error
    /// callbacks.
    Abort,

    /// Veto the transition with a checkpoint-supplied error.
    Fail(NavigationError),

    /// Abandon this transition (silently, no error) and navigate to a
    /// different target instead.
    Redirect(RawTarget),

    /// Allow the transition, and deliver this callback with the concrete
    /// fragment instance once it becomes available. Meaningful only for
    /// fragment enter guards; other checkpoint kinds treat it as
    /// [`Proceed`](Self::Proceed).
    Defer(InstanceCallback),
}

impl fmt::Debug for GuardVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardVerdict::Proceed => f.write_str("Proceed"),
            GuardVerdict::Abort => f.write_str("Abort"),
            GuardVerdict::Fail(err) => f.debug_tuple("Fail").field(err).finish(),
            GuardVerdict::Redirect(target) => f.debug_tuple("Redirect").field(target).finish(),
            GuardVerdict::Defer(_) => f.write_str("Defer(..)"),
        }
    }
}

// ============================================================================
// GuardNext
// ============================================================================

/// One-shot continuation handed to every checkpoint.
///
/// Consumed on use, so a checkpoint can resolve it exactly once. It is
/// `Send`, so a checkpoint may hand it to another thread or stash it and
/// resolve later — the transition suspends at this step until then.
/// Dropping it without resolving stalls the transition (resolved only by a
/// newer navigation superseding it).
pub struct GuardNext {
    deliver: Box<dyn FnOnce(GuardVerdict) + Send>,
}

impl GuardNext {
    pub(crate) fn new<F>(deliver: F) -> Self
    where
        F: FnOnce(GuardVerdict) + Send + 'static,
    {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Resolve with an explicit verdict.
    pub fn resolve(self, verdict: GuardVerdict) {
        (self.deliver)(verdict);
    }

    /// Allow the transition to advance.
    pub fn proceed(self) {
        self.resolve(GuardVerdict::Proceed);
    }

    /// Veto the transition.
    pub fn abort(self) {
        self.resolve(GuardVerdict::Abort);
    }

    /// Veto the transition with an error.
    pub fn fail(self, err: NavigationError) {
        self.resolve(GuardVerdict::Fail(err));
    }

    /// Abandon this transition and navigate elsewhere.
    pub fn redirect(self, target: impl Into<RawTarget>) {
        self.resolve(GuardVerdict::Redirect(target.into()));
    }

    /// Allow the transition, deferring `callback` until the owning slot's
    /// instance becomes available.
    pub fn when_ready<F>(self, callback: F)
    where
        F: Fn(&FragmentHandle) + Send + Sync + 'static,
    {
        self.resolve(GuardVerdict::Defer(Arc::new(callback)));
    }
}

impl fmt::Debug for GuardNext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardNext").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
