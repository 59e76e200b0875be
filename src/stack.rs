//! Stack-based location history for non-addressable environments.
//!
//! [`NavigationStack`] implements the abstract "current location" contract
//! with an in-process ordered list and a cursor: no address bar, no
//! browser-level back/forward, just the engine's own record of where the
//! application has been.
//!
//! - [`push`](NavigationStack::push) — navigate, then discard any forward
//!   history and append the new location.
//! - [`replace`](NavigationStack::replace) — navigate, then swap the cursor
//!   entry in place.
//! - [`go`](NavigationStack::go) — move the cursor by a signed offset,
//!   re-running the transition pipeline against the stored (already
//!   resolved) location; silently a no-op when the offset falls outside the
//!   stack.
//!
//! Checkpoint redirects are routed back through the stack's own
//! push/replace, so redirect targets land in history like any other
//! navigation.
//!
//! # Example
//!
//! ```
//! use waymark::{Location, Matcher, NavigationController, NavigationStack, RawTarget};
//!
//! struct PassThrough;
//! impl Matcher for PassThrough {
//!     fn resolve(&self, target: &RawTarget, _current: &Location) -> Location {
//!         Location::from_path(target.path.clone().unwrap_or_else(|| "/".into()))
//!     }
//! }
//!
//! let stack = NavigationStack::new(NavigationController::builder(PassThrough).build());
//! stack.push("/a");
//! stack.push("/b");
//! stack.go(-1);
//! assert_eq!(stack.current_location(), "/a");
//! ```

use crate::controller::{AbortCallback, CompleteCallback, NavigationController};
use crate::location::{Location, RawTarget};
use crate::sync::lock;
use crate::{debug_log, trace_log};
use std::sync::{Arc, Mutex, Weak};

// ============================================================================
// NavigationStack
// ============================================================================

struct StackState {
    stack: Vec<Location>,
    /// Cursor into `stack`; `-1` while the stack is empty.
    index: isize,
}

struct StackInner {
    controller: NavigationController,
    state: Mutex<StackState>,
}

/// In-process location history with a cursor. Cheap to clone; all clones
/// share one history.
#[derive(Clone)]
pub struct NavigationStack {
    inner: Arc<StackInner>,
}

impl NavigationStack {
    /// Wrap a controller in a stack history.
    ///
    /// Installs the stack as the controller's redirect dispatcher, so a
    /// checkpoint redirect becomes a stack push (or replace, when the
    /// redirect target carries the replace flag).
    pub fn new(controller: NavigationController) -> Self {
        let stack = Self {
            inner: Arc::new(StackInner {
                controller,
                state: Mutex::new(StackState {
                    stack: Vec::new(),
                    index: -1,
                }),
            }),
        };
        let weak: Weak<StackInner> = Arc::downgrade(&stack.inner);
        stack
            .inner
            .controller
            .set_redirect_handler(move |target: RawTarget| {
                if let Some(inner) = weak.upgrade() {
                    let stack = NavigationStack { inner };
                    if target.replace {
                        stack.replace(target);
                    } else {
                        stack.push(target);
                    }
                }
            });
        stack
    }

    /// The controller this stack drives.
    pub fn controller(&self) -> &NavigationController {
        &self.inner.controller
    }

    /// Navigate to `target`; on success, truncate forward history, append
    /// the new location, and advance the cursor.
    pub fn push(&self, target: impl Into<RawTarget>) {
        self.push_with(target, None, None);
    }

    /// [`push`](Self::push) with per-call completion and abort callbacks.
    pub fn push_with(
        &self,
        target: impl Into<RawTarget>,
        on_complete: Option<CompleteCallback>,
        on_abort: Option<AbortCallback>,
    ) {
        let this = self.clone();
        self.inner.controller.transition_to_with(
            target,
            Some(Box::new(move |route: &Location| {
                {
                    let mut state = lock(&this.inner.state);
                    let keep = (state.index + 1) as usize;
                    state.stack.truncate(keep);
                    state.stack.push(route.clone());
                    state.index += 1;
                }
                if let Some(cb) = on_complete {
                    cb(route);
                }
            })),
            on_abort,
        );
    }

    /// Navigate to `target`; on success, swap the cursor entry in place.
    /// On an empty stack this behaves like a first push.
    pub fn replace(&self, target: impl Into<RawTarget>) {
        self.replace_with(target, None, None);
    }

    /// [`replace`](Self::replace) with per-call completion and abort
    /// callbacks.
    pub fn replace_with(
        &self,
        target: impl Into<RawTarget>,
        on_complete: Option<CompleteCallback>,
        on_abort: Option<AbortCallback>,
    ) {
        let this = self.clone();
        self.inner.controller.transition_to_with(
            target,
            Some(Box::new(move |route: &Location| {
                {
                    let mut state = lock(&this.inner.state);
                    let keep = state.index.max(0) as usize;
                    state.stack.truncate(keep);
                    state.stack.push(route.clone());
                    state.index = keep as isize;
                }
                if let Some(cb) = on_complete {
                    cb(route);
                }
            })),
            on_abort,
        );
    }

    /// Move the cursor by `n` entries, re-confirming the stored location.
    ///
    /// Out-of-range offsets are silent no-ops: the cursor and current
    /// location are unchanged. In-range moves run the full checkpoint
    /// pipeline (a guard can still veto or redirect the move); matching is
    /// bypassed since the stored location is already resolved.
    pub fn go(&self, n: isize) {
        let (route, target_index) = {
            let state = lock(&self.inner.state);
            let target = state.index + n;
            if target < 0 || target >= state.stack.len() as isize {
                trace_log!("go({}) out of range at index {}", n, state.index);
                return;
            }
            (state.stack[target as usize].clone(), target)
        };
        debug_log!("go({}) to '{}'", n, route.full_path);
        let this = self.clone();
        self.inner.controller.confirm_transition(
            route,
            Box::new(move |route: &Location| {
                lock(&this.inner.state).index = target_index;
                this.inner.controller.update_route(route.clone());
            }),
            None,
        );
    }

    /// [`go`](Self::go)`(-1)`.
    pub fn back(&self) {
        self.go(-1);
    }

    /// [`go`](Self::go)`(1)`.
    pub fn forward(&self) {
        self.go(1);
    }

    /// Whether the cursor has somewhere to go back to.
    pub fn can_go_back(&self) -> bool {
        lock(&self.inner.state).index > 0
    }

    /// Whether the cursor has discarded-forward entries ahead of it.
    pub fn can_go_forward(&self) -> bool {
        let state = lock(&self.inner.state);
        state.index + 1 < state.stack.len() as isize
    }

    /// Full path at the cursor, or `/` while the stack is empty.
    pub fn current_location(&self) -> String {
        let state = lock(&self.inner.state);
        if state.index >= 0 {
            state.stack[state.index as usize].full_path.clone()
        } else {
            "/".to_string()
        }
    }

    /// Number of entries in the history, including discarded-forward ones
    /// still ahead of the cursor.
    pub fn len(&self) -> usize {
        lock(&self.inner.state).stack.len()
    }

    /// Whether no navigation has been recorded yet.
    pub fn is_empty(&self) -> bool {
        lock(&self.inner.state).stack.is_empty()
    }
}

impl std::fmt::Debug for NavigationStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("NavigationStack")
            .field("len", &state.stack.len())
            .field("index", &state.index)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
