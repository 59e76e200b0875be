//! The navigation controller: transition state machine and hook registry.
//!
//! [`NavigationController`] owns the current location, the single pending
//! transition, the global hook lists, and the ready/error callback queues,
//! and orchestrates the full resolve pipeline per transition:
//!
//! 1. leave guards (deactivated entries, child first)
//! 2. global before hooks (registration order)
//! 3. update guards (reused entries)
//! 4. entry-level before-enter guards (activated entries, in order)
//! 5. fragment resolution (one synthetic step for all activated entries)
//! 6. fragment enter guards (extracted only after step 5)
//! 7. global before-resolve hooks
//! 8. commit, then global after hooks (post-commit, cannot abort)
//!
//! # Cancellation
//!
//! Each transition captures a [`TransitionToken`] from a monotone counter;
//! the pending slot stores the active token. Every suspension point — before
//! a step runs, when a continuation resolves, when the final queue finishes,
//! when a deferred enter callback would fire — re-checks its captured token
//! against the controller. A stale token means a newer navigation took the
//! pending slot; the old transition aborts silently and its remaining
//! checkpoints are discarded. This is the only cancellation mechanism: there
//! are no timeouts, and a stalled checkpoint stalls its transition until a
//! new navigation supersedes it.
//!
//! # Failure taxonomy
//!
//! | Outcome | Error value | Global error callbacks | Caller abort callback |
//! |---------|-------------|------------------------|-----------------------|
//! | same-location no-op | none | no | yes (`None`) |
//! | superseded | none | no | yes (`None`) |
//! | redirect | none | no | yes (`None`), then one new navigation |
//! | veto (`Abort`) | synthesized [`NavigationError::Aborted`] | yes | yes |
//! | veto (`Fail`) / load failure | checkpoint-supplied | yes | yes |
//!
//! A veto with no registered global error callback is surfaced as an
//! error-level diagnostic, since it indicates a caller bug. The current
//! location moves only on the commit path.

use crate::backend::AddressBackend;
use crate::binder::{DeferredEnter, EnterGuardBinder, EnterPoll, InstanceWaitList, Waiter};
use crate::entry::{FragmentHandle, RouteEntry};
use crate::error::NavigationError;
use crate::extract::{self, diff_entries};
use crate::guards::{AfterHook, GuardNext, GuardVerdict, NavigationGuard};
use crate::location::{Location, RawTarget};
use crate::matcher::Matcher;
use crate::queue::{run_queue, NextStep};
use crate::resolve::{EagerResolver, FragmentResolver, ResolveDone};
use crate::scheduler::Scheduler;
use crate::sync::lock;
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Maximum consecutive checkpoint redirects before the chain is treated as
/// a loop and dropped.
const MAX_REDIRECT_DEPTH: usize = 5;

/// Completion callback for one navigation, invoked with the committed
/// location.
pub type CompleteCallback = Box<dyn FnOnce(&Location) + Send>;

/// Abort callback for one navigation. `None` marks a silent abort
/// (same-location no-op, supersession, or redirect).
pub type AbortCallback = Box<dyn FnOnce(Option<&NavigationError>) + Send>;

type UpdateListener = Arc<dyn Fn(&Location) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&NavigationError) + Send + Sync>;
type ReadyCallback = Box<dyn FnOnce(&Location) + Send>;
type ReadyErrorCallback = Box<dyn FnOnce(&NavigationError) + Send>;
type RedirectHandler = Arc<dyn Fn(RawTarget) + Send + Sync>;
type AbortFn = Arc<dyn Fn(Option<NavigationError>) + Send + Sync>;

// ============================================================================
// TransitionToken
// ============================================================================

/// Capture of the transition counter identifying one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionToken(u64);

impl TransitionToken {
    pub(crate) fn value(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(value: u64) -> Self {
        Self(value)
    }
}

struct PendingTransition {
    token: TransitionToken,
    to: String,
}

// ============================================================================
// NavigationController
// ============================================================================

struct ControllerInner {
    matcher: Arc<dyn Matcher>,
    resolver: Arc<dyn FragmentResolver>,
    backend: Option<Arc<dyn AddressBackend>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    current: Mutex<Location>,
    pending: Mutex<Option<PendingTransition>>,
    counter: AtomicU64,
    committed: AtomicU64,
    waitlist: InstanceWaitList,
    before_hooks: Mutex<Vec<NavigationGuard>>,
    resolve_hooks: Mutex<Vec<NavigationGuard>>,
    after_hooks: Mutex<Vec<AfterHook>>,
    listener: Mutex<Option<UpdateListener>>,
    error_cbs: Mutex<Vec<ErrorCallback>>,
    ready_cbs: Mutex<Vec<ReadyCallback>>,
    ready_error_cbs: Mutex<Vec<ReadyErrorCallback>>,
    ready: AtomicBool,
    redirect_handler: Mutex<Option<RedirectHandler>>,
    redirect_streak: AtomicUsize,
}

/// The transition engine. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct NavigationController {
    inner: Arc<ControllerInner>,
}

/// Builder for [`NavigationController`]. The matcher is required; every
/// other collaborator has a sensible absent/default value.
#[must_use]
pub struct NavigationControllerBuilder {
    matcher: Arc<dyn Matcher>,
    resolver: Arc<dyn FragmentResolver>,
    backend: Option<Arc<dyn AddressBackend>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl NavigationControllerBuilder {
    /// Use a custom fragment resolver (default: [`EagerResolver`]).
    pub fn resolver(mut self, resolver: impl FragmentResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Mirror committed locations to an addressable environment.
    pub fn backend(mut self, backend: impl AddressBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Provide tick scheduling. Without one, deferred enter callbacks are
    /// skipped (no rendering root exists to produce instances).
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the controller, initially at [`Location::nowhere`].
    pub fn build(self) -> NavigationController {
        NavigationController {
            inner: Arc::new(ControllerInner {
                matcher: self.matcher,
                resolver: self.resolver,
                backend: self.backend,
                scheduler: self.scheduler,
                current: Mutex::new(Location::nowhere()),
                pending: Mutex::new(None),
                counter: AtomicU64::new(0),
                committed: AtomicU64::new(0),
                waitlist: InstanceWaitList::default(),
                before_hooks: Mutex::new(Vec::new()),
                resolve_hooks: Mutex::new(Vec::new()),
                after_hooks: Mutex::new(Vec::new()),
                listener: Mutex::new(None),
                error_cbs: Mutex::new(Vec::new()),
                ready_cbs: Mutex::new(Vec::new()),
                ready_error_cbs: Mutex::new(Vec::new()),
                ready: AtomicBool::new(false),
                redirect_handler: Mutex::new(None),
                redirect_streak: AtomicUsize::new(0),
            }),
        }
    }
}

impl NavigationController {
    /// Start building a controller around the given matcher.
    pub fn builder(matcher: impl Matcher + 'static) -> NavigationControllerBuilder {
        NavigationControllerBuilder {
            matcher: Arc::new(matcher),
            resolver: Arc::new(EagerResolver),
            backend: None,
            scheduler: None,
        }
    }

    // ========================================================================
    // State accessors
    // ========================================================================

    /// Snapshot of the current location.
    pub fn current_location(&self) -> Location {
        lock(&self.inner.current).clone()
    }

    /// Whether a transition is in flight.
    pub fn has_pending(&self) -> bool {
        lock(&self.inner.pending).is_some()
    }

    /// Whether the first-ever transition has resolved.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    pub(crate) fn is_pending(&self, token: TransitionToken) -> bool {
        lock(&self.inner.pending)
            .as_ref()
            .is_some_and(|p| p.token == token)
    }

    pub(crate) fn is_committed(&self, token: TransitionToken) -> bool {
        self.inner.committed.load(Ordering::SeqCst) == token.value()
    }

    pub(crate) fn waitlist(&self) -> &InstanceWaitList {
        &self.inner.waitlist
    }

    /// Claim the pending slot for a new transition, superseding whatever
    /// held it.
    fn begin(&self, route: &Location) -> TransitionToken {
        let token = TransitionToken(self.inner.counter.fetch_add(1, Ordering::SeqCst) + 1);
        let mut pending = lock(&self.inner.pending);
        if let Some(stale) = pending.as_ref() {
            debug_log!(
                "transition to '{}' supersedes pending '{}'",
                route.full_path,
                stale.to
            );
        }
        *pending = Some(PendingTransition {
            token,
            to: route.full_path.clone(),
        });
        token
    }

    // ========================================================================
    // Hook registration
    // ========================================================================

    /// Register a global before hook, run for every transition after leave
    /// guards, in registration order.
    pub fn before_each<F>(&self, hook: F)
    where
        F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        lock(&self.inner.before_hooks).push(Arc::new(hook));
    }

    /// Register a global before-resolve hook, run after all enter
    /// checkpoints, in registration order.
    pub fn before_resolve<F>(&self, hook: F)
    where
        F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        lock(&self.inner.resolve_hooks).push(Arc::new(hook));
    }

    /// Register a global after hook, run post-commit with
    /// `(new, previous)`. After hooks take no continuation and cannot abort
    /// or redirect.
    pub fn after_each<F>(&self, hook: F)
    where
        F: Fn(&Location, &Location) + Send + Sync + 'static,
    {
        lock(&self.inner.after_hooks).push(Arc::new(hook));
    }

    /// Register the single update listener, invoked on every commit with
    /// the new location. A second call replaces the first listener.
    pub fn listen<F>(&self, callback: F)
    where
        F: Fn(&Location) + Send + Sync + 'static,
    {
        *lock(&self.inner.listener) = Some(Arc::new(callback));
    }

    /// Register a global error callback, invoked for every vetoed
    /// navigation.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&NavigationError) + Send + Sync + 'static,
    {
        lock(&self.inner.error_cbs).push(Arc::new(callback));
    }

    /// Run `callback` once the first-ever transition completes. If the
    /// controller is already ready, the callback fires immediately with the
    /// current location instead of queuing.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&Location) + Send + 'static,
    {
        if self.is_ready() {
            callback(&self.current_location());
        } else {
            lock(&self.inner.ready_cbs).push(Box::new(callback));
        }
    }

    /// Like [`on_ready`](Self::on_ready), additionally queueing
    /// `error_callback` for the case where the first-ever transition fails
    /// with an error.
    pub fn on_ready_with<F, E>(&self, callback: F, error_callback: E)
    where
        F: FnOnce(&Location) + Send + 'static,
        E: FnOnce(&NavigationError) + Send + 'static,
    {
        if self.is_ready() {
            callback(&self.current_location());
        } else {
            lock(&self.inner.ready_cbs).push(Box::new(callback));
            lock(&self.inner.ready_error_cbs).push(Box::new(error_callback));
        }
    }

    /// Route checkpoint redirects through `handler` instead of a plain
    /// [`transition_to`](Self::transition_to). Installed by history
    /// implementations so redirects flow through their own push/replace.
    pub fn set_redirect_handler<F>(&self, handler: F)
    where
        F: Fn(RawTarget) + Send + Sync + 'static,
    {
        *lock(&self.inner.redirect_handler) = Some(Arc::new(handler));
    }

    // ========================================================================
    // Fragment instance plumbing
    // ========================================================================

    /// Record that `handle` now occupies `slot` on `entry`, and deliver any
    /// parked enter callbacks waiting for it (push path).
    pub fn fragment_mounted(&self, entry: &Arc<RouteEntry>, slot: &str, handle: FragmentHandle) {
        entry.set_instance(slot, Arc::clone(&handle));
        for waiter in self.inner.waitlist.drain(entry.id(), slot) {
            if self.is_committed(waiter.token) && !waiter.delivered.swap(true, Ordering::SeqCst) {
                trace_log!(
                    "delivering enter callback for '{}' slot '{}' on mount",
                    entry.path(),
                    slot
                );
                (waiter.callback)(&handle);
            }
        }
    }

    /// Remove the instance from `slot` on `entry` (fragment unmounted).
    pub fn fragment_unmounted(&self, entry: &Arc<RouteEntry>, slot: &str) {
        entry.clear_instance(slot);
    }

    // ========================================================================
    // Navigation pipeline
    // ========================================================================

    /// Resolve `target` against the current location and run the full
    /// transition pipeline.
    pub fn transition_to(&self, target: impl Into<RawTarget>) {
        self.transition_to_with(target, None, None);
    }

    /// [`transition_to`](Self::transition_to) with per-call completion and
    /// abort callbacks.
    pub fn transition_to_with(
        &self,
        target: impl Into<RawTarget>,
        on_complete: Option<CompleteCallback>,
        on_abort: Option<AbortCallback>,
    ) {
        let target = target.into();
        let current = self.current_location();
        let route = self.inner.matcher.resolve(&target, &current);
        info_log!("navigating '{}' to '{}'", current.full_path, route.full_path);

        let this = self.clone();
        let complete: CompleteCallback = Box::new(move |route: &Location| {
            this.update_route(route.clone());
            if let Some(cb) = on_complete {
                cb(route);
            }
            this.ensure_address(false);
            if !this.inner.ready.swap(true, Ordering::SeqCst) {
                let callbacks = std::mem::take(&mut *lock(&this.inner.ready_cbs));
                for cb in callbacks {
                    cb(route);
                }
                lock(&this.inner.ready_error_cbs).clear();
            }
        });

        let this = self.clone();
        let abort: AbortCallback = Box::new(move |err: Option<&NavigationError>| {
            if let Some(cb) = on_abort {
                cb(err);
            }
            if let Some(err) = err {
                if !this.inner.ready.swap(true, Ordering::SeqCst) {
                    let callbacks = std::mem::take(&mut *lock(&this.inner.ready_error_cbs));
                    for cb in callbacks {
                        cb(err);
                    }
                    lock(&this.inner.ready_cbs).clear();
                }
            }
        });

        self.confirm_transition(route, complete, Some(abort));
    }

    /// Run the transition pipeline for an already-resolved location.
    ///
    /// This is the raw state machine: it does not commit (callers commit via
    /// [`update_route`](Self::update_route) in `on_complete`), does not touch
    /// the ready queues, and does not resync the address backend on success.
    /// [`transition_to`](Self::transition_to) and the history
    /// implementations wrap it with the right bookkeeping.
    pub fn confirm_transition(
        &self,
        route: Location,
        on_complete: CompleteCallback,
        on_abort: Option<AbortCallback>,
    ) {
        let current = self.current_location();

        // A navigation to the very location we are at is a no-op.
        if route.same_as(&current) && route.matched.len() == current.matched.len() {
            debug_log!("navigation to '{}' is a same-location no-op", route.full_path);
            self.ensure_address(false);
            if let Some(cb) = on_abort {
                cb(None);
            }
            return;
        }

        let token = self.begin(&route);
        let from_path = current.full_path.clone();
        let to_path = route.full_path.clone();

        // One-shot abort shared by every path out of this transition.
        let abort: AbortFn = {
            let this = self.clone();
            let on_abort = Arc::new(Mutex::new(on_abort));
            let to = to_path.clone();
            Arc::new(move |err: Option<NavigationError>| {
                {
                    let mut pending = lock(&this.inner.pending);
                    if pending.as_ref().is_some_and(|p| p.token == token) {
                        *pending = None;
                    }
                }
                if let Some(err) = &err {
                    warn_log!("navigation to '{}' aborted: {}", to, err);
                    this.inner.redirect_streak.store(0, Ordering::SeqCst);
                    this.notify_error(err);
                }
                if let Some(cb) = lock(&on_abort).take() {
                    cb(err.as_ref());
                }
            })
        };

        let diff = diff_entries(&current.matched, &route.matched);
        debug_log!(
            "transition '{}' to '{}': {} reused, {} activated, {} deactivated",
            from_path,
            to_path,
            diff.updated.len(),
            diff.activated.len(),
            diff.deactivated.len()
        );

        // Queue A: everything that can run before enter guards exist.
        let mut queue: Vec<Option<NavigationGuard>> = Vec::new();
        queue.extend(extract::leave_guards(&diff.deactivated));
        queue.extend(lock(&self.inner.before_hooks).iter().cloned().map(Some));
        queue.extend(extract::update_guards(&diff.updated));
        queue.extend(extract::before_enter_guards(&diff.activated));
        queue.push(Some(self.resolution_step(&diff.activated)));

        // The iterator classifies each checkpoint's verdict. Both the
        // pre-step check and the continuation re-check the token, so a
        // superseded transition can neither run further checkpoints nor act
        // on a stale resume.
        let iterator: Arc<dyn Fn(NavigationGuard, NextStep<NavigationGuard>) + Send + Sync> = {
            let this = self.clone();
            let abort = Arc::clone(&abort);
            let route = route.clone();
            let current = current.clone();
            let from_path = from_path.clone();
            let to_path = to_path.clone();
            Arc::new(move |hook: NavigationGuard, next: NextStep<NavigationGuard>| {
                if !this.is_pending(token) {
                    trace_log!("queue for '{}' superseded before step", to_path);
                    abort(None);
                    return;
                }
                let this = this.clone();
                let abort = Arc::clone(&abort);
                let from_path = from_path.clone();
                let to_path = to_path.clone();
                let continuation = GuardNext::new(move |verdict| {
                    if !this.is_pending(token) {
                        trace_log!("stale continuation for '{}' ignored", to_path);
                        abort(None);
                        return;
                    }
                    match verdict {
                        GuardVerdict::Proceed | GuardVerdict::Defer(_) => next.advance(),
                        GuardVerdict::Abort => {
                            this.ensure_address(true);
                            abort(Some(NavigationError::aborted(from_path, to_path)));
                        }
                        GuardVerdict::Fail(err) => {
                            this.ensure_address(true);
                            abort(Some(err));
                        }
                        GuardVerdict::Redirect(target) => {
                            debug_log!(
                                "checkpoint redirected '{}' to '{}'",
                                to_path,
                                target.describe()
                            );
                            abort(None);
                            this.dispatch_redirect(target);
                        }
                    }
                });
                hook(&route, &current, continuation);
            })
        };

        // Queue A, then (once instances can exist) queue B, then commit.
        let binder = EnterGuardBinder::new();
        let activated = diff.activated.clone();
        let done_a = {
            let this = self.clone();
            let abort = Arc::clone(&abort);
            let iterator = Arc::clone(&iterator);
            let route = route.clone();
            move || {
                let mut queue_b = extract::enter_guards(&activated, &binder);
                queue_b.extend(lock(&this.inner.resolve_hooks).iter().cloned().map(Some));
                trace_log!(
                    "running {} post-resolve steps for '{}'",
                    queue_b.len(),
                    route.full_path
                );

                let step_iterator = Arc::clone(&iterator);
                let done_b = {
                    let this = this.clone();
                    let abort = Arc::clone(&abort);
                    move || {
                        if !this.is_pending(token) {
                            abort(None);
                            return;
                        }
                        *lock(&this.inner.pending) = None;
                        this.inner.committed.store(token.value(), Ordering::SeqCst);
                        info_log!("transition to '{}' confirmed", route.full_path);
                        on_complete(&route);
                        this.schedule_deferred_enters(binder.take_deferred(), token);
                    }
                };
                run_queue(queue_b, move |hook, next| step_iterator(hook, next), done_b);
            }
        };
        let step_iterator = Arc::clone(&iterator);
        run_queue(queue, move |hook, next| step_iterator(hook, next), done_a);
    }

    /// Commit `route` as current: snapshot the previous location, swap,
    /// notify the update listener, then run every global after hook with
    /// `(new, previous)`.
    pub fn update_route(&self, route: Location) {
        let previous = {
            let mut current = lock(&self.inner.current);
            std::mem::replace(&mut *current, route.clone())
        };
        self.inner.redirect_streak.store(0, Ordering::SeqCst);
        debug_log!("current location is now '{}'", route.full_path);

        let listener = lock(&self.inner.listener).clone();
        if let Some(listener) = listener {
            listener(&route);
        }
        let after = lock(&self.inner.after_hooks).clone();
        for hook in after {
            hook(&route, &previous);
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The synthetic queue step that loads on-demand fragments for the
    /// activated entries. A load failure funnels into the vetoed-abort path
    /// exactly like an explicit checkpoint rejection.
    fn resolution_step(&self, activated: &[Arc<RouteEntry>]) -> NavigationGuard {
        let resolver = Arc::clone(&self.inner.resolver);
        let activated = activated.to_vec();
        Arc::new(move |_to: &Location, _from: &Location, next: GuardNext| {
            resolver.load(
                &activated,
                ResolveDone::new(move |result| match result {
                    Ok(()) => next.proceed(),
                    Err(err) => next.fail(err),
                }),
            );
        })
    }

    /// Deliver deferred enter callbacks after the next tick, or drop them
    /// when no scheduler (no rendering root) is configured.
    fn schedule_deferred_enters(&self, deferred: Vec<DeferredEnter>, token: TransitionToken) {
        if deferred.is_empty() {
            return;
        }
        let Some(scheduler) = self.inner.scheduler.clone() else {
            debug_log!(
                "no scheduler configured; dropping {} deferred enter callbacks",
                deferred.len()
            );
            return;
        };
        let this = self.clone();
        scheduler.defer(Box::new(move || {
            for item in deferred {
                this.deliver_or_park(item, token);
            }
        }));
    }

    /// Deliver one deferred enter callback now if its instance is mounted,
    /// otherwise park it on the wait-list and start the poll fallback.
    fn deliver_or_park(&self, item: DeferredEnter, token: TransitionToken) {
        if !self.is_committed(token) {
            return;
        }
        if let Some(instance) = item.entry.instance(&item.slot) {
            (item.callback)(&instance);
            return;
        }
        let delivered = Arc::new(AtomicBool::new(false));
        self.inner.waitlist.park(
            item.entry.id(),
            item.slot.clone(),
            Waiter {
                token,
                callback: Arc::clone(&item.callback),
                delivered: Arc::clone(&delivered),
            },
        );
        if let Some(scheduler) = self.inner.scheduler.clone() {
            Arc::new(EnterPoll {
                controller: self.clone(),
                scheduler,
                entry: item.entry,
                slot: item.slot,
                token,
                callback: item.callback,
                delivered,
            })
            .schedule();
        }
    }

    /// Issue the navigation a checkpoint redirected to, guarding against
    /// redirect chains that never settle.
    fn dispatch_redirect(&self, target: RawTarget) {
        let streak = self.inner.redirect_streak.fetch_add(1, Ordering::SeqCst) + 1;
        if streak > MAX_REDIRECT_DEPTH {
            let err = NavigationError::redirect_loop(target.describe());
            error_log!("{}", err);
            self.inner.redirect_streak.store(0, Ordering::SeqCst);
            self.notify_error(&err);
            return;
        }
        let handler = lock(&self.inner.redirect_handler).clone();
        match handler {
            Some(handler) => handler(target),
            None => self.transition_to(target),
        }
    }

    /// Resync the address backend to the current location, if one is
    /// configured.
    fn ensure_address(&self, force_replace: bool) {
        if let Some(backend) = &self.inner.backend {
            backend.ensure(&self.current_location(), force_replace);
        }
    }

    /// Dispatch an error to the global error callbacks, or surface a
    /// diagnostic when none are registered.
    fn notify_error(&self, err: &NavigationError) {
        let callbacks = lock(&self.inner.error_cbs).clone();
        if callbacks.is_empty() {
            error_log!("unhandled navigation failure: {}", err);
            return;
        }
        for cb in callbacks {
            cb(err);
        }
    }
}

impl fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationController")
            .field("current", &self.current_location().full_path)
            .field("pending", &lock(&self.inner.pending).as_ref().map(|p| p.to.clone()))
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Matcher resolving any path to a Location with no matched entries.
    struct EmptyMatcher;

    impl Matcher for EmptyMatcher {
        fn resolve(&self, target: &RawTarget, _current: &Location) -> Location {
            let path = target.path.clone().unwrap_or_else(|| "/".to_string());
            Location::new(
                path,
                target.query.clone(),
                target.hash.clone(),
                target.params.clone(),
                Vec::new(),
            )
        }
    }

    fn controller() -> NavigationController {
        NavigationController::builder(EmptyMatcher).build()
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();
        assert_eq!(controller.current_location().full_path, "/");
        assert!(!controller.has_pending());
        assert!(!controller.is_ready());
    }

    #[test]
    fn test_begin_supersedes_previous_token() {
        let controller = controller();
        let first = controller.begin(&Location::from_path("/a"));
        let second = controller.begin(&Location::from_path("/b"));
        assert!(!controller.is_pending(first));
        assert!(controller.is_pending(second));
    }

    #[test]
    fn test_update_route_notifies_listener_then_after_hooks() {
        use std::sync::Mutex;

        let controller = controller();
        let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let listener_log = Arc::clone(&order);
        controller.listen(move |route| {
            listener_log
                .lock()
                .unwrap()
                .push(format!("listen:{}", route.full_path));
        });
        let after_log = Arc::clone(&order);
        controller.after_each(move |to, from| {
            after_log
                .lock()
                .unwrap()
                .push(format!("after:{}<-{}", to.full_path, from.full_path));
        });

        controller.update_route(Location::from_path("/a"));
        assert_eq!(
            *order.lock().unwrap(),
            vec!["listen:/a".to_string(), "after:/a<-/".to_string()]
        );
    }

    #[test]
    fn test_listen_replaces_previous_listener() {
        use std::sync::Mutex;

        let controller = controller();
        let calls: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&calls);
        controller.listen(move |_| first.lock().unwrap().push("first"));
        let second = Arc::clone(&calls);
        controller.listen(move |_| second.lock().unwrap().push("second"));

        controller.update_route(Location::from_path("/a"));
        assert_eq!(*calls.lock().unwrap(), vec!["second"]);
    }
}
