//! Enter-guard binding and deferred instance delivery.
//!
//! Fragment enter guards run before their instance exists. When such a
//! guard resolves with [`GuardVerdict::Defer`], the callback is not invoked
//! immediately: the binder captures `(entry, slot, callback)` on the
//! transition, and after the transition commits the controller delivers
//! each callback with the concrete instance once it is available.
//!
//! Delivery is push-based first — an explicit wait-list keyed by
//! `(EntryId, slot name)` that
//! [`fragment_mounted`](crate::NavigationController::fragment_mounted)
//! resolves directly — with a cooperative per-tick poll as fallback for
//! hosts that store instances on entries without notifying the controller.
//! Both paths stop, removing the waiter, the moment the owning transition
//! is no longer the most recently committed one, so nothing polls forever
//! after abandonment.

use crate::controller::{NavigationController, TransitionToken};
use crate::entry::{EntryId, RouteEntry};
use crate::guards::{GuardNext, GuardVerdict, InstanceCallback, NavigationGuard};
use crate::location::Location;
use crate::scheduler::Scheduler;
use crate::sync::lock;
use crate::trace_log;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// EnterGuardBinder
// ============================================================================

/// A deferred enter callback captured during queue execution, not yet
/// eligible for delivery (the transition has not committed).
pub(crate) struct DeferredEnter {
    pub(crate) entry: Arc<RouteEntry>,
    pub(crate) slot: String,
    pub(crate) callback: InstanceCallback,
}

/// Wraps fragment enter guards for one transition, intercepting
/// [`GuardVerdict::Defer`] so the callback is queued instead of forwarded.
pub(crate) struct EnterGuardBinder {
    deferred: Arc<Mutex<Vec<DeferredEnter>>>,
}

impl EnterGuardBinder {
    pub(crate) fn new() -> Self {
        Self {
            deferred: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Wrap `guard` so a `Defer` verdict queues its callback against
    /// `(entry, slot)` and the transition advances as if the guard had
    /// resolved `Proceed`. Every other verdict passes through untouched.
    pub(crate) fn bind(
        &self,
        guard: NavigationGuard,
        entry: Arc<RouteEntry>,
        slot: String,
    ) -> NavigationGuard {
        let deferred = Arc::clone(&self.deferred);
        Arc::new(move |to: &Location, from: &Location, outer: GuardNext| {
            let deferred = Arc::clone(&deferred);
            let entry = Arc::clone(&entry);
            let slot = slot.clone();
            let wrapped = GuardNext::new(move |verdict| match verdict {
                GuardVerdict::Defer(callback) => {
                    lock(&deferred).push(DeferredEnter {
                        entry,
                        slot,
                        callback,
                    });
                    outer.resolve(GuardVerdict::Proceed);
                }
                other => outer.resolve(other),
            });
            guard(to, from, wrapped)
        })
    }

    /// Take everything captured so far (called once, at commit).
    pub(crate) fn take_deferred(&self) -> Vec<DeferredEnter> {
        std::mem::take(&mut *lock(&self.deferred))
    }
}

// ============================================================================
// InstanceWaitList
// ============================================================================

/// A parked enter callback awaiting its instance.
pub(crate) struct Waiter {
    pub(crate) token: TransitionToken,
    pub(crate) callback: InstanceCallback,
    pub(crate) delivered: Arc<AtomicBool>,
}

/// Wait-list keyed by `(entry, slot)`, drained push-style on mount.
#[derive(Default)]
pub(crate) struct InstanceWaitList {
    waiters: Mutex<HashMap<(EntryId, String), Vec<Waiter>>>,
}

impl InstanceWaitList {
    pub(crate) fn park(&self, entry: EntryId, slot: String, waiter: Waiter) {
        lock(&self.waiters)
            .entry((entry, slot))
            .or_default()
            .push(waiter);
    }

    /// Take every waiter parked under `(entry, slot)`.
    pub(crate) fn drain(&self, entry: EntryId, slot: &str) -> Vec<Waiter> {
        lock(&self.waiters)
            .remove(&(entry, slot.to_string()))
            .unwrap_or_default()
    }

    /// Remove one waiter, identified by its delivered flag.
    pub(crate) fn remove(&self, entry: EntryId, slot: &str, delivered: &Arc<AtomicBool>) {
        let mut waiters = lock(&self.waiters);
        let key = (entry, slot.to_string());
        if let Some(list) = waiters.get_mut(&key) {
            list.retain(|w| !Arc::ptr_eq(&w.delivered, delivered));
            if list.is_empty() {
                waiters.remove(&key);
            }
        }
    }
}

// ============================================================================
// EnterPoll — cooperative availability poll (fallback path)
// ============================================================================

/// Per-tick poll for one parked callback, used when the host mutates slot
/// instances directly instead of calling `fragment_mounted`.
pub(crate) struct EnterPoll {
    pub(crate) controller: NavigationController,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) entry: Arc<RouteEntry>,
    pub(crate) slot: String,
    pub(crate) token: TransitionToken,
    pub(crate) callback: InstanceCallback,
    pub(crate) delivered: Arc<AtomicBool>,
}

impl EnterPoll {
    /// Queue the next poll tick.
    pub(crate) fn schedule(self: Arc<Self>) {
        let scheduler = Arc::clone(&self.scheduler);
        scheduler.defer(Box::new(move || self.tick()));
    }

    fn tick(self: Arc<Self>) {
        if self.delivered.load(Ordering::SeqCst) {
            return;
        }
        if !self.controller.is_committed(self.token) {
            // The committed route moved on; this callback will never fire.
            trace_log!(
                "dropping enter callback for '{}' slot '{}': route superseded",
                self.entry.path(),
                self.slot
            );
            self.controller
                .waitlist()
                .remove(self.entry.id(), &self.slot, &self.delivered);
            return;
        }
        if let Some(instance) = self.entry.instance(&self.slot) {
            if !self.delivered.swap(true, Ordering::SeqCst) {
                self.controller
                    .waitlist()
                    .remove(self.entry.id(), &self.slot, &self.delivered);
                (self.callback)(&instance);
            }
            return;
        }
        self.schedule();
    }
}

// ============================================================================
// Tests
// ============================================================================
