//! Cooperative tick scheduling.
//!
//! The engine never blocks and owns no timers; anything that must happen
//! "later" — post-commit enter callbacks after the next render pass,
//! instance-availability polling — is handed to the host through the
//! [`Scheduler`] trait. A configured scheduler is also the engine's signal
//! that a rendering root exists: without one, deferred enter callbacks are
//! skipped entirely.
//!
//! [`ManualScheduler`] is a deterministic implementation for tests and
//! headless hosts: callbacks queue up until [`tick`](ManualScheduler::tick)
//! is called.

use crate::sync::lock;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Scheduler trait
// ============================================================================

/// Host-provided next-tick scheduling.
///
/// `defer` must run the callback at some later point on the host's logical
/// thread of control (an animation-frame-equivalent tick, an event-loop
/// turn). Callbacks may themselves defer further callbacks.
pub trait Scheduler: Send + Sync {
    /// Schedule `callback` to run on the next tick.
    fn defer(&self, callback: Box<dyn FnOnce() + Send>);
}

// ============================================================================
// ManualScheduler
// ============================================================================

/// Deterministic scheduler: callbacks queue until explicitly pumped.
///
/// # Example
///
/// ```
/// use waymark::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// scheduler.defer(Box::new(|| {}));
/// assert_eq!(scheduler.pending(), 1);
/// assert_eq!(scheduler.tick(), 1);
/// assert!(scheduler.is_idle());
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Box<dyn FnOnce() + Send>>>,
}

impl ManualScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued so far and return how many ran.
    ///
    /// Callbacks deferred *during* the tick land in the next batch, exactly
    /// like a frame-driven host.
    pub fn tick(&self) -> usize {
        let batch: Vec<_> = lock(&self.queue).drain(..).collect();
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }

    /// Number of callbacks waiting for the next tick.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Whether nothing is waiting.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, callback: Box<dyn FnOnce() + Send>) {
        lock(&self.queue).push_back(callback);
    }
}

// ============================================================================
// Tests
// ============================================================================
