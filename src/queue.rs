//! Sequential checkpoint queue runner.
//!
//! [`run_queue`] drives an ordered list of optional steps through an
//! iterator callback. Each present step receives a one-shot [`NextStep`]
//! handle; the queue advances only when the handle is consumed, so a step
//! may suspend the queue indefinitely (asynchronous checkpoints resolve the
//! handle whenever they are ready). Absent steps are no-ops that advance
//! immediately. No two steps ever run concurrently.
//!
//! Dropping a [`NextStep`] without advancing abandons the queue — that is
//! how a superseded transition's remaining checkpoints are discarded.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use waymark::queue::run_queue;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&seen);
//! run_queue(
//!     vec![Some("a"), None, Some("b")],
//!     move |step, next| {
//!         log.lock().unwrap().push(step);
//!         next.advance();
//!     },
//!     || {},
//! );
//! assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
//! ```

use crate::sync::lock;
use crate::trace_log;
use std::sync::{Arc, Mutex};

// ============================================================================
// Queue state
// ============================================================================

struct QueueState<T: Send + 'static> {
    steps: Mutex<Vec<Option<T>>>,
    iterator: Box<dyn Fn(T, NextStep<T>) + Send + Sync>,
    done: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl<T: Send + 'static> QueueState<T> {
    fn step(state: Arc<Self>, mut index: usize) {
        enum Slot<T> {
            End,
            Gap,
            Hook(T),
        }

        loop {
            let slot = {
                let mut steps = lock(&state.steps);
                if index >= steps.len() {
                    Slot::End
                } else {
                    // Steps are taken out so each runs at most once.
                    match steps[index].take() {
                        Some(hook) => Slot::Hook(hook),
                        None => Slot::Gap,
                    }
                }
            };
            match slot {
                Slot::End => {
                    if let Some(done) = lock(&state.done).take() {
                        done();
                    }
                    return;
                }
                Slot::Gap => index += 1,
                Slot::Hook(hook) => {
                    trace_log!("running queue step {}", index);
                    let next = NextStep {
                        state: Arc::clone(&state),
                        index: index + 1,
                    };
                    (state.iterator)(hook, next);
                    return;
                }
            }
        }
    }
}

// ============================================================================
// NextStep
// ============================================================================

/// One-shot handle advancing the queue past the current step.
///
/// `Send`, so an asynchronous step may advance from wherever it completes.
pub struct NextStep<T: Send + 'static> {
    state: Arc<QueueState<T>>,
    index: usize,
}

impl<T: Send + 'static> NextStep<T> {
    /// Advance to the following step (or finish the queue).
    pub fn advance(self) {
        QueueState::step(self.state, self.index);
    }
}

// ============================================================================
// run_queue
// ============================================================================

/// Run `steps` sequentially through `iterator`, invoking `done` exactly once
/// after the final step advances.
///
/// The iterator is responsible for classifying each step's outcome and
/// deciding whether to consume the [`NextStep`]; an abandoned handle leaves
/// the queue suspended forever, and `done` never fires.
pub fn run_queue<T, I, D>(steps: Vec<Option<T>>, iterator: I, done: D)
where
    T: Send + 'static,
    I: Fn(T, NextStep<T>) + Send + Sync + 'static,
    D: FnOnce() + Send + 'static,
{
    let state = Arc::new(QueueState {
        steps: Mutex::new(steps),
        iterator: Box::new(iterator),
        done: Mutex::new(Some(Box::new(done))),
    });
    QueueState::step(state, 0);
}

// ============================================================================
// Tests
// ============================================================================
