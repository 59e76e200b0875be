//! Small synchronization helpers shared across the crate.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Acquire a mutex, recovering the guard if a panicking thread poisoned it.
///
/// The engine's locks only protect plain data (no invariants span a lock
/// release), so a poisoned lock is still safe to read and write.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
