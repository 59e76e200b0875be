//! Entry-list diffing and checkpoint extraction.
//!
//! Given the current and target matched-entry chains, [`diff_entries`]
//! classifies each entry as reused, activated, or deactivated by comparing
//! stable [`EntryId`](crate::EntryId) handles. The extraction functions
//! then pull the right checkpoint kind out of each classified entry and
//! bind it for execution:
//!
//! - leave guards bind to the live instance of each deactivated slot and
//!   run child-first (reverse match order);
//! - update guards bind to the live instance of each reused slot;
//! - entry-level before-enter guards need no instance;
//! - fragment enter guards are extracted separately (after async fragment
//!   resolution) and wrapped by the
//!   [`EnterGuardBinder`](crate::binder::EnterGuardBinder).
//!
//! A slot with no live instance contributes an absent step — a gap the
//! queue runner skips — rather than being silently dropped, preserving the
//! positional structure of the extracted list.

use crate::binder::EnterGuardBinder;
use crate::entry::{FragmentHandle, RouteEntry};
use crate::guards::{GuardNext, InstanceGuard, NavigationGuard};
use crate::location::Location;
use std::sync::Arc;

// ============================================================================
// Entry diffing
// ============================================================================

/// Classification of the target chain against the current chain.
#[derive(Debug)]
pub struct EntryDiff {
    /// Leading run shared by both chains (reused entries).
    pub updated: Vec<Arc<RouteEntry>>,
    /// Target-chain suffix past the divergence point.
    pub activated: Vec<Arc<RouteEntry>>,
    /// Current-chain suffix past the divergence point.
    pub deactivated: Vec<Arc<RouteEntry>>,
}

/// Split two root-to-leaf entry chains at their divergence point.
///
/// Entries are compared by [`EntryId`](crate::EntryId); the shared prefix is
/// always contiguous from index 0. Callers guarantee chains are ordered
/// root-to-leaf, so a divergence point, once found, never re-converges.
pub fn diff_entries(current: &[Arc<RouteEntry>], next: &[Arc<RouteEntry>]) -> EntryDiff {
    let limit = current.len().max(next.len());
    let mut split = limit;
    for i in 0..limit {
        match (current.get(i), next.get(i)) {
            (Some(a), Some(b)) if a.id() == b.id() => {}
            _ => {
                split = i;
                break;
            }
        }
    }
    EntryDiff {
        updated: next[..split.min(next.len())].to_vec(),
        activated: next[split.min(next.len())..].to_vec(),
        deactivated: current[split.min(current.len())..].to_vec(),
    }
}

// ============================================================================
// Extraction & binding
// ============================================================================

/// Bind an instance guard to the slot's live instance, or produce a gap if
/// the slot has none.
fn bind_instance_guard(
    guard: &InstanceGuard,
    instance: Option<FragmentHandle>,
) -> Option<NavigationGuard> {
    let instance = instance?;
    let guard = Arc::clone(guard);
    Some(Arc::new(move |to: &Location, from: &Location, next: GuardNext| {
        guard(&instance, to, from, next)
    }))
}

/// Flatten one instance-bound guard kind across entries and slots.
///
/// `reverse` flips the per-slot groups (not the order of guards inside one
/// definition), producing the child-before-parent order leave guards need.
fn instance_guards<S>(entries: &[Arc<RouteEntry>], select: S, reverse: bool) -> Vec<Option<NavigationGuard>>
where
    S: Fn(&crate::entry::FragmentDefinition) -> Vec<InstanceGuard>,
{
    let mut groups: Vec<Vec<Option<NavigationGuard>>> = Vec::new();
    for entry in entries {
        for (_slot, definition, instance) in entry.slot_snapshot() {
            let bound: Vec<Option<NavigationGuard>> = select(&definition)
                .iter()
                .map(|guard| bind_instance_guard(guard, instance.clone()))
                .collect();
            if !bound.is_empty() {
                groups.push(bound);
            }
        }
    }
    if reverse {
        groups.reverse();
    }
    groups.into_iter().flatten().collect()
}

/// Leave guards from deactivated entries, child-first.
pub(crate) fn leave_guards(deactivated: &[Arc<RouteEntry>]) -> Vec<Option<NavigationGuard>> {
    instance_guards(deactivated, |def| def.leave_guards().to_vec(), true)
}

/// Update guards from reused entries, parent-first.
pub(crate) fn update_guards(updated: &[Arc<RouteEntry>]) -> Vec<Option<NavigationGuard>> {
    instance_guards(updated, |def| def.update_guards().to_vec(), false)
}

/// Entry-level before-enter guards from activated entries, in match order.
/// These belong to the entry itself and bind to no instance.
pub(crate) fn before_enter_guards(activated: &[Arc<RouteEntry>]) -> Vec<Option<NavigationGuard>> {
    activated
        .iter()
        .flat_map(|entry| entry.before_enter_guards().iter().cloned().map(Some))
        .collect()
}

/// Fragment enter guards from activated entries, wrapped so deferred
/// instance callbacks are captured by the binder. Extracted only after the
/// fragment-resolution step completes, since definitions for on-demand
/// fragments are final only then.
pub(crate) fn enter_guards(
    activated: &[Arc<RouteEntry>],
    binder: &EnterGuardBinder,
) -> Vec<Option<NavigationGuard>> {
    let mut steps = Vec::new();
    for entry in activated {
        for (slot, definition, _instance) in entry.slot_snapshot() {
            for guard in definition.enter_guards() {
                steps.push(Some(binder.bind(
                    Arc::clone(guard),
                    Arc::clone(entry),
                    slot.clone(),
                )));
            }
        }
    }
    steps
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{FragmentDefinition, RouteEntry, DEFAULT_SLOT};
    use std::sync::Mutex;

    fn entry(path: &str) -> Arc<RouteEntry> {
        Arc::new(RouteEntry::new(path))
    }

    fn ids(entries: &[Arc<RouteEntry>]) -> Vec<crate::entry::EntryId> {
        entries.iter().map(|e| e.id()).collect()
    }

    #[test]
    fn test_diff_disjoint_chains() {
        let a = entry("/a");
        let b = entry("/b");
        let diff = diff_entries(&[Arc::clone(&a)], &[Arc::clone(&b)]);
        assert!(diff.updated.is_empty());
        assert_eq!(ids(&diff.activated), ids(&[b]));
        assert_eq!(ids(&diff.deactivated), ids(&[a]));
    }

    #[test]
    fn test_diff_shared_prefix() {
        let root = entry("/");
        let users = entry("/users");
        let user = entry("/users/{id}");
        let admin = entry("/admin");

        let current = [Arc::clone(&root), Arc::clone(&users), Arc::clone(&user)];
        let next = [Arc::clone(&root), Arc::clone(&admin)];
        let diff = diff_entries(&current, &next);

        assert_eq!(ids(&diff.updated), ids(&[root]));
        assert_eq!(ids(&diff.activated), ids(&[admin]));
        assert_eq!(ids(&diff.deactivated), ids(&[users, user]));
    }

    #[test]
    fn test_diff_pure_extension() {
        let root = entry("/");
        let users = entry("/users");
        let diff = diff_entries(
            &[Arc::clone(&root)],
            &[Arc::clone(&root), Arc::clone(&users)],
        );
        assert_eq!(ids(&diff.updated), ids(&[root]));
        assert_eq!(ids(&diff.activated), ids(&[users]));
        assert!(diff.deactivated.is_empty());
    }

    #[test]
    fn test_diff_identical_chains() {
        let root = entry("/");
        let users = entry("/users");
        let chain = [Arc::clone(&root), Arc::clone(&users)];
        let diff = diff_entries(&chain, &chain);
        assert_eq!(ids(&diff.updated), ids(&chain));
        assert!(diff.activated.is_empty());
        assert!(diff.deactivated.is_empty());
    }

    #[test]
    fn test_diff_same_path_different_identity_diverges() {
        // Two registrations of the same pattern are distinct entries.
        let a = entry("/dup");
        let b = entry("/dup");
        let diff = diff_entries(&[a], &[b]);
        assert!(diff.updated.is_empty());
        assert_eq!(diff.activated.len(), 1);
        assert_eq!(diff.deactivated.len(), 1);
    }

    #[test]
    fn test_leave_guards_reverse_to_child_first() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let parent_log = Arc::clone(&order);
        let parent = Arc::new(
            RouteEntry::new("/parent").fragment(Arc::new(
                FragmentDefinition::new("Parent").on_leave(move |_, _, _, next| {
                    parent_log.lock().unwrap().push("parent");
                    next.proceed();
                }),
            )),
        );
        let child_log = Arc::clone(&order);
        let child = Arc::new(
            RouteEntry::new("child").fragment(Arc::new(
                FragmentDefinition::new("Child").on_leave(move |_, _, _, next| {
                    child_log.lock().unwrap().push("child");
                    next.proceed();
                }),
            )),
        );
        parent.set_instance(DEFAULT_SLOT, Arc::new(()));
        child.set_instance(DEFAULT_SLOT, Arc::new(()));

        let steps = leave_guards(&[parent, child]);
        assert_eq!(steps.len(), 2);

        let to = Location::from_path("/x");
        let from = Location::from_path("/parent/child");
        for step in steps.into_iter().flatten() {
            step(&to, &from, GuardNext::new(|_| {}));
        }
        assert_eq!(*order.lock().unwrap(), vec!["child", "parent"]);
    }

    #[test]
    fn test_unbound_slots_become_gaps() {
        let silent = Arc::new(
            RouteEntry::new("/silent").fragment(Arc::new(
                FragmentDefinition::new("Silent").on_leave(|_, _, _, next| next.proceed()),
            )),
        );
        // No instance mounted: the guard cannot bind.
        let steps = leave_guards(&[silent]);
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_none());
    }

    #[test]
    fn test_before_enter_guards_keep_match_order() {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let first_log = Arc::clone(&seen);
        let second_log = Arc::clone(&seen);
        let first = Arc::new(RouteEntry::new("/a").before_enter(move |_, _, next| {
            first_log.lock().unwrap().push("a");
            next.proceed();
        }));
        let second = Arc::new(RouteEntry::new("b").before_enter(move |_, _, next| {
            second_log.lock().unwrap().push("b");
            next.proceed();
        }));

        let to = Location::from_path("/a/b");
        let from = Location::nowhere();
        for step in before_enter_guards(&[first, second]).into_iter().flatten() {
            step(&to, &from, GuardNext::new(|_| {}));
        }
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }
}
