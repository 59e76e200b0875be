//! Route entries, fragment definitions, and fragment slots.
//!
//! A [`RouteEntry`] is one node of route configuration: it may carry
//! entry-level before-enter checkpoints and owns a set of named fragment
//! slots. Each slot pairs a [`FragmentDefinition`] (the constructible
//! description, including its checkpoint functions) with the live
//! [`FragmentHandle`] currently occupying the slot — absent until the host
//! mounts a fragment, removed when it unmounts.
//!
//! Entries are created once (by the matcher at registration, or by hand) and
//! shared by `Arc` across every [`Location`](crate::Location) that matches
//! them. Identity is the stable [`EntryId`] handle generated at
//! construction; the diffing algorithm compares ids, never by-value
//! equality, so reused-vs-replaced classification is explicit.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use waymark::{FragmentDefinition, RouteEntry};
//!
//! let pane = Arc::new(
//!     FragmentDefinition::new("UserPane")
//!         .on_enter(|_to, _from, next| next.proceed()),
//! );
//! let entry = Arc::new(RouteEntry::new("/users/{id}").fragment(pane));
//! assert_eq!(entry.path(), "/users/{id}");
//! assert!(entry.instance("default").is_none());
//! ```

use crate::guards::{GuardNext, InstanceGuard, NavigationGuard};
use crate::location::Location;
use crate::sync::lock;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Name of the slot used when a fragment is attached without an explicit
/// slot name.
pub const DEFAULT_SLOT: &str = "default";

/// The live object a host mounts into a fragment slot.
///
/// The engine never inspects it; it only binds it to leave/update guards
/// and delivers it to deferred enter callbacks. Hosts downcast to their own
/// concrete type.
pub type FragmentHandle = Arc<dyn Any + Send + Sync>;

// ============================================================================
// EntryId
// ============================================================================

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque stable handle identifying one [`RouteEntry`].
///
/// Generated once at entry construction; two entries are "the same" exactly
/// when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        Self(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// FragmentDefinition
// ============================================================================

/// Constructible description of a UI fragment: a debug label plus its
/// checkpoint functions, resolved once at construction.
///
/// A definition may declare zero, one, or an ordered list of checkpoints of
/// each kind; repeated builder calls append in order.
pub struct FragmentDefinition {
    label: String,
    enter: Vec<NavigationGuard>,
    update: Vec<InstanceGuard>,
    leave: Vec<InstanceGuard>,
}

impl FragmentDefinition {
    /// Create a definition with the given debug label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enter: Vec::new(),
            update: Vec::new(),
            leave: Vec::new(),
        }
    }

    /// Append an enter checkpoint. The instance does not exist yet when it
    /// runs; use [`GuardNext::when_ready`] to receive it after mount.
    #[must_use]
    pub fn on_enter<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        self.enter.push(Arc::new(guard));
        self
    }

    /// Append an update checkpoint, run when the owning entry is reused by
    /// the target location. Bound to the live instance.
    #[must_use]
    pub fn on_update<F>(mut self, guard: F) -> Self
    where
        F: Fn(&FragmentHandle, &Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        self.update.push(Arc::new(guard));
        self
    }

    /// Append a leave checkpoint, run when the owning entry is deactivated.
    /// Bound to the live instance.
    #[must_use]
    pub fn on_leave<F>(mut self, guard: F) -> Self
    where
        F: Fn(&FragmentHandle, &Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        self.leave.push(Arc::new(guard));
        self
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn enter_guards(&self) -> &[NavigationGuard] {
        &self.enter
    }

    pub(crate) fn update_guards(&self) -> &[InstanceGuard] {
        &self.update
    }

    pub(crate) fn leave_guards(&self) -> &[InstanceGuard] {
        &self.leave
    }
}

impl fmt::Debug for FragmentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentDefinition")
            .field("label", &self.label)
            .field("enter", &self.enter.len())
            .field("update", &self.update.len())
            .field("leave", &self.leave.len())
            .finish()
    }
}

// ============================================================================
// RouteEntry
// ============================================================================

struct FragmentSlot {
    definition: Arc<FragmentDefinition>,
    instance: Option<FragmentHandle>,
}

/// One node of route configuration.
///
/// Slot instances are mutated externally as fragments mount and unmount;
/// everything else is fixed at construction. Once populated, a slot's
/// instance is authoritative for that slot until removed.
pub struct RouteEntry {
    id: EntryId,
    path: String,
    name: Option<String>,
    before_enter: Vec<NavigationGuard>,
    slots: Mutex<BTreeMap<String, FragmentSlot>>,
}

impl RouteEntry {
    /// Create an entry for the given path pattern.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: EntryId::next(),
            path: path.into(),
            name: None,
            before_enter: Vec::new(),
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Give the entry a name, addressable via
    /// [`RawTarget::named`](crate::RawTarget::named).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an entry-level before-enter checkpoint, run when this entry
    /// is activated (not bound to any instance).
    #[must_use]
    pub fn before_enter<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Location, &Location, GuardNext) + Send + Sync + 'static,
    {
        self.before_enter.push(Arc::new(guard));
        self
    }

    pub(crate) fn push_before_enter(&mut self, guard: NavigationGuard) {
        self.before_enter.push(guard);
    }

    /// Attach a fragment definition under a named slot.
    #[must_use]
    pub fn slot(mut self, name: impl Into<String>, definition: Arc<FragmentDefinition>) -> Self {
        self.slots.get_mut().unwrap_or_else(|e| e.into_inner()).insert(
            name.into(),
            FragmentSlot {
                definition,
                instance: None,
            },
        );
        self
    }

    /// Attach a fragment definition under the [`DEFAULT_SLOT`].
    #[must_use]
    pub fn fragment(self, definition: Arc<FragmentDefinition>) -> Self {
        self.slot(DEFAULT_SLOT, definition)
    }

    /// Stable identity handle.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Path pattern this entry was registered with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Registered name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Store the live instance occupying `slot`.
    ///
    /// Unknown slot names are ignored (the entry declares its slots at
    /// construction). Prefer
    /// [`NavigationController::fragment_mounted`](crate::NavigationController::fragment_mounted),
    /// which also resolves parked enter callbacks push-style.
    pub fn set_instance(&self, slot: &str, handle: FragmentHandle) {
        if let Some(entry) = lock(&self.slots).get_mut(slot) {
            entry.instance = Some(handle);
        }
    }

    /// Remove the instance from `slot` (fragment unmounted).
    pub fn clear_instance(&self, slot: &str) {
        if let Some(entry) = lock(&self.slots).get_mut(slot) {
            entry.instance = None;
        }
    }

    /// The live instance in `slot`, if mounted.
    pub fn instance(&self, slot: &str) -> Option<FragmentHandle> {
        lock(&self.slots)
            .get(slot)
            .and_then(|entry| entry.instance.clone())
    }

    pub(crate) fn before_enter_guards(&self) -> &[NavigationGuard] {
        &self.before_enter
    }

    /// Snapshot of `(slot name, definition, instance)` triples in slot-name
    /// order. Cloned out so no lock is held while guards run.
    pub(crate) fn slot_snapshot(
        &self,
    ) -> Vec<(String, Arc<FragmentDefinition>, Option<FragmentHandle>)> {
        lock(&self.slots)
            .iter()
            .map(|(name, slot)| {
                (
                    name.clone(),
                    Arc::clone(&slot.definition),
                    slot.instance.clone(),
                )
            })
            .collect()
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("slots", &lock(&self.slots).keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
