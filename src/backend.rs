//! Address backend boundary.
//!
//! In an addressable environment (a real address bar), the committed
//! location must be mirrored outward, and a vetoed navigation must roll any
//! speculative address change back. The engine expresses both through this
//! trait and calls it at exactly three points: after a commit, after a
//! forced veto, and on a same-location no-op.
//!
//! The stack-based history ([`NavigationStack`](crate::NavigationStack))
//! targets non-addressable environments and configures no backend at all.

use crate::location::Location;

/// Outward synchronization with an addressable environment.
pub trait AddressBackend: Send + Sync {
    /// Make the external address reflect `current`.
    ///
    /// `force_replace` is set when re-asserting the current address after a
    /// veto: the backend must replace (not push) so any speculative address
    /// change is undone without growing history.
    fn ensure(&self, current: &Location, force_replace: bool);

    /// The external address as currently displayed.
    fn current_address(&self) -> String;
}
