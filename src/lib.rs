//! # waymark
//!
//! A navigation transition engine: given a current application location and
//! a requested target, it resolves an ordered sequence of interceptable
//! checkpoints ("guards") contributed by matched route entries and by
//! global hooks, runs them in a fixed precedence order, and only then
//! commits the new location as current.
//!
//! The engine supports:
//!
//! - **cancellation** — a newer navigation silently supersedes an in-flight
//!   one;
//! - **redirection** — any checkpoint can reroute the navigation elsewhere;
//! - **abortion** — any checkpoint can veto the navigation;
//! - **asynchronous checkpoints** — a checkpoint may resolve its
//!   continuation after an arbitrary delay, including enter callbacks that
//!   only become deliverable once a yet-to-be-created fragment instance
//!   registers itself.
//!
//! Rendering, fragment instantiation, and real address bars are host
//! concerns, reached only through the collaborator traits in
//! [`matcher`], [`resolve`], [`backend`], and [`scheduler`].
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`NavigationController`] | transition state machine, hook registry, ready bookkeeping |
//! | [`NavigationStack`] | cursor-based history for non-addressable environments |
//! | [`queue::run_queue`] | sequential checkpoint executor with suspension |
//! | [`extract::diff_entries`] | reused/activated/deactivated classification |
//! | [`RouteMap`] | default matcher (feature `matcher`) |
//!
//! # Example
//!
//! ```
//! use waymark::{NavigationController, NavigationStack, RouteDef, RouteMap};
//!
//! let map = RouteMap::builder()
//!     .route(RouteDef::new("/login"))
//!     .route(RouteDef::new("/admin").before_enter(|_to, _from, next| {
//!         next.redirect("/login")
//!     }))
//!     .build()
//!     .expect("route table is well-formed");
//!
//! let stack = NavigationStack::new(NavigationController::builder(map).build());
//! stack.push("/admin");
//! assert_eq!(stack.current_location(), "/login");
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `log` | yes | route engine logging through the `log` crate |
//! | `tracing` | no | route engine logging through the `tracing` crate |
//! | `matcher` | yes | [`RouteMap`], a `matchit`-backed default matcher |
//! | `cache` | yes | LRU memoization of matcher resolutions |

pub mod backend;
mod binder;
pub mod controller;
pub mod entry;
pub mod error;
pub mod extract;
pub mod guards;
pub mod location;
pub mod logging;
pub mod matcher;
pub mod queue;
pub mod resolve;
pub mod scheduler;
pub mod stack;
mod sync;

pub use backend::AddressBackend;
pub use controller::{
    AbortCallback, CompleteCallback, NavigationController, NavigationControllerBuilder,
    TransitionToken,
};
pub use entry::{
    EntryId, FragmentDefinition, FragmentHandle, RouteEntry, DEFAULT_SLOT,
};
pub use error::NavigationError;
pub use extract::{diff_entries, EntryDiff};
pub use guards::{
    guard_fn, instance_guard_fn, AfterHook, GuardNext, GuardVerdict, InstanceCallback,
    InstanceGuard, NavigationGuard,
};
pub use location::{full_path_of, parse_target, Location, Params, Query, RawTarget};
pub use matcher::Matcher;
#[cfg(feature = "matcher")]
pub use matcher::{RouteDef, RouteMap, RouteMapBuilder};
pub use queue::{run_queue, NextStep};
pub use resolve::{EagerResolver, FragmentResolver, ResolveDone};
pub use scheduler::{ManualScheduler, Scheduler};
pub use stack::NavigationStack;
