//! Shared fixtures for the scenario tests.
//!
//! Provides a table-driven matcher, call-order recorders, a recording
//! address backend, and continuation-stashing helpers for exercising
//! asynchronous checkpoints deterministically.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use waymark::{AddressBackend, GuardNext, Location, Matcher, RawTarget, RouteEntry};

/// Matcher backed by an explicit path → entry-chain table.
///
/// Chains are registered once and shared across resolves, so entry identity
/// behaves like a real matcher's.
pub struct TableMatcher {
    routes: Vec<(String, Vec<Arc<RouteEntry>>)>,
}

impl TableMatcher {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    #[must_use]
    pub fn route(mut self, path: &str, chain: Vec<Arc<RouteEntry>>) -> Self {
        self.routes.push((path.to_string(), chain));
        self
    }
}

impl Matcher for TableMatcher {
    fn resolve(&self, target: &RawTarget, _current: &Location) -> Location {
        let path = target.path.clone().unwrap_or_else(|| "/".to_string());
        let chain = self
            .routes
            .iter()
            .find(|(registered, _)| *registered == path)
            .map(|(_, chain)| chain.clone())
            .unwrap_or_default();
        Location::new(
            path,
            target.query.clone(),
            target.hash.clone(),
            target.params.clone(),
            chain,
        )
    }
}

/// Shared call-order recorder.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(log: &CallLog, label: impl Into<String>) {
    log.lock().unwrap().push(label.into());
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Slot for a checkpoint to stash its continuation, suspending the
/// transition until the test resolves it.
pub type StashedNext = Arc<Mutex<Option<GuardNext>>>;

pub fn stash_slot() -> StashedNext {
    Arc::new(Mutex::new(None))
}

pub fn take_stashed(slot: &StashedNext) -> GuardNext {
    slot.lock()
        .unwrap()
        .take()
        .expect("a checkpoint should have stashed its continuation")
}

/// Address backend recording every `ensure` call as `(full_path, force_replace)`.
pub struct RecordingBackend {
    pub calls: Arc<Mutex<Vec<(String, bool)>>>,
}

impl RecordingBackend {
    pub fn new() -> (Self, Arc<Mutex<Vec<(String, bool)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl AddressBackend for RecordingBackend {
    fn ensure(&self, current: &Location, force_replace: bool) {
        self.calls
            .lock()
            .unwrap()
            .push((current.full_path.clone(), force_replace));
    }

    fn current_address(&self) -> String {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(path, _)| path.clone())
            .unwrap_or_else(|| "/".to_string())
    }
}
