//! Scenario tests for the transition state machine: checkpoint precedence,
//! cancellation, veto, redirect, and ready bookkeeping.

mod common;

use common::*;
use std::sync::Arc;
use waymark::{
    FragmentDefinition, FragmentResolver, Location, NavigationController, NavigationError,
    ResolveDone, RouteEntry, DEFAULT_SLOT,
};

#[test]
fn test_checkpoint_kinds_run_in_fixed_precedence() {
    let log = call_log();

    let parent_def = {
        let log = log.clone();
        Arc::new(
            FragmentDefinition::new("ParentPane").on_update(move |_inst, _to, _from, next| {
                record(&log, "update:parent");
                next.proceed();
            }),
        )
    };
    let a_def = {
        let log = log.clone();
        Arc::new(
            FragmentDefinition::new("APane").on_leave(move |_inst, _to, _from, next| {
                record(&log, "leave:a");
                next.proceed();
            }),
        )
    };
    let b_def = {
        let log = log.clone();
        Arc::new(FragmentDefinition::new("BPane").on_enter(move |_to, _from, next| {
            record(&log, "enter:b");
            next.proceed();
        }))
    };

    let parent = Arc::new(RouteEntry::new("/parent").fragment(parent_def));
    let a = Arc::new(RouteEntry::new("a").fragment(a_def));
    let b = {
        let log = log.clone();
        Arc::new(
            RouteEntry::new("b")
                .fragment(b_def)
                .before_enter(move |_to, _from, next| {
                    record(&log, "before_enter:b");
                    next.proceed();
                }),
        )
    };

    let matcher = TableMatcher::new()
        .route("/parent/a", vec![Arc::clone(&parent), Arc::clone(&a)])
        .route("/parent/b", vec![Arc::clone(&parent), Arc::clone(&b)]);
    let controller = NavigationController::builder(matcher).build();

    controller.transition_to("/parent/a");
    assert_eq!(controller.current_location().full_path, "/parent/a");

    // Live instances so leave/update guards can bind.
    parent.set_instance(DEFAULT_SLOT, Arc::new("parent"));
    a.set_instance(DEFAULT_SLOT, Arc::new("a"));

    {
        let log = log.clone();
        controller.before_each(move |_to, _from, next| {
            record(&log, "before");
            next.proceed();
        });
    }
    {
        let log = log.clone();
        controller.before_resolve(move |_to, _from, next| {
            record(&log, "resolve");
            next.proceed();
        });
    }
    {
        let log = log.clone();
        controller.after_each(move |to, _from| {
            record(&log, format!("after:{}", to.full_path));
        });
    }
    {
        let log = log.clone();
        controller.listen(move |to| {
            record(&log, format!("listen:{}", to.full_path));
        });
    }

    controller.transition_to("/parent/b");

    assert_eq!(
        entries(&log),
        [
            "leave:a",
            "before",
            "update:parent",
            "before_enter:b",
            "enter:b",
            "resolve",
            "listen:/parent/b",
            "after:/parent/b",
        ]
        .map(String::from)
        .to_vec()
    );
}

#[test]
fn test_same_location_navigation_is_a_noop() {
    let log = call_log();
    let home = {
        let log = log.clone();
        Arc::new(RouteEntry::new("/home").before_enter(move |_to, _from, next| {
            record(&log, "guard");
            next.proceed();
        }))
    };
    let matcher = TableMatcher::new().route("/home", vec![home]);
    let controller = NavigationController::builder(matcher).build();

    controller.transition_to("/home");
    assert_eq!(entries(&log), vec!["guard".to_string()]);

    let aborts = call_log();
    let seen = aborts.clone();
    controller.transition_to_with(
        "/home",
        Some(Box::new(|_route: &Location| {
            panic!("same-location navigation must not commit")
        })),
        Some(Box::new(move |err: Option<&NavigationError>| {
            assert!(err.is_none(), "no-op abort carries no error");
            record(&seen, "abort");
        })),
    );

    // No checkpoint ran a second time, and the abort was silent.
    assert_eq!(entries(&log), vec!["guard".to_string()]);
    assert_eq!(entries(&aborts), vec!["abort".to_string()]);
    assert_eq!(controller.current_location().full_path, "/home");
}

#[test]
fn test_newer_transition_supersedes_pending_one() {
    let stash = stash_slot();
    let slow = {
        let stash = stash.clone();
        Arc::new(RouteEntry::new("/slow").before_enter(move |_to, _from, next| {
            *stash.lock().unwrap() = Some(next);
        }))
    };
    let fast = Arc::new(RouteEntry::new("/fast"));
    let matcher = TableMatcher::new()
        .route("/slow", vec![slow])
        .route("/fast", vec![fast]);
    let controller = NavigationController::builder(matcher).build();

    let outcomes = call_log();
    {
        let outcomes = outcomes.clone();
        controller.transition_to_with(
            "/slow",
            Some(Box::new(|_route: &Location| {
                panic!("superseded navigation must never complete")
            })),
            Some(Box::new(move |err: Option<&NavigationError>| {
                assert!(err.is_none(), "supersession aborts silently");
                record(&outcomes, "slow:aborted");
            })),
        );
    }
    assert!(controller.has_pending());
    assert_eq!(controller.current_location().full_path, "/");

    controller.transition_to("/fast");
    assert_eq!(controller.current_location().full_path, "/fast");

    // The stale checkpoint finally resolves; nothing may change.
    take_stashed(&stash).proceed();
    assert_eq!(controller.current_location().full_path, "/fast");
    assert_eq!(entries(&outcomes), vec!["slow:aborted".to_string()]);
}

#[test]
fn test_vetoing_checkpoint_aborts_without_commit() {
    let gate = Arc::new(RouteEntry::new("/gated").before_enter(|_to, _from, next| next.abort()));
    let matcher = TableMatcher::new().route("/gated", vec![gate]);
    let (backend, backend_calls) = RecordingBackend::new();
    let controller = NavigationController::builder(matcher).backend(backend).build();

    let errors = call_log();
    {
        let errors = errors.clone();
        controller.on_error(move |err| record(&errors, format!("error:{}", err)));
    }

    let aborts = call_log();
    {
        let aborts = aborts.clone();
        controller.transition_to_with(
            "/gated",
            Some(Box::new(|_route: &Location| {
                panic!("vetoed navigation must not commit")
            })),
            Some(Box::new(move |err: Option<&NavigationError>| {
                assert!(err.is_some(), "a veto carries an error");
                record(&aborts, "abort");
            })),
        );
    }

    assert_eq!(controller.current_location().full_path, "/");
    assert_eq!(
        entries(&errors),
        vec!["error:navigation from '/' to '/gated' aborted".to_string()]
    );
    assert_eq!(entries(&aborts), vec!["abort".to_string()]);
    // The speculative address change is rolled back with a forced replace.
    assert_eq!(
        backend_calls.lock().unwrap().as_slice(),
        &[("/".to_string(), true)]
    );
}

#[test]
fn test_entry_enter_redirect_lands_on_resolved_target() {
    let x = Arc::new(RouteEntry::new("/x").before_enter(|_to, _from, next| next.redirect("/y")));
    let y = Arc::new(RouteEntry::new("/y"));
    let matcher = TableMatcher::new()
        .route("/x", vec![x])
        .route("/y", vec![y]);
    let controller = NavigationController::builder(matcher).build();

    let commits = call_log();
    {
        let commits = commits.clone();
        controller.listen(move |to| record(&commits, to.full_path.clone()));
    }
    let aborts = call_log();
    {
        let aborts = aborts.clone();
        controller.transition_to_with(
            "/x",
            Some(Box::new(|_route: &Location| {
                panic!("redirected navigation must not commit its original target")
            })),
            Some(Box::new(move |err: Option<&NavigationError>| {
                assert!(err.is_none(), "a redirect aborts silently");
                record(&aborts, "abort");
            })),
        );
    }

    let current = controller.current_location();
    assert_eq!(current.full_path, "/y");
    assert_eq!(current.matched.len(), 1, "redirect target is fully resolved");
    assert_eq!(entries(&commits), vec!["/y".to_string()]);
    assert_eq!(entries(&aborts), vec!["abort".to_string()]);
}

#[test]
fn test_self_redirect_chain_is_cut_off() {
    let a = Arc::new(RouteEntry::new("/a").before_enter(|_to, _from, next| next.redirect("/a")));
    let matcher = TableMatcher::new().route("/a", vec![a]);
    let controller = NavigationController::builder(matcher).build();

    let errors = call_log();
    {
        let errors = errors.clone();
        controller.on_error(move |err| record(&errors, err.to_string()));
    }

    controller.transition_to("/a");

    assert_eq!(controller.current_location().full_path, "/");
    assert_eq!(
        entries(&errors),
        vec!["redirect loop detected while navigating to '/a'".to_string()]
    );
}

#[test]
fn test_ready_queue_drains_once_then_registrations_fire_immediately() {
    let home = Arc::new(RouteEntry::new("/home"));
    let matcher = TableMatcher::new().route("/home", vec![home]);
    let controller = NavigationController::builder(matcher).build();

    let log = call_log();
    {
        let log = log.clone();
        controller.on_ready(move |route: &Location| {
            record(&log, format!("queued:{}", route.full_path));
        });
    }
    assert!(entries(&log).is_empty());
    assert!(!controller.is_ready());

    controller.transition_to("/home");
    assert!(controller.is_ready());
    assert_eq!(entries(&log), vec!["queued:/home".to_string()]);

    {
        let log = log.clone();
        controller.on_ready(move |route: &Location| {
            record(&log, format!("late:{}", route.full_path));
        });
    }
    assert_eq!(
        entries(&log),
        vec!["queued:/home".to_string(), "late:/home".to_string()]
    );
}

#[test]
fn test_first_failure_drains_ready_error_queue() {
    let gate = Arc::new(RouteEntry::new("/gated").before_enter(|_to, _from, next| {
        next.fail(NavigationError::custom("denied"))
    }));
    let matcher = TableMatcher::new().route("/gated", vec![gate]);
    let controller = NavigationController::builder(matcher).build();
    controller.on_error(|_err| {});

    let log = call_log();
    {
        let ready_log = log.clone();
        let fail_log = log.clone();
        controller.on_ready_with(
            move |_route: &Location| record(&ready_log, "ready"),
            move |err: &NavigationError| record(&fail_log, format!("failed:{}", err)),
        );
    }

    controller.transition_to("/gated");
    assert!(controller.is_ready());
    assert_eq!(entries(&log), vec!["failed:denied".to_string()]);
}

#[test]
fn test_async_checkpoint_suspends_then_commits() {
    let stash = stash_slot();
    let slow = {
        let stash = stash.clone();
        Arc::new(RouteEntry::new("/slow").before_enter(move |_to, _from, next| {
            *stash.lock().unwrap() = Some(next);
        }))
    };
    let matcher = TableMatcher::new().route("/slow", vec![slow]);
    let controller = NavigationController::builder(matcher).build();

    controller.transition_to("/slow");
    assert!(controller.has_pending());
    assert_eq!(controller.current_location().full_path, "/");

    take_stashed(&stash).proceed();
    assert!(!controller.has_pending());
    assert_eq!(controller.current_location().full_path, "/slow");
}

struct FailingResolver;

impl FragmentResolver for FailingResolver {
    fn load(&self, _activated: &[Arc<RouteEntry>], done: ResolveDone) {
        done.fail(NavigationError::load_failed("chunk 404"));
    }
}

#[test]
fn test_fragment_load_failure_aborts_via_vetoed_path() {
    let lazy = Arc::new(RouteEntry::new("/lazy"));
    let matcher = TableMatcher::new().route("/lazy", vec![lazy]);
    let controller = NavigationController::builder(matcher)
        .resolver(FailingResolver)
        .build();

    let errors = call_log();
    {
        let errors = errors.clone();
        controller.on_error(move |err| record(&errors, err.to_string()));
    }

    let aborts = call_log();
    {
        let aborts = aborts.clone();
        controller.transition_to_with(
            "/lazy",
            Some(Box::new(|_route: &Location| {
                panic!("failed load must not commit")
            })),
            Some(Box::new(move |err: Option<&NavigationError>| {
                assert!(matches!(err, Some(NavigationError::LoadFailed { .. })));
                record(&aborts, "abort");
            })),
        );
    }

    assert_eq!(controller.current_location().full_path, "/");
    assert_eq!(
        entries(&errors),
        vec!["fragment load failed: chunk 404".to_string()]
    );
    assert_eq!(entries(&aborts), vec!["abort".to_string()]);
}

#[test]
fn test_leave_guard_without_instance_is_skipped() {
    let a_def = Arc::new(FragmentDefinition::new("APane").on_leave(
        |_inst, _to, _from, _next: waymark::GuardNext| panic!("unbound guard must not run"),
    ));
    let a = Arc::new(RouteEntry::new("/a").fragment(a_def));
    let b = Arc::new(RouteEntry::new("/b"));
    let matcher = TableMatcher::new()
        .route("/a", vec![a])
        .route("/b", vec![b]);
    let controller = NavigationController::builder(matcher).build();

    controller.transition_to("/a");
    // No instance was ever mounted on /a, so its leave guard is a gap.
    controller.transition_to("/b");
    assert_eq!(controller.current_location().full_path, "/b");
}
