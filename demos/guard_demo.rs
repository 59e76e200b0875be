//! Checkpoint Demo
//!
//! Demonstrates a login-wall checkpoint: navigating to a protected route
//! redirects to /login until the auth flag flips, and a veto checkpoint
//! blocks leaving a form with unsaved changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use waymark::{NavigationController, NavigationStack, RouteDef, RouteMap};

fn main() {
    env_logger::init();

    let authenticated = Arc::new(AtomicBool::new(false));
    let dirty_form = Arc::new(AtomicBool::new(true));

    let auth = Arc::clone(&authenticated);
    let map = RouteMap::builder()
        .route(RouteDef::new("/"))
        .route(RouteDef::new("/login"))
        .route(RouteDef::new("/form"))
        .route(
            RouteDef::new("/admin").before_enter(move |_to, _from, next| {
                if auth.load(Ordering::SeqCst) {
                    next.proceed();
                } else {
                    next.redirect("/login");
                }
            }),
        )
        .build()
        .expect("route table is well-formed");

    let stack = NavigationStack::new(NavigationController::builder(map).build());
    let controller = stack.controller().clone();

    let unsaved = Arc::clone(&dirty_form);
    controller.before_each(move |_to, from, next| {
        if from.path == "/form" && unsaved.load(Ordering::SeqCst) {
            println!("  -> blocked: the form has unsaved changes");
            next.abort();
        } else {
            next.proceed();
        }
    });
    controller.on_error(|err| println!("  !! {}", err));

    stack.push("/");
    println!("at {}", stack.current_location());

    println!("push /admin while logged out");
    stack.push("/admin");
    println!("at {} (redirected)", stack.current_location());

    authenticated.store(true, Ordering::SeqCst);
    println!("push /admin after logging in");
    stack.push("/admin");
    println!("at {}", stack.current_location());

    println!("push /form, edit it, then try to leave");
    stack.push("/form");
    stack.push("/");
    println!("at {} (veto kept us here)", stack.current_location());

    dirty_form.store(false, Ordering::SeqCst);
    println!("save the form, then leave");
    stack.push("/");
    println!("at {}", stack.current_location());
}
