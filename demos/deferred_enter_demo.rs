//! Deferred Enter Demo
//!
//! An enter checkpoint asks for its fragment instance before the instance
//! exists; the callback is delivered once the host mounts it, driven by a
//! manual tick scheduler standing in for a render loop.

use std::sync::Arc;
use waymark::{
    FragmentDefinition, FragmentHandle, ManualScheduler, NavigationController, RouteDef, RouteMap,
    DEFAULT_SLOT,
};

struct StatsPanel {
    title: &'static str,
}

fn main() {
    env_logger::init();

    let panel_def = Arc::new(FragmentDefinition::new("StatsPanel").on_enter(
        |_to, _from, next| {
            println!("enter checkpoint ran; instance not created yet");
            next.when_ready(|instance: &FragmentHandle| {
                if let Some(panel) = instance.downcast_ref::<StatsPanel>() {
                    println!("instance became available: {}", panel.title);
                }
            });
        },
    ));

    let map = RouteMap::builder()
        .route(RouteDef::new("/stats").fragment(Arc::clone(&panel_def)))
        .build()
        .expect("route table is well-formed");

    let scheduler = Arc::new(ManualScheduler::new());
    let controller = NavigationController::builder(map)
        .scheduler(scheduler.clone())
        .build();

    controller.transition_to("/stats");
    println!("committed: {}", controller.current_location().full_path);

    println!("tick: nothing mounted yet, callback parks");
    scheduler.tick();

    let entry = Arc::clone(&controller.current_location().matched[0]);
    println!("host mounts the panel");
    controller.fragment_mounted(&entry, DEFAULT_SLOT, Arc::new(StatsPanel { title: "CPU load" }));

    scheduler.tick();
}
