//! Stack History Demo
//!
//! Walks the cursor-based history: pushes, back/forward moves, forward
//! truncation, and out-of-range no-ops.

use waymark::{NavigationController, NavigationStack, RouteDef, RouteMap};

fn main() {
    env_logger::init();

    let map = RouteMap::builder()
        .route(RouteDef::new("/a"))
        .route(RouteDef::new("/b"))
        .route(RouteDef::new("/c"))
        .build()
        .expect("route table is well-formed");

    let stack = NavigationStack::new(NavigationController::builder(map).build());

    stack.push("/a");
    stack.push("/b");
    println!("after push /a, /b        -> {}", stack.current_location());

    stack.go(-1);
    println!("after go(-1)             -> {}", stack.current_location());

    stack.go(-5);
    println!("after go(-5) (no-op)     -> {}", stack.current_location());

    stack.push("/c");
    println!("after push /c            -> {}", stack.current_location());

    stack.go(1);
    println!(
        "after go(1) (forward gone) -> {} (len {})",
        stack.current_location(),
        stack.len()
    );

    stack.replace("/a");
    println!(
        "after replace /a         -> {} (len {})",
        stack.current_location(),
        stack.len()
    );
}
