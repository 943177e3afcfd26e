//! CLI command implementations.
//!
//! These commands bootstrap the controllers and print what was registered,
//! without starting the server.

use crate::controller::ControllerRegistry;
use crate::shortcut::ShortcutRegistry;

/// Print every registered route.
pub fn cmd_routes(controllers: &ControllerRegistry) {
    let listing = controllers.route_listing();
    if listing.is_empty() {
        println!("No routes registered.");
        return;
    }

    println!(
        "{:<16} {:<16} {:<12} {}",
        "CONTROLLER", "ROUTE", "METHODS", "PATH"
    );
    println!("{}", "-".repeat(64));

    for route in &listing {
        println!(
            "{:<16} {:<16} {:<12} {}",
            route.controller, route.name, route.methods, route.path
        );
    }
}

/// Print shortcuts grouped by category with their resolved links.
pub fn cmd_shortcuts(shortcuts: &ShortcutRegistry, controllers: &ControllerRegistry) {
    let grouped = shortcuts.resolve(controllers);
    if grouped.is_empty() {
        println!("No shortcuts registered.");
        return;
    }

    for (category, entries) in &grouped {
        println!("[{category}]");
        for entry in entries {
            let href = entry.href.as_deref().unwrap_or("(unresolved)");
            println!("  {:>4}  {:<24} {}", entry.priority, entry.title, href);
        }
    }
}
