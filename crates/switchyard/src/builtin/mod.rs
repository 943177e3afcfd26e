//! Built-in controllers.
//!
//! Introspection endpoints available to every deployment. Each is enabled by
//! dropping a manifest naming its factory into the controllers directory.

mod health;
mod routes;
mod shortcuts;

use crate::discovery::ControllerFactories;

/// Register the built-in factories.
pub fn register(factories: &mut ControllerFactories) {
    factories
        .register("health", health::controller)
        .register("routes", routes::controller)
        .register("shortcuts", shortcuts::controller);
}
