//! Controller factories.
//!
//! Manifests name a factory; the factory builds the controller and declares
//! its routes. Factories are registered at compile time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::manifest::ControllerManifest;
use crate::controller::Controller;
use crate::error::ControllerResult;

/// Builds a controller from its manifest.
pub type ControllerFactory =
    Arc<dyn Fn(&ControllerManifest) -> ControllerResult<Controller> + Send + Sync>;

/// Factories by name.
#[derive(Clone, Default)]
pub struct ControllerFactories {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerFactories {
    /// Create an empty factory map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory map preloaded with the built-in controllers.
    pub fn with_builtins() -> Self {
        let mut factories = Self::new();
        crate::builtin::register(&mut factories);
        factories
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ControllerManifest) -> ControllerResult<Controller> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<ControllerFactory> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered factory names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ControllerFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerFactories")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn register_and_build() {
        let mut factories = ControllerFactories::new();
        factories.register("blank", |m: &ControllerManifest| Controller::new(&m.name, "/blank"));

        let manifest = ControllerManifest::parse_str(
            "name = \"pages\"\nfactory = \"blank\"",
            Path::new("pages.controller.toml"),
        )
        .unwrap();

        let factory = factories.get(manifest.factory_name()).unwrap();
        let controller = factory(&manifest).unwrap();
        assert_eq!(controller.name(), "pages");
        assert_eq!(controller.mount(), "/blank");
        assert!(factories.get("missing").is_none());
    }

    #[test]
    fn builtins_are_registered() {
        let factories = ControllerFactories::with_builtins();
        assert_eq!(factories.names(), vec!["health", "routes", "shortcuts"]);
        assert!(factories.contains("health"));
        assert_eq!(factories.len(), 3);
    }
}
