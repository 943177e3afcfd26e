//! Controller registry - process-wide lookup of controllers by name.

use std::sync::LazyLock;

use dashmap::DashMap;
use tracing::{debug, warn};

use super::Controller;
use crate::error::{ControllerError, ControllerResult};
use crate::route::RouteInfo;

static GLOBAL: LazyLock<ControllerRegistry> = LazyLock::new(ControllerRegistry::new);

/// Named controller instances.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: DashMap<String, Controller>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static ControllerRegistry {
        &GLOBAL
    }

    /// Register a controller under its name, returning any controller it replaced.
    pub fn register(&self, controller: Controller) -> Option<Controller> {
        let name = controller.name().to_string();
        let previous = self.controllers.insert(name.clone(), controller);
        if previous.is_some() {
            warn!(controller = %name, "replaced previously registered controller");
        } else {
            debug!(controller = %name, "registered controller");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Controller> {
        self.controllers.get(name).map(|c| c.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Controller> {
        self.controllers.remove(name).map(|(_, c)| c)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Registered controllers without a parent, sorted by name.
    pub fn roots(&self) -> Vec<Controller> {
        let mut roots: Vec<Controller> = self
            .controllers
            .iter()
            .filter(|e| e.value().is_root())
            .map(|e| e.value().clone())
            .collect();
        roots.sort_by(|a, b| a.name().cmp(b.name()));
        roots
    }

    /// Build the URL of `route` on the controller named `controller`.
    pub fn gen_route<I, K, V>(&self, controller: &str, route: &str, params: I) -> ControllerResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let found = self
            .get(controller)
            .ok_or_else(|| ControllerError::ControllerNotFound {
                name: controller.to_string(),
            })?;
        found.gen_route(route, params)
    }

    /// Every registered controller's own routes, sorted by controller name.
    pub fn route_listing(&self) -> Vec<RouteInfo> {
        self.names()
            .iter()
            .filter_map(|name| self.get(name))
            .flat_map(|c| c.route_infos())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn clear(&self) {
        self.controllers.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::route::{NO_PARAMS, Route};

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn register_and_lookup() {
        let registry = ControllerRegistry::new();
        let users = Controller::new("users", "/users").unwrap();

        assert!(registry.register(users.clone()).is_none());
        assert!(registry.contains("users"));
        assert!(registry.get("users").unwrap().ptr_eq(&users));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn register_replaces() {
        let registry = ControllerRegistry::new();
        let first = Controller::new("users", "/users").unwrap();
        let second = Controller::new("users", "/people").unwrap();

        registry.register(first.clone());
        let replaced = registry.register(second.clone()).unwrap();
        assert!(replaced.ptr_eq(&first));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("users").unwrap().mount(), "/people");
    }

    #[test]
    fn roots_exclude_children() {
        let registry = ControllerRegistry::new();
        let admin = Controller::new("admin", "/admin").unwrap();
        let users = Controller::new("users", "/users").unwrap();
        let blog = Controller::new("blog", "/blog").unwrap();
        admin.add_child(&users).unwrap();

        registry.register(admin);
        registry.register(users);
        registry.register(blog);

        let roots: Vec<String> = registry.roots().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(roots, vec!["admin", "blog"]);
        assert_eq!(registry.names(), vec!["admin", "blog", "users"]);
    }

    #[test]
    fn gen_route_through_registry() {
        let registry = ControllerRegistry::new();
        let users = Controller::new("users", "/users")
            .unwrap()
            .with_route(Route::get("index", "/", ok))
            .unwrap();
        registry.register(users);

        assert_eq!(registry.gen_route("users", "index", NO_PARAMS).unwrap(), "/users");
        assert!(matches!(
            registry.gen_route("nobody", "index", NO_PARAMS),
            Err(ControllerError::ControllerNotFound { .. })
        ));
    }

    #[test]
    fn route_listing_is_sorted_by_controller() {
        let registry = ControllerRegistry::new();
        registry.register(
            Controller::new("zeta", "/z")
                .unwrap()
                .with_route(Route::get("index", "/", ok))
                .unwrap(),
        );
        registry.register(
            Controller::new("alpha", "/a")
                .unwrap()
                .with_route(Route::get("index", "/", ok))
                .unwrap(),
        );

        let listing = registry.route_listing();
        assert_eq!(listing[0].controller, "alpha");
        assert_eq!(listing[1].path, "/z");

        registry.remove("zeta");
        registry.clear();
        assert!(registry.is_empty());
    }
}
