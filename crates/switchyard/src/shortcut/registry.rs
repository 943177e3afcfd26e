//! Shortcut registry - collects menu shortcuts and groups them by category.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::controller::ControllerRegistry;

static GLOBAL: LazyLock<ShortcutRegistry> = LazyLock::new(ShortcutRegistry::new);

/// Menu metadata contributed by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    /// Human-readable title
    pub title: String,
    /// Icon identifier for the UI (free-form)
    #[serde(default)]
    pub icon: String,
    /// Menu group
    #[serde(default = "default_category")]
    pub category: String,
    /// Sort priority (higher = listed first)
    #[serde(default)]
    pub priority: i32,
    /// Controller that owns the target route
    #[serde(default)]
    pub controller: String,
    /// Named route on `controller` this shortcut links to
    #[serde(default)]
    pub route: Option<String>,
    /// Parameters for the named route
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Literal link; takes precedence over `route`
    #[serde(default)]
    pub url: Option<String>,
}

fn default_category() -> String {
    "general".to_string()
}

impl Shortcut {
    /// Create a shortcut with no link target.
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: String::new(),
            category: category.into(),
            priority: 0,
            controller: String::new(),
            route: None,
            params: BTreeMap::new(),
            url: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Link to a named route.
    pub fn link_route(mut self, controller: impl Into<String>, route: impl Into<String>) -> Self {
        self.controller = controller.into();
        self.route = Some(route.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Link to a literal URL.
    pub fn link_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Compute the link target, if any.
    pub fn href(&self, controllers: &ControllerRegistry) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        let route = self.route.as_ref()?;
        match controllers.gen_route(&self.controller, route, self.params.clone()) {
            Ok(href) => Some(href),
            Err(e) => {
                warn!(
                    shortcut = %self.title,
                    error = %e,
                    "failed to resolve shortcut link"
                );
                None
            }
        }
    }

    fn ordering(a: &Shortcut, b: &Shortcut) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.title.cmp(&b.title))
    }
}

/// A shortcut with its link resolved, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcutEntry {
    pub title: String,
    pub icon: String,
    pub category: String,
    pub priority: i32,
    pub href: Option<String>,
}

/// Registry of shortcuts from all controllers.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    entries: RwLock<Vec<Shortcut>>,
}

impl ShortcutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static ShortcutRegistry {
        &GLOBAL
    }

    /// Register a shortcut.
    pub fn add(&self, shortcut: Shortcut) {
        debug!(
            title = %shortcut.title,
            category = %shortcut.category,
            priority = shortcut.priority,
            "registered shortcut"
        );
        self.entries.write().push(shortcut);
    }

    /// Register several shortcuts.
    pub fn extend(&self, shortcuts: impl IntoIterator<Item = Shortcut>) {
        for shortcut in shortcuts {
            self.add(shortcut);
        }
    }

    /// Drop every shortcut owned by `controller`, returning how many were removed.
    pub fn remove_controller(&self, controller: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|s| s.controller != controller);
        before - entries.len()
    }

    /// Sorted category names.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .entries
            .read()
            .iter()
            .map(|s| s.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Shortcuts in one category, highest priority first.
    pub fn in_category(&self, category: &str) -> Vec<Shortcut> {
        let mut list: Vec<Shortcut> = self
            .entries
            .read()
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect();
        list.sort_by(Shortcut::ordering);
        list
    }

    /// All shortcuts grouped by category, each group highest priority first.
    pub fn grouped(&self) -> BTreeMap<String, Vec<Shortcut>> {
        let mut groups: BTreeMap<String, Vec<Shortcut>> = BTreeMap::new();
        for shortcut in self.entries.read().iter() {
            groups
                .entry(shortcut.category.clone())
                .or_default()
                .push(shortcut.clone());
        }
        for list in groups.values_mut() {
            list.sort_by(Shortcut::ordering);
        }
        groups
    }

    /// Grouped shortcuts with links resolved against `controllers`.
    pub fn resolve(&self, controllers: &ControllerRegistry) -> BTreeMap<String, Vec<ShortcutEntry>> {
        self.grouped()
            .into_iter()
            .map(|(category, list)| {
                let entries = list
                    .into_iter()
                    .map(|s| ShortcutEntry {
                        href: s.href(controllers),
                        title: s.title,
                        icon: s.icon,
                        category: s.category,
                        priority: s.priority,
                    })
                    .collect();
                (category, entries)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::route::Route;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn grouped_and_sorted_by_priority() {
        let registry = ShortcutRegistry::new();
        registry.add(Shortcut::new("Users", "admin").with_priority(5));
        registry.add(Shortcut::new("Settings", "admin").with_priority(10));
        registry.add(Shortcut::new("Audit", "admin").with_priority(5));
        registry.add(Shortcut::new("Home", "site"));

        let groups = registry.grouped();
        assert_eq!(groups.len(), 2);

        let admin: Vec<&str> = groups["admin"].iter().map(|s| s.title.as_str()).collect();
        assert_eq!(admin, vec!["Settings", "Audit", "Users"]);
        assert_eq!(groups["site"].len(), 1);
    }

    #[test]
    fn categories_are_unique_and_sorted() {
        let registry = ShortcutRegistry::new();
        registry.add(Shortcut::new("B", "tools"));
        registry.add(Shortcut::new("A", "admin"));
        registry.add(Shortcut::new("C", "tools"));

        assert_eq!(registry.categories(), vec!["admin", "tools"]);
        assert_eq!(registry.in_category("tools").len(), 2);
        assert!(registry.in_category("missing").is_empty());
    }

    #[test]
    fn remove_controller_drops_owned_shortcuts() {
        let registry = ShortcutRegistry::new();
        registry.add(Shortcut::new("Users", "admin").link_route("users", "index"));
        registry.add(Shortcut::new("Docs", "help").link_url("https://example.com/docs"));

        assert_eq!(registry.remove_controller("users"), 1);
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn resolve_links() {
        let controllers = ControllerRegistry::new();
        let users = Controller::new("users", "/users")
            .unwrap()
            .with_route(Route::get("show", "/{id}", ok))
            .unwrap();
        controllers.register(users);

        let registry = ShortcutRegistry::new();
        registry.add(
            Shortcut::new("Me", "account")
                .link_route("users", "show")
                .with_param("id", "me"),
        );
        registry.add(Shortcut::new("Docs", "account").link_url("/docs"));
        registry.add(Shortcut::new("Broken", "account").link_route("users", "missing"));
        registry.add(Shortcut::new("Label", "account"));

        let resolved = registry.resolve(&controllers);
        let hrefs: Vec<(&str, Option<&str>)> = resolved["account"]
            .iter()
            .map(|e| (e.title.as_str(), e.href.as_deref()))
            .collect();

        assert!(hrefs.contains(&("Me", Some("/users/me"))));
        assert!(hrefs.contains(&("Docs", Some("/docs"))));
        assert!(hrefs.contains(&("Broken", None)));
        assert!(hrefs.contains(&("Label", None)));
    }

    #[test]
    fn deserialize_with_defaults() {
        let shortcut: Shortcut = toml::from_str(r#"title = "Users""#).unwrap();
        assert_eq!(shortcut.category, "general");
        assert_eq!(shortcut.priority, 0);
        assert!(shortcut.route.is_none());
    }
}
