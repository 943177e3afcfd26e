//! Controller discovery.
//!
//! Controllers are declared by `{name}.controller.toml` manifests in a single
//! directory and built by named [`ControllerFactories`]. [`bootstrap`] turns a
//! directory of manifests into a mounted hierarchy and fills the registries.

mod factory;
mod manifest;
mod order;

pub use factory::{ControllerFactories, ControllerFactory};
pub use manifest::{ControllerManifest, MANIFEST_SUFFIX};
pub use order::mount_order;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::controller::{Controller, ControllerRegistry};
use crate::error::{ControllerError, ControllerResult};
use crate::shortcut::ShortcutRegistry;

/// Scan `dir` for controller manifests.
///
/// Only the directory itself is scanned. Files are visited in name order;
/// manifests that fail to parse are logged and skipped. A missing directory
/// yields nothing.
pub fn discover(dir: &Path) -> Vec<(ControllerManifest, PathBuf)> {
    let mut discovered = Vec::new();

    if !dir.exists() {
        info!(?dir, "controllers directory does not exist, nothing to discover");
        return discovered;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "failed to read controllers directory");
            return discovered;
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX))
        })
        .collect();
    files.sort();

    for path in files {
        match ControllerManifest::parse(&path) {
            Ok(manifest) => {
                debug!(controller = %manifest.name, path = %path.display(), "discovered controller");
                discovered.push((manifest, path));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping invalid controller manifest");
            }
        }
    }

    info!(count = discovered.len(), "discovered controller manifests");
    discovered
}

/// Discover, build, mount and register every controller declared in `dir`.
///
/// Returns the root controllers in name order.
pub fn bootstrap(
    dir: &Path,
    factories: &ControllerFactories,
    controllers: &ControllerRegistry,
    shortcuts: &ShortcutRegistry,
) -> ControllerResult<Vec<Controller>> {
    let manifests = discover(dir).into_iter().map(|(m, _)| m).collect();
    bootstrap_manifests(manifests, factories, controllers, shortcuts)
}

/// Build, mount and register controllers from already parsed manifests.
///
/// Disabled manifests and manifests with an unknown factory are skipped with
/// a warning, and so is every descendant of a skipped manifest. A parent that
/// was never declared is an error. On any error the registries are left as
/// they were.
pub fn bootstrap_manifests(
    manifests: Vec<ControllerManifest>,
    factories: &ControllerFactories,
    controllers: &ControllerRegistry,
    shortcuts: &ShortcutRegistry,
) -> ControllerResult<Vec<Controller>> {
    let declared: BTreeSet<String> = manifests.iter().map(|m| m.name.clone()).collect();
    let mut skipped = BTreeSet::new();
    let mut active = Vec::with_capacity(manifests.len());

    for manifest in manifests {
        if !manifest.enabled {
            info!(controller = %manifest.name, "controller disabled, skipping");
            skipped.insert(manifest.name);
            continue;
        }
        if !factories.contains(manifest.factory_name()) {
            warn!(
                controller = %manifest.name,
                factory = %manifest.factory_name(),
                known = %factories.names().join(", "),
                "unknown controller factory, skipping"
            );
            skipped.insert(manifest.name);
            continue;
        }
        active.push(manifest);
    }

    // Drop descendants of skipped controllers until nothing changes
    loop {
        let before = active.len();
        active.retain(|m| match m.parent.as_deref() {
            Some(parent) if skipped.contains(parent) => {
                warn!(controller = %m.name, parent = %parent, "parent controller skipped, skipping");
                skipped.insert(m.name.clone());
                false
            }
            _ => true,
        });
        if active.len() == before {
            break;
        }
    }

    // Parents that were declared but skipped are handled above; anything
    // else missing is a configuration error
    for manifest in &active {
        if let Some(parent) = manifest.parent.as_deref()
            && !declared.contains(parent)
        {
            return Err(ControllerError::MissingParent {
                controller: manifest.name.clone(),
                parent: parent.to_string(),
            });
        }
    }

    let order = mount_order(&active)?;
    let by_name: HashMap<&str, &ControllerManifest> =
        active.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut built: HashMap<String, Controller> = HashMap::with_capacity(order.len());
    let mut roots = Vec::new();

    for name in &order {
        let Some(manifest) = by_name.get(name.as_str()) else {
            continue;
        };
        let controller = instantiate(manifest, factories)?;

        match manifest.parent.as_deref().and_then(|p| built.get(p)) {
            Some(parent) => parent.add_child(&controller)?,
            None => roots.push(controller.clone()),
        }
        built.insert(name.clone(), controller);
    }

    // The registries stay untouched until the whole hierarchy is built and
    // its routes fit in one router
    Controller::check_conflicts(&roots)?;

    // Re-registering a controller replaces the shortcuts that point at it
    for name in &order {
        shortcuts.remove_controller(name);
    }

    for name in &order {
        let (Some(manifest), Some(controller)) = (by_name.get(name.as_str()), built.get(name))
        else {
            continue;
        };
        controllers.register(controller.clone());
        shortcuts.extend(manifest.shortcuts.iter().cloned().map(|mut shortcut| {
            if shortcut.controller.is_empty() {
                shortcut.controller = manifest.name.clone();
            }
            shortcut
        }));
    }

    info!(
        controllers = built.len(),
        roots = roots.len(),
        skipped = skipped.len(),
        "controllers bootstrapped"
    );
    Ok(roots)
}

/// Run the manifest's factory and apply manifest overrides.
fn instantiate(
    manifest: &ControllerManifest,
    factories: &ControllerFactories,
) -> ControllerResult<Controller> {
    let factory =
        factories
            .get(manifest.factory_name())
            .ok_or_else(|| ControllerError::UnknownFactory {
                controller: manifest.name.clone(),
                factory: manifest.factory_name().to_string(),
                known: factories.names().join(", "),
            })?;

    let controller = factory(manifest)?;
    if controller.name() != manifest.name {
        return Err(ControllerError::InvalidManifest {
            path: format!("{}{MANIFEST_SUFFIX}", manifest.name),
            details: format!(
                "factory '{}' built a controller named '{}'",
                manifest.factory_name(),
                controller.name()
            ),
        });
    }

    if let Some(mount) = &manifest.mount {
        controller.set_mount(mount)?;
    }
    if !manifest.description.is_empty() {
        controller.set_description(&manifest.description);
    }

    debug!(
        controller = %controller.name(),
        factory = %manifest.factory_name(),
        mount = %controller.mount(),
        "instantiated controller"
    );
    Ok(controller)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::route::Route;

    async fn ok() -> &'static str {
        "ok"
    }

    fn factories() -> ControllerFactories {
        let mut factories = ControllerFactories::new();
        factories.register("section", |m: &ControllerManifest| {
            let mount = m.setting_str("mount").unwrap_or("/");
            Controller::new(&m.name, mount)?.with_route(Route::get("index", "/", ok))
        });
        factories
    }

    fn manifest(toml: &str) -> ControllerManifest {
        ControllerManifest::parse_str(toml, Path::new("test.controller.toml")).unwrap()
    }

    #[test]
    fn discover_missing_dir() {
        assert!(discover(Path::new("/nonexistent/switchyard/controllers")).is_empty());
    }

    #[test]
    fn bootstrap_skips_disabled_subtrees() {
        let manifests = vec![
            manifest("name = \"admin\"\nfactory = \"section\"\nenabled = false"),
            manifest("name = \"users\"\nfactory = \"section\"\nparent = \"admin\""),
            manifest("name = \"roles\"\nfactory = \"section\"\nparent = \"users\""),
            manifest("name = \"blog\"\nfactory = \"missing\""),
            manifest("name = \"posts\"\nfactory = \"section\"\nparent = \"blog\""),
            manifest("name = \"site\"\nfactory = \"section\""),
        ];

        let controllers = ControllerRegistry::new();
        let shortcuts = ShortcutRegistry::new();
        let roots =
            bootstrap_manifests(manifests, &factories(), &controllers, &shortcuts).unwrap();

        assert_eq!(roots.len(), 1);
        assert_eq!(controllers.names(), vec!["site"]);
    }

    #[test]
    fn bootstrap_missing_parent_fails() {
        let manifests = vec![manifest(
            "name = \"users\"\nfactory = \"section\"\nparent = \"ghost\"",
        )];
        let result = bootstrap_manifests(
            manifests,
            &factories(),
            &ControllerRegistry::new(),
            &ShortcutRegistry::new(),
        );
        assert!(matches!(result, Err(ControllerError::MissingParent { .. })));
    }

    #[test]
    fn factory_must_keep_manifest_name() {
        let mut factories = ControllerFactories::new();
        factories.register("fixed", |_: &ControllerManifest| Controller::new("fixed", "/"));

        let result = bootstrap_manifests(
            vec![manifest("name = \"pages\"\nfactory = \"fixed\"")],
            &factories,
            &ControllerRegistry::new(),
            &ShortcutRegistry::new(),
        );
        assert!(matches!(result, Err(ControllerError::InvalidManifest { .. })));
    }

    #[test]
    fn rebootstrap_replaces_shortcuts() {
        let toml = "name = \"site\"\nfactory = \"section\"\n[[shortcuts]]\ntitle = \"Home\"\nroute = \"index\"";
        let controllers = ControllerRegistry::new();
        let shortcuts = ShortcutRegistry::new();

        for _ in 0..2 {
            bootstrap_manifests(vec![manifest(toml)], &factories(), &controllers, &shortcuts)
                .unwrap();
        }
        assert_eq!(shortcuts.len(), 1);
        assert_eq!(controllers.len(), 1);
    }

    #[test]
    fn failed_bootstrap_leaves_registries_untouched() {
        let controllers = ControllerRegistry::new();
        let shortcuts = ShortcutRegistry::new();
        let home = "name = \"home\"\nfactory = \"section\"\n[[shortcuts]]\ntitle = \"Home\"\nroute = \"index\"";
        bootstrap_manifests(vec![manifest(home)], &factories(), &controllers, &shortcuts).unwrap();
        let before = controllers.get("home").unwrap();

        let mut failing = factories();
        failing.register("broken", |m: &ControllerManifest| Controller::new(&m.name, "/:id"));
        let manifests = vec![
            manifest(home),
            manifest("name = \"zzz\"\nfactory = \"broken\""),
        ];
        let err = bootstrap_manifests(manifests, &failing, &controllers, &shortcuts).unwrap_err();

        assert!(matches!(err, ControllerError::InvalidPath { .. }));
        assert_eq!(controllers.names(), vec!["home"]);
        assert!(controllers.get("home").unwrap().ptr_eq(&before));
        assert_eq!(shortcuts.len(), 1);
    }

    #[test]
    fn conflicting_manifests_are_rejected() {
        let manifests = vec![
            manifest("name = \"a\"\nfactory = \"section\"\nmount = \"/health\""),
            manifest("name = \"b\"\nfactory = \"section\"\nmount = \"/health\""),
        ];
        let controllers = ControllerRegistry::new();
        let shortcuts = ShortcutRegistry::new();

        let err = bootstrap_manifests(manifests, &factories(), &controllers, &shortcuts).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::ConflictingRoute { ref controller, ref existing, .. }
                if controller == "b" && existing == "a.index"
        ));
        assert!(controllers.is_empty());
    }

    #[test]
    fn wildcard_mount_in_manifest_is_invalid() {
        let err = ControllerManifest::parse_str(
            "name = \"files\"\nmount = \"/a/{*b}\"",
            Path::new("files.controller.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidManifest { .. }));
    }
}
