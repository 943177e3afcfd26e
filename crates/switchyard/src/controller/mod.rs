//! Controllers: named route tables composed into mount hierarchies.
//!
//! A [`Controller`] owns a set of named routes and a mount segment. Controllers
//! can be nested: a child's routes are served under its parent's mount path,
//! and [`Controller::gen_route`] builds URLs from route names using the live
//! parent chain. Named instances are kept in a [`ControllerRegistry`].

mod registry;

pub use registry::ControllerRegistry;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use axum::response::Html;
use axum::{Extension, Router};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ControllerError, ControllerResult};
use crate::route::{Methods, Route, RouteInfo, RouteTable, pattern};
use crate::state::AppState;
use crate::view::ViewEngine;

/// Handle to a controller. Cloning is cheap and shares the same instance.
///
/// Handlers can extract their own controller with `Extension<Controller>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    name: String,
    description: RwLock<String>,
    /// Normalized mount segment; empty means the parent's root.
    mount: RwLock<String>,
    routes: RwLock<RouteTable>,
    parent: RwLock<Weak<ControllerInner>>,
    children: RwLock<Vec<Controller>>,
}

impl Controller {
    /// Create a controller mounted at `mount` relative to its future parent.
    pub fn new(name: impl Into<String>, mount: &str) -> ControllerResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ControllerError::EmptyName { kind: "controller" });
        }
        let mount = pattern::normalize_mount(mount)?;

        Ok(Self {
            inner: Arc::new(ControllerInner {
                routes: RwLock::new(RouteTable::new(name.clone())),
                name,
                description: RwLock::new(String::new()),
                mount: RwLock::new(mount),
                parent: RwLock::new(Weak::new()),
                children: RwLock::new(Vec::new()),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn description(&self) -> String {
        self.inner.description.read().clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        *self.inner.description.write() = description.into();
    }

    /// Builder form of [`set_description`](Self::set_description).
    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    /// Own mount segment, normalized (`""` for the root).
    pub fn mount(&self) -> String {
        self.inner.mount.read().clone()
    }

    /// Change the mount segment.
    pub fn set_mount(&self, mount: &str) -> ControllerResult<()> {
        let mount = pattern::normalize_mount(mount)?;
        *self.inner.mount.write() = mount;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Routes
    // -------------------------------------------------------------------------

    /// Builder form of [`add_route`](Self::add_route).
    pub fn with_route(self, route: Route) -> ControllerResult<Self> {
        self.add_route(route)?;
        Ok(self)
    }

    /// Declare a named route.
    pub fn add_route(&self, route: Route) -> ControllerResult<()> {
        self.inner.routes.write().add(route)
    }

    pub fn remove_route(&self, name: &str) -> Option<Route> {
        self.inner.routes.write().remove(name)
    }

    pub fn route(&self, name: &str) -> Option<Route> {
        self.inner.routes.read().get(name).cloned()
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.inner.routes.read().get(name).is_some()
    }

    /// Route names in declaration order.
    pub fn route_names(&self) -> Vec<String> {
        self.inner.routes.read().names()
    }

    // -------------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------------

    /// Current parent, if mounted and the parent is still alive.
    pub fn parent(&self) -> Option<Controller> {
        self.inner
            .parent
            .read()
            .upgrade()
            .map(|inner| Controller { inner })
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Topmost ancestor (or self).
    pub fn root(&self) -> Controller {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn children(&self) -> Vec<Controller> {
        self.inner.children.read().clone()
    }

    pub fn child(&self, name: &str) -> Option<Controller> {
        self.inner
            .children
            .read()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Mount `child` under this controller.
    pub fn add_child(&self, child: &Controller) -> ControllerResult<()> {
        // Walk up from self: finding the child means the mount would loop
        let mut chain = vec![self.name().to_string()];
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(child) {
                chain.reverse();
                chain.push(child.name().to_string());
                return Err(ControllerError::MountCycle {
                    cycle: chain.join(" -> "),
                });
            }
            current = node.parent();
            if let Some(parent) = &current {
                chain.push(parent.name().to_string());
            }
        }

        if let Some(parent) = child.parent() {
            return Err(ControllerError::AlreadyMounted {
                child: child.name().to_string(),
                parent: parent.name().to_string(),
            });
        }

        let mut children = self.inner.children.write();
        if children.iter().any(|c| c.name() == child.name()) {
            return Err(ControllerError::DuplicateChild {
                parent: self.name().to_string(),
                child: child.name().to_string(),
            });
        }

        *child.inner.parent.write() = Arc::downgrade(&self.inner);
        children.push(child.clone());

        debug!(
            parent = %self.name(),
            child = %child.name(),
            mount = %child.mount(),
            "mounted controller"
        );
        Ok(())
    }

    /// Detach a child, making it a root again.
    pub fn remove_child(&self, name: &str) -> Option<Controller> {
        let mut children = self.inner.children.write();
        let pos = children.iter().position(|c| c.name() == name)?;
        let child = children.remove(pos);
        *child.inner.parent.write() = Weak::new();
        Some(child)
    }

    /// Full mount path: every ancestor's segment, root first, then our own.
    pub fn mount_path(&self) -> String {
        let mut segments = vec![self.mount()];
        let mut current = self.parent();
        while let Some(parent) = current {
            segments.push(parent.mount());
            current = parent.parent();
        }

        segments
            .iter()
            .rev()
            .fold(String::from("/"), |acc, segment| pattern::join(&acc, segment))
    }

    /// Absolute path pattern for a route pattern of this controller.
    fn full_pattern(&self, route_path: &str) -> String {
        let mut full = pattern::join(&self.mount_path(), route_path);
        if route_path.len() > 1 && route_path.ends_with('/') {
            full.push('/');
        }
        full
    }

    /// Build the URL of a named route.
    ///
    /// Placeholders in the mount path and the route pattern are filled from
    /// `params`; leftover parameters become the query string.
    pub fn gen_route<I, K, V>(&self, name: &str, params: I) -> ControllerResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let path = self
            .inner
            .routes
            .read()
            .get(name)
            .map(|r| r.path().to_string())
            .ok_or_else(|| ControllerError::RouteNotFound {
                controller: self.name().to_string(),
                route: name.to_string(),
            })?;

        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();

        pattern::fill(name, &self.full_pattern(&path), &params)
    }

    /// Own routes with absolute paths.
    pub fn route_infos(&self) -> Vec<RouteInfo> {
        self.inner
            .routes
            .read()
            .iter()
            .map(|r| RouteInfo {
                controller: self.name().to_string(),
                name: r.name().to_string(),
                methods: r.methods().to_string(),
                path: self.full_pattern(r.path()),
            })
            .collect()
    }

    /// Own routes followed by every descendant's, depth first.
    pub fn route_listing(&self) -> Vec<RouteInfo> {
        let mut listing = self.route_infos();
        for child in self.children() {
            listing.extend(child.route_listing());
        }
        listing
    }

    // -------------------------------------------------------------------------
    // Router registration
    // -------------------------------------------------------------------------

    /// Check that the routes of `roots` and their descendants can share one
    /// router.
    ///
    /// Two routes conflict when their absolute paths differ only in
    /// placeholder names, or when they share a path and a method.
    pub fn check_conflicts(roots: &[Controller]) -> ControllerResult<()> {
        let mut seen: Vec<(String, RouteInfo, Methods)> = Vec::new();
        for root in roots {
            root.collect_routes(&mut seen);
        }

        for (i, (shape, info, methods)) in seen.iter().enumerate() {
            let clash = seen[..i].iter().find(|(other_shape, other, other_methods)| {
                other_shape == shape
                    && (other.path != info.path || other_methods.overlaps(methods))
            });
            if let Some((_, existing, _)) = clash {
                return Err(ControllerError::ConflictingRoute {
                    controller: info.controller.clone(),
                    route: info.name.clone(),
                    existing: format!("{}.{}", existing.controller, existing.name),
                    methods: info.methods.clone(),
                    path: info.path.clone(),
                });
            }
        }
        Ok(())
    }

    fn collect_routes(&self, out: &mut Vec<(String, RouteInfo, Methods)>) {
        let methods: Vec<Methods> = self
            .inner
            .routes
            .read()
            .iter()
            .map(|r| r.methods().clone())
            .collect();
        for (info, methods) in self.route_infos().into_iter().zip(methods) {
            out.push((pattern::shape(&info.path), info, methods));
        }
        for child in self.children() {
            child.collect_routes(out);
        }
    }

    /// Router relative to this controller's own mount point.
    ///
    /// Children are nested at their mount segments, or merged when mounted at
    /// the root.
    fn routes_router(&self) -> Router<AppState> {
        let mut router = self
            .inner
            .routes
            .read()
            .to_router()
            .layer(Extension(self.clone()));

        for child in self.children() {
            let mount = child.mount();
            let child_router = child.routes_router();
            router = if mount.is_empty() {
                router.merge(child_router)
            } else {
                router.nest(&mount, child_router)
            };
        }
        router
    }

    /// Router with this controller placed at its full mount path.
    ///
    /// Fails with [`ControllerError::ConflictingRoute`] when two routes of
    /// the tree would collide.
    pub fn router(&self) -> ControllerResult<Router<AppState>> {
        Self::check_conflicts(std::slice::from_ref(self))?;
        Ok(self.build_router())
    }

    /// [`router`](Self::router) without the conflict check.
    pub(crate) fn build_router(&self) -> Router<AppState> {
        let mount_path = self.mount_path();
        debug!(controller = %self.name(), mount = %mount_path, "building router");
        if mount_path == "/" {
            self.routes_router()
        } else {
            Router::new().nest(&mount_path, self.routes_router())
        }
    }

    // -------------------------------------------------------------------------
    // Views and translation
    // -------------------------------------------------------------------------

    /// Render a view, preferring `{controller}/{view}` over `{view}`.
    ///
    /// `controller` and `mount_path` are added to the template context.
    pub fn render(
        &self,
        state: &AppState,
        view: &str,
        mut context: tera::Context,
    ) -> ControllerResult<Html<String>> {
        let suggestions = ViewEngine::view_suggestions(self.name(), view);
        let refs: Vec<&str> = suggestions.iter().map(String::as_str).collect();

        let template = state.views().resolve_template(&refs).ok_or_else(|| {
            ControllerError::TemplateNotFound {
                view: view.to_string(),
                tried: suggestions.join(", "),
            }
        })?;

        context.insert("controller", self.name());
        context.insert("mount_path", &self.mount_path());

        state.views().render(&template, &context).map(Html)
    }

    /// Translate `source` with this controller's name as the context.
    ///
    /// Uses the configured default language when `language` is `None`.
    pub fn t(&self, state: &AppState, source: &str, language: Option<&str>) -> String {
        let language = language.unwrap_or(state.config().default_language.as_str());
        state.locale().translate(source, self.name(), language)
    }

    /// Check whether two handles point at the same controller.
    pub fn ptr_eq(&self, other: &Controller) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self
            .inner
            .children
            .read()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        f.debug_struct("Controller")
            .field("name", &self.inner.name)
            .field("mount", &*self.inner.mount.read())
            .field("routes", &self.inner.routes.read().len())
            .field("children", &children)
            .finish()
    }
}
