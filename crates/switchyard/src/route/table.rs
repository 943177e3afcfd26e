//! Named route declarations and the per-controller route table.

use std::collections::HashMap;
use std::fmt;

use axum::Router;
use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{self, MethodRouter};
use serde::Serialize;
use tracing::debug;

use super::methods::Methods;
use super::pattern;
use crate::error::{ControllerError, ControllerResult};
use crate::state::AppState;

/// A named route: methods, path pattern and handler.
#[derive(Clone)]
pub struct Route {
    name: String,
    methods: Methods,
    path: String,
    handler: MethodRouter<AppState>,
}

impl Route {
    /// Declare a route answering to `methods`.
    ///
    /// Fails if one of the methods has no axum filter.
    pub fn new<H, T>(
        name: impl Into<String>,
        methods: Methods,
        path: impl Into<String>,
        handler: H,
    ) -> ControllerResult<Self>
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let handler = match methods.filter()? {
            Some(filter) => routing::on(filter, handler),
            None => routing::any(handler),
        };
        Ok(Self {
            name: name.into(),
            methods,
            path: path.into(),
            handler,
        })
    }

    pub fn get<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::one(Method::GET), path, routing::get(handler))
    }

    pub fn post<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::one(Method::POST), path, routing::post(handler))
    }

    pub fn put<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::one(Method::PUT), path, routing::put(handler))
    }

    pub fn patch<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::one(Method::PATCH), path, routing::patch(handler))
    }

    pub fn delete<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::one(Method::DELETE), path, routing::delete(handler))
    }

    pub fn any<H, T>(name: impl Into<String>, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self::from_parts(name, Methods::Any, path, routing::any(handler))
    }

    fn from_parts(
        name: impl Into<String>,
        methods: Methods,
        path: impl Into<String>,
        handler: MethodRouter<AppState>,
    ) -> Self {
        Self {
            name: name.into(),
            methods,
            path: path.into(),
            handler,
        }
    }

    /// Route name used for URL generation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods this route answers to.
    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    /// Path pattern relative to the owning controller's mount path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Serializable description of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub controller: String,
    pub name: String,
    pub methods: String,
    pub path: String,
}

/// Ordered routes of one controller, indexed by name.
#[derive(Debug, Clone)]
pub struct RouteTable {
    owner: String,
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// Create an empty table owned by `owner` (used in error messages).
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            routes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a route.
    ///
    /// Rejects empty names, invalid path patterns and duplicate names. A
    /// route also conflicts with an existing one when both share a path and
    /// a method, or when their paths differ only in placeholder names.
    pub fn add(&mut self, route: Route) -> ControllerResult<()> {
        if route.name.is_empty() {
            return Err(ControllerError::EmptyName { kind: "route" });
        }
        pattern::validate_path(&route.path)?;
        if self.index.contains_key(&route.name) {
            return Err(ControllerError::DuplicateRoute {
                controller: self.owner.clone(),
                route: route.name.clone(),
            });
        }
        let shape = pattern::shape(&route.path);
        if let Some(existing) = self.routes.iter().find(|r| {
            pattern::shape(&r.path) == shape
                && (r.path != route.path || r.methods.overlaps(&route.methods))
        }) {
            return Err(ControllerError::ConflictingRoute {
                controller: self.owner.clone(),
                route: route.name.clone(),
                existing: existing.name.clone(),
                methods: route.methods.to_string(),
                path: route.path.clone(),
            });
        }

        debug!(
            controller = %self.owner,
            route = %route.name,
            methods = %route.methods,
            path = %route.path,
            "registered route"
        );

        self.index.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Remove a route by name, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Route> {
        let pos = self.index.remove(name)?;
        let route = self.routes.remove(pos);
        for idx in self.index.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(route)
    }

    /// Get a route by name.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    /// Iterate routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Route names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Build an axum router holding every route.
    ///
    /// Routes sharing a path are merged into a single method router.
    pub fn to_router(&self) -> Router<AppState> {
        let mut by_path: Vec<(&str, MethodRouter<AppState>)> = Vec::new();

        for route in &self.routes {
            match by_path.iter_mut().find(|(path, _)| *path == route.path) {
                Some((_, existing)) => {
                    let current = std::mem::replace(existing, MethodRouter::new());
                    *existing = current.merge(route.handler.clone());
                }
                None => by_path.push((route.path.as_str(), route.handler.clone())),
            }
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, handler)| {
                router.route(path, handler)
            })
    }
}
