//! Switchyard
//!
//! Named controllers for axum: route tables addressed by name, composed into
//! mount hierarchies, discovered from manifests and listed in process-wide
//! registries.

pub mod app;
pub mod builtin;
pub mod cli;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod locale;
pub mod route;
pub mod shortcut;
pub mod state;
pub mod view;

pub use config::Config;
pub use controller::{Controller, ControllerRegistry};
pub use discovery::{ControllerFactories, ControllerManifest, bootstrap};
pub use error::{AppError, AppResult, ControllerError, ControllerResult};
pub use route::{Methods, NO_PARAMS, Route, RouteInfo};
pub use shortcut::{Shortcut, ShortcutEntry, ShortcutRegistry};
pub use state::AppState;
