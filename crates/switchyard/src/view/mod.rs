//! View rendering.
//!
//! Thin wrapper over Tera: template suggestion resolution for controller
//! views plus the `url_for` and `t` template functions.

mod engine;

pub use engine::ViewEngine;
