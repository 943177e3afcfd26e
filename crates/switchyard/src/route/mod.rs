//! Route declarations.
//!
//! A controller owns a [`RouteTable`] of named [`Route`]s. Names are used to
//! generate URLs; see [`pattern::fill`].

mod methods;
pub mod pattern;
mod table;

pub use methods::Methods;
pub use table::{Route, RouteInfo, RouteTable};

/// Empty parameter list for [`crate::Controller::gen_route`].
pub const NO_PARAMS: [(&str, &str); 0] = [];
