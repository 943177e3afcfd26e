//! Interface translation.
//!
//! Controllers delegate message lookups here via [`crate::Controller::t`].

mod po_parser;
mod service;

pub use po_parser::{PoEntry, parse_po};
pub use service::LocaleService;
