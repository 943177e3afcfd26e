//! Shortcuts: menu metadata (title, icon, category, priority) contributed by
//! controllers and listed in UI navigation. Unrelated to request routing.

mod registry;

pub use registry::{Shortcut, ShortcutEntry, ShortcutRegistry};
