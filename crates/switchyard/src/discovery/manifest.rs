//! Parser for `{name}.controller.toml` manifest files.
//!
//! A manifest declares one controller instance:
//! - name, description, and the factory that builds it
//! - where it is mounted (own segment and optional parent)
//! - shortcuts it contributes to menus
//! - free-form settings passed to the factory

use std::path::Path;

use serde::Deserialize;

use crate::error::{ControllerError, ControllerResult};
use crate::route::pattern;
use crate::shortcut::Shortcut;

/// File name suffix of controller manifests.
pub const MANIFEST_SUFFIX: &str = ".controller.toml";

/// Controller metadata parsed from `.controller.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerManifest {
    /// Controller name (must match the file name).
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Factory that builds the controller (defaults to `name`).
    #[serde(default)]
    pub factory: Option<String>,

    /// Mount segment; overrides the one chosen by the factory.
    #[serde(default)]
    pub mount: Option<String>,

    /// Name of the controller this one is mounted under.
    #[serde(default)]
    pub parent: Option<String>,

    /// Disabled manifests are discovered but never instantiated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Menu shortcuts contributed by this controller.
    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,

    /// Factory-specific settings.
    #[serde(default)]
    pub settings: toml::Table,
}

fn default_enabled() -> bool {
    true
}

impl ControllerManifest {
    /// Parse a manifest file from the given path.
    pub fn parse(path: &Path) -> ControllerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| invalid(path, e))?;
        let manifest = Self::parse_str(&content, path)?;

        let expected = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(MANIFEST_SUFFIX));
        if expected != Some(manifest.name.as_str()) {
            return Err(invalid(
                path,
                format!(
                    "controller '{}' must be declared in {}{MANIFEST_SUFFIX}",
                    manifest.name, manifest.name
                ),
            ));
        }

        Ok(manifest)
    }

    /// Parse a manifest from a TOML string. `path` is only used in errors.
    pub fn parse_str(content: &str, path: &Path) -> ControllerResult<Self> {
        let manifest: ControllerManifest = toml::from_str(content).map_err(|e| invalid(path, e))?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> ControllerResult<()> {
        if self.name.is_empty() {
            return Err(invalid(path, "empty 'name' field"));
        }

        if let Some(mount) = &self.mount
            && let Err(e) = pattern::normalize_mount(mount)
        {
            return Err(invalid(path, format!("controller '{}': {e}", self.name)));
        }

        if self.parent.as_deref() == Some(self.name.as_str()) {
            return Err(invalid(
                path,
                format!("controller '{}' cannot be its own parent", self.name),
            ));
        }

        if self.factory.as_deref() == Some("") {
            return Err(invalid(path, format!("controller '{}': empty 'factory' field", self.name)));
        }

        Ok(())
    }

    /// Factory used to build this controller.
    pub fn factory_name(&self) -> &str {
        self.factory.as_deref().unwrap_or(&self.name)
    }

    /// Read a string setting.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(toml::Value::as_str)
    }
}

fn invalid(path: &Path, details: impl ToString) -> ControllerError {
    ControllerError::InvalidManifest {
        path: path.display().to_string(),
        details: details.to_string(),
    }
}
