//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::controller::ControllerRegistry;
use crate::locale::LocaleService;
use crate::shortcut::ShortcutRegistry;
use crate::view::ViewEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Template rendering for controller views.
    views: Arc<ViewEngine>,

    /// Interface translations.
    locale: Arc<LocaleService>,

    /// Named controllers (the process-wide registry outside of tests).
    controllers: &'static ControllerRegistry,

    /// Menu shortcuts (the process-wide registry outside of tests).
    shortcuts: &'static ShortcutRegistry,
}

impl AppState {
    /// Create state backed by the process-wide registries.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_registries(
            config,
            ControllerRegistry::global(),
            ShortcutRegistry::global(),
        )
    }

    /// Create state backed by the given registries, loading translations and
    /// templates from the configured directories.
    pub fn with_registries(
        config: &Config,
        controllers: &'static ControllerRegistry,
        shortcuts: &'static ShortcutRegistry,
    ) -> Result<Self> {
        let locale = Arc::new(LocaleService::new());
        let translations = locale
            .load_dir(&config.locales_dir)
            .context("failed to load translations")?;

        let views = if config.templates_dir.exists() {
            ViewEngine::new(
                &config.templates_dir,
                controllers,
                Arc::clone(&locale),
                &config.default_language,
            )
            .context("failed to initialize view engine")?
        } else {
            info!(dir = ?config.templates_dir, "templates directory does not exist, rendering disabled");
            ViewEngine::empty(controllers, Arc::clone(&locale), &config.default_language)
        };

        info!(
            translations,
            languages = ?locale.languages(),
            "view engine and locale ready"
        );

        Ok(Self::from_parts(
            config.clone(),
            views,
            locale,
            controllers,
            shortcuts,
        ))
    }

    /// Assemble state from prebuilt parts.
    pub fn from_parts(
        config: Config,
        views: ViewEngine,
        locale: Arc<LocaleService>,
        controllers: &'static ControllerRegistry,
        shortcuts: &'static ShortcutRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                views: Arc::new(views),
                locale,
                controllers,
                shortcuts,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn views(&self) -> &Arc<ViewEngine> {
        &self.inner.views
    }

    pub fn locale(&self) -> &Arc<LocaleService> {
        &self.inner.locale
    }

    pub fn controllers(&self) -> &'static ControllerRegistry {
        self.inner.controllers
    }

    pub fn shortcuts(&self) -> &'static ShortcutRegistry {
        self.inner.shortcuts
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("views", &self.inner.views)
            .field("controllers", &self.inner.controllers.len())
            .field("shortcuts", &self.inner.shortcuts.len())
            .finish()
    }
}
