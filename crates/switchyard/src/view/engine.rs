//! View engine with Tera templates and suggestion resolution.

use std::collections::HashMap;
use std::error::Error as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::{Tera, Value};
use tracing::debug;

use crate::controller::ControllerRegistry;
use crate::error::{ControllerError, ControllerResult};
use crate::locale::LocaleService;

/// View engine for rendering controller templates.
pub struct ViewEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Cache mapping suggestion lists to resolved template names.
    suggestion_cache: DashMap<String, String>,
}

impl ViewEngine {
    /// Create a view engine loading `**/*.html` from `template_dir`.
    ///
    /// Registers the `url_for` and `t` template functions.
    pub fn new(
        template_dir: &Path,
        controllers: &'static ControllerRegistry,
        locale: Arc<LocaleService>,
        default_language: &str,
    ) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        Self::register_functions(&mut tera, controllers, locale, default_language);

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            suggestion_cache: DashMap::new(),
        })
    }

    /// Create a view engine with no templates.
    pub fn empty(
        controllers: &'static ControllerRegistry,
        locale: Arc<LocaleService>,
        default_language: &str,
    ) -> Self {
        let mut tera = Tera::default();
        Self::register_functions(&mut tera, controllers, locale, default_language);
        Self {
            tera,
            suggestion_cache: DashMap::new(),
        }
    }

    /// Register `url_for(controller=, route=, ..)` and `t(source=, context=, lang=)`.
    fn register_functions(
        tera: &mut Tera,
        controllers: &'static ControllerRegistry,
        locale: Arc<LocaleService>,
        default_language: &str,
    ) {
        tera.register_function("url_for", move |args: &HashMap<String, Value>| {
            let controller = required_str(args, "url_for", "controller")?;
            let route = required_str(args, "url_for", "route")?;
            let params: Vec<(String, String)> = args
                .iter()
                .filter(|(k, _)| k.as_str() != "controller" && k.as_str() != "route")
                .map(|(k, v)| (k.clone(), value_to_param(v)))
                .collect();

            controllers
                .gen_route(&controller, &route, params)
                .map(Value::String)
                .map_err(|e| tera::Error::msg(e.to_string()))
        });

        let default_language = default_language.to_string();
        tera.register_function("t", move |args: &HashMap<String, Value>| {
            let source = required_str(args, "t", "source")?;
            let context = args.get("context").and_then(Value::as_str).unwrap_or("");
            let language = args
                .get("lang")
                .and_then(Value::as_str)
                .unwrap_or(default_language.as_str());
            Ok(Value::String(locale.translate(&source, context, language)))
        });
    }

    /// Add a template from a string (tests and embedded views).
    pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, content)
            .with_context(|| format!("failed to add template '{name}'"))?;
        self.clear_cache();
        Ok(())
    }

    /// Resolve the best template from a list of suggestions.
    ///
    /// Templates are tried in order; the first one that exists is returned.
    /// Hits are cached; misses are not, so reloads can pick up new files.
    pub fn resolve_template(&self, suggestions: &[&str]) -> Option<String> {
        if suggestions.is_empty() {
            return None;
        }

        let cache_key = suggestions.join("|");
        if let Some(cached) = self.suggestion_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        for suggestion in suggestions {
            let template_name = format!("{suggestion}.html");
            if self.tera.get_template(&template_name).is_ok() {
                self.suggestion_cache
                    .insert(cache_key, template_name.clone());
                return Some(template_name);
            }

            if self.tera.get_template(suggestion).is_ok() {
                let name = (*suggestion).to_string();
                self.suggestion_cache.insert(cache_key, name.clone());
                return Some(name);
            }
        }

        None
    }

    /// Template suggestions for a controller view, most specific first.
    ///
    /// - `{controller}/{view}`
    /// - `{view}`
    pub fn view_suggestions(controller: &str, view: &str) -> Vec<String> {
        let view = view.trim_start_matches('/');
        vec![format!("{controller}/{view}"), view.to_string()]
    }

    /// Render a resolved template.
    pub fn render(&self, template: &str, context: &tera::Context) -> ControllerResult<String> {
        self.tera
            .render(template, context)
            .map_err(|e| ControllerError::Render {
                template: template.to_string(),
                details: error_chain(&e),
            })
    }

    /// Clear the suggestion cache.
    pub fn clear_cache(&self) {
        self.suggestion_cache.clear();
    }
}

impl std::fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.suggestion_cache.len())
            .finish()
    }
}

fn required_str(args: &HashMap<String, Value>, function: &str, key: &str) -> tera::Result<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| tera::Error::msg(format!("{function}: missing string argument '{key}'")))
}

fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Tera hides the useful message in the error source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
