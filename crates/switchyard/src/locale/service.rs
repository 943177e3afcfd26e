//! Locale service for interface string translation.
//!
//! Translations live in an in-memory cache keyed by language, context and
//! source string. They are loaded from `{lang}.po` files at startup.

use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tracing::{info, warn};

use super::po_parser::parse_po;

/// Locale translation service.
#[derive(Debug, Default)]
pub struct LocaleService {
    /// (language, context, source) → translation.
    cache: DashMap<CacheKey, String>,
    /// Languages with at least one loaded translation.
    languages: DashMap<String, usize>,
}

impl LocaleService {
    /// Create an empty locale service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `{lang}.po` file in `dir`.
    ///
    /// A missing directory is not an error; unreadable files are skipped.
    pub fn load_dir(&self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            info!(?dir, "locales directory does not exist, skipping");
            return Ok(0);
        }

        let mut files: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read locales directory: {}", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "po"))
            .collect();
        files.sort();

        let mut total = 0;
        for path in files {
            let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(content) => total += self.load_po(language, &content),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read translation file");
                }
            }
        }

        Ok(total)
    }

    /// Load translations for `language` from .po file contents.
    pub fn load_po(&self, language: &str, content: &str) -> usize {
        let entries = parse_po(content);
        let count = entries.len();
        for entry in entries {
            self.insert(language, &entry.context, &entry.source, &entry.translation);
        }
        info!(language = %language, count = count, "loaded locale translations");
        count
    }

    /// Add or replace a single translation.
    pub fn insert(&self, language: &str, context: &str, source: &str, translation: &str) {
        let key = cache_key(language, context, source);
        if self.cache.insert(key, translation.to_string()).is_none() {
            *self.languages.entry(language.to_string()).or_default() += 1;
        }
    }

    /// Translate a source string.
    ///
    /// Tries the exact context, then no context, then falls back to the source.
    pub fn translate(&self, source: &str, context: &str, language: &str) -> String {
        let key = cache_key(language, context, source);
        if let Some(translation) = self.cache.get(&key) {
            return translation.clone();
        }

        if !context.is_empty() {
            let key = cache_key(language, "", source);
            if let Some(translation) = self.cache.get(&key) {
                return translation.clone();
            }
        }

        source.to_string()
    }

    /// Languages with loaded translations, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.languages.iter().map(|e| e.key().clone()).collect();
        langs.sort();
        langs
    }

    /// Number of cached translations.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

type CacheKey = (String, String, String);

fn cache_key(language: &str, context: &str, source: &str) -> CacheKey {
    (language.to_string(), context.to_string(), source.to_string())
}
