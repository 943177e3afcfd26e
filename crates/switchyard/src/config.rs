//! Configuration loaded from environment variables.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind (default: 0.0.0.0).
    pub host: IpAddr,

    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Directory scanned for `*.controller.toml` manifests (default: ./controllers).
    pub controllers_dir: PathBuf,

    /// Directory holding Tera templates (default: ./templates).
    pub templates_dir: PathBuf,

    /// Directory holding `{lang}.po` translation files (default: ./locales).
    pub locales_dir: PathBuf,

    /// Language used when a request does not ask for one (default: en).
    pub default_language: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse()
            .context("HOST must be a valid IP address")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let controllers_dir = env::var("CONTROLLERS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./controllers"));

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let locales_dir = env::var("LOCALES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./locales"));

        let default_language = env::var("DEFAULT_LANGUAGE")
            .map(|v| v.trim().to_lowercase())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "en".to_string());

        Ok(Self {
            host,
            port,
            controllers_dir,
            templates_dir,
            locales_dir,
            default_language,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            controllers_dir: PathBuf::from("./controllers"),
            templates_dir: PathBuf::from("./templates"),
            locales_dir: PathBuf::from("./locales"),
            default_language: "en".to_string(),
        }
    }
}
