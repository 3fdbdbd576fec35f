//! Application configuration.
//!
//! Settings are resolved in three layers: built-in defaults, an optional TOML
//! file, then environment variables. `main` loads `.env` through dotenvy before
//! calling [`load_settings`], so values from `.env` behave like real
//! environment variables.

/// Database connection and table creation
pub mod database;
/// Tracing subscriber setup
pub mod logging;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Config file read when `APP_CONFIG_PATH` is not set and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Every tunable of the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub app_description: String,
    /// Forces debug-level logging
    pub debug: bool,
    pub host: String,
    pub port: u16,
    /// Prefix for the product routes, e.g. `/api/v1`
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub cors_allow_credentials: bool,
    pub cors_allow_methods: Vec<String>,
    pub cors_allow_headers: Vec<String>,
    pub log_level: String,
    pub log_format_json: bool,
    /// When set, products are stored through SeaORM instead of in memory
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "product-catalog".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            app_description: "Product catalog CRUD service".to_string(),
            debug: false,
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_prefix: "/api/v1".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            cors_allow_credentials: true,
            cors_allow_methods: ["GET", "POST", "PUT", "DELETE", "PATCH"]
                .into_iter()
                .map(String::from)
                .collect(),
            cors_allow_headers: ["Content-Type", "Authorization", "Accept"]
                .into_iter()
                .map(String::from)
                .collect(),
            log_level: "info".to_string(),
            log_format_json: false,
            database_url: None,
        }
    }
}

impl Settings {
    /// `host:port` for the listener.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Overrides fields from environment-style variables found via `lookup`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when a variable holds an unparsable value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("APP_NAME") {
            self.app_name = value;
        }
        if let Some(value) = lookup("APP_VERSION") {
            self.app_version = value;
        }
        if let Some(value) = lookup("APP_DESCRIPTION") {
            self.app_description = value;
        }
        if let Some(value) = lookup("DEBUG") {
            self.debug = parse_bool("DEBUG", &value)?;
        }
        if let Some(value) = lookup("HOST") {
            self.host = value;
        }
        if let Some(value) = lookup("PORT") {
            self.port = value.trim().parse().map_err(|e| Error::Config {
                message: format!("PORT must be a port number, got {value:?}: {e}"),
            })?;
        }
        if let Some(value) = lookup("API_PREFIX") {
            self.api_prefix = value;
        }
        if let Some(value) = lookup("CORS_ORIGINS") {
            self.cors_origins = parse_list(&value);
        }
        if let Some(value) = lookup("CORS_ALLOW_CREDENTIALS") {
            self.cors_allow_credentials = parse_bool("CORS_ALLOW_CREDENTIALS", &value)?;
        }
        if let Some(value) = lookup("CORS_ALLOW_METHODS") {
            self.cors_allow_methods = parse_list(&value);
        }
        if let Some(value) = lookup("CORS_ALLOW_HEADERS") {
            self.cors_allow_headers = parse_list(&value);
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("LOG_FORMAT_JSON") {
            self.log_format_json = parse_bool("LOG_FORMAT_JSON", &value)?;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value).filter(|url| !url.trim().is_empty());
        }
        self.api_prefix = normalize_prefix(&self.api_prefix);
        Ok(())
    }
}

/// Reads a TOML settings file; missing keys keep their defaults.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    let settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })?;
    Ok(settings)
}

/// Resolves settings from defaults, the config file and the process environment.
///
/// # Errors
/// Returns [`Error::Config`] if the config file or an environment value is invalid.
pub fn load_settings() -> Result<Settings> {
    let explicit = std::env::var("APP_CONFIG_PATH").ok();
    let mut settings = match explicit.as_deref() {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE)?,
        None => Settings::default(),
    };
    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config {
            message: format!("{key} must be a boolean, got {other:?}"),
        }),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
