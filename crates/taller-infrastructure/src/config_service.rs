//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/taller/config.toml) and layers
//! environment overrides on top of it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use taller_core::config::ClientConfig;
use taller_core::{Result, TallerError};

use crate::paths::TallerPaths;

pub const ENV_API_URL: &str = "TALLER_API_URL";
pub const ENV_PUSH_PATH: &str = "TALLER_PUSH_PATH";
pub const ENV_TIMEOUT_SECS: &str = "TALLER_TIMEOUT_SECS";

/// Configuration service that loads and caches the client configuration.
///
/// A missing file yields the defaults; a file that does not parse is an
/// error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file; `None` means the platform default.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default `config.toml`.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `path` instead of the default location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let path = self.config_path()?;
        let mut loaded = load_file(&path)?;
        apply_overrides(&mut loaded, |key| std::env::var(key).ok())?;
        tracing::debug!(
            "[ConfigService] Loaded config from {} (api: {})",
            path.display(),
            loaded.api_base_url
        );

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => TallerPaths::config_file(),
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> Result<ClientConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            return Ok(ClientConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    Ok(toml::from_str(&content)?)
}

/// Applies `TALLER_*` overrides read through `lookup`.
fn apply_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(path) = lookup(ENV_PUSH_PATH) {
        config.push_path = path;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = raw.trim().parse().map_err(|_| {
            TallerError::config(format!(
                "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
            ))
        })?;
    }
    Ok(())
}
