pub mod board;
pub mod notifications;
pub mod session;
pub mod transition;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use taller_application::{Console, Gateways};
use taller_core::config::ClientConfig;
use taller_infrastructure::{ConfigService, HttpGateway, HttpPushTransport};

/// Loads `config.toml` (or `path`), then applies `--api-url`.
pub fn load_config(path: Option<&Path>, api_url: Option<&str>) -> Result<ClientConfig> {
    let service = match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = service
        .get_config()
        .context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api_base_url = url.to_string();
    }
    tracing::debug!("[cli] Using API at {}", config.api_base_url);
    Ok(config)
}

pub fn build_console(config: &ClientConfig) -> Result<Console> {
    let http = Arc::new(HttpGateway::new(config.clone())?);
    let push = Arc::new(HttpPushTransport::new(config, http.jar())?);
    Ok(Console::new(Gateways {
        auth: http.clone(),
        notifications: http.clone(),
        work_orders: http,
        push,
    }))
}
