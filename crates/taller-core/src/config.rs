//! Client configuration model.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PUSH_PATH: &str = "/push/events";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the console finds its server and how patient it is with it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub push_path: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            push_path: DEFAULT_PUSH_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Joins `path` onto the API base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn push_url(&self) -> String {
        self.endpoint(&self.push_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(r#"api_base_url = "https://taller.example/api/""#).unwrap();
        assert_eq!(config.api_base_url, "https://taller.example/api/");
        assert_eq!(config.push_path, DEFAULT_PUSH_PATH);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = ClientConfig {
            api_base_url: "https://taller.example/api/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.endpoint("/work-orders"), "https://taller.example/api/work-orders");
        assert_eq!(config.push_url(), "https://taller.example/api/push/events");
    }
}
