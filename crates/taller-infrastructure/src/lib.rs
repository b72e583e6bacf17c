//! Infrastructure adapters for Taller: the REST gateways, the push
//! transport and on-disk client configuration.

pub mod config_service;
pub mod http;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::http::{HttpGateway, HttpPushTransport};
pub use crate::paths::TallerPaths;
