//! HTTP adapters for the shop server.

mod dto;
mod gateway;
mod push;

pub use gateway::HttpGateway;
pub use push::HttpPushTransport;
