//! Push domain module.
//!
//! Server-to-client events and the transport that carries them.

mod event;
pub mod transport;

pub use event::{OrderAssigned, PushEvent};
pub use transport::{PushStream, PushTransport};
