//! Push transport trait.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::event::PushEvent;
use crate::error::Result;
use crate::session::UserId;

/// Stream of events delivered to one registered identity.
///
/// The stream ends when the connection drops; it is never resumed by the
/// transport itself.
pub type PushStream = BoxStream<'static, Result<PushEvent>>;

/// A persistent server-to-client connection.
///
/// `connect` both establishes the connection and registers `identity_id`
/// with the server side, so events addressed to that identity start flowing.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn connect(&self, identity_id: UserId) -> Result<PushStream>;
}
