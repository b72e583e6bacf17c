//! Notification gateway trait.

use async_trait::async_trait;

use super::model::{NotificationId, NotificationRecord};
use crate::error::Result;
use crate::session::UserId;

/// Access to the per-user notification endpoints.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Lists every record for `user_id`, in server order (newest first).
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<NotificationRecord>>;

    /// Sets the read flag of one record.
    async fn mark_read(&self, id: NotificationId) -> Result<()>;
}
