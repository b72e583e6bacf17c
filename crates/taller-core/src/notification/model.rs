//! Notification domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::UserId;
use crate::work_order::WorkOrderId;

pub type NotificationId = i64;

/// A server-originated record telling a user something happened to a work order.
///
/// Created by the server; the client only ever flips `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub user_id: UserId,
    /// The work order this record points at.
    pub reference_id: WorkOrderId,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Returns the unread subset of `records`, keeping their order.
pub fn unread(records: &[NotificationRecord]) -> Vec<NotificationRecord> {
    records.iter().filter(|r| !r.read).cloned().collect()
}
