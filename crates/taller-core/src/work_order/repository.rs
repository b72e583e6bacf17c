//! Work-order gateway trait.

use async_trait::async_trait;

use super::model::WorkOrder;
use super::transition::MoveRequest;
use crate::error::Result;

/// Access to the work-order endpoints used by the board.
#[async_trait]
pub trait WorkOrderGateway: Send + Sync {
    /// Fetches the flat list of every work order.
    async fn list(&self) -> Result<Vec<WorkOrder>>;

    /// Moves one order to a new stage/sub-state/technician and returns the
    /// updated order.
    async fn move_order(&self, request: &MoveRequest) -> Result<WorkOrder>;
}
