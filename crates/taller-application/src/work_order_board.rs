//! Cached work-order list backing the operator board.

use std::sync::Arc;

use chrono::NaiveDate;
use taller_core::work_order::{
    FilterState, StageCounts, WorkOrder, WorkOrderGateway, WorkOrderId, board_view,
};
use taller_core::{Result, TallerError};
use tokio::sync::RwLock;

/// In-memory copy of `GET /work-orders`.
///
/// The copy is read-mostly: any mutation elsewhere calls [`invalidate`]
/// and the next read refetches.
///
/// [`invalidate`]: WorkOrderBoard::invalidate
pub struct WorkOrderBoard {
    gateway: Arc<dyn WorkOrderGateway>,
    orders: RwLock<Option<Vec<WorkOrder>>>,
}

impl WorkOrderBoard {
    pub fn new(gateway: Arc<dyn WorkOrderGateway>) -> Self {
        Self {
            gateway,
            orders: RwLock::new(None),
        }
    }

    /// Returns the cached orders, fetching them first if needed.
    pub async fn orders(&self) -> Result<Vec<WorkOrder>> {
        if let Some(cached) = self.orders.read().await.as_ref() {
            return Ok(cached.clone());
        }
        self.refresh().await
    }

    /// Fetches the order list and replaces the cache.
    pub async fn refresh(&self) -> Result<Vec<WorkOrder>> {
        let fetched = self.gateway.list().await?;
        tracing::debug!("[WorkOrderBoard] Fetched {} work orders", fetched.len());
        *self.orders.write().await = Some(fetched.clone());
        Ok(fetched)
    }

    pub async fn invalidate(&self) {
        *self.orders.write().await = None;
        tracing::debug!("[WorkOrderBoard] Cache invalidated");
    }

    pub async fn is_cached(&self) -> bool {
        self.orders.read().await.is_some()
    }

    /// Looks an order up by id in the (possibly refetched) list.
    pub async fn find(&self, id: WorkOrderId) -> Result<WorkOrder> {
        self.orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| TallerError::not_found("work order", id.to_string()))
    }

    /// Post-filter badge counts for the current list.
    pub async fn counts(&self, filter: &FilterState, today: NaiveDate) -> Result<StageCounts> {
        let orders = self.orders().await?;
        Ok(board_view(&orders, filter, today).counts)
    }
}
