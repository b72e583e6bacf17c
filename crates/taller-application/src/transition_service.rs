//! Stage-transition submission.

use std::sync::Arc;

use taller_core::Result;
use taller_core::work_order::{TransitionForm, WorkOrder, WorkOrderGateway, WorkOrderId};

use crate::work_order_board::WorkOrderBoard;

/// Opens transition forms and submits them to the move endpoint.
pub struct TransitionService {
    gateway: Arc<dyn WorkOrderGateway>,
    board: Arc<WorkOrderBoard>,
}

impl TransitionService {
    pub fn new(gateway: Arc<dyn WorkOrderGateway>, board: Arc<WorkOrderBoard>) -> Self {
        Self { gateway, board }
    }

    /// Opens a form pre-populated from the order's current values.
    pub async fn open_form(&self, order_id: WorkOrderId) -> Result<TransitionForm> {
        let order = self.board.find(order_id).await?;
        Ok(TransitionForm::open(&order))
    }

    /// Validates and submits `form`.
    ///
    /// A form failing the technician guard is rejected with
    /// `TallerError::Validation` before any server call. On success the
    /// board cache is invalidated so the next read refetches; on a server
    /// failure nothing is invalidated and the form can be corrected and
    /// resubmitted.
    pub async fn submit(&self, form: &TransitionForm) -> Result<WorkOrder> {
        let request = form.validate()?;

        let updated = self.gateway.move_order(&request).await.inspect_err(|e| {
            tracing::warn!(
                "[TransitionService] Move of order {} failed: {}",
                request.order_id,
                e
            );
        })?;

        tracing::info!(
            "[TransitionService] Order {} moved to {}/{}",
            request.order_id,
            request.stage,
            request.sub_state
        );
        self.board.invalidate().await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeWorkOrderGateway, work_order};
    use taller_core::TallerError;
    use taller_core::work_order::{Stage, SubState, TransitionError};

    fn service(gateway: &Arc<FakeWorkOrderGateway>) -> (TransitionService, Arc<WorkOrderBoard>) {
        let board = Arc::new(WorkOrderBoard::new(gateway.clone()));
        (TransitionService::new(gateway.clone(), board.clone()), board)
    }

    #[tokio::test]
    async fn test_missing_technician_never_reaches_server() {
        let gateway = Arc::new(FakeWorkOrderGateway::new(vec![work_order(1, Some(Stage::Entrada))]));
        let (service, _) = service(&gateway);
        let mut form = service.open_form(1).await.unwrap();
        form.set_stage(Stage::Salida);

        let err = service.submit(&form).await.unwrap_err();

        assert_eq!(
            err,
            TallerError::Validation(TransitionError::TechnicianRequired {
                stage: Stage::Salida
            })
        );
        assert!(gateway.moves().is_empty());
    }

    #[tokio::test]
    async fn test_successful_move_invalidates_board() {
        let gateway = Arc::new(FakeWorkOrderGateway::new(vec![work_order(1, Some(Stage::Entrada))]));
        let (service, board) = service(&gateway);
        let mut form = service.open_form(1).await.unwrap();
        form.set_stage(Stage::Reparacion);
        form.set_sub_state(SubState::Reparacion);
        form.set_technician(Some(7));
        assert!(board.is_cached().await);

        let updated = service.submit(&form).await.unwrap();

        assert_eq!(updated.stage, Some(Stage::Reparacion));
        assert_eq!(updated.technician_id, Some(7));
        assert_eq!(gateway.moves().len(), 1);
        assert_eq!(gateway.moves()[0].order_id, 1);
        assert!(!board.is_cached().await);
    }

    #[tokio::test]
    async fn test_server_failure_keeps_board_and_form() {
        let gateway = Arc::new(FakeWorkOrderGateway::new(vec![work_order(1, Some(Stage::Entrada))]));
        gateway.fail_moves(TallerError::server(500, "boom"));
        let (service, board) = service(&gateway);
        let mut form = service.open_form(1).await.unwrap();
        form.set_stage(Stage::Reparacion);
        form.set_technician(Some(7));

        let err = service.submit(&form).await.unwrap_err();

        assert!(err.is_remote());
        assert!(board.is_cached().await);
        assert_eq!(form.stage(), Stage::Reparacion);
        assert!(form.is_dirty());
    }
}
