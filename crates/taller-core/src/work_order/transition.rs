//! Stage-transition form.
//!
//! Any stage/sub-state pair may be chosen from any other; the only guard is
//! that `Reparación` and `Salida` need an assigned technician. The guard is
//! re-derived on every edit so the form can show it before submission.

use serde::Serialize;
use thiserror::Error;

use super::model::{Stage, SubState, WorkOrder, WorkOrderId};
use crate::session::UserId;

/// Local rejection of a transition. Never sent to the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("technician required to move an order to {stage}")]
    TechnicianRequired { stage: Stage },
}

/// A validated request for the server's move endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(skip)]
    pub order_id: WorkOrderId,
    pub stage: Stage,
    pub sub_state: SubState,
    pub technician_id: Option<UserId>,
}

/// Editable state of the transition dialog for one work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionForm {
    order_id: WorkOrderId,
    stage: Stage,
    sub_state: SubState,
    technician_id: Option<UserId>,
    initial: (Stage, SubState, Option<UserId>),
}

impl TransitionForm {
    /// Opens the form pre-populated from the order's current values.
    ///
    /// Orders without a recognized stage or sub-state start at
    /// `Entrada`/`CHEQUEO`, the intake defaults.
    pub fn open(order: &WorkOrder) -> Self {
        let stage = order.stage.unwrap_or(Stage::Entrada);
        let sub_state = order.sub_state.unwrap_or(SubState::Chequeo);
        Self {
            order_id: order.id,
            stage,
            sub_state,
            technician_id: order.technician_id,
            initial: (stage, sub_state, order.technician_id),
        }
    }

    pub fn order_id(&self) -> WorkOrderId {
        self.order_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn sub_state(&self) -> SubState {
        self.sub_state
    }

    pub fn technician_id(&self) -> Option<UserId> {
        self.technician_id
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn set_sub_state(&mut self, sub_state: SubState) {
        self.sub_state = sub_state;
    }

    pub fn set_technician(&mut self, technician_id: Option<UserId>) {
        self.technician_id = technician_id;
    }

    /// Whether the currently selected stage needs a technician.
    pub fn technician_required(&self) -> bool {
        self.stage.requires_technician()
    }

    /// The validation error the form would show right now, if any.
    pub fn validation(&self) -> Option<TransitionError> {
        if self.technician_required() && self.technician_id.is_none() {
            Some(TransitionError::TechnicianRequired { stage: self.stage })
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation().is_none()
    }

    /// Whether anything changed since the form was opened.
    pub fn is_dirty(&self) -> bool {
        (self.stage, self.sub_state, self.technician_id) != self.initial
    }

    /// Builds the request to submit, or the error that blocks submission.
    pub fn validate(&self) -> Result<MoveRequest, TransitionError> {
        if let Some(err) = self.validation() {
            return Err(err);
        }
        Ok(MoveRequest {
            order_id: self.order_id,
            stage: self.stage,
            sub_state: self.sub_state,
            technician_id: self.technician_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake_order() -> WorkOrder {
        let mut order = WorkOrder::new(42, "OT-0042");
        order.stage = Some(Stage::Entrada);
        order.sub_state = Some(SubState::Chequeo);
        order
    }

    #[test]
    fn test_open_prepopulates_from_order() {
        let mut order = intake_order();
        order.stage = Some(Stage::Reparacion);
        order.sub_state = Some(SubState::Reparacion);
        order.technician_id = Some(7);

        let form = TransitionForm::open(&order);

        assert_eq!(form.order_id(), 42);
        assert_eq!(form.stage(), Stage::Reparacion);
        assert_eq!(form.sub_state(), SubState::Reparacion);
        assert_eq!(form.technician_id(), Some(7));
        assert!(!form.is_dirty());
        assert!(form.is_valid());
    }

    #[test]
    fn test_open_defaults_unknown_stage_to_intake() {
        let form = TransitionForm::open(&WorkOrder::new(1, "A"));
        assert_eq!(form.stage(), Stage::Entrada);
        assert_eq!(form.sub_state(), SubState::Chequeo);
    }

    #[test]
    fn test_requirement_follows_stage_edits() {
        let mut form = TransitionForm::open(&intake_order());
        assert!(!form.technician_required());
        assert!(form.is_valid());

        form.set_stage(Stage::Reparacion);
        assert!(form.technician_required());
        assert_eq!(
            form.validation(),
            Some(TransitionError::TechnicianRequired {
                stage: Stage::Reparacion
            })
        );

        form.set_stage(Stage::Entrada);
        assert!(!form.technician_required());
        assert!(form.is_valid());
    }

    #[test]
    fn test_salida_without_technician_is_rejected() {
        let mut form = TransitionForm::open(&intake_order());
        form.set_stage(Stage::Salida);
        form.set_sub_state(SubState::Terminado);

        let err = form.validate().unwrap_err();
        assert_eq!(err, TransitionError::TechnicianRequired { stage: Stage::Salida });
        assert!(err.to_string().contains("technician required"));
    }

    #[test]
    fn test_any_stage_reachable_with_technician() {
        for from in Stage::ALL {
            for to in Stage::ALL {
                for sub_state in SubState::ALL {
                    let mut order = intake_order();
                    order.stage = Some(from);
                    let mut form = TransitionForm::open(&order);
                    form.set_stage(to);
                    form.set_sub_state(sub_state);
                    form.set_technician(Some(3));

                    let request = form.validate().unwrap();
                    assert_eq!(request.stage, to);
                    assert_eq!(request.sub_state, sub_state);
                }
            }
        }
    }

    #[test]
    fn test_entrada_may_clear_technician() {
        let mut order = intake_order();
        order.technician_id = Some(5);
        let mut form = TransitionForm::open(&order);
        form.set_technician(None);

        let request = form.validate().unwrap();
        assert_eq!(request.technician_id, None);
        assert!(form.is_dirty());
    }

    #[test]
    fn test_move_request_body_shape() {
        let request = MoveRequest {
            order_id: 42,
            stage: Stage::Reparacion,
            sub_state: SubState::Reparacion,
            technician_id: Some(7),
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "stage": "Reparación",
                "subState": "REPARACION",
                "technicianId": 7
            })
        );
    }
}
