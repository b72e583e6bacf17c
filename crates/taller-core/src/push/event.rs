use serde::{Deserialize, Serialize};

use crate::work_order::WorkOrderId;

/// Payload of the `orderAssigned` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAssigned {
    pub message: String,
    pub reference_order_id: WorkOrderId,
}

/// Events the server can push to a registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PushEvent {
    OrderAssigned(OrderAssigned),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_assigned_frame() {
        let frame = r#"{"event":"orderAssigned","data":{"message":"assigned","referenceOrderId":42}}"#;
        let event: PushEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            PushEvent::OrderAssigned(OrderAssigned {
                message: "assigned".to_string(),
                reference_order_id: 42,
            })
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let frame = r#"{"event":"orderDeleted","data":{}}"#;
        assert!(serde_json::from_str::<PushEvent>(frame).is_err());
    }
}
