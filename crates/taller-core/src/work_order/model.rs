//! Work-order domain model.
//!
//! Work orders are owned by the server; the console holds a read-mostly
//! copy that is refetched after every mutation.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::session::UserId;

pub type WorkOrderId = i64;

/// Top-level processing phase of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Entrada,
    #[serde(rename = "Reparación")]
    Reparacion,
    Salida,
}

impl Stage {
    /// All stages in board order.
    pub const ALL: [Stage; 3] = [Stage::Entrada, Stage::Reparacion, Stage::Salida];

    /// Wire spelling of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Entrada => "Entrada",
            Stage::Reparacion => "Reparación",
            Stage::Salida => "Salida",
        }
    }

    /// Parses the wire spelling; anything else is not a stage.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Whether an order in this stage must have a technician assigned.
    pub fn requires_technician(&self) -> bool {
        matches!(self, Stage::Reparacion | Stage::Salida)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer status within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubState {
    Chequeo,
    Reparacion,
    Terminado,
}

impl SubState {
    pub const ALL: [SubState; 3] = [SubState::Chequeo, SubState::Reparacion, SubState::Terminado];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubState::Chequeo => "CHEQUEO",
            SubState::Reparacion => "REPARACION",
            SubState::Terminado => "TERMINADO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for SubState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    Alta,
    #[default]
    Normal,
    Baja,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Alta, Priority::Normal, Priority::Baja];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Alta => "Alta",
            Priority::Normal => "Normal",
            Priority::Baja => "Baja",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub advance: f64,
}

impl Totals {
    /// Amount still owed by the client.
    pub fn balance(&self) -> f64 {
        self.total - self.advance
    }
}

/// One billed line (product or service) of a work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTask {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub order_number: String,
    /// `None` when the server sent no stage or one this client does not know.
    #[serde(default, deserialize_with = "lenient_stage")]
    pub stage: Option<Stage>,
    #[serde(default, deserialize_with = "lenient_sub_state")]
    pub sub_state: Option<SubState>,
    /// `Normal` when missing, null or unknown.
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub technician_id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub promised_date: Option<NaiveDate>,
    #[serde(default)]
    pub client: Option<Client>,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub totals: Totals,
    #[serde(default)]
    pub details: Vec<DetailLine>,
    #[serde(default)]
    pub tasks: Vec<WorkTask>,
}

impl WorkOrder {
    /// A bare order, mostly useful for building fixtures.
    pub fn new(id: WorkOrderId, order_number: impl Into<String>) -> Self {
        Self {
            id,
            order_number: order_number.into(),
            stage: None,
            sub_state: None,
            priority: Priority::Normal,
            technician_id: None,
            promised_date: None,
            client: None,
            device: None,
            totals: Totals::default(),
            details: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn client_first_name(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.first_name.as_str())
    }

    /// Whether the order satisfies the technician-assignment invariant.
    pub fn has_required_technician(&self) -> bool {
        match self.stage {
            Some(stage) if stage.requires_technician() => self.technician_id.is_some(),
            _ => true,
        }
    }
}

// One odd field must not fail a whole list decode, so the enum-like fields
// accept any JSON value and keep only strings they recognise.
fn wire_str<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_stage<'de, D>(deserializer: D) -> Result<Option<Stage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(wire_str(deserializer)?.as_deref().and_then(Stage::parse))
}

fn lenient_sub_state<'de, D>(deserializer: D) -> Result<Option<SubState>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(wire_str(deserializer)?.as_deref().and_then(SubState::parse))
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(wire_str(deserializer)?
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or_default())
}

// The server sends either `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = wire_str(deserializer)?.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Ok(parse_promised_date(&raw))
}

fn parse_promised_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.date_naive()),
        Err(e) => {
            tracing::warn!("[WorkOrder] Ignoring unparseable promised date '{}': {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wire_spelling() {
        assert_eq!(serde_json::to_string(&Stage::Reparacion).unwrap(), "\"Reparación\"");
        assert_eq!(Stage::parse("Salida"), Some(Stage::Salida));
        assert_eq!(Stage::parse("Reparacion"), None);
        assert_eq!(serde_json::to_string(&SubState::Terminado).unwrap(), "\"TERMINADO\"");
    }

    #[test]
    fn test_requires_technician() {
        assert!(!Stage::Entrada.requires_technician());
        assert!(Stage::Reparacion.requires_technician());
        assert!(Stage::Salida.requires_technician());
    }

    #[test]
    fn test_deserialize_full_order() {
        let json = r#"{
            "id": 12,
            "orderNumber": "OT-0012",
            "stage": "Reparación",
            "subState": "REPARACION",
            "priority": "Alta",
            "technicianId": 7,
            "promisedDate": "2026-10-20T00:00:00.000Z",
            "client": {"id": 3, "firstName": "Lucía", "lastName": "Pérez"},
            "device": {"id": 9, "brand": "Samsung", "model": "A54"},
            "totals": {"subtotal": 100.0, "tax": 16.0, "total": 116.0, "advance": 50.0},
            "details": [{"description": "Pantalla", "quantity": 1, "unitPrice": 100.0}],
            "tasks": [{"id": 1, "description": "Cambiar pantalla"}]
        }"#;

        let order: WorkOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.stage, Some(Stage::Reparacion));
        assert_eq!(order.sub_state, Some(SubState::Reparacion));
        assert_eq!(order.priority, Priority::Alta);
        assert_eq!(order.promised_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(order.client_first_name(), Some("Lucía"));
        assert_eq!(order.totals.balance(), 66.0);
        assert!(!order.tasks[0].done);
        assert!(order.has_required_technician());
    }

    #[test]
    fn test_unknown_or_missing_stage_is_none() {
        let unknown: WorkOrder =
            serde_json::from_str(r#"{"id": 1, "orderNumber": "A", "stage": "Archivada"}"#).unwrap();
        let missing: WorkOrder = serde_json::from_str(r#"{"id": 2, "orderNumber": "B"}"#).unwrap();
        let null: WorkOrder =
            serde_json::from_str(r#"{"id": 3, "orderNumber": "C", "stage": null}"#).unwrap();

        assert_eq!(unknown.stage, None);
        assert_eq!(missing.stage, None);
        assert_eq!(null.stage, None);
        assert_eq!(missing.priority, Priority::Normal);
    }

    #[test]
    fn test_plain_date_is_accepted() {
        let order: WorkOrder = serde_json::from_str(
            r#"{"id": 1, "orderNumber": "A", "promisedDate": "2026-10-19"}"#,
        )
        .unwrap();
        assert_eq!(order.promised_date, NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn test_odd_fields_do_not_fail_the_list() {
        let json = r#"[
            {"id": 1, "orderNumber": "A", "stage": "Entrada", "subState": "CHEQUEO", "priority": "Baja"},
            {"id": 2, "orderNumber": "B", "stage": "Salida", "subState": "ENTREGADO", "priority": null},
            {"id": 3, "orderNumber": "C", "priority": "Urgente", "promisedDate": "next tuesday"},
            {"id": 4, "orderNumber": "D", "subState": 3, "promisedDate": 20261020}
        ]"#;

        let orders: Vec<WorkOrder> = serde_json::from_str(json).unwrap();

        assert_eq!(orders.len(), 4);
        assert_eq!(orders[0].sub_state, Some(SubState::Chequeo));
        assert_eq!(orders[0].priority, Priority::Baja);
        assert_eq!(orders[1].stage, Some(Stage::Salida));
        assert_eq!(orders[1].sub_state, None);
        assert_eq!(orders[1].priority, Priority::Normal);
        assert_eq!(orders[2].priority, Priority::Normal);
        assert_eq!(orders[2].promised_date, None);
        assert_eq!(orders[3].sub_state, None);
        assert_eq!(orders[3].promised_date, None);
    }

    #[test]
    fn test_missing_technician_breaks_invariant() {
        let mut order = WorkOrder::new(1, "A");
        order.stage = Some(Stage::Salida);
        assert!(!order.has_required_technician());
    }
}
