use super::{invalid_field_from, FieldReader};
use crate::{
    entities::inventory_movement::{self, MovementKind},
    errors::ServiceError,
    services::inventory::{RecordMovementCommand, RecordedMovement},
};
use chrono::{DateTime, Utc};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

const KIND_EXPECTED: &str = "one of restock, sale, adjustment";

/// Body of `POST /api/v1/inventory/movements`.
///
/// `quantity` is a count of units for `restock` and `sale`, and a signed,
/// non-zero change for `adjustment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "product_id": 17,
    "warehouse_id": 2,
    "kind": "sale",
    "quantity": 3,
    "reason": "order 1042"
}))]
pub struct RecordMovementRequest {
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity: i32,
    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

fn expected_type(field: &str) -> &'static str {
    match field {
        "product_id" | "warehouse_id" => "a positive integer",
        "kind" => KIND_EXPECTED,
        "quantity" => "an integer",
        "reason" => "a string of at most 255 characters",
        _ => "a valid value",
    }
}

impl RecordMovementRequest {
    pub fn parse(payload: &Value) -> Result<Self, ServiceError> {
        let reader = FieldReader::new(payload)?;
        reader.require(&["product_id", "warehouse_id", "kind", "quantity"])?;

        let kind = match MovementKind::try_from_value(&reader.string("kind")?).ok() {
            Some(MovementKind::Initial) | None => {
                return Err(ServiceError::invalid_field("kind", KIND_EXPECTED))
            }
            Some(kind) => kind,
        };

        let request = Self {
            product_id: reader.integer("product_id", expected_type("product_id"))?,
            warehouse_id: reader.integer("warehouse_id", expected_type("warehouse_id"))?,
            kind,
            quantity: reader.integer("quantity", expected_type("quantity"))?,
            reason: reader.optional_string("reason")?.filter(|r| !r.is_empty()),
        };

        request
            .validate()
            .map_err(|errors| invalid_field_from(&errors, expected_type))?;

        match request.kind {
            MovementKind::Adjustment if request.quantity == 0 => Err(ServiceError::invalid_field(
                "quantity",
                "a non-zero integer for adjustments",
            )),
            MovementKind::Restock | MovementKind::Sale if request.quantity <= 0 => Err(
                ServiceError::invalid_field("quantity", "a positive integer for restock and sale"),
            ),
            _ => Ok(request),
        }
    }
}

impl From<RecordMovementRequest> for RecordMovementCommand {
    fn from(request: RecordMovementRequest) -> Self {
        let quantity_delta = match request.kind {
            MovementKind::Sale => -request.quantity,
            _ => request.quantity,
        };

        Self {
            product_id: request.product_id,
            warehouse_id: request.warehouse_id,
            kind: request.kind,
            quantity_delta,
            reason: request.reason,
        }
    }
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MovementEntry {
    pub id: i32,
    pub kind: MovementKind,
    pub quantity_delta: i32,
    pub quantity_after: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<inventory_movement::Model> for MovementEntry {
    fn from(model: inventory_movement::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            quantity_delta: model.quantity_delta,
            quantity_after: model.quantity_after,
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}

/// Result of a recorded movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordedMovementResponse {
    pub inventory_id: i32,
    pub product_id: i32,
    pub warehouse_id: i32,
    /// Stock on hand after the movement
    pub quantity: i32,
    pub movement: MovementEntry,
}

impl From<RecordedMovement> for RecordedMovementResponse {
    fn from(recorded: RecordedMovement) -> Self {
        Self {
            inventory_id: recorded.inventory.id,
            product_id: recorded.inventory.product_id,
            warehouse_id: recorded.inventory.warehouse_id,
            quantity: recorded.inventory.quantity,
            movement: recorded.movement.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MovementHistoryResponse {
    pub inventory_id: i32,
    pub movements: Vec<MovementEntry>,
}
