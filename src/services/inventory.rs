use crate::{
    db::{self, DbPool},
    entities::{
        inventory,
        inventory_movement::{self, MovementKind},
    },
    errors::ServiceError,
    repositories::inventory as inventory_repo,
};
use chrono::Utc;
use sea_orm::ActiveEnum;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Validated stock change for one (product, warehouse) row.
///
/// `quantity_delta` is already signed: restocks are positive, sales
/// negative, adjustments either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMovementCommand {
    pub product_id: i32,
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity_delta: i32,
    pub reason: Option<String>,
}

/// Ledger entry together with the row it changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMovement {
    pub movement: inventory_movement::Model,
    pub inventory: inventory::Model,
}

/// Service for stock movements against existing inventory rows
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Applies a movement and appends it to the ledger in one transaction.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        command: RecordMovementCommand,
    ) -> Result<RecordedMovement, ServiceError> {
        if command.quantity_delta == 0 {
            return Err(ServiceError::ValidationError(
                "movement quantity must not be zero".to_string(),
            ));
        }
        if command.kind == MovementKind::Initial {
            return Err(ServiceError::invalid_field(
                "kind",
                "one of restock, sale, adjustment",
            ));
        }

        let now = Utc::now();
        let recorded = db::with_transaction(&self.db_pool, "record_movement", move |txn| {
            Box::pin(async move {
                let current = inventory_repo::find_by_product_and_warehouse(
                    txn,
                    command.product_id,
                    command.warehouse_id,
                )
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "no inventory for product {} in warehouse {}",
                        command.product_id, command.warehouse_id
                    ))
                })?;

                let new_quantity = current
                    .quantity
                    .checked_add(command.quantity_delta)
                    .ok_or_else(|| {
                        ServiceError::ValidationError("resulting quantity is out of range".to_string())
                    })?;
                if new_quantity < 0 {
                    return Err(ServiceError::InsufficientStock(format!(
                        "{} on hand in warehouse {}, cannot remove {}",
                        current.quantity,
                        command.warehouse_id,
                        command.quantity_delta.unsigned_abs()
                    )));
                }

                let applied = inventory_repo::compare_and_set_quantity(
                    txn,
                    current.id,
                    current.quantity,
                    new_quantity,
                    now,
                )
                .await
                .map_err(ServiceError::db_error)?;
                if !applied {
                    return Err(ServiceError::Conflict(format!(
                        "inventory {} changed concurrently, retry the movement",
                        current.id
                    )));
                }

                let movement = inventory_repo::insert_movement(
                    txn,
                    inventory_repo::NewMovement {
                        inventory_id: current.id,
                        kind: command.kind,
                        quantity_delta: command.quantity_delta,
                        quantity_after: new_quantity,
                        reason: command.reason,
                        created_at: now,
                    },
                )
                .await
                .map_err(ServiceError::db_error)?;

                let inventory = inventory::Model {
                    quantity: new_quantity,
                    updated_at: now,
                    ..current
                };

                Ok(RecordedMovement {
                    movement,
                    inventory,
                })
            })
        })
        .await
        .map_err(|e| {
            if matches!(e, ServiceError::InsufficientStock(_) | ServiceError::Conflict(_)) {
                warn!(error = %e, "Stock movement rejected");
            }
            e
        })?;

        counter!("stockguard.inventory.movements", 1, "kind" => recorded.movement.kind.to_value());
        info!(
            inventory_id = recorded.inventory.id,
            delta = recorded.movement.quantity_delta,
            quantity_after = recorded.movement.quantity_after,
            "Stock movement recorded"
        );

        Ok(recorded)
    }

    /// Ledger for one inventory row, oldest first
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        inventory_id: i32,
    ) -> Result<Vec<inventory_movement::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        if inventory_repo::find_by_id(db, inventory_id)
            .await
            .map_err(ServiceError::db_error)?
            .is_none()
        {
            return Err(ServiceError::NotFound(format!(
                "inventory {} not found",
                inventory_id
            )));
        }

        inventory_repo::list_movements(db, inventory_id)
            .await
            .map_err(ServiceError::db_error)
    }
}
