use crate::entities::{
    inventory,
    inventory_movement::{self, MovementKind},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

/// Ledger entry to append for one inventory row
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub inventory_id: i32,
    pub kind: MovementKind,
    pub quantity_delta: i32,
    pub quantity_after: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_inventory<C>(
    conn: &C,
    product_id: i32,
    warehouse_id: i32,
    quantity: i32,
    now: DateTime<Utc>,
) -> Result<inventory::Model, DbErr>
where
    C: ConnectionTrait,
{
    inventory::ActiveModel {
        product_id: Set(product_id),
        warehouse_id: Set(warehouse_id),
        quantity: Set(quantity),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C>(conn: &C, inventory_id: i32) -> Result<Option<inventory::Model>, DbErr>
where
    C: ConnectionTrait,
{
    inventory::Entity::find_by_id(inventory_id).one(conn).await
}

pub async fn find_by_product_and_warehouse<C>(
    conn: &C,
    product_id: i32,
    warehouse_id: i32,
) -> Result<Option<inventory::Model>, DbErr>
where
    C: ConnectionTrait,
{
    inventory::Entity::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .filter(inventory::Column::WarehouseId.eq(warehouse_id))
        .one(conn)
        .await
}

/// Moves the cached quantity from `expected` to `new_quantity`.
///
/// The update only applies while the row still holds `expected`; a `false`
/// return means another writer changed it first.
pub async fn compare_and_set_quantity<C>(
    conn: &C,
    inventory_id: i32,
    expected: i32,
    new_quantity: i32,
    now: DateTime<Utc>,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let result = inventory::Entity::update_many()
        .col_expr(inventory::Column::Quantity, Expr::value(new_quantity))
        .col_expr(inventory::Column::UpdatedAt, Expr::value(now))
        .filter(inventory::Column::Id.eq(inventory_id))
        .filter(inventory::Column::Quantity.eq(expected))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

pub async fn insert_movement<C>(conn: &C, movement: NewMovement) -> Result<inventory_movement::Model, DbErr>
where
    C: ConnectionTrait,
{
    inventory_movement::ActiveModel {
        inventory_id: Set(movement.inventory_id),
        kind: Set(movement.kind),
        quantity_delta: Set(movement.quantity_delta),
        quantity_after: Set(movement.quantity_after),
        reason: Set(movement.reason),
        created_at: Set(movement.created_at),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Ledger for one inventory row, oldest first
pub async fn list_movements<C>(
    conn: &C,
    inventory_id: i32,
) -> Result<Vec<inventory_movement::Model>, DbErr>
where
    C: ConnectionTrait,
{
    inventory_movement::Entity::find()
        .filter(inventory_movement::Column::InventoryId.eq(inventory_id))
        .order_by_asc(inventory_movement::Column::Id)
        .all(conn)
        .await
}
