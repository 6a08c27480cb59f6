use crate::entities::{inventory, product, product_supplier, product_type, supplier, warehouse};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// One inventory row below its product type's threshold.
///
/// A product linked to several suppliers yields one row per supplier; a
/// product with none yields a single row with the supplier columns null.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct LowStockRow {
    pub product_id: i32,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub quantity: i32,
    pub threshold: i32,
    pub supplier_id: Option<i32>,
    pub supplier_name: Option<String>,
    pub supplier_contact_email: Option<String>,
}

/// Candidate ids bound per query; keeps the IN list well under the
/// Postgres bind-parameter limit.
const CANDIDATE_BATCH: usize = 1_000;

/// Inventory rows of `candidates` that sit strictly below threshold.
///
/// Products without a product type never match. Product and warehouse must
/// both belong to `company_id`.
pub async fn low_stock_rows<C>(
    conn: &C,
    company_id: i32,
    candidates: &[i32],
) -> Result<Vec<LowStockRow>, DbErr>
where
    C: ConnectionTrait,
{
    low_stock_rows_batched(conn, company_id, candidates, CANDIDATE_BATCH).await
}

async fn low_stock_rows_batched<C>(
    conn: &C,
    company_id: i32,
    candidates: &[i32],
    batch_size: usize,
) -> Result<Vec<LowStockRow>, DbErr>
where
    C: ConnectionTrait,
{
    let mut rows = Vec::new();
    for batch in candidates.chunks(batch_size.max(1)) {
        rows.extend(low_stock_batch(conn, company_id, batch).await?);
    }
    Ok(rows)
}

async fn low_stock_batch<C>(
    conn: &C,
    company_id: i32,
    candidates: &[i32],
) -> Result<Vec<LowStockRow>, DbErr>
where
    C: ConnectionTrait,
{
    inventory::Entity::find()
        .select_only()
        .column_as(inventory::Column::ProductId, "product_id")
        .column_as(product::Column::Name, "product_name")
        .column_as(product::Column::Sku, "sku")
        .column_as(inventory::Column::WarehouseId, "warehouse_id")
        .column_as(warehouse::Column::Name, "warehouse_name")
        .column_as(inventory::Column::Quantity, "quantity")
        .column_as(product_type::Column::LowStockThreshold, "threshold")
        .column_as(supplier::Column::Id, "supplier_id")
        .column_as(supplier::Column::Name, "supplier_name")
        .column_as(supplier::Column::ContactEmail, "supplier_contact_email")
        .join(JoinType::InnerJoin, inventory::Relation::Product.def())
        .join(JoinType::InnerJoin, product::Relation::ProductType.def())
        .join(JoinType::InnerJoin, inventory::Relation::Warehouse.def())
        .join(JoinType::LeftJoin, product::Relation::ProductSupplier.def())
        .join(JoinType::LeftJoin, product_supplier::Relation::Supplier.def())
        .filter(inventory::Column::ProductId.is_in(candidates.iter().copied()))
        .filter(product::Column::CompanyId.eq(company_id))
        .filter(warehouse::Column::CompanyId.eq(company_id))
        .filter(
            Expr::col((inventory::Entity, inventory::Column::Quantity)).lt(Expr::col((
                product_type::Entity,
                product_type::Column::LowStockThreshold,
            ))),
        )
        .order_by_asc(inventory::Column::ProductId)
        .order_by_asc(inventory::Column::WarehouseId)
        .into_model::<LowStockRow>()
        .all(conn)
        .await
}
