use crate::entities::{sales_order, sales_order_item};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QuerySelect,
};

/// Units sold for one product
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ProductSalesRow {
    pub product_id: i32,
    pub total_sold: i64,
}

/// Sums item quantities per product over the company's orders created at or
/// after `cutoff`. Products without a qualifying order produce no row.
pub async fn units_sold_since<C>(
    conn: &C,
    company_id: i32,
    cutoff: DateTime<Utc>,
) -> Result<Vec<ProductSalesRow>, DbErr>
where
    C: ConnectionTrait,
{
    sales_order_item::Entity::find()
        .inner_join(sales_order::Entity)
        .filter(sales_order::Column::CompanyId.eq(company_id))
        .filter(sales_order::Column::CreatedAt.gte(cutoff))
        .group_by(sales_order_item::Column::ProductId)
        .select_only()
        .column(sales_order_item::Column::ProductId)
        .column_as(
            Expr::col((sales_order_item::Entity, sales_order_item::Column::Quantity)).sum(),
            "total_sold",
        )
        .into_model::<ProductSalesRow>()
        .all(conn)
        .await
}
