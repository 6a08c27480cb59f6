use crate::entities::{company, product};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};

/// Returns true when a company with this id exists
pub async fn company_exists<C>(conn: &C, company_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(company::Entity::find_by_id(company_id)
        .one(conn)
        .await?
        .is_some())
}

/// Inserts a product row and returns it with its generated id
pub async fn insert_product<C>(conn: &C, product: product::ActiveModel) -> Result<product::Model, DbErr>
where
    C: ConnectionTrait,
{
    product.insert(conn).await
}
