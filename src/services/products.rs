use crate::{
    db::{self, DbPool},
    entities::{inventory, inventory_movement::MovementKind, product},
    errors::ServiceError,
    repositories::{catalog, inventory as inventory_repo},
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::Set;
use std::sync::Arc;
use tracing::{info, instrument};

/// Validated input for creating a product together with its opening stock.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductCommand {
    pub company_id: i32,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub product_type_id: Option<i32>,
    pub warehouse_id: i32,
    pub initial_quantity: i32,
}

/// Rows written by a successful create.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithStock {
    pub product: product::Model,
    pub inventory: inventory::Model,
}

/// Service for onboarding products into the catalog
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates the product, its inventory row in the requested warehouse and
    /// the opening ledger entry in one transaction. Either all three rows
    /// commit or none do.
    #[instrument(skip(self, command), fields(sku = %command.sku, company_id = command.company_id))]
    pub async fn create_product_with_stock(
        &self,
        command: CreateProductCommand,
    ) -> Result<ProductWithStock, ServiceError> {
        let now = Utc::now();

        let created = db::with_transaction(&self.db_pool, "create_product_with_stock", move |txn| {
            Box::pin(async move {
                let CreateProductCommand {
                    company_id,
                    sku,
                    name,
                    price,
                    product_type_id,
                    warehouse_id,
                    initial_quantity,
                } = command;

                let new_product = product::ActiveModel {
                    company_id: Set(company_id),
                    product_type_id: Set(product_type_id),
                    sku: Set(sku.clone()),
                    name: Set(name),
                    price: Set(price),
                    created_at: Set(now),
                    ..Default::default()
                };

                let product = catalog::insert_product(txn, new_product)
                    .await
                    .map_err(|e| {
                        ServiceError::from_constraint(
                            e,
                            || ServiceError::Conflict(format!("product with SKU '{}' already exists", sku)),
                            || match product_type_id {
                                Some(type_id) => ServiceError::NotFound(format!(
                                    "company {} or product type {} not found",
                                    company_id, type_id
                                )),
                                None => ServiceError::NotFound(format!("company {} not found", company_id)),
                            },
                        )
                    })?;

                let inventory =
                    inventory_repo::insert_inventory(txn, product.id, warehouse_id, initial_quantity, now)
                        .await
                        .map_err(|e| {
                            ServiceError::from_constraint(
                                e,
                                || {
                                    ServiceError::Conflict(format!(
                                        "inventory for product {} in warehouse {} already exists",
                                        product.id, warehouse_id
                                    ))
                                },
                                || ServiceError::NotFound(format!("warehouse {} not found", warehouse_id)),
                            )
                        })?;

                inventory_repo::insert_movement(
                    txn,
                    inventory_repo::NewMovement {
                        inventory_id: inventory.id,
                        kind: MovementKind::Initial,
                        quantity_delta: initial_quantity,
                        quantity_after: initial_quantity,
                        reason: None,
                        created_at: now,
                    },
                )
                .await
                .map_err(ServiceError::db_error)?;

                Ok(ProductWithStock { product, inventory })
            })
        })
        .await?;

        counter!("stockguard.products.created", 1);
        info!(
            product_id = created.product.id,
            inventory_id = created.inventory.id,
            warehouse_id = created.inventory.warehouse_id,
            quantity = created.inventory.quantity,
            "Product created with initial stock"
        );

        Ok(created)
    }
}
