use super::{invalid_field_from, FieldReader};
use crate::{
    errors::ServiceError,
    services::products::{CreateProductCommand, ProductWithStock},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const REQUIRED_FIELDS: [&str; 6] = [
    "company_id",
    "sku",
    "name",
    "price",
    "warehouse_id",
    "initial_quantity",
];

/// Prices are stored as NUMERIC(10, 2)
const MAX_PRICE_EXCLUSIVE: i64 = 100_000_000;

/// Body of `POST /api/v1/products`.
///
/// Numeric fields also accept numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "company_id": 1,
    "sku": "WID-001",
    "name": "Widget",
    "price": "19.99",
    "product_type_id": 3,
    "warehouse_id": 2,
    "initial_quantity": 40
}))]
pub struct CreateProductRequest {
    #[validate(range(min = 1))]
    pub company_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(custom = "validate_price")]
    #[schema(value_type = String)]
    pub price: Decimal,
    #[validate(range(min = 1))]
    pub product_type_id: Option<i32>,
    #[validate(range(min = 1))]
    pub warehouse_id: i32,
    #[validate(range(min = 0))]
    pub initial_quantity: i32,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price_negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_precision"));
    }
    if *price >= Decimal::from(MAX_PRICE_EXCLUSIVE) {
        return Err(ValidationError::new("price_too_large"));
    }
    Ok(())
}

fn expected_type(field: &str) -> &'static str {
    match field {
        "company_id" | "warehouse_id" | "product_type_id" => "a positive integer",
        "sku" => "a non-empty string of at most 100 characters",
        "name" => "a non-empty string of at most 255 characters",
        "price" => "a non-negative decimal with at most 2 fractional digits, below 100000000",
        "initial_quantity" => "a non-negative integer",
        _ => "a valid value",
    }
}

impl CreateProductRequest {
    /// Reads and validates a raw JSON body.
    ///
    /// Absent fields are reported together; otherwise the first malformed
    /// field is named along with the type it should have.
    pub fn parse(payload: &Value) -> Result<Self, ServiceError> {
        let reader = FieldReader::new(payload)?;
        reader.require(&REQUIRED_FIELDS)?;

        let request = Self {
            company_id: reader.integer("company_id", expected_type("company_id"))?,
            sku: reader.string("sku")?,
            name: reader.string("name")?,
            price: reader.decimal("price", expected_type("price"))?,
            product_type_id: reader
                .optional_integer("product_type_id", expected_type("product_type_id"))?,
            warehouse_id: reader.integer("warehouse_id", expected_type("warehouse_id"))?,
            initial_quantity: reader
                .integer("initial_quantity", expected_type("initial_quantity"))?,
        };

        request
            .validate()
            .map_err(|errors| invalid_field_from(&errors, expected_type))?;

        Ok(request)
    }
}

impl From<CreateProductRequest> for CreateProductCommand {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            company_id: request.company_id,
            sku: request.sku,
            name: request.name,
            price: request.price,
            product_type_id: request.product_type_id,
            warehouse_id: request.warehouse_id,
            initial_quantity: request.initial_quantity,
        }
    }
}

/// Identifiers of the rows created for a new product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedProductResponse {
    #[schema(example = 17)]
    pub product_id: i32,
    #[schema(example = 31)]
    pub inventory_id: i32,
    #[schema(example = 2)]
    pub warehouse_id: i32,
    #[schema(example = "WID-001")]
    pub sku: String,
    #[schema(example = 40)]
    pub quantity: i32,
}

impl From<ProductWithStock> for CreatedProductResponse {
    fn from(created: ProductWithStock) -> Self {
        Self {
            product_id: created.product.id,
            inventory_id: created.inventory.id,
            warehouse_id: created.inventory.warehouse_id,
            sku: created.product.sku,
            quantity: created.inventory.quantity,
        }
    }
}
