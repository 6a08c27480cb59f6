use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reason a stock level changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MovementKind {
    /// Opening balance written together with the product.
    #[sea_orm(string_value = "initial")]
    Initial,
    #[sea_orm(string_value = "restock")]
    Restock,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

/// Append-only ledger of stock changes for one inventory row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub inventory_id: i32,
    pub kind: MovementKind,
    pub quantity_delta: i32,
    pub quantity_after: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::InventoryId",
        to = "super::inventory::Column::Id"
    )]
    Inventory,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn kinds_are_stored_as_their_snake_case_names() {
        assert_eq!(MovementKind::Adjustment.to_value(), "adjustment");
        assert_eq!(
            MovementKind::try_from_value(&"restock".to_string()).ok(),
            Some(MovementKind::Restock)
        );
        assert!(MovementKind::try_from_value(&"transfer".to_string()).is_err());
    }

    #[test]
    fn storage_names_match_the_json_names() {
        for kind in MovementKind::iter() {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.to_value());
        }
    }
}
