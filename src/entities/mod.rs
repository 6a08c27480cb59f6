//! sea-orm entities for the stock tracking schema.
//!
//! A product never carries warehouse identity: the only product/warehouse
//! link is an `inventory` row, unique per (product_id, warehouse_id).

pub mod company;
pub mod inventory;
pub mod inventory_movement;
pub mod product;
pub mod product_supplier;
pub mod product_type;
pub mod sales_order;
pub mod sales_order_item;
pub mod supplier;
pub mod warehouse;
