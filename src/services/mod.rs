pub mod inventory;
pub mod low_stock;
pub mod products;
pub mod sales_activity;
