pub mod alerts;
pub mod common;
pub mod inventory;
pub mod products;
