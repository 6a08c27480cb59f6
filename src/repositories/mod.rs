//! Data access functions.
//!
//! Every function takes the connection or transaction it runs on, so the
//! calling service decides the unit of work. Functions return `DbErr` and
//! leave classification of constraint failures to the caller.

pub mod alerts;
pub mod catalog;
pub mod inventory;
pub mod sales;
