//! Command implementations.

pub mod sale;
pub mod sales;
pub mod stock;
