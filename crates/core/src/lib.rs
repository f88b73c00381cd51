//! Stockroom Core - Domain types and rules.
//!
//! This crate provides the types shared by every Stockroom component:
//! - `app` - Document-store adapters and the stock/sale screen controllers
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no store access,
//! no HTTP clients. Everything here is synchronous and deterministic given
//! its inputs, which keeps the validation rules testable on their own.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, categories, and stock levels
//! - [`stock`] - Stock items, derived display values, and the stock snapshot
//! - [`sale`] - Append-only sale records
//! - [`cart`] - Manual-sale cart and stock coverage check
//! - [`form`] - Text-field forms and their validation
//! - [`report`] - Per-day sales summary
//! - [`error`] - Validation and inventory rule errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod form;
pub mod report;
pub mod sale;
pub mod stock;
pub mod types;

pub use cart::{Cart, CartLine, CartState, parse_cart_quantity};
pub use error::{InventoryError, ValidationError};
pub use form::{FormMode, SaleSelection, StockForm};
pub use report::{DailySales, daily_summary};
pub use sale::{RecordedSale, SaleRecord, sale_timestamp};
pub use stock::{MARGIN_OUT_OF_RANGE, StockItem, StockItemInput, StockSnapshot, name_key};
pub use types::*;
