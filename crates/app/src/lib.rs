//! Stockroom App - Stock and manual-sale screens over a remote document store.
//!
//! # Architecture
//!
//! - [`store`] - The four-call document store seam and its adapters
//! - [`repository`] - Typed access to the stock and sales collections
//! - [`screens`] - Stock and sale screen controllers
//! - [`history`] - Sales history and per-day summary
//! - [`import`] - Bulk stock import through the stock form rules
//! - [`config`] - Environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//!
//! Screens hold a snapshot of the stock collection and never observe their
//! own writes except by refetching. Multi-write actions are not atomic;
//! see [`AppError::PartialCommit`] and [`AppError::StockNotDecremented`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod history;
pub mod import;
pub mod repository;
pub mod screens;
pub mod store;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, FirestoreConfig};
pub use error::{AppError, CommitStep, Result};
pub use history::SalesHistory;
pub use import::{ImportReport, import_forms};
pub use repository::{SaleRepository, StockRepository};
pub use screens::{Confirm, SaleReceipt, SaleScreen, StockRow, StockScreen};
pub use store::{Collections, DocumentStore, FirestoreStore, InMemoryStore, StoreError};
pub use telemetry::{LogFormat, init_tracing};
