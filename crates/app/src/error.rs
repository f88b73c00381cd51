//! Application error type returned by screen actions.

use std::fmt;

use stockroom_core::{InventoryError, SaleRecordId};
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Which write of a multi-write action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    /// Appending the sale record.
    RecordSale,
    /// Lowering the stock item's quantity.
    DecrementStock,
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordSale => write!(f, "recording the sale"),
            Self::DecrementStock => write!(f, "updating stock"),
        }
    }
}

/// Errors surfaced by the stock and sale screens.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected by a stock or cart rule before anything was written.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// A remote call failed and the action wrote nothing.
    #[error("remote operation failed: {0}")]
    Remote(#[from] StoreError),

    /// Some writes of a multi-write action landed before one failed.
    ///
    /// The store is left as written; nothing is rolled back.
    #[error(
        "partially committed: {committed} of {total} line(s) saved; failed while {step} for {item}: {source}"
    )]
    PartialCommit {
        /// Lines fully written before the failure.
        committed: usize,
        /// Lines in the action.
        total: usize,
        /// Name of the item whose write failed.
        item: String,
        /// The failing write.
        step: CommitStep,
        /// Underlying store error.
        source: StoreError,
    },

    /// A quick-sell record was appended but the quantity was not lowered.
    #[error("sale of {item} was recorded as {record} but stock was not updated: {source}")]
    StockNotDecremented {
        /// Name of the item sold.
        item: String,
        /// The appended sale record.
        record: SaleRecordId,
        /// Underlying store error.
        source: StoreError,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Whether the store may hold writes from the failed action.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(
            self,
            Self::PartialCommit { .. } | Self::StockNotDecremented { .. }
        )
    }
}

/// Result alias for screen actions.
pub type Result<T> = std::result::Result<T, AppError>;
