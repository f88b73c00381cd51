//! Domain errors.
//!
//! Every variant is recoverable: the caller keeps its form or cart and the
//! user corrects the input. Transport failures live in the app crate.

use thiserror::Error;

use crate::types::StockItemId;

/// A required field is missing or does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required form field is blank.
    #[error("{field} is required")]
    MissingField {
        /// Field label.
        field: &'static str,
    },

    /// A numeric field does not parse.
    #[error("{field} must be a valid number (got {value:?})")]
    InvalidNumber {
        /// Field label.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A numeric field is below zero.
    #[error("{field} cannot be negative")]
    Negative {
        /// Field label.
        field: &'static str,
    },

    /// The category is not one of the enumerated values.
    #[error("unknown category: {0}")]
    InvalidCategory(String),

    /// No stock item was selected for the cart.
    #[error("select a product first")]
    NoItemSelected,

    /// The referenced item is not in the current snapshot.
    #[error("product {0} is not in the stock list")]
    UnknownItem(StockItemId),

    /// Cart quantity is not a positive integer.
    #[error("quantity must be a positive whole number (got {0:?})")]
    InvalidQuantity(String),

    /// A price times quantity does not fit a decimal amount.
    #[error("total for {name} is too large")]
    AmountTooLarge {
        /// Item or line name.
        name: String,
    },
}

/// Rejections raised by stock and cart rules before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another stock item already uses this name (ignoring case).
    #[error("a product named {name:?} already exists")]
    DuplicateName {
        /// The conflicting name as typed.
        name: String,
    },

    /// The item already has a line in the cart.
    #[error("{name} is already in the cart; remove it before adding it again")]
    DuplicateCartLine {
        /// Name of the item.
        name: String,
    },

    /// Not enough units on hand.
    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        /// Name of the item.
        name: String,
        /// Quantity on hand in the snapshot.
        available: u32,
        /// Quantity the action needed.
        requested: u32,
    },

    /// Confirm was attempted with no lines.
    #[error("the cart is empty; add at least one item")]
    CartEmpty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InventoryError::InsufficientStock {
            name: "Rice".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Rice: 2 available, 3 requested"
        );

        let err = InventoryError::from(ValidationError::MissingField { field: "name" });
        assert_eq!(err.to_string(), "name is required");
    }
}
