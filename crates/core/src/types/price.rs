//! Non-negative decimal price.
//!
//! Prices are stored in the remote collections as plain JSON numbers, so the
//! serde representation goes through `rust_decimal::serde::float`. In memory
//! all arithmetic stays in `Decimal`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A non-negative amount of money in the shop's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, field: &'static str) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::Negative { field });
        }
        Ok(Self(amount))
    }

    /// Build a price from an amount in cents. Used mostly by tests and fixtures.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Parse a price typed into a form field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for blank input,
    /// [`ValidationError::InvalidNumber`] if the text is not a decimal, and
    /// [`ValidationError::Negative`] for amounts below zero.
    pub fn parse(text: &str, field: &'static str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField { field });
        }
        let amount = Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidNumber {
            field,
            value: trimmed.to_owned(),
        })?;
        Self::new(amount, field)
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price times `quantity`, or `None` if the product does not fit a `Decimal`.
    #[must_use]
    pub fn checked_total(&self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}
