//! Status enums derived from stock data.

use serde::{Deserialize, Serialize};

/// Stock level of an item relative to its minimum threshold.
///
/// Purely presentational: nothing in the write path depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    #[default]
    Healthy,
    /// Quantity on hand is at or below the minimum threshold.
    Low,
}

impl StockLevel {
    /// Classify a quantity against its minimum threshold.
    #[must_use]
    pub const fn classify(quantity: u32, minimum: u32) -> Self {
        if quantity <= minimum { Self::Low } else { Self::Healthy }
    }

    /// Whether this is the low-stock state.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "ok"),
            Self::Low => write!(f, "low"),
        }
    }
}
