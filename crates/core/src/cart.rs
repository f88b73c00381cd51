//! Manual-sale cart.
//!
//! The cart lives only in the sale screen's session. Lines snapshot the
//! item's name and sale price when added; quantities on hand are checked
//! against the stock snapshot at confirm time, never re-fetched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, ValidationError};
use crate::stock::{StockItem, StockSnapshot};
use crate::types::{Price, StockItemId};

/// A pending sale quantity for one stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Item being sold.
    pub item_id: StockItemId,
    /// Name snapshot.
    pub name: String,
    /// Unit price snapshot.
    pub sale_price: Price,
    /// Requested units, always positive.
    pub quantity: u32,
}

impl CartLine {
    /// Price snapshot times quantity, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.sale_price.checked_total(self.quantity)
    }
}

/// Where the cart is in the sale flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    /// No lines.
    #[default]
    Empty,
    /// Lines are being added or removed.
    Building,
    /// A confirm is validating or writing.
    Confirming,
}

/// Cart with at most one line per stock item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the item already has a line.
    #[must_use]
    pub fn contains(&self, id: &StockItemId) -> bool {
        self.lines.iter().any(|line| &line.item_id == id)
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountTooLarge`] naming the first line whose
    /// total, or the running sum up to it, does not fit a `Decimal`.
    pub fn total(&self) -> Result<Decimal, ValidationError> {
        self.lines.iter().try_fold(Decimal::ZERO, |sum, line| {
            line.total()
                .and_then(|amount| sum.checked_add(amount))
                .ok_or_else(|| ValidationError::AmountTooLarge {
                    name: line.name.clone(),
                })
        })
    }

    /// Append a line for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQuantity`] for a zero quantity,
    /// [`ValidationError::AmountTooLarge`] if the cart total would overflow,
    /// and [`InventoryError::DuplicateCartLine`] if the item is already
    /// present. Duplicates are rejected rather than merged.
    pub fn add(&mut self, item: &StockItem, quantity: u32) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity(quantity.to_string()).into());
        }
        if self.contains(&item.id) {
            return Err(InventoryError::DuplicateCartLine {
                name: item.name.clone(),
            });
        }
        self.lines.push(CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            sale_price: item.sale_price,
            quantity,
        });
        if let Err(e) = self.total() {
            self.lines.pop();
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: &StockItemId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| &line.item_id == id)?;
        Some(self.lines.remove(index))
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Check every line against quantities on hand in `snapshot`.
    ///
    /// An item missing from the snapshot counts as having nothing on hand.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::CartEmpty`] for an empty cart, or
    /// [`InventoryError::InsufficientStock`] naming the first line that
    /// cannot be covered.
    pub fn check_stock(&self, snapshot: &StockSnapshot) -> Result<(), InventoryError> {
        if self.is_empty() {
            return Err(InventoryError::CartEmpty);
        }
        for line in &self.lines {
            let available = snapshot.get(&line.item_id).map_or(0, |item| item.quantity);
            if available < line.quantity {
                return Err(InventoryError::InsufficientStock {
                    name: line.name.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }
        Ok(())
    }
}

/// Parse the cart quantity typed by the user.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidQuantity`] unless the text is a
/// positive whole number.
pub fn parse_cart_quantity(text: &str) -> Result<u32, ValidationError> {
    let trimmed = text.trim();
    match trimmed.parse::<u32>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(ValidationError::InvalidQuantity(trimmed.to_owned())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::stock::tests::item;

    #[test]
    fn test_duplicate_line_is_rejected_not_merged() {
        let rice = item("1", "Rice", 10, 200, 350);
        let mut cart = Cart::new();
        cart.add(&rice, 3).unwrap();

        let err = cart.add(&rice, 2).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateCartLine { ref name } if name == "Rice"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let rice = item("1", "Rice", 10, 200, 350);
        let mut cart = Cart::new();
        cart.add(&rice, 1).unwrap();

        assert!(cart.remove(&rice.id).is_some());
        assert!(cart.remove(&rice.id).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total() {
        let mut cart = Cart::new();
        cart.add(&item("1", "Rice", 10, 200, 350), 3).unwrap();
        cart.add(&item("2", "Beans", 10, 100, 125), 2).unwrap();
        assert_eq!(cart.total().unwrap(), Decimal::new(1300, 2));
    }

    #[test]
    fn test_add_rejects_line_whose_total_overflows() {
        let mut cart = Cart::new();
        cart.add(&item("1", "Rice", 10, 200, 350), 3).unwrap();

        let mut gold = item("2", "Gold", u32::MAX, 100, 100);
        gold.sale_price = Price::parse("100000000000000000000", "sale price").unwrap();
        let err = cart.add(&gold, 4_000_000_000).unwrap_err();
        assert_eq!(
            err,
            InventoryError::Validation(ValidationError::AmountTooLarge {
                name: "Gold".to_string(),
            })
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total().unwrap(), Decimal::new(1050, 2));
    }

    #[test]
    fn test_add_rejects_line_that_overflows_running_sum() {
        let mut big = item("1", "Big", u32::MAX, 100, 100);
        big.sale_price = Price::new(Decimal::MAX, "sale price").unwrap();
        let mut cart = Cart::new();
        cart.add(&big, 1).unwrap();

        let err = cart.add(&item("2", "Rice", 10, 200, 350), 1).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Validation(ValidationError::AmountTooLarge { ref name }) if name == "Rice"
        ));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_check_stock_names_first_offending_line() {
        let snapshot = StockSnapshot::new(
            vec![item("1", "Rice", 10, 200, 350), item("2", "Beans", 1, 100, 150)],
            Utc::now(),
        );
        let mut cart = Cart::new();
        cart.add(&item("1", "Rice", 10, 200, 350), 10).unwrap();
        cart.add(&item("2", "Beans", 1, 100, 150), 2).unwrap();

        let err = cart.check_stock(&snapshot).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                name: "Beans".to_string(),
                available: 1,
                requested: 2,
            }
        );
    }

    #[test]
    fn test_check_stock_treats_missing_item_as_empty() {
        let snapshot = StockSnapshot::new(Vec::new(), Utc::now());
        let mut cart = Cart::new();
        cart.add(&item("9", "Ghost", 4, 100, 200), 1).unwrap();
        assert!(matches!(
            cart.check_stock(&snapshot),
            Err(InventoryError::InsufficientStock { available: 0, .. })
        ));
    }

    #[test]
    fn test_check_stock_rejects_empty_cart() {
        let snapshot = StockSnapshot::default();
        assert_eq!(Cart::new().check_stock(&snapshot), Err(InventoryError::CartEmpty));
    }

    #[test]
    fn test_parse_cart_quantity() {
        assert_eq!(parse_cart_quantity(" 3 ").unwrap(), 3);
        assert!(parse_cart_quantity("0").is_err());
        assert!(parse_cart_quantity("-2").is_err());
        assert!(parse_cart_quantity("1.5").is_err());
        assert!(parse_cart_quantity("").is_err());
    }
}
