//! Stock items and the locally held stock snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, ValidationError};
use crate::types::{Category, Price, StockItemId, StockLevel};

/// Field values of a stock item as written to the stock collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItemInput {
    /// Product name, unique ignoring case.
    #[serde(rename = "nome")]
    pub name: String,
    /// Units on hand.
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    /// Low-stock threshold.
    #[serde(rename = "quantidadeMinima")]
    pub minimum_quantity: u32,
    /// Category, if one was chosen.
    #[serde(rename = "categoria", default, with = "crate::types::category::optional")]
    pub category: Option<Category>,
    /// Unit cost.
    #[serde(rename = "valorCompra")]
    pub purchase_price: Price,
    /// Unit sale price.
    #[serde(rename = "valorVenda")]
    pub sale_price: Price,
}

/// Margin text shown when the percentage does not fit a `Decimal`.
pub const MARGIN_OUT_OF_RANGE: &str = "n/a";

/// A stock item as fetched from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    /// Store-assigned identifier.
    pub id: StockItemId,
    /// Product name.
    pub name: String,
    /// Units on hand.
    pub quantity: u32,
    /// Low-stock threshold.
    pub minimum_quantity: u32,
    /// Category, if one was chosen.
    pub category: Option<Category>,
    /// Unit cost.
    pub purchase_price: Price,
    /// Unit sale price.
    pub sale_price: Price,
}

impl StockItem {
    /// Attach a store identifier to decoded field values.
    #[must_use]
    pub fn from_parts(id: StockItemId, input: StockItemInput) -> Self {
        Self {
            id,
            name: input.name,
            quantity: input.quantity,
            minimum_quantity: input.minimum_quantity,
            category: input.category,
            purchase_price: input.purchase_price,
            sale_price: input.sale_price,
        }
    }

    /// The item's field values without its identifier.
    #[must_use]
    pub fn to_input(&self) -> StockItemInput {
        StockItemInput {
            name: self.name.clone(),
            quantity: self.quantity,
            minimum_quantity: self.minimum_quantity,
            category: self.category,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
        }
    }

    /// Sale price minus purchase price. May be negative.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.sale_price.amount() - self.purchase_price.amount()
    }

    /// Profit as a percentage of the purchase price, or zero when the item
    /// cost nothing.
    ///
    /// `None` when the percentage does not fit a `Decimal`, which happens for
    /// purchase prices tiny enough to blow up the quotient.
    #[must_use]
    pub fn margin_percent(&self) -> Option<Decimal> {
        let cost = self.purchase_price.amount();
        if cost.is_zero() {
            return Some(Decimal::ZERO);
        }
        self.profit()
            .checked_div(cost)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Margin formatted with one decimal place, `"0"` for free items and
    /// `"n/a"` when the percentage is out of range.
    #[must_use]
    pub fn margin_display(&self) -> String {
        if self.purchase_price.amount().is_zero() {
            return "0".to_string();
        }
        self.margin_percent().map_or_else(
            || MARGIN_OUT_OF_RANGE.to_string(),
            |margin| {
                let rounded = margin.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
                format!("{rounded:.1}")
            },
        )
    }

    /// Stock level against the minimum threshold.
    #[must_use]
    pub const fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.quantity, self.minimum_quantity)
    }

    /// Whether the item is at or below its minimum threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_level().is_low()
    }
}

/// Case-insensitive key used for name uniqueness.
///
/// Uses Unicode lowercase mapping after trimming surrounding whitespace.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The stock collection as of the last fetch.
///
/// Never live: it only changes when the owner replaces it after a refresh.
#[derive(Debug, Clone, Default)]
pub struct StockSnapshot {
    items: Vec<StockItem>,
    fetched_at: Option<DateTime<Utc>>,
}

impl StockSnapshot {
    /// Snapshot of `items` taken at `fetched_at`.
    #[must_use]
    pub const fn new(items: Vec<StockItem>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            items,
            fetched_at: Some(fetched_at),
        }
    }

    /// Items in store order.
    #[must_use]
    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    /// When the snapshot was fetched; `None` before the first fetch.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by identifier.
    #[must_use]
    pub fn get(&self, id: &StockItemId) -> Option<&StockItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Look up an item by identifier, failing with a validation error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownItem`] if the item is not present.
    pub fn require(&self, id: &StockItemId) -> Result<&StockItem, ValidationError> {
        self.get(id)
            .ok_or_else(|| ValidationError::UnknownItem(id.clone()))
    }

    /// Find an item with the same name ignoring case, skipping `excluding`.
    #[must_use]
    pub fn find_by_name(&self, name: &str, excluding: Option<&StockItemId>) -> Option<&StockItem> {
        let key = name_key(name);
        self.items
            .iter()
            .filter(|item| Some(&item.id) != excluding)
            .find(|item| name_key(&item.name) == key)
    }

    /// Enforce name uniqueness for a candidate.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::DuplicateName`] if another item uses the name.
    pub fn ensure_unique_name(
        &self,
        name: &str,
        excluding: Option<&StockItemId>,
    ) -> Result<(), InventoryError> {
        match self.find_by_name(name, excluding) {
            Some(_) => Err(InventoryError::DuplicateName {
                name: name.trim().to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Items at or below their minimum threshold.
    pub fn low_stock(&self) -> impl Iterator<Item = &StockItem> {
        self.items.iter().filter(|item| item.is_low_stock())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(id: &str, name: &str, quantity: u32, buy: u32, sell: u32) -> StockItem {
        StockItem {
            id: StockItemId::new(id),
            name: name.to_string(),
            quantity,
            minimum_quantity: 5,
            category: Some(Category::Cereals),
            purchase_price: Price::from_cents(buy),
            sale_price: Price::from_cents(sell),
        }
    }

    #[test]
    fn test_profit_and_margin() {
        let rice = item("1", "Rice", 10, 200, 350);
        assert_eq!(rice.profit(), Decimal::new(150, 2));
        assert_eq!(rice.margin_display(), "75.0");
        assert!(!rice.is_low_stock());
    }

    #[test]
    fn test_margin_is_zero_for_free_items() {
        let sample = item("1", "Sample", 3, 0, 199);
        assert_eq!(sample.margin_percent(), Some(Decimal::ZERO));
        assert_eq!(sample.margin_display(), "0");
    }

    #[test]
    fn test_margin_out_of_range_for_tiny_cost() {
        let mut gum = item("1", "Gum", 3, 0, 1000);
        gum.purchase_price = Price::parse("0.0000000000000000000000000001", "purchase price").unwrap();
        assert_eq!(gum.margin_percent(), None);
        assert_eq!(gum.margin_display(), MARGIN_OUT_OF_RANGE);
        assert_eq!(gum.profit().round_dp(2), Decimal::new(1000, 2));
    }

    #[test]
    fn test_low_stock_lists_items_at_or_below_minimum() {
        let snapshot = StockSnapshot::new(
            vec![
                item("1", "Rice", 10, 200, 350),
                item("2", "Beans", 5, 100, 150),
                item("3", "Salt", 0, 50, 90),
            ],
            Utc::now(),
        );
        let low: Vec<&str> = snapshot.low_stock().map(|item| item.name.as_str()).collect();
        assert_eq!(low, ["Beans", "Salt"]);
        assert!(StockSnapshot::default().fetched_at().is_none());
        assert!(snapshot.fetched_at().is_some());
    }

    #[test]
    fn test_margin_rounds_to_one_decimal() {
        // 1.00 / 3.00 = 33.333...%
        let beans = item("1", "Beans", 3, 300, 400);
        assert_eq!(beans.margin_display(), "33.3");
        let loss = item("2", "Soap", 3, 300, 200);
        assert_eq!(loss.margin_display(), "-33.3");
    }

    #[test]
    fn test_find_by_name_ignores_case_and_excluded_item() {
        let snapshot = StockSnapshot::new(
            vec![item("1", "Rice", 10, 200, 350), item("2", "Beans", 1, 100, 150)],
            Utc::now(),
        );

        assert!(snapshot.find_by_name("rICE", None).is_some());
        assert!(snapshot.find_by_name(" rice ", None).is_some());
        assert!(
            snapshot
                .find_by_name("RICE", Some(&StockItemId::new("1")))
                .is_none()
        );
        assert!(matches!(
            snapshot.ensure_unique_name("BEANS", Some(&StockItemId::new("1"))),
            Err(InventoryError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_unicode_case_folding() {
        let snapshot = StockSnapshot::new(vec![item("1", "AÇÚCAR", 4, 300, 450)], Utc::now());
        assert!(snapshot.find_by_name("açúcar", None).is_some());
    }

    #[test]
    fn test_decodes_stored_document() {
        let fields = serde_json::json!({
            "nome": "Rice",
            "quantidade": 10,
            "quantidadeMinima": 5,
            "categoria": "Cereais",
            "valorCompra": 2,
            "valorVenda": 3.5,
        });
        let input: StockItemInput = serde_json::from_value(fields).unwrap();
        assert_eq!(input.category, Some(Category::Cereals));
        assert_eq!(input.sale_price, Price::from_cents(350));

        let unset = serde_json::json!({
            "nome": "Misc",
            "quantidade": 0,
            "quantidadeMinima": 0,
            "categoria": "",
            "valorCompra": 0,
            "valorVenda": 0,
        });
        let input: StockItemInput = serde_json::from_value(unset).unwrap();
        assert_eq!(input.category, None);
    }

    #[test]
    fn test_rejects_negative_stored_quantity() {
        let fields = serde_json::json!({
            "nome": "Rice",
            "quantidade": -1,
            "quantidadeMinima": 5,
            "categoria": "Cereais",
            "valorCompra": 2,
            "valorVenda": 3.5,
        });
        assert!(serde_json::from_value::<StockItemInput>(fields).is_err());
    }
}
