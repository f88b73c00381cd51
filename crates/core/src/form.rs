//! Text-field forms for the stock and sale screens.
//!
//! Forms hold exactly what the user typed. Validation turns them into typed
//! values or a [`ValidationError`] naming the first bad field.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stock::{StockItem, StockItemInput};
use crate::types::{Category, Price, StockItemId};

/// Whether the stock form creates a new item or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FormMode {
    /// Submitting creates a new item.
    #[default]
    Creating,
    /// Submitting updates this item in place.
    Editing(StockItemId),
}

impl FormMode {
    /// The item being edited, if any.
    #[must_use]
    pub const fn editing(&self) -> Option<&StockItemId> {
        match self {
            Self::Creating => None,
            Self::Editing(id) => Some(id),
        }
    }

    /// Whether `id` is the item being edited.
    #[must_use]
    pub fn is_editing(&self, id: &StockItemId) -> bool {
        self.editing() == Some(id)
    }
}

/// Stock item form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockForm {
    pub name: String,
    pub quantity: String,
    pub minimum_quantity: String,
    pub category: String,
    pub purchase_price: String,
    pub sale_price: String,
}

impl StockForm {
    /// Blank form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled with an item's current values.
    #[must_use]
    pub fn from_item(item: &StockItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            minimum_quantity: item.minimum_quantity.to_string(),
            category: item.category.map(Category::label).unwrap_or_default().to_string(),
            purchase_price: item.purchase_price.amount().normalize().to_string(),
            sale_price: item.sale_price.amount().normalize().to_string(),
        }
    }

    /// Reset every field to blank.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate and convert into stored field values.
    ///
    /// Every field is required. Blank checks run over all fields before any
    /// number is parsed, so a missing field is reported ahead of a malformed
    /// one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<StockItemInput, ValidationError> {
        let required = [
            ("name", &self.name),
            ("quantity", &self.quantity),
            ("minimum quantity", &self.minimum_quantity),
            ("category", &self.category),
            ("purchase price", &self.purchase_price),
            ("sale price", &self.sale_price),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::MissingField { field: *field });
        }

        Ok(StockItemInput {
            name: self.name.trim().to_owned(),
            quantity: parse_count(&self.quantity, "quantity")?,
            minimum_quantity: parse_count(&self.minimum_quantity, "minimum quantity")?,
            category: Some(Category::parse(&self.category)?),
            purchase_price: Price::parse(&self.purchase_price, "purchase price")?,
            sale_price: Price::parse(&self.sale_price, "sale price")?,
        })
    }
}

/// Parse a non-negative whole number typed into a form field.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for blank text,
/// [`ValidationError::Negative`] for negative integers, and
/// [`ValidationError::InvalidNumber`] for anything else that is not an
/// integer in range.
pub fn parse_count(text: &str, field: &'static str) -> Result<u32, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(ValidationError::Negative { field }),
        Ok(n) => u32::try_from(n).map_err(|_| ValidationError::InvalidNumber {
            field,
            value: trimmed.to_owned(),
        }),
        Err(_) => Err(ValidationError::InvalidNumber {
            field,
            value: trimmed.to_owned(),
        }),
    }
}

/// Sale screen selection inputs: the chosen item and the typed quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleSelection {
    pub item_id: Option<StockItemId>,
    pub quantity: String,
}

impl SaleSelection {
    /// Reset both inputs.
    pub fn clear(&mut self) {
        self.item_id = None;
        self.quantity.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rice_form() -> StockForm {
        StockForm {
            name: "  Rice ".to_string(),
            quantity: "10".to_string(),
            minimum_quantity: "5".to_string(),
            category: "Cereals".to_string(),
            purchase_price: "2.00".to_string(),
            sale_price: "3.50".to_string(),
        }
    }

    #[test]
    fn test_valid_form_converts() {
        let input = rice_form().validate().unwrap();
        assert_eq!(input.name, "Rice");
        assert_eq!(input.quantity, 10);
        assert_eq!(input.minimum_quantity, 5);
        assert_eq!(input.category, Some(Category::Cereals));
        assert_eq!(input.purchase_price, Price::from_cents(200));
        assert_eq!(input.sale_price, Price::from_cents(350));
    }

    #[test]
    fn test_blank_fields_are_reported_first() {
        let mut form = rice_form();
        form.quantity = "abc".to_string();
        form.sale_price = " ".to_string();
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "sale price" })
        );
    }

    #[test]
    fn test_unparseable_numbers() {
        let mut form = rice_form();
        form.minimum_quantity = "five".to_string();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidNumber { field: "minimum quantity", .. })
        ));

        let mut form = rice_form();
        form.purchase_price = "2,00,0".to_string();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidNumber { field: "purchase price", .. })
        ));
    }

    #[test]
    fn test_negative_stock_is_rejected() {
        let mut form = rice_form();
        form.quantity = "-1".to_string();
        assert_eq!(
            form.validate(),
            Err(ValidationError::Negative { field: "quantity" })
        );
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let mut form = rice_form();
        form.category = String::new();
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "category" })
        );
    }

    #[test]
    fn test_from_item_round_trips_through_validate() {
        let item = StockItem::from_parts(StockItemId::new("abc"), rice_form().validate().unwrap());
        let form = StockForm::from_item(&item);
        assert_eq!(form.purchase_price, "2");
        assert_eq!(form.sale_price, "3.5");
        assert_eq!(form.category, "Cereals");
        assert_eq!(form.validate().unwrap(), item.to_input());
    }

    #[test]
    fn test_form_mode() {
        let id = StockItemId::new("abc");
        let mode = FormMode::Editing(id.clone());
        assert!(mode.is_editing(&id));
        assert!(!FormMode::Creating.is_editing(&id));
        assert_eq!(FormMode::default(), FormMode::Creating);
    }
}
