//! Stock item categories.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Product category.
///
/// Serialized with the values already stored in the stock collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Cereais")]
    Cereals,
    #[serde(rename = "Limpeza")]
    Cleaning,
    #[serde(rename = "Frios")]
    Deli,
    #[serde(rename = "Bebidas")]
    Beverages,
    #[serde(rename = "Animais")]
    Pet,
    #[serde(rename = "Outros")]
    Other,
}

impl Category {
    /// Every selectable category, in picker order.
    pub const ALL: [Self; 6] = [
        Self::Cereals,
        Self::Cleaning,
        Self::Deli,
        Self::Beverages,
        Self::Pet,
        Self::Other,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cereals => "Cereals",
            Self::Cleaning => "Cleaning",
            Self::Deli => "Deli",
            Self::Beverages => "Beverages",
            Self::Pet => "Pet",
            Self::Other => "Other",
        }
    }

    /// Value written to the `categoria` field.
    #[must_use]
    pub const fn stored_value(self) -> &'static str {
        match self {
            Self::Cereals => "Cereais",
            Self::Cleaning => "Limpeza",
            Self::Deli => "Frios",
            Self::Beverages => "Bebidas",
            Self::Pet => "Animais",
            Self::Other => "Outros",
        }
    }

    /// Parse a category chosen in a form.
    ///
    /// Accepts the display label or the stored value, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for blank input and
    /// [`ValidationError::InvalidCategory`] for anything else unknown.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField { field: "category" });
        }
        Self::ALL
            .into_iter()
            .find(|c| {
                c.label().eq_ignore_ascii_case(trimmed)
                    || c.stored_value().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ValidationError::InvalidCategory(trimmed.to_owned()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serde adapter for an optional category stored as `""` when unset.
pub mod optional {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Category;

    #[allow(clippy::ref_option)] // signature required by serde `with`
    pub fn serialize<S: Serializer>(value: &Option<Category>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(category) => category.serialize(s),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Category>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.stored_value() == raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown category: {raw}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_label_or_stored_value() {
        assert_eq!(Category::parse("cereals").unwrap(), Category::Cereals);
        assert_eq!(Category::parse("Frios").unwrap(), Category::Deli);
        assert_eq!(Category::parse(" PET ").unwrap(), Category::Pet);
    }

    #[test]
    fn test_parse_rejects_blank_and_unknown() {
        assert!(matches!(
            Category::parse(""),
            Err(ValidationError::MissingField { field: "category" })
        ));
        assert!(matches!(
            Category::parse("Toys"),
            Err(ValidationError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_serializes_stored_value() {
        let value = serde_json::to_value(Category::Beverages).unwrap();
        assert_eq!(value, serde_json::json!("Bebidas"));
    }
}
