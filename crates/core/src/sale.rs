//! Sale records: the append-only log in the sales collection.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, SaleRecordId};

/// One completed sale of a single product.
///
/// The name is denormalized: renaming or deleting the stock item later does
/// not touch existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Product name at the time of sale.
    #[serde(rename = "nome")]
    pub name: String,
    /// Units sold.
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    /// Unit price snapshot. Absent for quick-sell records.
    #[serde(rename = "valorVenda", default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Price>,
    /// When the sale happened.
    #[serde(rename = "data", with = "millis")]
    pub sold_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Record for the single-unit quick-sell action.
    #[must_use]
    pub fn quick_sell(name: impl Into<String>, sold_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            sale_price: None,
            sold_at: sale_timestamp(sold_at),
        }
    }

    /// Line total, when a price snapshot exists.
    ///
    /// Records written by other clients are not bounded, so the product
    /// saturates at `Decimal::MAX` instead of overflowing.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.sale_price
            .map(|price| price.amount().saturating_mul(Decimal::from(self.quantity)))
    }
}

/// RFC 3339 in UTC with exactly three fractional digits, e.g.
/// `2026-03-14T09:30:00.000Z`.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// A sale record together with its store identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSale {
    /// Store-assigned identifier.
    pub id: SaleRecordId,
    /// The record.
    pub record: SaleRecord,
}

/// Normalize a timestamp to the millisecond precision stored in records.
#[must_use]
pub fn sale_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_quick_sell_record_has_no_price() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let record = SaleRecord::quick_sell("Rice", at);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "nome": "Rice",
                "quantidade": 1,
                "data": "2026-03-14T09:30:00.000Z",
            })
        );
        assert_eq!(record.total(), None);
    }

    #[test]
    fn test_reads_timestamps_in_other_precisions() {
        for (text, nanos) in [
            ("2026-03-14T09:30:00Z", 0),
            ("2026-03-14T09:30:00.5Z", 500_000_000),
            ("2026-03-14T06:30:00.250-03:00", 250_000_000),
        ] {
            let record: SaleRecord = serde_json::from_value(serde_json::json!({
                "nome": "Rice",
                "quantidade": 1,
                "data": text,
            }))
            .unwrap();
            let expected = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
                + chrono::Duration::nanoseconds(nanos);
            assert_eq!(record.sold_at, expected, "{text}");
        }
    }

    #[test]
    fn test_total_saturates_for_oversized_records() {
        let record = SaleRecord {
            name: "Gold".to_string(),
            quantity: u32::MAX,
            sale_price: Some(Price::new(Decimal::MAX, "sale price").unwrap()),
            sold_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        };
        assert_eq!(record.total(), Some(Decimal::MAX));
    }

    #[test]
    fn test_timestamp_keeps_milliseconds() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let record = SaleRecord {
            name: "Rice".to_string(),
            quantity: 3,
            sale_price: Some(Price::from_cents(350)),
            sold_at: sale_timestamp(at),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["data"], "2023-11-14T22:13:20.123Z");
        assert_eq!(value["valorVenda"], 3.5);
        assert_eq!(record.total(), Some(Decimal::new(1050, 2)));
    }
}
